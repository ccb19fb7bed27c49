//! Grounded on `auth/jwt.py`: read a bearer JWT, optionally verify it
//! against a JWKS endpoint, then use a configured claim as the identity
//! store lookup key.
//!
//! One behavior is preserved verbatim from the origin even though it reads
//! as a bug: a missing JWT header raises `HTTPException(500, ...)`, not 401
//! — every other auth failure in this module is a 401. See `DESIGN.md`
//! Open Question 1.

use crate::auth::AuthHandler;
use crate::identity_store::IdentityStore;
use axum::http::HeaderMap;
use gateway_core::error::GatewayError;
use gateway_core::identity::Identity;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use std::sync::Arc;

pub struct JwtAuthHandler {
    header_name: String,
    id_key: String,
    verify_signature: bool,
    jwks_uri: Option<String>,
    issuer: Option<String>,
    audience: Option<String>,
    identity_store: Arc<dyn IdentityStore>,
    http_client: reqwest::Client,
}

impl JwtAuthHandler {
    pub fn new(
        header_name: String,
        id_key: String,
        verify_signature: bool,
        jwks_uri: Option<String>,
        issuer: Option<String>,
        audience: Option<String>,
        identity_store: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            header_name,
            id_key,
            verify_signature,
            jwks_uri,
            issuer,
            audience,
            identity_store,
            http_client: reqwest::Client::new(),
        }
    }

    async fn decode_claims(&self, token: &str) -> Result<serde_json::Value, GatewayError> {
        let header = decode_header(token)
            .map_err(|e| GatewayError::Auth(format!("malformed JWT header: {e}")))?;

        if !self.verify_signature {
            let mut validation = Validation::new(header.alg);
            validation.insecure_disable_signature_validation();
            validation.validate_exp = false;
            validation.required_spec_claims.clear();
            let data = decode::<serde_json::Value>(token, &DecodingKey::from_secret(&[]), &validation)
                .map_err(|e| GatewayError::Auth(format!("could not decode JWT: {e}")))?;
            return Ok(data.claims);
        }

        let jwks_uri = self
            .jwks_uri
            .as_ref()
            .ok_or_else(|| GatewayError::Internal("JWT signature verification enabled without a JWKS URI".to_string()))?;
        let jwks: JwkSet = self
            .http_client
            .get(jwks_uri)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| GatewayError::Internal(format!("failed to fetch JWKS: {e}")))?
            .json()
            .await
            .map_err(|e| GatewayError::Internal(format!("malformed JWKS document: {e}")))?;

        let jwk = match &header.kid {
            Some(kid) => jwks.find(kid),
            None => jwks.keys.first(),
        }
        .ok_or_else(|| GatewayError::Auth("no matching JWKS key".to_string()))?;

        let decoding_key = DecodingKey::from_jwk(jwk)
            .map_err(|e| GatewayError::Internal(format!("unusable JWKS key: {e}")))?;

        let mut validation = Validation::new(header.alg);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &self.audience {
            validation.set_audience(&[audience]);
        }

        let data = decode::<serde_json::Value>(token, &decoding_key, &validation)
            .map_err(|_| GatewayError::Auth("could not verify JWT".to_string()))?;
        Ok(data.claims)
    }
}

fn strip_bearer_prefix(raw: &str) -> &str {
    if raw.len() >= 7 && raw[..6].eq_ignore_ascii_case("bearer") {
        &raw[7..]
    } else {
        raw
    }
}

#[async_trait::async_trait]
impl AuthHandler for JwtAuthHandler {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, GatewayError> {
        let raw = headers.get(&self.header_name).and_then(|v| v.to_str().ok()).ok_or_else(|| {
            GatewayError::Internal("could not get JWT from headers".to_string())
        })?;
        let token = strip_bearer_prefix(raw);

        let claims = self.decode_claims(token).await?;
        let key = claims
            .get(&self.id_key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayError::Auth(format!("JWT missing '{}' claim", self.id_key)))?;

        self.identity_store
            .find(key)
            .ok_or_else(|| GatewayError::Auth("JWT does not match a valid identity".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(strip_bearer_prefix("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer_prefix("abc.def.ghi"), "abc.def.ghi");
    }

    #[tokio::test]
    async fn missing_header_is_internal_not_auth_error() {
        use crate::identity_store::DisabledIdentityStore;
        let handler = JwtAuthHandler::new(
            "Authorization".to_string(),
            "oid".to_string(),
            false,
            None,
            None,
            None,
            Arc::new(DisabledIdentityStore),
        );
        let err = handler.authenticate(&HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
