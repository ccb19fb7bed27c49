//! Grounded on `auth/apikey.py`: read a configurable header, strip a
//! `Bearer ` prefix if present, and look the rest up in the identity store.

use crate::auth::AuthHandler;
use crate::identity_store::IdentityStore;
use axum::http::HeaderMap;
use gateway_core::error::GatewayError;
use gateway_core::identity::Identity;
use std::sync::Arc;

pub struct ApiKeyAuthHandler {
    header_name: String,
    identity_store: Arc<dyn IdentityStore>,
}

impl ApiKeyAuthHandler {
    pub fn new(header_name: String, identity_store: Arc<dyn IdentityStore>) -> Self {
        Self { header_name, identity_store }
    }
}

/// Strip a case-insensitive `Bearer ` prefix, matching the origin's
/// `key[7:] if key[:6].lower() == "bearer"` slice (7 bytes: "Bearer ").
fn strip_bearer_prefix(raw: &str) -> &str {
    if raw.len() >= 7 && raw[..6].eq_ignore_ascii_case("bearer") {
        &raw[7..]
    } else {
        raw
    }
}

#[async_trait::async_trait]
impl AuthHandler for ApiKeyAuthHandler {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, GatewayError> {
        let raw = headers
            .get(&self.header_name)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| GatewayError::Auth("missing API key header".to_string()))?;
        let key = strip_bearer_prefix(raw);
        self.identity_store
            .find(key)
            .ok_or_else(|| GatewayError::Auth("invalid API key".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity_store::JsonIdentityStore;
    use axum::http::HeaderValue;

    fn store() -> Arc<dyn IdentityStore> {
        let json = r#"[{"id": "tenant-a", "auth_key": "sk-a"}]"#;
        Arc::new(JsonIdentityStore::from_json(json).unwrap())
    }

    #[test]
    fn strips_bearer_prefix_case_insensitively() {
        assert_eq!(strip_bearer_prefix("Bearer sk-a"), "sk-a");
        assert_eq!(strip_bearer_prefix("bearer sk-a"), "sk-a");
        assert_eq!(strip_bearer_prefix("sk-a"), "sk-a");
    }

    #[tokio::test]
    async fn authenticates_with_bearer_prefixed_key() {
        let handler = ApiKeyAuthHandler::new("Authorization".to_string(), store());
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer sk-a"));
        let identity = handler.authenticate(&headers).await.unwrap();
        assert_eq!(identity.id, "tenant-a");
    }

    #[tokio::test]
    async fn rejects_unknown_key() {
        let handler = ApiKeyAuthHandler::new("Authorization".to_string(), store());
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer nope"));
        assert!(handler.authenticate(&headers).await.is_err());
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let handler = ApiKeyAuthHandler::new("Authorization".to_string(), store());
        assert!(handler.authenticate(&HeaderMap::new()).await.is_err());
    }
}
