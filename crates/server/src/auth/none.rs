//! Grounded on `auth/none.py`: no credential is checked, every request is
//! the same synthetic identity.

use crate::auth::AuthHandler;
use axum::http::HeaderMap;
use gateway_core::error::GatewayError;
use gateway_core::identity::Identity;

pub struct NoneAuthHandler;

#[async_trait::async_trait]
impl AuthHandler for NoneAuthHandler {
    async fn authenticate(&self, _headers: &HeaderMap) -> Result<Identity, GatewayError> {
        Ok(Identity::anonymous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_returns_anonymous() {
        let identity = NoneAuthHandler.authenticate(&HeaderMap::new()).await.unwrap();
        assert_eq!(identity.id, "anonymous");
    }
}
