//! Authentication: turn an inbound request's headers into an `Identity`.
//! Grounded on `auth/{base,none,apikey,jwt}.py`'s `AuthHandlerInterface`
//! hierarchy — one handler per `auth_method` setting, chosen once at
//! startup and shared across requests.

pub mod apikey;
pub mod jwt;
pub mod none;

use crate::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gateway_core::error::GatewayError;
use gateway_core::identity::Identity;
use std::sync::Arc;

/// Resolves the caller's `Identity` from request headers.
#[async_trait::async_trait]
pub trait AuthHandler: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, GatewayError>;
}

/// Axum middleware wiring: authenticate the request and stash the resolved
/// `Identity` as an extension for downstream handlers, or short-circuit with
/// the auth handler's error response.
pub async fn auth_middleware(State(state): State<Arc<AppState>>, mut request: Request, next: Next) -> Response {
    match state.auth_handler.authenticate(request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
