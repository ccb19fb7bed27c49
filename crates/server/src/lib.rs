pub mod auth;
pub mod dispatch;
pub mod handler;
pub mod identity_store;
pub mod logging_sink;
pub mod middleware;
pub mod observability_sink;
pub mod relay;
pub mod settings;

use crate::auth::AuthHandler;
use crate::identity_store::IdentityStore;
use crate::logging_sink::LoggingSink;
use crate::observability_sink::ObservabilitySink;
use crate::settings::Settings;
use axum::{Router, middleware as axum_mw};
use gateway_core::registry::ModelRegistry;
use gateway_provider::AdapterRegistry;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Default inbound body size cap. Upstream vision/image payloads can be
/// large; this only bounds what the gateway itself will buffer before
/// forwarding, not the upstream provider's own limits.
const BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub model_registry: Arc<ModelRegistry>,
    pub adapters: Arc<AdapterRegistry>,
    pub identity_store: Arc<dyn IdentityStore>,
    pub auth_handler: Arc<dyn AuthHandler>,
    pub logging_sink: Arc<dyn LoggingSink>,
    pub observability_sink: Arc<dyn ObservabilitySink>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.app_requests_timeout)
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/health", axum::routing::get(handler::health::health));

    let api_routes = Router::new()
        .route(
            "/chat/completions",
            axum::routing::post(handler::chat_completions::chat_completions),
        )
        .route(
            "/v1/chat/completions",
            axum::routing::post(handler::chat_completions::chat_completions),
        )
        .route("/completions", axum::routing::post(handler::completions::completions))
        .route("/v1/completions", axum::routing::post(handler::completions::completions))
        .route("/embeddings", axum::routing::post(handler::embeddings::embeddings))
        .route("/v1/embeddings", axum::routing::post(handler::embeddings::embeddings))
        .route(
            "/images/generations",
            axum::routing::post(handler::images::images_generations),
        )
        .route(
            "/v1/images/generations",
            axum::routing::post(handler::images::images_generations),
        )
        .route("/models", axum::routing::get(handler::models::list_models))
        .route("/v1/models", axum::routing::get(handler::models::list_models))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(axum_mw::from_fn_with_state(state.clone(), auth::auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(axum_mw::from_fn(middleware::request_logging::request_logging_middleware))
        .layer(axum_mw::from_fn(middleware::request_context::request_context_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
