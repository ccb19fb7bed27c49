use crate::AppState;
use crate::dispatch;
use axum::Extension;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use gateway_core::error::GatewayError;
use gateway_core::identity::Identity;
use gateway_core::registry::EndpointTag;
use serde_json::Value;
use std::sync::Arc;

pub async fn embeddings(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let body: Value =
        serde_json::from_slice(&body).map_err(|e| GatewayError::BadRequest(format!("invalid JSON body: {e}")))?;

    dispatch::dispatch(
        EndpointTag::Embeddings,
        body,
        identity,
        &state.model_registry,
        &state.adapters,
        &state.http_client,
        state.logging_sink.clone(),
        state.observability_sink.clone(),
        state.request_timeout(),
    )
    .await
}
