use crate::AppState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use std::sync::Arc;

pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut data: Vec<Value> = state
        .model_registry
        .all()
        .map(|descriptor| {
            let mut capabilities: Vec<&'static str> =
                descriptor.capabilities.iter().map(|tag| tag.as_str()).collect();
            capabilities.sort_unstable();
            json!({
                "id": descriptor.id,
                "capabilities": capabilities,
                "object": "model",
                "proxied_by": state.settings.app_name,
            })
        })
        .collect();
    data.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));

    Json(json!({ "object": "list", "data": data }))
}
