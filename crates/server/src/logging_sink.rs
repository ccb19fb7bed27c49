//! Request/response logging. Grounded on `llm/logging/{interface,mongodb}.py`:
//! a single `log_api_call` contract, emitted asynchronously and never
//! allowed to fail the request it describes. The concrete variant here
//! posts to an HTTP collector rather than a document database — the
//! teacher crate's stack already carries `reqwest` for this role and no
//! database driver is part of it; see `DESIGN.md`.

use gateway_core::registry::EndpointTag;
use serde_json::Value;

#[async_trait::async_trait]
pub trait LoggingSink: Send + Sync {
    async fn log(&self, endpoint: EndpointTag, metadata: Value, request: Value, response: Value);
    async fn shutdown(&self);
}

pub struct NoneLoggingSink;

#[async_trait::async_trait]
impl LoggingSink for NoneLoggingSink {
    async fn log(&self, _endpoint: EndpointTag, _metadata: Value, _request: Value, _response: Value) {}
    async fn shutdown(&self) {}
}

pub struct HttpLoggingSink {
    url: String,
    client: reqwest::Client,
}

impl HttpLoggingSink {
    pub fn new(url: String) -> Self {
        Self { url, client: reqwest::Client::new() }
    }
}

#[async_trait::async_trait]
impl LoggingSink for HttpLoggingSink {
    async fn log(&self, endpoint: EndpointTag, metadata: Value, request: Value, response: Value) {
        let body = serde_json::json!({
            "endpoint": endpoint.as_str(),
            "metadata": metadata,
            "request": request,
            "response": response,
        });
        if let Err(err) = self.client.post(&self.url).json(&body).send().await {
            tracing::warn!(error = %err, "failed to post log record");
        }
    }

    async fn shutdown(&self) {}
}
