use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the gateway's request path.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("model not valid for this endpoint: {0}")]
    CapabilityMismatch(String),

    #[error("upstream read timeout")]
    UpstreamTimeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::ModelNotFound(_) => StatusCode::NOT_FOUND,
            Self::CapabilityMismatch(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::UpstreamTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Detail string exposed to the client. `Internal` suppresses its cause.
    fn detail(&self) -> String {
        match self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.client_message(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Auth(_) => "authentication failed".to_string(),
            Self::ModelNotFound(_) => "Model not found".to_string(),
            Self::CapabilityMismatch(_) => "Model not valid for this endpoint".to_string(),
            Self::UpstreamTimeout => "upstream read timeout".to_string(),
            Self::Internal(_) => "internal error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal error");
        }
        let status = self.status_code();
        let body = json!({ "detail": self.detail() });
        (status, [("content-type", "application/json")], body.to_string()).into_response()
    }
}
