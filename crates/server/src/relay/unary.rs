//! Non-streaming relay: issue one POST, await the full JSON body, return it
//! to the caller, and schedule the log/observability emission in the
//! background so it never delays the response. Grounded on the non-stream
//! branch of `llm/dispatcher.py::dispatch`.

use crate::logging_sink::LoggingSink;
use crate::observability_sink::ObservabilitySink;
use chrono::Utc;
use gateway_core::error::GatewayError;
use gateway_core::identity::Identity;
use gateway_core::registry::EndpointTag;
use gateway_core::trim::trim_for_logging;
use gateway_provider::UpstreamRequestSpec;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[allow(clippy::too_many_arguments)]
pub async fn relay_unary(
    client: &reqwest::Client,
    spec: &UpstreamRequestSpec,
    request_body: Value,
    endpoint: EndpointTag,
    identity: Identity,
    metadata: Value,
    logging_sink: Arc<dyn LoggingSink>,
    observability_sink: Arc<dyn ObservabilitySink>,
    timeout: Duration,
) -> Result<Value, GatewayError> {
    let start_time = Utc::now();

    let req = gateway_provider::common::apply_headers(client.post(&spec.url).timeout(timeout), spec).json(&request_body);

    let response = req.send().await.map_err(|err| {
        if err.is_timeout() {
            GatewayError::UpstreamTimeout
        } else {
            GatewayError::Internal(format!("upstream request failed: {err}"))
        }
    })?;

    let response_body: Value = response
        .json()
        .await
        .map_err(|err| GatewayError::Internal(format!("malformed upstream response: {err}")))?;

    let end_time = Utc::now();
    let trimmed_request = trim_for_logging(&request_body);
    let trimmed_response = trim_for_logging(&response_body);
    let caller_metadata = serde_json::json!({ "caller": &identity });

    tokio::spawn(async move {
        logging_sink
            .log(endpoint, caller_metadata, trimmed_request.clone(), trimmed_response.clone())
            .await;
        observability_sink
            .emit(endpoint, &identity, metadata, &trimmed_request, &trimmed_response, start_time, end_time, None)
            .await;
    });

    Ok(response_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging_sink::NoneLoggingSink;
    use crate::observability_sink::NoneObservabilitySink;
    use std::collections::HashMap;

    #[tokio::test]
    async fn propagates_connection_failure_as_internal_error() {
        let client = reqwest::Client::new();
        let spec = UpstreamRequestSpec {
            url: "http://127.0.0.1:0/unreachable".to_string(),
            headers: HashMap::new(),
        };
        let err = relay_unary(
            &client,
            &spec,
            serde_json::json!({"model": "gpt-4"}),
            EndpointTag::ChatCompletions,
            Identity::anonymous(),
            Value::Null,
            Arc::new(NoneLoggingSink),
            Arc::new(NoneObservabilitySink),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::Internal(_)));
    }
}
