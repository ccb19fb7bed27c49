//! Streaming relay: the cancellation-scoped chunk pump / disconnect watcher
//! pair from spec §4.F. The source expresses this as two sibling tasks
//! under an `anyio` cancel scope; `tokio::select!` over the upstream poll
//! and the downstream sender's `closed()` future gives the same
//! first-to-finish-wins semantics in one task, without a second spawn.

use crate::logging_sink::LoggingSink;
use crate::observability_sink::ObservabilitySink;
use crate::relay::reassembly;
use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use gateway_core::error::GatewayError;
use gateway_core::identity::Identity;
use gateway_core::registry::EndpointTag;
use gateway_core::trim::trim_for_logging;
use gateway_provider::UpstreamRequestSpec;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

#[allow(clippy::too_many_arguments)]
pub async fn relay_stream(
    client: &reqwest::Client,
    spec: &UpstreamRequestSpec,
    request_body: Value,
    endpoint: EndpointTag,
    identity: Identity,
    metadata: Value,
    logging_sink: Arc<dyn LoggingSink>,
    observability_sink: Arc<dyn ObservabilitySink>,
    prompt_tokens: Option<u64>,
    timeout: Duration,
) -> Result<Response, GatewayError> {
    let start_time = Utc::now();

    let req = gateway_provider::common::apply_headers(client.post(&spec.url).timeout(timeout), spec).json(&request_body);

    let upstream = req.send().await.map_err(|err| {
        if err.is_timeout() {
            GatewayError::UpstreamTimeout
        } else {
            GatewayError::Internal(format!("upstream request failed: {err}"))
        }
    })?;

    let status = upstream.status();
    let headers = upstream.headers().clone();
    let mut upstream_chunks = upstream.bytes_stream();

    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(32);

    tokio::spawn(async move {
        let mut buffer: Vec<Bytes> = Vec::new();

        loop {
            tokio::select! {
                biased;
                _ = tx.closed() => {
                    tracing::debug!("downstream disconnected, cancelling upstream pump");
                    break;
                }
                next = upstream_chunks.next() => {
                    match next {
                        Some(Ok(bytes)) => {
                            buffer.push(bytes.clone());
                            if tx.send(Ok(bytes)).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(err)) => {
                            tracing::warn!(error = %err, "upstream stream read failed");
                            break;
                        }
                        None => break,
                    }
                }
            }
        }
        // `upstream_chunks` (and the connection it owns) drops here, exactly
        // once, regardless of which select arm broke the loop.
        drop(upstream_chunks);

        let end_time = Utc::now();
        let object_type = endpoint.stream_object_type().unwrap_or("chat.completion.chunk");
        let outcome = reassembly::reassemble(&buffer, object_type, prompt_tokens);

        let trimmed_request = trim_for_logging(&request_body);
        let trimmed_response = trim_for_logging(&outcome.response);
        let caller_metadata = serde_json::json!({ "caller": &identity });

        logging_sink
            .log(endpoint, caller_metadata, trimmed_request.clone(), trimmed_response.clone())
            .await;
        observability_sink
            .emit(endpoint, &identity, metadata, &trimmed_request, &trimmed_response, start_time, end_time, None)
            .await;
    });

    let body = Body::from_stream(ReceiverStream::new(rx));
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging_sink::NoneLoggingSink;
    use crate::observability_sink::NoneObservabilitySink;
    use std::collections::HashMap;

    #[tokio::test]
    async fn surfaces_connection_failure_before_streaming_begins() {
        let client = reqwest::Client::new();
        let spec = UpstreamRequestSpec {
            url: "http://127.0.0.1:0/unreachable".to_string(),
            headers: HashMap::new(),
        };
        let err = relay_stream(
            &client,
            &spec,
            serde_json::json!({"model": "gpt-4", "stream": true}),
            EndpointTag::ChatCompletions,
            Identity::anonymous(),
            Value::Null,
            Arc::new(NoneLoggingSink),
            Arc::new(NoneObservabilitySink),
            None,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::Internal(_)));
    }
}
