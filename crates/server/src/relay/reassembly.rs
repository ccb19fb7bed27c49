//! Post-stream reassembly: turn the buffered SSE chunks of a streaming
//! response back into a single JSON object shaped like its non-streaming
//! counterpart. Grounded on `llm/utils/openai.py::merge_response_chunks`.

use bytes::Bytes;
use serde_json::{Map, Value, json};

pub struct ReassemblyOutcome {
    pub response: Value,
    pub merge_successful: bool,
}

/// Reassemble a chat/completions stream from its raw chunks.
///
/// `object_type` is the `object` field an accepted event must carry
/// (`chat.completion.chunk` or `text_completion`); events with any other
/// `object` value are skipped, not treated as stream termination.
/// `prompt_tokens` is the best-effort estimate computed before the request
/// was issued, if any (see [`crate::dispatch`] for how it is produced).
pub fn reassemble(chunks: &[Bytes], object_type: &str, prompt_tokens: Option<u64>) -> ReassemblyOutcome {
    let mut concatenated = Vec::new();
    for chunk in chunks {
        concatenated.extend_from_slice(chunk);
    }
    let text = String::from_utf8_lossy(&concatenated);

    let mut base: Option<Value> = None;
    let mut accumulated = String::new();
    let mut completion_tokens: u64 = 0;
    let mut finish_reason: Option<Value> = None;
    let mut merge_successful = false;

    for segment in text.split("\n\n") {
        if segment.len() < 5 {
            break;
        }
        if !segment.starts_with("data:") {
            break;
        }
        let payload = if segment.len() > 6 { &segment[6..] } else { "" };
        if payload.trim() == "[DONE]" {
            merge_successful = true;
            break;
        }

        let Ok(event) = serde_json::from_str::<Value>(payload) else {
            break;
        };

        if event.get("object").and_then(Value::as_str) != Some(object_type) {
            continue;
        }

        if base.is_none() {
            let mut seeded = event.clone();
            if object_type == "chat.completion.chunk"
                && seeded.pointer("/choices/0/delta/content").is_none()
                && let Some(delta) = seeded.pointer_mut("/choices/0/delta")
            {
                delta.as_object_mut().map(|m| m.insert("content".to_string(), Value::String(String::new())));
            }
            base = Some(seeded);
            continue;
        }

        let contributed = if object_type == "chat.completion.chunk" {
            event.pointer("/choices/0/delta/content").and_then(Value::as_str)
        } else {
            event.pointer("/choices/0/text").and_then(Value::as_str)
        };
        if let Some(text_piece) = contributed {
            accumulated.push_str(text_piece);
            completion_tokens += 1;
        }
        if let Some(reason) = event.pointer("/choices/0/finish_reason")
            && !reason.is_null()
        {
            finish_reason = Some(reason.clone());
        }
    }

    let Some(mut response) = base else {
        return ReassemblyOutcome {
            response: json!({ "error": "Merge failed" }),
            merge_successful: false,
        };
    };

    if object_type == "chat.completion.chunk" {
        if let Some(existing) = response.pointer("/choices/0/delta/content").and_then(Value::as_str) {
            accumulated.insert_str(0, existing);
        }
        if let Some(choice) = response.pointer_mut("/choices/0")
            && let Some(obj) = choice.as_object_mut()
        {
            let mut message = Map::new();
            message.insert("role".to_string(), json!("assistant"));
            message.insert("content".to_string(), Value::String(accumulated));
            obj.remove("delta");
            obj.insert("message".to_string(), Value::Object(message));
            if let Some(reason) = finish_reason {
                obj.insert("finish_reason".to_string(), reason);
            }
        }
    } else {
        if let Some(existing) = response.pointer("/choices/0/text").and_then(Value::as_str) {
            accumulated.insert_str(0, existing);
        }
        if let Some(choice) = response.pointer_mut("/choices/0")
            && let Some(obj) = choice.as_object_mut()
        {
            obj.insert("text".to_string(), Value::String(accumulated));
            if let Some(reason) = finish_reason {
                obj.insert("finish_reason".to_string(), reason);
            }
        }
    }

    let mut usage = json!({ "completion_tokens": completion_tokens });
    if let Some(prompt) = prompt_tokens
        && let Some(usage_obj) = usage.as_object_mut()
    {
        usage_obj.insert("prompt_tokens".to_string(), json!(prompt));
        usage_obj.insert("total_tokens".to_string(), json!(prompt + completion_tokens));
    }
    if let Some(obj) = response.as_object_mut() {
        obj.insert("usage".to_string(), usage);
        obj.insert("streaming_response".to_string(), json!(true));
        obj.insert("stream_merge_successful".to_string(), json!(merge_successful));
    }

    ReassemblyOutcome { response, merge_successful }
}
