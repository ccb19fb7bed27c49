//! Deep structural trimming of request/response bodies. Grounded on
//! `llm/wrappers.py`'s `trim_url`/`trim_data`: the walker returns a new
//! `Value`, leaving the original (and the bytes already sent downstream)
//! untouched.
//!
//! The url/b64_json rules apply to every trimmed value, sink-bound or not.
//! The embedding-vector truncation is narrower: `embeddings_wrapper` only
//! ever applies it to a value logged through `logger.debug(...)` when
//! `debug_level > 0`, never to what reaches `logging_client`/
//! `observability_client`. `trim_for_logging` (fed to both sinks) therefore
//! leaves `embedding` arrays untouched; `trim_for_debug_log` additionally
//! truncates them, for an ephemeral debug line only.

use serde_json::Value;

const URL_TRUNCATE_LEN: usize = 30;
const B64_TRUNCATE_LEN: usize = 10;
const EMBEDDING_TRUNCATE_LEN: usize = 5;
const TRUNCATION_SUFFIX: &str = "...[truncated]";

/// Trim a value for the logging/observability sinks: truncates image data
/// URLs and base64 image payloads, leaves embedding vectors untouched.
pub fn trim_for_logging(value: &Value) -> Value {
    walk(value, false)
}

/// Trim a value for an ephemeral debug-log line: everything
/// `trim_for_logging` does, plus embedding-vector truncation.
pub fn trim_for_debug_log(value: &Value) -> Value {
    walk(value, true)
}

fn walk(value: &Value, trim_embeddings: bool) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                let trimmed = match key.as_str() {
                    "url" => trim_data_url(val, trim_embeddings),
                    "b64_json" => trim_b64_json(val, trim_embeddings),
                    "embedding" if trim_embeddings => trim_embedding(val),
                    _ => walk(val, trim_embeddings),
                };
                out.insert(key.clone(), trimmed);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| walk(v, trim_embeddings)).collect()),
        other => other.clone(),
    }
}

fn trim_data_url(val: &Value, trim_embeddings: bool) -> Value {
    match val.as_str() {
        Some(s) if s.starts_with("data:image") => Value::String(truncate(s, URL_TRUNCATE_LEN)),
        Some(_) => val.clone(),
        None => walk(val, trim_embeddings),
    }
}

fn trim_b64_json(val: &Value, trim_embeddings: bool) -> Value {
    match val.as_str() {
        Some(s) => Value::String(truncate(s, B64_TRUNCATE_LEN)),
        None => walk(val, trim_embeddings),
    }
}

fn trim_embedding(val: &Value) -> Value {
    match val.as_array() {
        Some(arr) => Value::Array(arr.iter().take(EMBEDDING_TRUNCATE_LEN).cloned().collect()),
        None => walk(val, true),
    }
}

fn truncate(s: &str, len: usize) -> String {
    let prefix: String = s.chars().take(len).collect();
    format!("{prefix}{TRUNCATION_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncates_data_image_url() {
        let long_b64 = "A".repeat(100);
        let input = json!({"data": [{"url": format!("data:image/png;base64,{long_b64}")}]});
        let trimmed = trim_for_logging(&input);
        let url = trimmed["data"][0]["url"].as_str().unwrap();
        assert_eq!(url.len(), URL_TRUNCATE_LEN + TRUNCATION_SUFFIX.len());
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn leaves_non_data_urls_untouched() {
        let input = json!({"url": "https://example.com/image.png"});
        let trimmed = trim_for_logging(&input);
        assert_eq!(trimmed["url"], "https://example.com/image.png");
    }

    #[test]
    fn truncates_b64_json() {
        let input = json!({"b64_json": "AAAAAAAAAAAAAAAAAAAAAAAA"});
        let trimmed = trim_for_logging(&input);
        assert_eq!(trimmed["b64_json"], format!("AAAAAAAAAA{TRUNCATION_SUFFIX}"));
    }

    #[test]
    fn leaves_embedding_vectors_untouched_for_sinks() {
        let input = json!({"embedding": [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]});
        let trimmed = trim_for_logging(&input);
        assert_eq!(trimmed["embedding"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn truncates_embedding_vectors_for_debug_log() {
        let input = json!({"embedding": [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]});
        let trimmed = trim_for_debug_log(&input);
        assert_eq!(trimmed["embedding"].as_array().unwrap().len(), EMBEDDING_TRUNCATE_LEN);
    }

    #[test]
    fn idempotent() {
        let long_b64 = "A".repeat(100);
        let input = json!({
            "data": [{"url": format!("data:image/png;base64,{long_b64}"), "b64_json": long_b64}],
            "embedding": [1,2,3,4,5,6,7,8]
        });
        let once = trim_for_logging(&input);
        let twice = trim_for_logging(&once);
        assert_eq!(once, twice);

        let once_debug = trim_for_debug_log(&input);
        let twice_debug = trim_for_debug_log(&once_debug);
        assert_eq!(once_debug, twice_debug);
    }

    #[test]
    fn does_not_mutate_original() {
        let input = json!({"url": "data:image/png;base64,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"});
        let before = input.clone();
        let _ = trim_for_logging(&input);
        assert_eq!(input, before);
    }
}
