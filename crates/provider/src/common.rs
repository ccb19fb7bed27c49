//! Shared helpers for turning an `UpstreamRequestSpec` into a `reqwest`
//! request. Grounded on `crates/provider/src/common.rs` in the teacher
//! crate (`apply_headers`), trimmed to the single concern the gateway
//! still needs — the retry/translation helpers it also carried are out of
//! scope here.

use crate::UpstreamRequestSpec;

/// Apply a spec's headers onto a request builder.
pub fn apply_headers(mut req: reqwest::RequestBuilder, spec: &UpstreamRequestSpec) -> reqwest::RequestBuilder {
    for (k, v) in &spec.headers {
        req = req.header(k.as_str(), v.as_str());
    }
    req
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn applies_all_headers() {
        let client = reqwest::Client::new();
        let mut headers = HashMap::new();
        headers.insert("api-key".to_string(), "secret".to_string());
        let spec = UpstreamRequestSpec {
            url: "https://example.com".to_string(),
            headers,
        };
        let req = apply_headers(client.post(&spec.url), &spec).build().unwrap();
        assert_eq!(req.headers().get("api-key").unwrap(), "secret");
    }
}
