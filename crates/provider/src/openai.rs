//! Grounded on `llm/provider/openai.py`: flat `api.openai.com` paths, bearer
//! auth, optional `OpenAI-Organization` header.

use crate::{ProviderAdapter, UpstreamRequestSpec};
use gateway_core::registry::{EndpointTag, InstanceDescriptor};
use std::collections::HashMap;

pub struct OpenAiAdapter;

impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn build_request(&self, endpoint: EndpointTag, instance: &InstanceDescriptor) -> UpstreamRequestSpec {
        let InstanceDescriptor::Openai {
            openai_api_key,
            openai_organization,
        } = instance
        else {
            unreachable!("OpenAiAdapter invoked with a non-openai instance");
        };

        let path = match endpoint {
            EndpointTag::ChatCompletions => "chat/completions",
            EndpointTag::Completions => "completions",
            EndpointTag::Embeddings => "embeddings",
            EndpointTag::ImagesGenerations => "images/generations",
        };
        let url = format!("https://api.openai.com/v1/{path}");

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {openai_api_key}"));
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(org) = openai_organization
            && !org.is_empty()
        {
            headers.insert("OpenAI-Organization".to_string(), org.clone());
        }

        UpstreamRequestSpec { url, headers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_chat_completions_url() {
        let instance = InstanceDescriptor::Openai {
            openai_api_key: "sk-test".to_string(),
            openai_organization: None,
        };
        let spec = OpenAiAdapter.build_request(EndpointTag::ChatCompletions, &instance);
        assert_eq!(spec.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(spec.headers["Authorization"], "Bearer sk-test");
        assert!(!spec.headers.contains_key("OpenAI-Organization"));
    }

    #[test]
    fn includes_organization_header_when_present() {
        let instance = InstanceDescriptor::Openai {
            openai_api_key: "sk-test".to_string(),
            openai_organization: Some("org-123".to_string()),
        };
        let spec = OpenAiAdapter.build_request(EndpointTag::Embeddings, &instance);
        assert_eq!(spec.url, "https://api.openai.com/v1/embeddings");
        assert_eq!(spec.headers["OpenAI-Organization"], "org-123");
    }
}
