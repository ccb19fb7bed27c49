//! Grounded on `llm/provider/azure.py`: deployment-scoped paths under the
//! tenant's Azure endpoint, `api-key` header auth. The images-generations
//! path's doubled slash (`/images//generations`) is preserved verbatim —
//! see `DESIGN.md` Open Question 3.

use crate::{ProviderAdapter, UpstreamRequestSpec};
use gateway_core::registry::{EndpointTag, InstanceDescriptor};
use std::collections::HashMap;

pub struct AzureAdapter;

impl ProviderAdapter for AzureAdapter {
    fn name(&self) -> &'static str {
        "azure"
    }

    fn build_request(&self, endpoint: EndpointTag, instance: &InstanceDescriptor) -> UpstreamRequestSpec {
        let InstanceDescriptor::Azure {
            azure_endpoint,
            azure_deployment,
            azure_api_version,
            azure_api_key,
        } = instance
        else {
            unreachable!("AzureAdapter invoked with a non-azure instance");
        };

        let base = azure_endpoint.trim_end_matches('/');
        let path = match endpoint {
            EndpointTag::ChatCompletions => format!(
                "/openai/deployments/{azure_deployment}/chat/completions?api-version={azure_api_version}"
            ),
            EndpointTag::Completions => format!(
                "/openai/deployments/{azure_deployment}/completions?api-version={azure_api_version}"
            ),
            EndpointTag::Embeddings => format!(
                "/openai/deployments/{azure_deployment}/embeddings?api-version={azure_api_version}"
            ),
            EndpointTag::ImagesGenerations => format!(
                "/openai/deployments/{azure_deployment}/images//generations?api-version={azure_api_version}"
            ),
        };
        let url = format!("{base}{path}");

        let mut headers = HashMap::new();
        headers.insert("api-key".to_string(), azure_api_key.clone());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        UpstreamRequestSpec { url, headers }
    }
}
