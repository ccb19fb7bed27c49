//! Provider adapters: for a given instance descriptor, build the upstream
//! URL and auth headers for each endpoint family. Grounded on
//! `llm/provider/{interface,openai,azure}.py`: each provider module there
//! exposes one pure URL/header builder per endpoint, leaving the actual
//! HTTP call and streaming relay to shared dispatch code. The split is kept
//! here — `ProviderAdapter` only builds the request; the server crate's
//! relay performs it.

pub mod azure;
pub mod common;
pub mod openai;

use gateway_core::registry::{EndpointTag, InstanceDescriptor};
use std::collections::HashMap;

/// Everything needed to issue the upstream HTTP request: a fully-formed URL
/// and the headers that authenticate it. The request body is forwarded
/// verbatim by the caller (minus `observation_metadata`, stripped upstream
/// of this contract).
#[derive(Debug, Clone)]
pub struct UpstreamRequestSpec {
    pub url: String,
    pub headers: HashMap<String, String>,
}

/// Builds upstream request specs for one provider family.
pub trait ProviderAdapter: Send + Sync {
    /// Short provider tag, matching `InstanceDescriptor::provider()`.
    fn name(&self) -> &'static str;

    /// Build the URL + headers for one endpoint against one instance.
    fn build_request(&self, endpoint: EndpointTag, instance: &InstanceDescriptor) -> UpstreamRequestSpec;
}

/// Static registry mapping a provider tag to its adapter, resolved once at
/// startup. Unknown names are a configuration error (an instance descriptor
/// with an unregistered provider tag cannot deserialize in the first place,
/// since `InstanceDescriptor` is a closed enum — this registry exists so the
/// dispatcher need not match on the enum itself).
pub struct AdapterRegistry {
    openai: openai::OpenAiAdapter,
    azure: azure::AzureAdapter,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            openai: openai::OpenAiAdapter,
            azure: azure::AzureAdapter,
        }
    }

    pub fn for_instance(&self, instance: &InstanceDescriptor) -> &dyn ProviderAdapter {
        match instance {
            InstanceDescriptor::Openai { .. } => &self.openai,
            InstanceDescriptor::Azure { .. } => &self.azure,
        }
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
