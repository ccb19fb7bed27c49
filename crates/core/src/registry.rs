//! The model registry: endpoint/model/instance data model and loader.
//!
//! Grounded on `llm/dispatcher.py`'s `load_models`/`get_model`: a JSON
//! document of model descriptors, each carrying one or more provider
//! instances and zero or more aliases. Aliases are registered as
//! shallow-copied descriptors sharing the same capabilities and instance
//! list, exactly as the source does with its `model_list` alias expansion.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One of the four routes the gateway proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointTag {
    ChatCompletions,
    Completions,
    Embeddings,
    ImagesGenerations,
}

impl EndpointTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatCompletions => "chat_completions",
            Self::Completions => "completions",
            Self::Embeddings => "embeddings",
            Self::ImagesGenerations => "images_generations",
        }
    }

    /// The object-type tag a streaming chunk is expected to carry, used by
    /// reassembly. Only chat/completions streams.
    pub fn stream_object_type(&self) -> Option<&'static str> {
        match self {
            Self::ChatCompletions => Some("chat.completion.chunk"),
            Self::Completions => Some("text_completion"),
            _ => None,
        }
    }
}

/// A tagged upstream deployment, carrying its own credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum InstanceDescriptor {
    Openai {
        openai_api_key: String,
        #[serde(default)]
        openai_organization: Option<String>,
    },
    Azure {
        azure_endpoint: String,
        azure_deployment: String,
        azure_api_version: String,
        azure_api_key: String,
    },
}

impl InstanceDescriptor {
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Openai { .. } => "openai",
            Self::Azure { .. } => "azure",
        }
    }

    /// Expand `$NAME`/`${NAME}` references in every string field against
    /// the process environment. Called once, at registry load time.
    fn expand_env(&mut self) {
        match self {
            Self::Openai {
                openai_api_key,
                openai_organization,
            } => {
                *openai_api_key = expand_env_vars(openai_api_key);
                if let Some(org) = openai_organization {
                    *org = expand_env_vars(org);
                }
            }
            Self::Azure {
                azure_endpoint,
                azure_deployment,
                azure_api_version,
                azure_api_key,
            } => {
                *azure_endpoint = expand_env_vars(azure_endpoint);
                *azure_deployment = expand_env_vars(azure_deployment);
                *azure_api_version = expand_env_vars(azure_api_version);
                *azure_api_key = expand_env_vars(azure_api_key);
            }
        }
    }
}

/// A logical model: an id, the endpoints it supports, and the instances it
/// may be dispatched to.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub capabilities: HashSet<EndpointTag>,
    pub instances: Vec<InstanceDescriptor>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// The read-only, load-once registry of models (and their aliases).
pub struct ModelRegistry {
    models: HashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    /// Load from a `models.json` file. Fails on duplicate ids/aliases, a
    /// malformed document, or an unreadable file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read model registry '{}': {e}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let descriptors: Vec<ModelDescriptor> = serde_json::from_str(contents)?;
        let mut models: HashMap<String, ModelDescriptor> = HashMap::new();

        for mut descriptor in descriptors {
            anyhow::ensure!(
                !descriptor.instances.is_empty(),
                "model '{}' has no instances",
                descriptor.id
            );
            for instance in &mut descriptor.instances {
                instance.expand_env();
            }
            let aliases = std::mem::take(&mut descriptor.aliases);

            anyhow::ensure!(
                !models.contains_key(&descriptor.id),
                "duplicate model id or alias: {}",
                descriptor.id
            );
            let primary_id = descriptor.id.clone();
            models.insert(primary_id.clone(), descriptor);

            for alias in aliases {
                anyhow::ensure!(
                    !models.contains_key(&alias),
                    "duplicate model id or alias: {}",
                    alias
                );
                let mut alias_descriptor = models[&primary_id].clone_with_id(&alias);
                alias_descriptor.aliases.clear();
                models.insert(alias, alias_descriptor);
            }
        }

        Ok(Self { models })
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.values()
    }
}

impl ModelDescriptor {
    fn clone_with_id(&self, id: &str) -> Self {
        Self {
            id: id.to_string(),
            capabilities: self.capabilities.clone(),
            instances: self.instances.clone(),
            aliases: self.aliases.clone(),
        }
    }
}

impl Clone for InstanceDescriptor {
    fn clone(&self) -> Self {
        match self {
            Self::Openai {
                openai_api_key,
                openai_organization,
            } => Self::Openai {
                openai_api_key: openai_api_key.clone(),
                openai_organization: openai_organization.clone(),
            },
            Self::Azure {
                azure_endpoint,
                azure_deployment,
                azure_api_version,
                azure_api_key,
            } => Self::Azure {
                azure_endpoint: azure_endpoint.clone(),
                azure_deployment: azure_deployment.clone(),
                azure_api_version: azure_api_version.clone(),
                azure_api_key: azure_api_key.clone(),
            },
        }
    }
}

/// Expand `$NAME` and `${NAME}` references against the process environment.
/// An undefined variable is left untouched (the literal segment is kept).
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            if let Some(rest) = input[i + 1..].strip_prefix('{') {
                if let Some(end) = rest.find('}') {
                    let name = &rest[..end];
                    match std::env::var(name) {
                        Ok(val) => result.push_str(&val),
                        Err(_) => {
                            result.push_str("${");
                            result.push_str(name);
                            result.push('}');
                        }
                    }
                    i += 1 + 1 + name.len() + 1;
                    continue;
                }
            } else {
                let rest = &input[i + 1..];
                let name_len = rest
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .count();
                if name_len > 0 {
                    let name = &rest[..name_len];
                    match std::env::var(name) {
                        Ok(val) => result.push_str(&val),
                        Err(_) => {
                            result.push('$');
                            result.push_str(name);
                        }
                    }
                    i += 1 + name_len;
                    continue;
                }
            }
        }
        let ch = input[i..].chars().next().unwrap();
        result.push(ch);
        i += ch.len_utf8();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_both_dollar_forms() {
        unsafe {
            std::env::set_var("GATEWAY_TEST_KEY", "sk-abc123");
        }
        assert_eq!(expand_env_vars("$GATEWAY_TEST_KEY"), "sk-abc123");
        assert_eq!(expand_env_vars("${GATEWAY_TEST_KEY}"), "sk-abc123");
        assert_eq!(
            expand_env_vars("prefix-${GATEWAY_TEST_KEY}-suffix"),
            "prefix-sk-abc123-suffix"
        );
    }

    #[test]
    fn leaves_undefined_vars_literal() {
        unsafe {
            std::env::remove_var("GATEWAY_TEST_UNDEFINED");
        }
        assert_eq!(expand_env_vars("$GATEWAY_TEST_UNDEFINED"), "$GATEWAY_TEST_UNDEFINED");
        assert_eq!(
            expand_env_vars("${GATEWAY_TEST_UNDEFINED}"),
            "${GATEWAY_TEST_UNDEFINED}"
        );
    }

    fn sample_json() -> &'static str {
        r#"[
            {
                "id": "gpt-4",
                "capabilities": ["chat_completions"],
                "aliases": ["gpt-4-alias"],
                "instances": [
                    {"provider": "openai", "openai_api_key": "sk-test"}
                ]
            }
        ]"#
    }

    #[test]
    fn loads_and_registers_aliases() {
        let registry = ModelRegistry::from_json(sample_json()).unwrap();
        let base = registry.get("gpt-4").unwrap();
        let alias = registry.get("gpt-4-alias").unwrap();
        assert_eq!(alias.capabilities, base.capabilities);
        assert_eq!(alias.instances.len(), base.instances.len());
    }

    fn one_instance() -> &'static str {
        r#"[{"provider": "openai", "openai_api_key": "sk-test"}]"#
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = format!(
            r#"[
                {{"id": "dup", "capabilities": [], "instances": {inst}}},
                {{"id": "dup", "capabilities": [], "instances": {inst}}}
            ]"#,
            inst = one_instance()
        );
        assert!(ModelRegistry::from_json(&json).is_err());
    }

    #[test]
    fn rejects_alias_colliding_with_id() {
        let json = format!(
            r#"[
                {{"id": "a", "capabilities": [], "instances": {inst}, "aliases": ["b"]}},
                {{"id": "b", "capabilities": [], "instances": {inst}}}
            ]"#,
            inst = one_instance()
        );
        assert!(ModelRegistry::from_json(&json).is_err());
    }

    #[test]
    fn rejects_model_with_no_instances() {
        let json = r#"[{"id": "empty", "capabilities": [], "instances": []}]"#;
        assert!(ModelRegistry::from_json(json).is_err());
    }
}
