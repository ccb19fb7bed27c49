//! The authenticated caller record.
//!
//! Grounded on `identity/identity.py`'s `Identity` model: the external
//! serialization exposes only `{id, name, info}`. Rather than skip secret
//! fields with an annotation, the whole type hand-writes `Serialize` so a
//! redacted copy never needs to exist alongside the real one.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-tenant observability credentials (e.g. a Langfuse project keypair).
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityCredentials {
    pub public_key: String,
    pub secret_key: String,
}

/// The authenticated caller. Constructed per request by an auth handler;
/// immutable thereafter.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub info: Option<Value>,
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub observability: Option<ObservabilityCredentials>,
}

impl Identity {
    /// The synthetic identity used when auth is disabled.
    pub fn anonymous() -> Self {
        Self {
            id: "anonymous".to_string(),
            name: Some("Anonymous".to_string()),
            info: None,
            auth_key: None,
            observability: None,
        }
    }
}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Identity", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("info", &self.info)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_serialization_seals_secrets() {
        let identity = Identity {
            id: "tenant-1".to_string(),
            name: Some("Tenant One".to_string()),
            info: Some(serde_json::json!({"plan": "pro"})),
            auth_key: Some("sk-super-secret".to_string()),
            observability: Some(ObservabilityCredentials {
                public_key: "pk-1".to_string(),
                secret_key: "sk-1".to_string(),
            }),
        };

        let rendered = serde_json::to_string(&identity).unwrap();
        assert!(!rendered.contains("sk-super-secret"));
        assert!(!rendered.contains("pk-1"));
        assert!(!rendered.contains("sk-1"));
        assert!(!rendered.contains("auth_key"));
        assert!(!rendered.contains("observability"));

        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["id"], "tenant-1");
        assert_eq!(value["name"], "Tenant One");
        assert_eq!(value["info"]["plan"], "pro");
    }

    #[test]
    fn anonymous_identity_has_no_secrets() {
        let anon = Identity::anonymous();
        assert_eq!(anon.id, "anonymous");
        assert!(anon.auth_key.is_none());
        assert!(anon.observability.is_none());
    }
}
