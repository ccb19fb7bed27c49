//! Identity lookup by auth key. Grounded on `identity/identity_store.py`'s
//! `JSONIdentityStore`: a flat JSON array of identity records, loaded once
//! and scanned linearly by `auth_key` on each lookup — the store favors
//! load-time simplicity over lookup speed, matching the origin, since
//! tenant counts stay small enough that a `HashMap` would be premature.

use gateway_core::identity::Identity;
use std::path::Path;

/// Resolves an opaque key (bearer token, JWT claim value, ...) to an
/// `Identity`. Implementations never see the raw `Authorization` header —
/// the auth handler strips any scheme prefix first.
pub trait IdentityStore: Send + Sync {
    fn find(&self, key: &str) -> Option<Identity>;
}

/// The `identity_store = "none"` variant. Only valid alongside
/// `auth_method = "none"`, where no lookup is ever attempted; wiring this up
/// behind any other auth method is a configuration error the caller must
/// catch before requests arrive.
pub struct DisabledIdentityStore;

impl IdentityStore for DisabledIdentityStore {
    fn find(&self, _key: &str) -> Option<Identity> {
        unreachable!("DisabledIdentityStore::find called — auth_method requires an identity store")
    }
}

/// The `identity_store = "json"` variant: identities loaded eagerly from a
/// JSON file at startup, matched by linear scan on `auth_key`.
pub struct JsonIdentityStore {
    identities: Vec<Identity>,
}

impl JsonIdentityStore {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read identity store '{}': {e}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let identities: Vec<Identity> = serde_json::from_str(contents)?;
        Ok(Self { identities })
    }
}

impl IdentityStore for JsonIdentityStore {
    fn find(&self, key: &str) -> Option<Identity> {
        self.identities
            .iter()
            .find(|identity| identity.auth_key.as_deref() == Some(key))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
            {"id": "tenant-a", "name": "Tenant A", "auth_key": "key-a"},
            {"id": "tenant-b", "name": "Tenant B", "auth_key": "key-b"}
        ]"#
    }

    #[test]
    fn finds_identity_by_auth_key() {
        let store = JsonIdentityStore::from_json(sample_json()).unwrap();
        let identity = store.find("key-a").unwrap();
        assert_eq!(identity.id, "tenant-a");
    }

    #[test]
    fn returns_none_for_unknown_key() {
        let store = JsonIdentityStore::from_json(sample_json()).unwrap();
        assert!(store.find("nope").is_none());
    }

    #[test]
    #[should_panic]
    fn disabled_store_panics_on_find() {
        DisabledIdentityStore.find("anything");
    }
}
