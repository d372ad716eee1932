//! Credential store keyed by logical server name.
//!
//! Credentials live in their own section of the catalog document and are a
//! distinct trust boundary from the registry: descriptors are serialized
//! outward for discovery, credentials never are. A name present in one but
//! not the other is a configuration error surfaced at lookup time.

use crate::error::GatewayError;
use serde::Deserialize;
use std::collections::HashMap;

/// Connection secrets for one server.
///
/// `Debug` is implemented by hand so a stray log line cannot leak the
/// password, and there is deliberately no `Serialize` impl.
#[derive(Clone, Deserialize)]
pub struct Credential {
    /// Host or `host,port` the TDS session connects to. May differ from
    /// the registry's display address.
    pub address: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fixed mapping from normalized logical name to credential.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, Credential>,
}

impl CredentialStore {
    /// Build a store from raw entries, normalizing every key.
    pub fn new(entries: impl IntoIterator<Item = (String, Credential)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, cred)| (normalize_server_name(&name), cred))
                .collect(),
        }
    }

    /// Look up the credential for a logical server name.
    ///
    /// The name is normalized first, so `"DB1"`, `"db1"` and
    /// `"DB1 (172.16.13.11)"` all resolve to the same entry.
    pub fn credential_for(&self, name: &str) -> Result<&Credential, GatewayError> {
        self.entries
            .get(&normalize_server_name(name))
            .ok_or_else(|| GatewayError::unknown_server(name))
    }

    /// Number of configured credentials.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize a logical server name for lookup: drop a trailing
/// parenthesized annotation, trim, uppercase.
pub fn normalize_server_name(name: &str) -> String {
    let cleaned = match name.find('(') {
        Some(pos) => &name[..pos],
        None => name,
    };
    cleaned.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new([(
            "DB1".to_string(),
            Credential {
                address: "172.16.13.11".into(),
                username: "gateway".into(),
                password: "secret".into(),
            },
        )])
    }

    #[test]
    fn test_normalize_strips_annotation() {
        assert_eq!(normalize_server_name("DB1 (172.16.13.11)"), "DB1");
        assert_eq!(normalize_server_name("db1"), "DB1");
        assert_eq!(normalize_server_name("  DB1  "), "DB1");
        assert_eq!(normalize_server_name("DB1"), "DB1");
    }

    #[test]
    fn test_annotated_and_plain_names_resolve_identically() {
        let s = store();
        let plain = s.credential_for("DB1").unwrap();
        let annotated = s.credential_for("DB1 (172.16.13.11)").unwrap();
        assert_eq!(plain.address, annotated.address);
        assert_eq!(plain.username, annotated.username);
    }

    #[test]
    fn test_unknown_name_fails_with_unknown_server() {
        let err = store().credential_for("DB9").unwrap_err();
        assert!(matches!(err, GatewayError::UnknownServer(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let s = store();
        let cred = s.credential_for("DB1").unwrap();
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
