//! Gateway configuration.
//!
//! Process settings come from environment variables following the
//! 12-factor pattern. The server catalog and credential table come from an
//! external JSON document so secrets never live in the binary; the two
//! sections are kept separate because descriptors are served outward while
//! credentials never are.

use crate::constants::DEFAULT_BIND_ADDR;
use crate::credentials::{normalize_server_name, Credential, CredentialStore};
use crate::error::GatewayError;
use crate::registry::{ProjectCatalog, ServerDescriptor};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Fully loaded gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    /// Accepted API keys for the `/api/` gate.
    pub api_keys: Vec<String>,
    /// The discovery catalog served to callers.
    pub catalog: ProjectCatalog,
    /// Connection secrets keyed by logical server name.
    pub credentials: CredentialStore,
}

/// On-disk shape of the catalog document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    project: String,
    allowed_projects: Vec<String>,
    servers: Vec<ServerDescriptor>,
    credentials: HashMap<String, Credential>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GATEWAY_CONFIG`: path to the catalog document (required)
    /// - `GATEWAY_API_KEYS`: comma-separated accepted API keys (required)
    /// - `GATEWAY_BIND`: listener address (default: `0.0.0.0:5000`)
    pub fn from_env() -> Result<Self, GatewayError> {
        let path = std::env::var("GATEWAY_CONFIG").map_err(|_| {
            GatewayError::config("GATEWAY_CONFIG environment variable is required")
        })?;

        let api_keys = std::env::var("GATEWAY_API_KEYS")
            .map_err(|_| {
                GatewayError::config("GATEWAY_API_KEYS environment variable is required")
            })?
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();

        let bind_addr =
            std::env::var("GATEWAY_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Self::from_file(path, bind_addr, api_keys)
    }

    /// Load the catalog document from a file and assemble the config.
    pub fn from_file(
        path: impl AsRef<Path>,
        bind_addr: String,
        api_keys: Vec<String>,
    ) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::config(format!("cannot read catalog document {}: {e}", path.display()))
        })?;
        let document: CatalogDocument = serde_json::from_str(&raw).map_err(|e| {
            GatewayError::config(format!(
                "invalid catalog document {}: {e}",
                path.display()
            ))
        })?;

        if api_keys.is_empty() {
            return Err(GatewayError::config("at least one API key is required"));
        }

        // Lookup failures stay lazy per request; a mismatch between the two
        // sections is still worth flagging at startup.
        for server in &document.servers {
            if !document
                .credentials
                .keys()
                .any(|k| normalize_server_name(k) == normalize_server_name(&server.name))
            {
                warn!(server = %server.name, "catalog server has no credential entry");
            }
        }

        Ok(Config {
            bind_addr,
            api_keys,
            catalog: ProjectCatalog {
                project: document.project,
                allowed_projects: document.allowed_projects,
                servers: document.servers,
            },
            credentials: CredentialStore::new(document.credentials),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "project": "Dev",
        "allowedProjects": ["Samast", "GTD", "Dev"],
        "servers": [
            {
                "name": "DB1",
                "displayName": "DB 1 (172.16.13.11)",
                "address": "172.16.13.11",
                "project": "Samast"
            },
            {
                "name": "DEV1",
                "displayName": "DEV 1 (192.168.0.101)",
                "address": "192.168.0.101",
                "project": "Dev"
            }
        ],
        "credentials": {
            "DB1": {
                "address": "172.16.13.11",
                "username": "gateway",
                "password": "s3cret"
            }
        }
    }"#;

    fn write_document() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_catalog_and_credentials() {
        let file = write_document();
        let config = Config::from_file(
            file.path(),
            "127.0.0.1:5000".to_string(),
            vec!["key-1".to_string()],
        )
        .unwrap();

        assert_eq!(config.catalog.project, "Dev");
        assert_eq!(config.catalog.servers.len(), 2);
        assert_eq!(config.credentials.len(), 1);
        assert!(config.credentials.credential_for("db1").is_ok());
    }

    #[test]
    fn test_server_without_credential_is_lazy_not_fatal() {
        let file = write_document();
        let config = Config::from_file(
            file.path(),
            "127.0.0.1:5000".to_string(),
            vec!["key-1".to_string()],
        )
        .unwrap();

        // DEV1 is in the registry but has no credential: discovery still
        // lists it, resolution fails per request.
        assert!(config.catalog.descriptor("DEV1").is_some());
        assert!(config.credentials.credential_for("DEV1").is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file(
            "/nonexistent/catalog.json",
            "127.0.0.1:5000".to_string(),
            vec!["key-1".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_empty_api_keys_rejected() {
        let file = write_document();
        let err = Config::from_file(file.path(), "127.0.0.1:5000".to_string(), vec![])
            .unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_malformed_document_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = Config::from_file(
            file.path(),
            "127.0.0.1:5000".to_string(),
            vec!["key-1".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
