//! Server registry and project catalog.
//!
//! The catalog is a static list of server descriptors grouped by project
//! tag. It is built once at startup from the catalog document and never
//! mutated afterwards, so handlers share it behind an `Arc` with no
//! synchronization.

use serde::{Deserialize, Serialize};

/// A single configured server as exposed to callers.
///
/// The display name conventionally carries the address in parentheses,
/// e.g. `"DB 1 (172.16.13.11)"`; the credential store strips that
/// annotation when the display name is used as a lookup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDescriptor {
    /// Logical name callers use instead of a network address.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Network address shown for discovery.
    pub address: String,
    /// Project tag this server belongs to.
    pub project: String,
}

/// The full configuration exposed by the discovery endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCatalog {
    /// The project this deployment is running as.
    pub project: String,
    /// All project tags callers may filter by.
    pub allowed_projects: Vec<String>,
    /// Every configured server, in catalog order.
    pub servers: Vec<ServerDescriptor>,
}

impl ProjectCatalog {
    /// Servers whose project tag matches exactly. An unknown project
    /// yields an empty list, not an error.
    pub fn servers_for_project(&self, project: &str) -> Vec<&ServerDescriptor> {
        self.servers
            .iter()
            .filter(|s| s.project == project)
            .collect()
    }

    /// Look up a descriptor by logical name, case-insensitively.
    pub fn descriptor(&self, name: &str) -> Option<&ServerDescriptor> {
        self.servers
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
