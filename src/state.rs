//! Shared application state.
//!
//! Everything here is read-only after startup, so handlers clone the state
//! freely and share the catalog and resolver behind `Arc`s without locks.

use crate::config::Config;
use crate::database::{QueryGateway, SchemaInspector};
use crate::registry::ProjectCatalog;
use crate::resolver::ConnectionResolver;
use std::sync::Arc;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ProjectCatalog>,
    pub inspector: SchemaInspector,
    pub gateway: QueryGateway,
    pub api_keys: Arc<Vec<String>>,
}

impl AppState {
    /// Build the state graph from loaded configuration.
    pub fn new(config: Config) -> Self {
        let resolver = Arc::new(ConnectionResolver::new(config.credentials));
        Self {
            catalog: Arc::new(config.catalog),
            inspector: SchemaInspector::new(Arc::clone(&resolver)),
            gateway: QueryGateway::new(resolver),
            api_keys: Arc::new(config.api_keys),
        }
    }
}
