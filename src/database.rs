//! Database connectivity, introspection, and query execution.

mod connection;
pub mod metadata;
pub mod query;
pub mod types;

pub use connection::{open_connection, BackendClient};
pub use metadata::SchemaInspector;
pub use query::{QueryGateway, QueryOperation, TabularResult};
pub use types::{ParamValue, SqlValue, TypeMapper};
