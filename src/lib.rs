//! # MSSQL Gateway
//!
//! An HTTP gateway that routes metadata and query operations across many
//! independently-configured SQL Server instances, grouped by logical
//! project, while enforcing a read-only policy on ad-hoc SQL.
//!
//! ## Architecture
//!
//! - **Registry**: static catalog of named servers, grouped by project
//! - **Credentials**: connection secrets keyed by logical server name
//! - **Resolver**: logical name + database -> connection descriptor
//! - **Inspector**: read-only catalog queries over scoped connections
//! - **Gateway**: validated execution of scans, ad-hoc queries,
//!   procedure calls, and view dumps
//! - **HTTP**: axum router, request binding, API-key gate

pub mod config;
pub mod constants;
pub mod credentials;
pub mod database;
pub mod error;
pub mod http;
pub mod registry;
pub mod resolver;
pub mod security;
pub mod state;

pub use config::Config;
pub use error::GatewayError;
pub use state::AppState;
