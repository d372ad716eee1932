//! Error types for the gateway.
//!
//! Every failure a request can hit maps to one of four terminal kinds, each
//! a distinct variant the HTTP boundary can inspect to pick a response code.
//! Nothing here is retried; a fault surfaces to the caller immediately.

use thiserror::Error;

/// Domain errors for the gateway core.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The logical server name has no configured credential.
    #[error("server '{0}' is not configured")]
    UnknownServer(String),

    /// A connection or execution fault from the backend.
    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The statement failed read-only validation or carried an unsafe
    /// identifier.
    #[error("query rejected: {0}")]
    QueryRejected(String),

    /// A required request field was absent.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Startup-time configuration error. Never produced per request.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Create an unknown-server error.
    pub fn unknown_server(name: impl Into<String>) -> Self {
        Self::UnknownServer(name.into())
    }

    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a backend error with a source.
    pub fn backend_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::BackendUnavailable {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query-rejected error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::QueryRejected(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-readable code for the HTTP envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownServer(_) => "UNKNOWN_SERVER",
            Self::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
            Self::QueryRejected(_) => "QUERY_REJECTED",
            Self::MissingParameter(_) => "MISSING_PARAMETER",
            Self::Config(_) => "CONFIGURATION",
        }
    }
}

impl From<tiberius::error::Error> for GatewayError {
    fn from(e: tiberius::error::Error) -> Self {
        GatewayError::backend_with_source(e.to_string(), e)
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::backend_with_source(format!("IO error: {e}"), e)
    }
}

impl From<tokio::time::error::Elapsed> for GatewayError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        GatewayError::backend("operation timed out")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            GatewayError::unknown_server("DB1"),
            GatewayError::backend("down"),
            GatewayError::rejected("not a select"),
            GatewayError::MissingParameter("tableName"),
            GatewayError::config("bad file"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_unknown_server_message() {
        let err = GatewayError::unknown_server("DB9");
        assert_eq!(err.to_string(), "server 'DB9' is not configured");
    }

    #[test]
    fn test_timeout_maps_to_backend() {
        let err: GatewayError = GatewayError::backend("operation timed out");
        assert!(matches!(err, GatewayError::BackendUnavailable { .. }));
    }
}
