//! Centralized constants for the gateway.
//!
//! All magic numbers and default values used throughout the codebase live
//! here, making them easy to find, understand, and modify.

use std::time::Duration;

// =============================================================================
// Timeout Constants
// =============================================================================

/// Connect timeout for servers classified as development.
pub const DEV_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Command timeout for servers classified as development.
pub const DEV_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Connect timeout for servers classified as production.
pub const PROD_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Command timeout for servers classified as production.
pub const PROD_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Command timeout for query-gateway operations (scans, ad-hoc queries,
/// procedure calls, view dumps). Large date-range scans need this headroom.
pub const QUERY_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

// =============================================================================
// Connection Parameters
// =============================================================================

/// Maximum pool size carried in every connection descriptor.
pub const MAX_POOL_SIZE: u32 = 100;

/// Minimum pool size carried in every connection descriptor.
pub const MIN_POOL_SIZE: u32 = 5;

/// Default TDS port when a credential address does not carry one.
pub const DEFAULT_SQL_PORT: u16 = 1433;

// =============================================================================
// Identifier Constants
// =============================================================================

/// Maximum length for SQL Server identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Column name used by date-range scans when the caller omits one.
pub const DEFAULT_DATE_COLUMN: &str = "Date";

// =============================================================================
// HTTP Constants
// =============================================================================

/// Default bind address for the HTTP listener.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Query-string parameter accepted as an API key fallback.
pub const API_KEY_QUERY_PARAM: &str = "apiKey";

// =============================================================================
// Logging Constants
// =============================================================================

/// Truncation length for query logging.
pub const LOG_QUERY_TRUNCATE_LENGTH: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_pairs() {
        assert_eq!(DEV_CONNECT_TIMEOUT, Duration::from_secs(30));
        assert_eq!(DEV_COMMAND_TIMEOUT, Duration::from_secs(60));
        assert_eq!(PROD_CONNECT_TIMEOUT, Duration::from_secs(15));
        assert_eq!(PROD_COMMAND_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_pool_bounds() {
        assert!(MIN_POOL_SIZE <= MAX_POOL_SIZE);
    }
}
