//! SQL Server identifier allow-listing and bracket quoting.
//!
//! Table, column, view, and procedure names arrive as caller-supplied
//! strings and end up interpolated into statement text, so they pass a
//! strict character allow-list first and are always bracket-quoted. This
//! check is independent of the read-only statement validator.

use crate::constants::MAX_IDENTIFIER_LENGTH;
use crate::error::GatewayError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Allowed identifier shape: alphanumerics, underscores, and brackets.
static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_\[\]]+$")
        .unwrap_or_else(|e| panic!("invalid identifier pattern: {e}"))
});

/// Validate that an identifier contains only allow-listed characters.
pub fn validate_identifier(identifier: &str) -> Result<(), GatewayError> {
    if identifier.is_empty() {
        return Err(GatewayError::rejected("identifier cannot be empty"));
    }
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(GatewayError::rejected(format!(
            "identifier exceeds maximum length of {MAX_IDENTIFIER_LENGTH} characters"
        )));
    }
    if !IDENTIFIER_PATTERN.is_match(identifier) {
        return Err(GatewayError::rejected(format!(
            "identifier '{identifier}' contains characters outside [A-Za-z0-9_[]]"
        )));
    }
    Ok(())
}

/// Bracket-quote an identifier.
///
/// Outer brackets supplied by the caller are stripped before re-quoting,
/// and embedded right brackets are doubled per SQL Server quoting rules.
pub fn quote_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    let inner = if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    format!("[{}]", inner.replace(']', "]]"))
}

/// Validate and quote in one step, for use at the gateway boundary.
pub fn safe_identifier(identifier: &str) -> Result<String, GatewayError> {
    validate_identifier(identifier)?;
    Ok(quote_identifier(identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers_pass() {
        assert!(validate_identifier("Orders").is_ok());
        assert!(validate_identifier("order_lines").is_ok());
        assert!(validate_identifier("Table123").is_ok());
    }

    #[test]
    fn test_dangerous_characters_rejected() {
        for bad in [
            "Orders; DROP TABLE X",
            "Orders--",
            "Orders'",
            "dbo.Orders",
            "My Table",
            "Orders/*",
        ] {
            assert!(validate_identifier(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_empty_and_oversized_rejected() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"x".repeat(129)).is_err());
        assert!(validate_identifier(&"x".repeat(128)).is_ok());
    }

    #[test]
    fn test_quote_simple() {
        assert_eq!(quote_identifier("Orders"), "[Orders]");
    }

    #[test]
    fn test_quote_already_bracketed() {
        assert_eq!(quote_identifier("[Orders]"), "[Orders]");
    }

    #[test]
    fn test_quote_doubles_embedded_bracket() {
        assert_eq!(quote_identifier("Table[1]"), "[Table[1]]]");
    }

    #[test]
    fn test_safe_identifier_combines_both() {
        assert_eq!(safe_identifier("Orders").unwrap(), "[Orders]");
        assert!(safe_identifier("Orders; DROP").is_err());
    }

    #[test]
    fn test_rejection_is_query_rejected() {
        let err = safe_identifier("bad name").unwrap_err();
        assert!(matches!(err, crate::error::GatewayError::QueryRejected(_)));
    }
}
