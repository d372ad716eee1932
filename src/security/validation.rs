//! Read-only statement validation for ad-hoc SQL.
//!
//! The predicate is a textual heuristic, not a parser: the statement must
//! start with `select` or `with`, and must not contain any denylisted
//! mutation or administrative token. A keyword hidden inside a string
//! literal or split by comments is not specially handled; the database
//! login's own permissions remain the real enforcement boundary.

use crate::error::GatewayError;

/// Denylisted tokens scanned for anywhere in the lowercased statement.
pub const DENYLIST: [&str; 11] = [
    "drop ",
    "delete ",
    "truncate ",
    "alter ",
    "insert ",
    "update ",
    "create ",
    "exec ",
    "execute ",
    "sp_",
    "xp_",
];

/// Whether a statement passes the read-only heuristic.
pub fn is_read_only(statement: &str) -> bool {
    let lowered = statement.to_lowercase();
    let lowered = lowered.trim();

    if !lowered.starts_with("select") && !lowered.starts_with("with") {
        return false;
    }

    !DENYLIST.iter().any(|token| lowered.contains(token))
}

/// Validate a statement, naming the offending token on rejection.
pub fn validate_read_only(statement: &str) -> Result<(), GatewayError> {
    let lowered = statement.to_lowercase();
    let lowered = lowered.trim();

    if !lowered.starts_with("select") && !lowered.starts_with("with") {
        return Err(GatewayError::rejected(
            "only SELECT statements are allowed",
        ));
    }

    if let Some(token) = DENYLIST.iter().find(|token| lowered.contains(**token)) {
        return Err(GatewayError::rejected(format!(
            "forbidden keyword '{}'",
            token.trim()
        )));
    }

    Ok(())
}
