//! Constrained query execution.
//!
//! The gateway runs four operation kinds against a resolved connection:
//! date-range scans, ad-hoc read-only queries, stored-procedure calls, and
//! view dumps. A request moves through Resolving, Validating, Executing,
//! and Serializing; validation failures reject the request before any
//! connection is opened, and a fault in any phase is terminal.

use crate::constants::{LOG_QUERY_TRUNCATE_LENGTH, QUERY_COMMAND_TIMEOUT};
use crate::database::connection::open_connection;
use crate::database::types::{ParamValue, SqlValue, TypeMapper};
use crate::error::GatewayError;
use crate::resolver::ConnectionResolver;
use crate::security::{safe_identifier, validate_read_only};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tiberius::{QueryItem, QueryStream, ToSql};
use tokio::time::timeout;
use tracing::debug;

/// One of the four operations the gateway executes.
#[derive(Debug, Clone)]
pub enum QueryOperation {
    /// `SELECT *` filtered to a date or date range on one column.
    DateRangeScan {
        table: String,
        column: String,
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
    /// Ad-hoc SQL, subject to read-only validation.
    CustomQuery { text: String },
    /// Stored-procedure invocation with ordered named parameters.
    ProcedureCall {
        name: String,
        parameters: Vec<(String, ParamValue)>,
    },
    /// `SELECT *` over a named view.
    ViewDump { name: String },
}

/// A rectangular result: ordered column names plus positional rows.
///
/// Produced fresh per request and owned by the caller; never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl TabularResult {
    /// Serialize into a transport-ready document.
    ///
    /// Column order and row order are preserved exactly; null cells appear
    /// as explicit JSON `null`.
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Null)
    }
}

/// A validated statement ready for execution.
#[derive(Debug)]
pub struct PreparedStatement {
    pub sql: String,
    pub params: Vec<ParamValue>,
}

/// Build the date-range scan statement.
///
/// Identifiers are allow-listed and bracket-quoted; the date bounds are
/// always bound parameters, never interpolated text.
pub fn date_range_statement(
    table: &str,
    column: &str,
    has_upper_bound: bool,
) -> Result<String, GatewayError> {
    let table = safe_identifier(table)?;
    let column = safe_identifier(column)?;
    if has_upper_bound {
        Ok(format!(
            "SELECT * FROM {table} WHERE CAST({column} AS DATE) BETWEEN @P1 AND @P2"
        ))
    } else {
        Ok(format!(
            "SELECT * FROM {table} WHERE CAST({column} AS DATE) = @P1"
        ))
    }
}

/// Build the stored-procedure invocation statement.
///
/// Each parameter key is normalized to carry a leading `@`, then assigned
/// a positional placeholder in caller order.
pub fn procedure_statement(name: &str, keys: &[String]) -> Result<String, GatewayError> {
    let procedure = safe_identifier(name)?;
    if keys.is_empty() {
        return Ok(format!("EXEC {procedure}"));
    }
    let assignments = keys
        .iter()
        .enumerate()
        .map(|(idx, key)| Ok(format!("{} = @P{}", normalize_param_key(key)?, idx + 1)))
        .collect::<Result<Vec<_>, GatewayError>>()?
        .join(", ");
    Ok(format!("EXEC {procedure} {assignments}"))
}

/// Build the view dump statement.
pub fn view_statement(name: &str) -> Result<String, GatewayError> {
    let view = safe_identifier(name)?;
    Ok(format!("SELECT * FROM {view}"))
}

/// Normalize a procedure parameter key: ensure one leading `@` and an
/// alphanumeric/underscore body.
fn normalize_param_key(key: &str) -> Result<String, GatewayError> {
    let bare = key.strip_prefix('@').unwrap_or(key);
    if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(GatewayError::rejected(format!(
            "invalid procedure parameter name '{key}'"
        )));
    }
    Ok(format!("@{bare}"))
}

/// Validate an operation and produce its statement and bound parameters.
pub fn prepare(operation: &QueryOperation) -> Result<PreparedStatement, GatewayError> {
    match operation {
        QueryOperation::DateRangeScan {
            table,
            column,
            from,
            to,
        } => {
            let sql = date_range_statement(table, column, to.is_some())?;
            let mut params = vec![ParamValue::Date(*from)];
            if let Some(to) = to {
                params.push(ParamValue::Date(*to));
            }
            Ok(PreparedStatement { sql, params })
        }
        QueryOperation::CustomQuery { text } => {
            validate_read_only(text)?;
            Ok(PreparedStatement {
                sql: text.clone(),
                params: Vec::new(),
            })
        }
        QueryOperation::ProcedureCall { name, parameters } => {
            let keys: Vec<String> = parameters.iter().map(|(k, _)| k.clone()).collect();
            let sql = procedure_statement(name, &keys)?;
            let params = parameters.iter().map(|(_, v)| v.clone()).collect();
            Ok(PreparedStatement { sql, params })
        }
        QueryOperation::ViewDump { name } => Ok(PreparedStatement {
            sql: view_statement(name)?,
            params: Vec::new(),
        }),
    }
}

/// Collect a query stream into a [`TabularResult`].
///
/// Column order follows the result metadata; row order follows the
/// backend's delivery order.
pub(crate) async fn collect_stream(
    mut stream: QueryStream<'_>,
) -> Result<TabularResult, GatewayError> {
    use futures_util::stream::TryStreamExt;

    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<SqlValue>> = Vec::new();

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                if columns.is_empty() {
                    columns = meta.columns().iter().map(|c| c.name().to_string()).collect();
                }
            }
            QueryItem::Row(row) => {
                let values = (0..row.columns().len())
                    .map(|idx| TypeMapper::extract_column(&row, idx))
                    .collect();
                rows.push(values);
            }
        }
    }

    Ok(TabularResult { columns, rows })
}

/// Executes validated operations against resolved connections.
#[derive(Clone)]
pub struct QueryGateway {
    resolver: Arc<ConnectionResolver>,
}

impl QueryGateway {
    /// Create a gateway over a connection resolver.
    pub fn new(resolver: Arc<ConnectionResolver>) -> Self {
        Self { resolver }
    }

    /// Execute one operation end to end.
    ///
    /// The connection is scoped to this call and released on every exit
    /// path. All four operation kinds share the fixed long-scan command
    /// timeout.
    pub async fn execute(
        &self,
        server: &str,
        database: &str,
        operation: QueryOperation,
    ) -> Result<TabularResult, GatewayError> {
        let descriptor = self.resolver.resolve(server, database)?;
        let prepared = prepare(&operation)?;

        debug!(
            server,
            database,
            sql = %truncate_for_log(&prepared.sql, LOG_QUERY_TRUNCATE_LENGTH),
            "executing query operation"
        );

        let mut client = open_connection(&descriptor).await?;
        let result = timeout(QUERY_COMMAND_TIMEOUT, async {
            let params: Vec<&dyn ToSql> =
                prepared.params.iter().map(|p| p as &dyn ToSql).collect();
            let stream = client.query(prepared.sql.as_str(), &params).await?;
            collect_stream(stream).await
        })
        .await??;

        debug!(rows = result.rows.len(), "query operation completed");
        Ok(result)
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_date_uses_equality_filter() {
        let sql = date_range_statement("Orders", "Date", false).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM [Orders] WHERE CAST([Date] AS DATE) = @P1"
        );
    }

    #[test]
    fn test_date_range_uses_between_filter() {
        let sql = date_range_statement("Orders", "CreatedAt", true).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM [Orders] WHERE CAST([CreatedAt] AS DATE) BETWEEN @P1 AND @P2"
        );
    }

    #[test]
    fn test_date_scan_identifiers_are_validated() {
        assert!(date_range_statement("Orders; DROP TABLE X", "Date", false).is_err());
        assert!(date_range_statement("Orders", "Date' --", false).is_err());
    }

    #[test]
    fn test_prepare_binds_one_or_two_dates() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let single = prepare(&QueryOperation::DateRangeScan {
            table: "Orders".into(),
            column: "Date".into(),
            from,
            to: None,
        })
        .unwrap();
        assert_eq!(single.params, vec![ParamValue::Date(from)]);

        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let range = prepare(&QueryOperation::DateRangeScan {
            table: "Orders".into(),
            column: "Date".into(),
            from,
            to: Some(to),
        })
        .unwrap();
        assert_eq!(
            range.params,
            vec![ParamValue::Date(from), ParamValue::Date(to)]
        );
        assert!(range.sql.contains("BETWEEN"));
    }

    #[test]
    fn test_custom_query_rejected_without_touching_backend() {
        let err = prepare(&QueryOperation::CustomQuery {
            text: "SELECT 1; DROP TABLE X".into(),
        })
        .unwrap_err();
        assert!(matches!(err, GatewayError::QueryRejected(_)));
    }

    #[test]
    fn test_custom_query_passes_through_unchanged() {
        let prepared = prepare(&QueryOperation::CustomQuery {
            text: "SELECT name FROM Customers".into(),
        })
        .unwrap();
        assert_eq!(prepared.sql, "SELECT name FROM Customers");
        assert!(prepared.params.is_empty());
    }

    #[test]
    fn test_procedure_statement_without_parameters() {
        let sql = procedure_statement("GetDailyTotals", &[]).unwrap();
        assert_eq!(sql, "EXEC [GetDailyTotals]");
    }

    #[test]
    fn test_procedure_keys_gain_at_prefix() {
        let sql = procedure_statement(
            "GetDailyTotals",
            &["From".to_string(), "@To".to_string()],
        )
        .unwrap();
        assert_eq!(sql, "EXEC [GetDailyTotals] @From = @P1, @To = @P2");
    }

    #[test]
    fn test_procedure_parameter_order_is_preserved() {
        let parameters = vec![
            ("Zeta".to_string(), ParamValue::Integer(1)),
            ("Alpha".to_string(), ParamValue::Null),
        ];
        let prepared = prepare(&QueryOperation::ProcedureCall {
            name: "Report".into(),
            parameters,
        })
        .unwrap();
        assert_eq!(prepared.sql, "EXEC [Report] @Zeta = @P1, @Alpha = @P2");
        assert_eq!(
            prepared.params,
            vec![ParamValue::Integer(1), ParamValue::Null]
        );
    }

    #[test]
    fn test_bad_parameter_key_rejected() {
        assert!(procedure_statement("Report", &["bad key".to_string()]).is_err());
        assert!(procedure_statement("Report", &["@".to_string()]).is_err());
    }

    #[test]
    fn test_view_statement_shape() {
        assert_eq!(
            view_statement("DailySummary").unwrap(),
            "SELECT * FROM [DailySummary]"
        );
        assert!(view_statement("x; DROP").is_err());
    }

    #[test]
    fn test_document_round_trips_order_and_nulls() {
        let result = TabularResult {
            columns: vec!["b".into(), "a".into()],
            rows: vec![
                vec![SqlValue::I32(1), SqlValue::Null],
                vec![SqlValue::String("x".into()), SqlValue::Bool(false)],
            ],
        };
        let doc = result.to_document();
        assert_eq!(doc["columns"], serde_json::json!(["b", "a"]));
        assert_eq!(doc["rows"][0][0], serde_json::json!(1));
        assert!(doc["rows"][0][1].is_null());
        assert_eq!(doc["rows"][1][0], serde_json::json!("x"));
    }

    #[test]
    fn test_document_handles_empty_result() {
        let empty = TabularResult::default();
        let doc = empty.to_document();
        assert_eq!(doc["columns"], serde_json::json!([]));
        assert_eq!(doc["rows"], serde_json::json!([]));
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(
            truncate_for_log("this is a long string", 10),
            "this is a ..."
        );
    }
}
