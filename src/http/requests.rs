//! Request payloads for the query endpoints.
//!
//! One payload shape serves all four query operations, mirroring what
//! callers already send; each endpoint re-validates the fields its
//! operation needs, so a request reaching the core directly still fails
//! with `MissingParameter` rather than something opaque.

use crate::constants::DEFAULT_DATE_COLUMN;
use crate::database::{ParamValue, QueryOperation};
use crate::error::GatewayError;
use chrono::NaiveDate;
use serde::Deserialize;

/// Body accepted by the query/procedure/view endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    pub server_name: Option<String>,
    pub database_name: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub query: Option<String>,
    pub procedure_name: Option<String>,
    pub view_name: Option<String>,
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

impl QueryRequest {
    /// The routing pair every operation needs.
    pub fn target(&self) -> Result<(&str, &str), GatewayError> {
        let server = require(self.server_name.as_deref(), "serverName")?;
        let database = require(self.database_name.as_deref(), "databaseName")?;
        Ok((server, database))
    }

    /// Build a date-range scan from this payload.
    pub fn date_range_operation(&self) -> Result<QueryOperation, GatewayError> {
        let table = require(self.table_name.as_deref(), "tableName")?;
        let from = parse_date(require(self.from_date.as_deref(), "fromDate")?)?;
        let to = self
            .to_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_date)
            .transpose()?;
        let column = self
            .column_name
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_DATE_COLUMN);

        Ok(QueryOperation::DateRangeScan {
            table: table.to_string(),
            column: column.to_string(),
            from,
            to,
        })
    }

    /// Build an ad-hoc query from this payload.
    pub fn custom_query_operation(&self) -> Result<QueryOperation, GatewayError> {
        let text = require(self.query.as_deref(), "query")?;
        Ok(QueryOperation::CustomQuery {
            text: text.to_string(),
        })
    }

    /// Build a stored-procedure call from this payload.
    ///
    /// Parameter order follows the request body; values that are not JSON
    /// scalars are rejected.
    pub fn procedure_operation(&self) -> Result<QueryOperation, GatewayError> {
        let name = require(self.procedure_name.as_deref(), "procedureName")?;

        let mut parameters = Vec::new();
        if let Some(map) = &self.parameters {
            for (key, value) in map {
                let value: ParamValue =
                    serde_json::from_value(value.clone()).map_err(|_| {
                        GatewayError::rejected(format!(
                            "parameter '{key}' is not a scalar value"
                        ))
                    })?;
                parameters.push((key.clone(), value));
            }
        }

        Ok(QueryOperation::ProcedureCall {
            name: name.to_string(),
            parameters,
        })
    }

    /// Build a view dump from this payload.
    pub fn view_operation(&self) -> Result<QueryOperation, GatewayError> {
        let name = require(self.view_name.as_deref(), "viewName")?;
        Ok(QueryOperation::ViewDump {
            name: name.to_string(),
        })
    }
}

fn require<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, GatewayError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::MissingParameter(name)),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, GatewayError> {
    value
        .parse()
        .map_err(|_| GatewayError::rejected(format!("invalid date '{value}', expected YYYY-MM-DD")))
}
