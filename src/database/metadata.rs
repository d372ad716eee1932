//! Catalog queries for schema introspection.
//!
//! Each operation resolves a connection, opens a scoped session, runs one
//! fixed catalog query, and collects the single result column as strings
//! in the query's declared sort order. Calls are single best-effort
//! attempts; any fault surfaces as `BackendUnavailable` and the caller
//! decides whether to retry.

use crate::database::connection::open_connection;
use crate::database::query::collect_stream;
use crate::database::types::SqlValue;
use crate::error::GatewayError;
use crate::resolver::{ConnectionDescriptor, ConnectionResolver};
use std::sync::Arc;
use tiberius::ToSql;
use tokio::time::timeout;
use tracing::{debug, warn};

/// User databases, excluding the four system databases, online only.
const LIST_DATABASES: &str = "SELECT name FROM sys.databases \
     WHERE database_id > 4 AND state = 0 \
     ORDER BY name";

const LIST_TABLES: &str = "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_NAME";

const LIST_COLUMNS: &str = "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_NAME = @P1 \
     ORDER BY ORDINAL_POSITION";

const LIST_PROCEDURES: &str = "SELECT ROUTINE_NAME FROM INFORMATION_SCHEMA.ROUTINES \
     WHERE ROUTINE_TYPE = 'PROCEDURE' AND ROUTINE_SCHEMA = 'dbo' \
     ORDER BY ROUTINE_NAME";

const LIST_VIEWS: &str = "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.VIEWS \
     WHERE TABLE_SCHEMA = 'dbo' \
     ORDER BY TABLE_NAME";

/// Read-only schema introspection over resolved connections.
#[derive(Clone)]
pub struct SchemaInspector {
    resolver: Arc<ConnectionResolver>,
}

impl SchemaInspector {
    /// Create an inspector over a connection resolver.
    pub fn new(resolver: Arc<ConnectionResolver>) -> Self {
        Self { resolver }
    }

    /// Best-effort connectivity probe against the master database.
    pub async fn test_connection(&self, server: &str) -> bool {
        let descriptor = match self.resolver.resolve(server, "master") {
            Ok(d) => d,
            Err(e) => {
                warn!(server, error = %e, "connection test failed to resolve");
                return false;
            }
        };
        match open_connection(&descriptor).await {
            Ok(_) => true,
            Err(e) => {
                warn!(server, error = %e, "connection test failed");
                false
            }
        }
    }

    /// Online user databases on a server, name ascending.
    pub async fn list_databases(&self, server: &str) -> Result<Vec<String>, GatewayError> {
        let descriptor = self.resolver.resolve(server, "master")?;
        self.single_column(&descriptor, LIST_DATABASES, &[]).await
    }

    /// Base tables in a database, name ascending.
    pub async fn list_tables(
        &self,
        server: &str,
        database: &str,
    ) -> Result<Vec<String>, GatewayError> {
        let descriptor = self.resolver.resolve(server, database)?;
        self.single_column(&descriptor, LIST_TABLES, &[]).await
    }

    /// Columns of one table, ordinal position ascending. The table name is
    /// a bound parameter, not interpolated text.
    pub async fn list_columns(
        &self,
        server: &str,
        database: &str,
        table: &str,
    ) -> Result<Vec<String>, GatewayError> {
        let descriptor = self.resolver.resolve(server, database)?;
        self.single_column(&descriptor, LIST_COLUMNS, &[&table])
            .await
    }

    /// Stored procedures in the default schema, name ascending.
    pub async fn list_procedures(
        &self,
        server: &str,
        database: &str,
    ) -> Result<Vec<String>, GatewayError> {
        let descriptor = self.resolver.resolve(server, database)?;
        self.single_column(&descriptor, LIST_PROCEDURES, &[]).await
    }

    /// Views in the default schema, name ascending.
    pub async fn list_views(
        &self,
        server: &str,
        database: &str,
    ) -> Result<Vec<String>, GatewayError> {
        let descriptor = self.resolver.resolve(server, database)?;
        self.single_column(&descriptor, LIST_VIEWS, &[]).await
    }

    /// Run one catalog query on a scoped connection and collect column 0.
    async fn single_column(
        &self,
        descriptor: &ConnectionDescriptor,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<String>, GatewayError> {
        let mut client = open_connection(descriptor).await?;

        let result = timeout(descriptor.command_timeout, async {
            let stream = client.query(sql, params).await?;
            collect_stream(stream).await
        })
        .await??;

        debug!(rows = result.rows.len(), "catalog query completed");

        Ok(result
            .rows
            .into_iter()
            .filter_map(|mut row| {
                if row.is_empty() {
                    None
                } else {
                    Some(row.swap_remove(0))
                }
            })
            .map(|value| match value {
                SqlValue::String(s) => s,
                other => other.to_display_string(),
            })
            .collect())
    }
}
