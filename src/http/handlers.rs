//! HTTP endpoint handlers.
//!
//! Handlers stay thin: bind the request, re-validate required fields,
//! call into the inspector or gateway, wrap the output in the response
//! envelope. Failure mapping to status codes lives on `GatewayError`'s
//! `IntoResponse` impl.

use crate::error::GatewayError;
use crate::http::requests::QueryRequest;
use crate::http::response::ApiResponse;
use crate::registry::{ProjectCatalog, ServerDescriptor};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness probe payload.
#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-server connectivity probe payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResponse {
    pub is_active: bool,
    pub message: String,
}

/// `GET /api/database/test`
pub async fn test() -> Json<TestResponse> {
    Json(TestResponse {
        message: "API is running".to_string(),
        timestamp: Utc::now(),
    })
}

/// `GET /api/database/config` returns the whole discovery catalog.
pub async fn get_configuration(
    State(state): State<AppState>,
) -> Json<ApiResponse<ProjectCatalog>> {
    Json(ApiResponse::ok(state.catalog.as_ref().clone()))
}

/// `GET /api/database/projects/{project}/servers`
///
/// Unknown projects yield an empty list, not an error.
pub async fn get_project_servers(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> Json<ApiResponse<Vec<ServerDescriptor>>> {
    let servers = state
        .catalog
        .servers_for_project(&project)
        .into_iter()
        .cloned()
        .collect();
    Json(ApiResponse::ok(servers))
}

/// `GET /api/database/servers/{server}/test`
pub async fn test_server(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Json<ApiResponse<ConnectionTestResponse>> {
    let is_active = state.inspector.test_connection(&server).await;
    Json(ApiResponse::ok(ConnectionTestResponse {
        is_active,
        message: if is_active { "Connected" } else { "Failed" }.to_string(),
    }))
}

/// `GET /api/database/servers/{server}/databases`
pub async fn get_databases(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<ApiResponse<Vec<String>>>, GatewayError> {
    let databases = state.inspector.list_databases(&server).await?;
    Ok(Json(ApiResponse::ok(databases)))
}

/// `GET /api/database/servers/{server}/databases/{database}/tables`
pub async fn get_tables(
    State(state): State<AppState>,
    Path((server, database)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<String>>>, GatewayError> {
    let tables = state.inspector.list_tables(&server, &database).await?;
    Ok(Json(ApiResponse::ok(tables)))
}

/// `GET /api/database/servers/{server}/databases/{database}/tables/{table}/columns`
pub async fn get_columns(
    State(state): State<AppState>,
    Path((server, database, table)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<Vec<String>>>, GatewayError> {
    let columns = state
        .inspector
        .list_columns(&server, &database, &table)
        .await?;
    Ok(Json(ApiResponse::ok(columns)))
}

/// `GET /api/database/servers/{server}/databases/{database}/procedures`
pub async fn get_procedures(
    State(state): State<AppState>,
    Path((server, database)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<String>>>, GatewayError> {
    let procedures = state.inspector.list_procedures(&server, &database).await?;
    Ok(Json(ApiResponse::ok(procedures)))
}

/// `GET /api/database/servers/{server}/databases/{database}/views`
pub async fn get_views(
    State(state): State<AppState>,
    Path((server, database)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<String>>>, GatewayError> {
    let views = state.inspector.list_views(&server, &database).await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// `POST /api/database/query/daterange`
pub async fn query_date_range(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, GatewayError> {
    let (server, database) = request.target()?;
    let operation = request.date_range_operation()?;
    let result = state.gateway.execute(server, database, operation).await?;
    Ok(Json(ApiResponse::ok(result.to_document())))
}

/// `POST /api/database/query/custom`
pub async fn query_custom(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, GatewayError> {
    let (server, database) = request.target()?;
    let operation = request.custom_query_operation()?;
    let result = state.gateway.execute(server, database, operation).await?;
    Ok(Json(ApiResponse::ok(result.to_document())))
}

/// `POST /api/database/procedures/execute`
pub async fn execute_procedure(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, GatewayError> {
    let (server, database) = request.target()?;
    let operation = request.procedure_operation()?;
    let result = state.gateway.execute(server, database, operation).await?;
    Ok(Json(ApiResponse::ok(result.to_document())))
}

/// `POST /api/database/views/execute`
pub async fn execute_view(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, GatewayError> {
    let (server, database) = request.target()?;
    let operation = request.view_operation()?;
    let result = state.gateway.execute(server, database, operation).await?;
    Ok(Json(ApiResponse::ok(result.to_document())))
}
