//! HTTP surface: router, handlers, request binding, and the API-key gate.

pub mod auth;
pub mod handlers;
pub mod requests;
pub mod response;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/database/test", get(handlers::test))
        .route("/api/database/config", get(handlers::get_configuration))
        .route(
            "/api/database/projects/{project}/servers",
            get(handlers::get_project_servers),
        )
        .route(
            "/api/database/servers/{server}/test",
            get(handlers::test_server),
        )
        .route(
            "/api/database/servers/{server}/databases",
            get(handlers::get_databases),
        )
        .route(
            "/api/database/servers/{server}/databases/{database}/tables",
            get(handlers::get_tables),
        )
        .route(
            "/api/database/servers/{server}/databases/{database}/tables/{table}/columns",
            get(handlers::get_columns),
        )
        .route(
            "/api/database/servers/{server}/databases/{database}/procedures",
            get(handlers::get_procedures),
        )
        .route(
            "/api/database/servers/{server}/databases/{database}/views",
            get(handlers::get_views),
        )
        .route(
            "/api/database/query/daterange",
            post(handlers::query_date_range),
        )
        .route("/api/database/query/custom", post(handlers::query_custom))
        .route(
            "/api/database/procedures/execute",
            post(handlers::execute_procedure),
        )
        .route("/api/database/views/execute", post(handlers::execute_view))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::api_key_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
