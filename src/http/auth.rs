//! API-key gate for `/api/` routes.
//!
//! The key arrives in the `X-API-Key` header or, as a fallback, the
//! `apiKey` query parameter. Paths outside `/api/` pass through untouched.
//! The gateway core never re-checks identity; this gate is the only
//! authorization boundary.

use crate::constants::{API_KEY_HEADER, API_KEY_QUERY_PARAM};
use crate::http::response::ApiResponse;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

/// Reject `/api/` requests that lack a valid API key.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_ascii_lowercase();
    if !path.starts_with("/api/") {
        return next.run(request).await;
    }

    let provided = header_key(&request).or_else(|| query_key(&request));

    match provided {
        None => {
            warn!(path = %path, "missing API key");
            unauthorized("API key is required")
        }
        Some(key) if !state.api_keys.iter().any(|k| k == &key) => {
            warn!(path = %path, "invalid API key");
            unauthorized("the provided API key is not valid")
        }
        Some(_) => next.run(request).await,
    }
}

fn header_key(request: &Request) -> Option<String> {
    request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn query_key(request: &Request) -> Option<String> {
    request.uri().query().and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| *name == API_KEY_QUERY_PARAM)
            .map(|(_, value)| value.to_string())
            .filter(|v| !v.is_empty())
    })
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::err("UNAUTHORIZED", message)),
    )
        .into_response()
}
