//! API route definitions.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::AppState;

pub mod brokers;
pub mod health;
pub mod plots;
pub mod wallets;

/// Creates the API router with all routes.
pub fn api_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .merge(health::routes())
        .merge(plots::routes())
        .merge(brokers::routes())
        .merge(wallets::routes())
}

/// Builds the standard error response body.
pub(crate) fn error_json(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

/// Maps a repository error status to a `StatusCode`, hiding server-side
/// detail behind a generic message.
pub(crate) fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
