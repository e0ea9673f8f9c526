//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes
//! - Request/response types
//! - Error translation to JSON responses

pub mod routes;

use axum::Router;
use plotbook_core::commission::CommissionPolicy;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Commission policy applied to sales and cancellations.
    pub policy: Arc<CommissionPolicy>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
