//! Broker network routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::{error_json, status_from};
use plotbook_db::entities::brokers;
use plotbook_db::repositories::broker::{
    BrokerError, BrokerFilter, BrokerRepository, CreateBrokerInput,
};

/// Creates the broker routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/brokers", post(create_broker))
        .route("/brokers", get(list_brokers))
        .route("/brokers/{broker_id}", get(get_broker))
        .route("/brokers/{broker_id}/downline", get(list_downline))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for registering a broker.
#[derive(Debug, Deserialize)]
pub struct CreateBrokerRequest {
    /// Broker display name.
    pub name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Recruiting broker, if any.
    pub upline_id: Option<Uuid>,
}

/// Query parameters for listing brokers.
#[derive(Debug, Deserialize)]
pub struct ListBrokersQuery {
    /// Filter by active status.
    pub active: Option<bool>,
}

/// Response for a broker.
#[derive(Debug, Serialize)]
pub struct BrokerResponse {
    /// Broker ID.
    pub id: Uuid,
    /// Broker display name.
    pub name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Recruiting broker.
    pub upline_id: Option<Uuid>,
    /// Whether the broker is active.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

fn broker_to_response(broker: brokers::Model) -> BrokerResponse {
    BrokerResponse {
        id: broker.id,
        name: broker.name,
        phone: broker.phone,
        upline_id: broker.upline_id,
        is_active: broker.is_active,
        created_at: broker.created_at.to_rfc3339(),
        updated_at: broker.updated_at.to_rfc3339(),
    }
}

/// Translates a broker repository error into a JSON response.
fn broker_error(e: &BrokerError) -> axum::response::Response {
    let status = e.http_status_code();
    if status >= 500 {
        error!(error = %e, "Broker operation failed");
        return error_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "An error occurred",
        );
    }
    error_json(status_from(status), e.error_code(), &e.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /brokers - Register a new broker.
async fn create_broker(
    State(state): State<AppState>,
    Json(payload): Json<CreateBrokerRequest>,
) -> impl IntoResponse {
    let repo = BrokerRepository::new((*state.db).clone());

    match repo
        .create_broker(CreateBrokerInput {
            name: payload.name,
            phone: payload.phone,
            upline_id: payload.upline_id,
        })
        .await
    {
        Ok(broker) => {
            info!(broker_id = %broker.id, name = %broker.name, "Broker registered");
            (StatusCode::CREATED, Json(broker_to_response(broker))).into_response()
        }
        Err(e) => broker_error(&e),
    }
}

/// GET /brokers - List brokers ordered by name.
async fn list_brokers(
    State(state): State<AppState>,
    Query(query): Query<ListBrokersQuery>,
) -> impl IntoResponse {
    let repo = BrokerRepository::new((*state.db).clone());

    match repo
        .list_brokers(BrokerFilter {
            is_active: query.active,
        })
        .await
    {
        Ok(rows) => {
            let items: Vec<BrokerResponse> =
                rows.into_iter().map(broker_to_response).collect();
            (StatusCode::OK, Json(json!({ "brokers": items }))).into_response()
        }
        Err(e) => broker_error(&e),
    }
}

/// GET `/brokers/{broker_id}` - Get broker details.
async fn get_broker(
    State(state): State<AppState>,
    Path(broker_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BrokerRepository::new((*state.db).clone());

    match repo.get_broker(broker_id).await {
        Ok(broker) => (StatusCode::OK, Json(broker_to_response(broker))).into_response(),
        Err(e) => broker_error(&e),
    }
}

/// GET `/brokers/{broker_id}/downline` - List directly recruited brokers.
async fn list_downline(
    State(state): State<AppState>,
    Path(broker_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BrokerRepository::new((*state.db).clone());

    match repo.downline(broker_id).await {
        Ok(rows) => {
            let items: Vec<BrokerResponse> =
                rows.into_iter().map(broker_to_response).collect();
            (StatusCode::OK, Json(json!({ "brokers": items }))).into_response()
        }
        Err(e) => broker_error(&e),
    }
}
