//! Plot inventory and lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::{error_json, status_from};
use plotbook_core::plot::PlotStatus;
use plotbook_db::entities::{payments, plots, sea_orm_active_enums};
use plotbook_db::repositories::commission::{
    CommissionRepository, DistributionError, DistributionOutcome,
};
use plotbook_db::repositories::plot::{
    BookPlotInput, CreatePlotInput, PlotError, PlotFilter, PlotRepository, RecordPaymentInput,
    UpdatePlotInput,
};
use plotbook_shared::types::PageRequest;

/// Creates the plot routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plots", post(create_plot))
        .route("/plots", get(list_plots))
        .route("/plots/{plot_id}", get(get_plot))
        .route("/plots/{plot_id}", patch(update_plot))
        .route("/plots/{plot_id}", delete(delete_plot))
        .route("/plots/{plot_id}/book", post(book_plot))
        .route("/plots/{plot_id}/cancel", post(cancel_booking))
        .route("/plots/{plot_id}/payments", post(record_payment))
        .route("/plots/{plot_id}/payments", get(list_payments))
        .route(
            "/plots/{plot_id}/commission/distribute",
            post(distribute_commission),
        )
        .route(
            "/plots/{plot_id}/commission/reconcile",
            post(reconcile_plot),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a plot.
#[derive(Debug, Deserialize)]
pub struct CreatePlotRequest {
    /// Project or scheme name.
    pub project: String,
    /// Plot number, unique within the project.
    pub plot_number: String,
    /// Plot area in square feet.
    pub area_sqft: Option<Decimal>,
    /// Free-form description.
    pub description: Option<String>,
    /// Sale price.
    pub total_amount: Option<Decimal>,
}

/// Request body for updating a plot.
#[derive(Debug, Deserialize)]
pub struct UpdatePlotRequest {
    /// Plot area in square feet (optional, null to clear).
    pub area_sqft: Option<Option<Decimal>>,
    /// Free-form description (optional, null to clear).
    pub description: Option<Option<String>>,
    /// Sale price (optional, null to clear); locked while booked or sold.
    pub total_amount: Option<Option<Decimal>>,
}

/// Query parameters for listing plots.
#[derive(Debug, Deserialize)]
pub struct ListPlotsQuery {
    /// Filter by project name.
    pub project: Option<String>,
    /// Filter by lifecycle status.
    pub status: Option<String>,
    /// Filter by referring broker.
    pub broker: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Request body for booking a plot.
#[derive(Debug, Deserialize)]
pub struct BookPlotRequest {
    /// Buyer the plot is booked for.
    pub buyer_name: String,
    /// Amount paid at booking time.
    pub booking_amount: Decimal,
    /// Referring broker, if any.
    pub broker_id: Option<Uuid>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Payment amount.
    pub amount: Decimal,
    /// Payment date (YYYY-MM-DD, defaults to today).
    pub paid_on: Option<NaiveDate>,
    /// Payment method.
    pub method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Response for a plot.
#[derive(Debug, Serialize)]
pub struct PlotResponse {
    /// Plot ID.
    pub id: Uuid,
    /// Project or scheme name.
    pub project: String,
    /// Plot number within the project.
    pub plot_number: String,
    /// Plot area in square feet.
    pub area_sqft: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Sale price.
    pub total_amount: Option<String>,
    /// Amount paid at booking time.
    pub booking_amount: String,
    /// Remaining balance.
    pub remaining_amount: String,
    /// Percentage of the sale price paid so far.
    pub paid_percent: String,
    /// Referring broker.
    pub broker_id: Option<Uuid>,
    /// Buyer the plot is booked for.
    pub buyer_name: Option<String>,
    /// Commission settlement status.
    pub commission_status: String,
    /// When the current booking was made.
    pub booked_at: Option<String>,
    /// When the plot was sold.
    pub sold_at: Option<String>,
    /// When the last booking was cancelled.
    pub cancelled_at: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Plot the payment belongs to.
    pub plot_id: Uuid,
    /// Payment amount.
    pub amount: String,
    /// Payment date.
    pub paid_on: String,
    /// Payment method.
    pub method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
}

fn plot_status_to_string(status: &sea_orm_active_enums::PlotStatus) -> &'static str {
    match status {
        sea_orm_active_enums::PlotStatus::Available => "available",
        sea_orm_active_enums::PlotStatus::Booked => "booked",
        sea_orm_active_enums::PlotStatus::Sold => "sold",
        sea_orm_active_enums::PlotStatus::Cancelled => "cancelled",
    }
}

fn string_to_plot_status(s: &str) -> Option<PlotStatus> {
    match s.to_lowercase().as_str() {
        "available" => Some(PlotStatus::Available),
        "booked" => Some(PlotStatus::Booked),
        "sold" => Some(PlotStatus::Sold),
        "cancelled" => Some(PlotStatus::Cancelled),
        _ => None,
    }
}

fn commission_status_to_string(status: &sea_orm_active_enums::CommissionStatus) -> &'static str {
    match status {
        sea_orm_active_enums::CommissionStatus::Pending => "pending",
        sea_orm_active_enums::CommissionStatus::Paid => "paid",
    }
}

fn plot_to_response(plot: plots::Model) -> PlotResponse {
    PlotResponse {
        id: plot.id,
        project: plot.project,
        plot_number: plot.plot_number,
        area_sqft: plot.area_sqft.map(|a| a.to_string()),
        description: plot.description,
        status: plot_status_to_string(&plot.status).to_string(),
        total_amount: plot.total_amount.map(|t| t.to_string()),
        booking_amount: plot.booking_amount.to_string(),
        remaining_amount: plot.remaining_amount.to_string(),
        paid_percent: plot.paid_percent.to_string(),
        broker_id: plot.broker_id,
        buyer_name: plot.buyer_name,
        commission_status: commission_status_to_string(&plot.commission_status).to_string(),
        booked_at: plot.booked_at.map(|t| t.to_rfc3339()),
        sold_at: plot.sold_at.map(|t| t.to_rfc3339()),
        cancelled_at: plot.cancelled_at.map(|t| t.to_rfc3339()),
        created_at: plot.created_at.to_rfc3339(),
        updated_at: plot.updated_at.to_rfc3339(),
    }
}

fn payment_to_response(payment: payments::Model) -> PaymentResponse {
    PaymentResponse {
        id: payment.id,
        plot_id: payment.plot_id,
        amount: payment.amount.to_string(),
        paid_on: payment.paid_on.to_string(),
        method: payment.method,
        notes: payment.notes,
        created_at: payment.created_at.to_rfc3339(),
    }
}

/// Translates a plot repository error into a JSON response.
fn plot_error(e: &PlotError) -> axum::response::Response {
    let status = e.http_status_code();
    if status >= 500 {
        error!(error = %e, "Plot operation failed");
        return error_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "An error occurred",
        );
    }
    error_json(status_from(status), e.error_code(), &e.to_string())
}

/// Translates a distribution error into a JSON response.
fn distribution_error(e: &DistributionError) -> axum::response::Response {
    let status = e.http_status_code();
    if status >= 500 {
        error!(error = %e, "Commission operation failed");
        return error_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "An error occurred",
        );
    }
    error_json(status_from(status), e.error_code(), &e.to_string())
}

/// Serializes a distribution outcome for API responses.
fn distribution_json(outcome: &DistributionOutcome) -> serde_json::Value {
    match outcome {
        DistributionOutcome::Distributed {
            credits,
            total_commission,
        } => json!({
            "outcome": "distributed",
            "credits": credits,
            "total_commission": total_commission,
        }),
        DistributionOutcome::AlreadyDistributed => json!({ "outcome": "already_distributed" }),
        DistributionOutcome::NoBroker => json!({ "outcome": "no_broker" }),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /plots - Create a new plot listing.
async fn create_plot(
    State(state): State<AppState>,
    Json(payload): Json<CreatePlotRequest>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo
        .create_plot(CreatePlotInput {
            project: payload.project,
            plot_number: payload.plot_number,
            area_sqft: payload.area_sqft,
            description: payload.description,
            total_amount: payload.total_amount,
        })
        .await
    {
        Ok(plot) => {
            info!(plot_id = %plot.id, project = %plot.project, "Plot created");
            (StatusCode::CREATED, Json(plot_to_response(plot))).into_response()
        }
        Err(e) => plot_error(&e),
    }
}

/// GET /plots - List plots with filters.
async fn list_plots(
    State(state): State<AppState>,
    Query(query): Query<ListPlotsQuery>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    let filter = PlotFilter {
        project: query.project,
        status: query.status.as_ref().and_then(|s| string_to_plot_status(s)),
        broker_id: query.broker,
    };
    let mut page = PageRequest::default();
    if let Some(n) = query.page {
        page.page = n;
    }
    if let Some(n) = query.per_page {
        page.per_page = n;
    }

    match repo.list_plots(filter, &page).await {
        Ok(result) => {
            let items: Vec<PlotResponse> =
                result.data.into_iter().map(plot_to_response).collect();
            (
                StatusCode::OK,
                Json(json!({ "plots": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => plot_error(&e),
    }
}

/// GET `/plots/{plot_id}` - Get plot details.
async fn get_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo.get_plot(plot_id).await {
        Ok(plot) => (StatusCode::OK, Json(plot_to_response(plot))).into_response(),
        Err(e) => plot_error(&e),
    }
}

/// PATCH `/plots/{plot_id}` - Update a plot's descriptive fields.
async fn update_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
    Json(payload): Json<UpdatePlotRequest>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo
        .update_plot(
            plot_id,
            UpdatePlotInput {
                area_sqft: payload.area_sqft,
                description: payload.description,
                total_amount: payload.total_amount,
            },
        )
        .await
    {
        Ok(plot) => {
            info!(plot_id = %plot.id, "Plot updated");
            (StatusCode::OK, Json(plot_to_response(plot))).into_response()
        }
        Err(e) => plot_error(&e),
    }
}

/// DELETE `/plots/{plot_id}` - Delete an available plot.
async fn delete_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo.delete_plot(plot_id).await {
        Ok(()) => {
            info!(plot_id = %plot_id, "Plot deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => plot_error(&e),
    }
}

/// POST `/plots/{plot_id}/book` - Book a plot for a buyer.
async fn book_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
    Json(payload): Json<BookPlotRequest>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo
        .book_plot(
            plot_id,
            BookPlotInput {
                buyer_name: payload.buyer_name,
                booking_amount: payload.booking_amount,
                broker_id: payload.broker_id,
            },
        )
        .await
    {
        Ok(plot) => (StatusCode::OK, Json(plot_to_response(plot))).into_response(),
        Err(e) => plot_error(&e),
    }
}

/// POST `/plots/{plot_id}/cancel` - Cancel the current booking.
async fn cancel_booking(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo.cancel_booking(plot_id, &state.policy).await {
        Ok(plot) => (StatusCode::OK, Json(plot_to_response(plot))).into_response(),
        Err(e) => plot_error(&e),
    }
}

/// POST `/plots/{plot_id}/payments` - Record an installment payment.
async fn record_payment(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo
        .record_payment(
            plot_id,
            RecordPaymentInput {
                amount: payload.amount,
                paid_on: payload.paid_on,
                method: payload.method,
                notes: payload.notes,
            },
            &state.policy,
        )
        .await
    {
        Ok(recorded) => {
            let commission_distributed = matches!(
                recorded.distribution,
                Some(DistributionOutcome::Distributed { .. })
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "payment": payment_to_response(recorded.payment),
                    "paid_total": recorded.progress.paid_total,
                    "paid_percent": recorded.progress.paid_percent,
                    "remaining_amount": recorded.progress.remaining_amount,
                    "sale_triggered": recorded.sale_triggered,
                    "commission_distributed": commission_distributed,
                })),
            )
                .into_response()
        }
        Err(e) => plot_error(&e),
    }
}

/// GET `/plots/{plot_id}/payments` - List the live payment history.
async fn list_payments(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PlotRepository::new((*state.db).clone());

    match repo.list_payments(plot_id).await {
        Ok(rows) => {
            let items: Vec<PaymentResponse> =
                rows.into_iter().map(payment_to_response).collect();
            (StatusCode::OK, Json(json!({ "payments": items }))).into_response()
        }
        Err(e) => plot_error(&e),
    }
}

/// POST `/plots/{plot_id}/commission/distribute` - Settle commission for a
/// sold plot. Safe to retry; an already settled plot reports
/// `already_distributed`.
async fn distribute_commission(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CommissionRepository::new((*state.db).clone());

    match repo.distribute(plot_id, &state.policy).await {
        Ok(outcome) => (StatusCode::OK, Json(distribution_json(&outcome))).into_response(),
        Err(e) => distribution_error(&e),
    }
}

/// POST `/plots/{plot_id}/commission/reconcile` - Re-derive the plot's paid
/// state from its payment history and repair drift.
async fn reconcile_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CommissionRepository::new((*state.db).clone());

    match repo.reconcile(plot_id, &state.policy).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "paid_total": outcome.progress.paid_total,
                "paid_percent": outcome.progress.paid_percent,
                "remaining_amount": outcome.progress.remaining_amount,
                "progress_repaired": outcome.progress_repaired,
                "marked_sold": outcome.marked_sold,
                "distribution": outcome.distribution.as_ref().map(distribution_json),
            })),
        )
            .into_response(),
        Err(e) => distribution_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("available")]
    #[case("booked")]
    #[case("sold")]
    #[case("cancelled")]
    fn test_status_round_trip(#[case] s: &str) {
        let parsed = string_to_plot_status(s).expect("known status");
        let db: sea_orm_active_enums::PlotStatus = parsed.into();
        assert_eq!(plot_status_to_string(&db), s);
    }

    #[test]
    fn test_status_parse_edge_cases() {
        assert!(string_to_plot_status("reserved").is_none());
        assert_eq!(string_to_plot_status("SOLD"), Some(PlotStatus::Sold));
    }
}
