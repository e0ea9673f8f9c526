//! Wallet and withdrawal routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::{error_json, status_from};
use plotbook_core::wallet::WithdrawalStatus;
use plotbook_db::entities::{sea_orm_active_enums, wallet_transactions, withdrawal_requests};
use plotbook_db::repositories::wallet::{WalletError, WalletRepository};
use plotbook_shared::types::PageRequest;

/// Creates the wallet and withdrawal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/brokers/{broker_id}/wallet", get(get_wallet))
        .route(
            "/brokers/{broker_id}/wallet/transactions",
            get(list_transactions),
        )
        .route("/brokers/{broker_id}/withdrawals", post(request_withdrawal))
        .route("/withdrawals", get(list_withdrawals))
        .route("/withdrawals/{withdrawal_id}/approve", post(approve_withdrawal))
        .route("/withdrawals/{withdrawal_id}/reject", post(reject_withdrawal))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a withdrawal.
#[derive(Debug, Deserialize)]
pub struct RequestWithdrawalRequest {
    /// Amount to withdraw.
    pub amount: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Query parameters for paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Query parameters for listing withdrawals.
#[derive(Debug, Deserialize)]
pub struct ListWithdrawalsQuery {
    /// Filter by decision status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Response for a withdrawal request.
#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    /// Withdrawal request ID.
    pub id: Uuid,
    /// Requesting broker.
    pub broker_id: Uuid,
    /// Requested amount.
    pub amount: String,
    /// Decision status.
    pub status: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the request was made.
    pub requested_at: String,
    /// When the request was decided.
    pub decided_at: Option<String>,
}

/// Response for a wallet ledger entry.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Ledger entry ID.
    pub id: Uuid,
    /// Owning broker.
    pub broker_id: Uuid,
    /// Entry kind.
    pub kind: String,
    /// Entry amount.
    pub amount: String,
    /// Plot the entry relates to, for commission credits.
    pub plot_id: Option<Uuid>,
    /// Referral level of the credit.
    pub level: Option<i16>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
}

fn withdrawal_status_to_string(
    status: &sea_orm_active_enums::WithdrawalStatus,
) -> &'static str {
    match status {
        sea_orm_active_enums::WithdrawalStatus::Pending => "pending",
        sea_orm_active_enums::WithdrawalStatus::Approved => "approved",
        sea_orm_active_enums::WithdrawalStatus::Rejected => "rejected",
    }
}

fn string_to_withdrawal_status(s: &str) -> Option<WithdrawalStatus> {
    match s.to_lowercase().as_str() {
        "pending" => Some(WithdrawalStatus::Pending),
        "approved" => Some(WithdrawalStatus::Approved),
        "rejected" => Some(WithdrawalStatus::Rejected),
        _ => None,
    }
}

fn txn_kind_to_string(kind: &sea_orm_active_enums::WalletTxnKind) -> &'static str {
    match kind {
        sea_orm_active_enums::WalletTxnKind::Commission => "commission",
        sea_orm_active_enums::WalletTxnKind::Withdrawal => "withdrawal",
        sea_orm_active_enums::WalletTxnKind::Adjustment => "adjustment",
    }
}

fn withdrawal_to_response(request: withdrawal_requests::Model) -> WithdrawalResponse {
    WithdrawalResponse {
        id: request.id,
        broker_id: request.broker_id,
        amount: request.amount.to_string(),
        status: withdrawal_status_to_string(&request.status).to_string(),
        notes: request.notes,
        requested_at: request.requested_at.to_rfc3339(),
        decided_at: request.decided_at.map(|t| t.to_rfc3339()),
    }
}

fn transaction_to_response(txn: wallet_transactions::Model) -> TransactionResponse {
    TransactionResponse {
        id: txn.id,
        broker_id: txn.broker_id,
        kind: txn_kind_to_string(&txn.kind).to_string(),
        amount: txn.amount.to_string(),
        plot_id: txn.plot_id,
        level: txn.level,
        description: txn.description,
        created_at: txn.created_at.to_rfc3339(),
    }
}

/// Translates a wallet repository error into a JSON response.
fn wallet_error(e: &WalletError) -> axum::response::Response {
    let status = e.http_status_code();
    if status >= 500 {
        error!(error = %e, "Wallet operation failed");
        return error_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "An error occurred",
        );
    }
    error_json(status_from(status), e.error_code(), &e.to_string())
}

fn page_from(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let mut request = PageRequest::default();
    if let Some(n) = page {
        request.page = n;
    }
    if let Some(n) = per_page {
        request.per_page = n;
    }
    request
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/brokers/{broker_id}/wallet` - Get a broker's wallet balances.
async fn get_wallet(
    State(state): State<AppState>,
    Path(broker_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.get_wallet(broker_id).await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(json!({
                "broker_id": snapshot.broker_id,
                "direct_balance": snapshot.balances.direct,
                "downline_balance": snapshot.balances.downline,
                "total_balance": snapshot.balances.total(),
                "updated_at": snapshot.updated_at.map(|t| t.to_rfc3339()),
            })),
        )
            .into_response(),
        Err(e) => wallet_error(&e),
    }
}

/// GET `/brokers/{broker_id}/wallet/transactions` - List the wallet ledger,
/// newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Path(broker_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());
    let page = page_from(query.page, query.per_page);

    match repo.list_transactions(broker_id, &page).await {
        Ok(result) => {
            let items: Vec<TransactionResponse> = result
                .data
                .into_iter()
                .map(transaction_to_response)
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "transactions": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => wallet_error(&e),
    }
}

/// POST `/brokers/{broker_id}/withdrawals` - Request a withdrawal.
async fn request_withdrawal(
    State(state): State<AppState>,
    Path(broker_id): Path<Uuid>,
    Json(payload): Json<RequestWithdrawalRequest>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo
        .request_withdrawal(broker_id, payload.amount, payload.notes)
        .await
    {
        Ok(request) => {
            (StatusCode::CREATED, Json(withdrawal_to_response(request))).into_response()
        }
        Err(e) => wallet_error(&e),
    }
}

/// GET /withdrawals - List withdrawal requests, newest first.
async fn list_withdrawals(
    State(state): State<AppState>,
    Query(query): Query<ListWithdrawalsQuery>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());
    let status = query
        .status
        .as_ref()
        .and_then(|s| string_to_withdrawal_status(s));
    let page = page_from(query.page, query.per_page);

    match repo.list_withdrawals(status, &page).await {
        Ok(result) => {
            let items: Vec<WithdrawalResponse> = result
                .data
                .into_iter()
                .map(withdrawal_to_response)
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "withdrawals": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => wallet_error(&e),
    }
}

/// POST `/withdrawals/{withdrawal_id}/approve` - Approve a pending
/// withdrawal and debit the wallet.
async fn approve_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.approve_withdrawal(withdrawal_id).await {
        Ok(request) => {
            info!(withdrawal_id = %request.id, broker_id = %request.broker_id, "Withdrawal approved");
            (StatusCode::OK, Json(withdrawal_to_response(request))).into_response()
        }
        Err(e) => wallet_error(&e),
    }
}

/// POST `/withdrawals/{withdrawal_id}/reject` - Reject a pending withdrawal.
async fn reject_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.reject_withdrawal(withdrawal_id).await {
        Ok(request) => {
            info!(withdrawal_id = %request.id, broker_id = %request.broker_id, "Withdrawal rejected");
            (StatusCode::OK, Json(withdrawal_to_response(request))).into_response()
        }
        Err(e) => wallet_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pending")]
    #[case("approved")]
    #[case("rejected")]
    fn test_withdrawal_status_round_trip(#[case] s: &str) {
        let parsed = string_to_withdrawal_status(s).expect("known status");
        let db: sea_orm_active_enums::WithdrawalStatus = parsed.into();
        assert_eq!(withdrawal_status_to_string(&db), s);
    }

    #[test]
    fn test_withdrawal_status_parse_unknown() {
        assert!(string_to_withdrawal_status("settled").is_none());
    }
}
