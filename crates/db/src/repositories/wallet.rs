//! Wallet repository for broker balances, the wallet ledger, and withdrawals.
//!
//! Balances only ever change together with a matching immutable
//! `wallet_transactions` row, inside one database transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use plotbook_core::wallet::{BalanceError, WalletBalances, WithdrawalStatus};
use plotbook_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    brokers, sea_orm_active_enums, wallet_transactions, wallets, withdrawal_requests,
};

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Broker not found.
    #[error("Broker not found: {0}")]
    BrokerNotFound(Uuid),

    /// Withdrawal request not found.
    #[error("Withdrawal request not found: {0}")]
    WithdrawalNotFound(Uuid),

    /// Withdrawal request was already decided.
    #[error("Withdrawal request is already {0}")]
    AlreadyDecided(WithdrawalStatus),

    /// Balance arithmetic rejected the operation.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl WalletError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BrokerNotFound(_) => "BROKER_NOT_FOUND",
            Self::WithdrawalNotFound(_) => "WITHDRAWAL_NOT_FOUND",
            Self::AlreadyDecided(_) => "ALREADY_DECIDED",
            Self::Balance(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BrokerNotFound(_) | Self::WithdrawalNotFound(_) => 404,
            Self::AlreadyDecided(_) => 409,
            Self::Balance(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// A broker's wallet balances, zeroed when the broker has never been credited.
#[derive(Debug, Clone)]
pub struct WalletSnapshot {
    /// Owning broker.
    pub broker_id: Uuid,
    /// Commission balances split by source.
    pub balances: WalletBalances,
    /// Last balance change, if the wallet row exists.
    pub updated_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Wallet repository for balance reads, the ledger, and the withdrawal
/// workflow.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a broker's wallet, defaulting to zero balances when the broker
    /// has never been credited.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker does not exist or the query fails.
    pub async fn get_wallet(&self, broker_id: Uuid) -> Result<WalletSnapshot, WalletError> {
        let broker = brokers::Entity::find_by_id(broker_id)
            .one(&self.db)
            .await?
            .ok_or(WalletError::BrokerNotFound(broker_id))?;

        let wallet = wallets::Entity::find_by_id(broker.id).one(&self.db).await?;

        Ok(match wallet {
            Some(w) => WalletSnapshot {
                broker_id: w.broker_id,
                balances: WalletBalances::new(w.direct_balance, w.downline_balance),
                updated_at: Some(w.updated_at),
            },
            None => WalletSnapshot {
                broker_id: broker.id,
                balances: WalletBalances::ZERO,
                updated_at: None,
            },
        })
    }

    /// Lists a broker's wallet ledger, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker does not exist or the query fails.
    pub async fn list_transactions(
        &self,
        broker_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<wallet_transactions::Model>, WalletError> {
        let broker = brokers::Entity::find_by_id(broker_id)
            .one(&self.db)
            .await?
            .ok_or(WalletError::BrokerNotFound(broker_id))?;

        let total = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::BrokerId.eq(broker.id))
            .count(&self.db)
            .await?;

        let rows = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::BrokerId.eq(broker.id))
            .order_by_desc(wallet_transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Creates a pending withdrawal request after checking the current
    /// balance covers it.
    ///
    /// The balance is only debited at approval time, so overlapping pending
    /// requests are allowed and the later approval fails on insufficient
    /// funds.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker does not exist, the amount is not
    /// positive, the balance cannot cover it, or the insert fails.
    pub async fn request_withdrawal(
        &self,
        broker_id: Uuid,
        amount: Decimal,
        notes: Option<String>,
    ) -> Result<withdrawal_requests::Model, WalletError> {
        let snapshot = self.get_wallet(broker_id).await?;

        // Rejects non-positive amounts and requests above the balance.
        snapshot.balances.withdraw(amount)?;

        let request = withdrawal_requests::ActiveModel {
            id: Set(Uuid::new_v4()),
            broker_id: Set(broker_id),
            amount: Set(amount),
            status: Set(sea_orm_active_enums::WithdrawalStatus::Pending),
            notes: Set(notes),
            requested_at: Set(Utc::now().into()),
            decided_at: Set(None),
        };

        let created = request.insert(&self.db).await?;

        tracing::info!(
            withdrawal_id = %created.id,
            broker_id = %broker_id,
            amount = %amount,
            "withdrawal requested"
        );

        Ok(created)
    }

    /// Approves a pending withdrawal and debits the wallet.
    ///
    /// The pending→approved flip is a conditional update, so two concurrent
    /// decisions cannot both debit; the wallet row is locked for the debit
    /// and the withdrawal lands in the ledger within the same database
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is missing or already decided, the
    /// balance cannot cover the amount, or a write fails.
    pub async fn approve_withdrawal(
        &self,
        id: Uuid,
    ) -> Result<withdrawal_requests::Model, WalletError> {
        let txn = self.db.begin().await?;
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

        let flipped = withdrawal_requests::Entity::update_many()
            .col_expr(
                withdrawal_requests::Column::Status,
                sea_orm::sea_query::Expr::value(sea_orm_active_enums::WithdrawalStatus::Approved),
            )
            .col_expr(
                withdrawal_requests::Column::DecidedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(withdrawal_requests::Column::Id.eq(id))
            .filter(
                withdrawal_requests::Column::Status
                    .eq(sea_orm_active_enums::WithdrawalStatus::Pending),
            )
            .exec(&txn)
            .await?;

        if flipped.rows_affected == 0 {
            // Distinguish a missing request from one already decided.
            let current = withdrawal_requests::Entity::find_by_id(id).one(&txn).await?;
            txn.rollback().await?;
            return match current {
                None => Err(WalletError::WithdrawalNotFound(id)),
                Some(r) => Err(WalletError::AlreadyDecided(r.status.into())),
            };
        }

        let request = withdrawal_requests::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(WalletError::WithdrawalNotFound(id))?;

        let wallet = wallets::Entity::find_by_id(request.broker_id)
            .lock_exclusive()
            .one(&txn)
            .await?;

        let before = wallet.as_ref().map_or(WalletBalances::ZERO, |w| {
            WalletBalances::new(w.direct_balance, w.downline_balance)
        });

        // Errors here drop the transaction and roll the flip back.
        let after = before.withdraw(request.amount)?;

        if let Some(wallet) = wallet {
            let mut active: wallets::ActiveModel = wallet.into();
            active.total_balance = Set(after.total());
            active.direct_balance = Set(after.direct);
            active.downline_balance = Set(after.downline);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }

        let entry = wallet_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            broker_id: Set(request.broker_id),
            kind: Set(sea_orm_active_enums::WalletTxnKind::Withdrawal),
            amount: Set(request.amount),
            plot_id: Set(None),
            level: Set(None),
            description: Set(Some(format!("Withdrawal request {id} approved"))),
            created_at: Set(now),
        };
        entry.insert(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            withdrawal_id = %id,
            broker_id = %request.broker_id,
            amount = %request.amount,
            "withdrawal approved"
        );

        Ok(request)
    }

    /// Rejects a pending withdrawal. The wallet is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is missing or already decided, or the
    /// update fails.
    pub async fn reject_withdrawal(
        &self,
        id: Uuid,
    ) -> Result<withdrawal_requests::Model, WalletError> {
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

        let flipped = withdrawal_requests::Entity::update_many()
            .col_expr(
                withdrawal_requests::Column::Status,
                sea_orm::sea_query::Expr::value(sea_orm_active_enums::WithdrawalStatus::Rejected),
            )
            .col_expr(
                withdrawal_requests::Column::DecidedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(withdrawal_requests::Column::Id.eq(id))
            .filter(
                withdrawal_requests::Column::Status
                    .eq(sea_orm_active_enums::WithdrawalStatus::Pending),
            )
            .exec(&self.db)
            .await?;

        if flipped.rows_affected == 0 {
            let current = withdrawal_requests::Entity::find_by_id(id).one(&self.db).await?;
            return match current {
                None => Err(WalletError::WithdrawalNotFound(id)),
                Some(r) => Err(WalletError::AlreadyDecided(r.status.into())),
            };
        }

        let request = withdrawal_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(WalletError::WithdrawalNotFound(id))?;

        tracing::info!(withdrawal_id = %id, broker_id = %request.broker_id, "withdrawal rejected");

        Ok(request)
    }

    /// Lists withdrawal requests, newest first, optionally filtered by
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_withdrawals(
        &self,
        status: Option<WithdrawalStatus>,
        page: &PageRequest,
    ) -> Result<PageResponse<withdrawal_requests::Model>, WalletError> {
        let db_status: Option<sea_orm_active_enums::WithdrawalStatus> = status.map(Into::into);

        let mut count_query = withdrawal_requests::Entity::find();
        let mut query = withdrawal_requests::Entity::find();

        if let Some(db_status) = db_status {
            count_query =
                count_query.filter(withdrawal_requests::Column::Status.eq(db_status.clone()));
            query = query.filter(withdrawal_requests::Column::Status.eq(db_status));
        }

        let total = count_query.count(&self.db).await?;

        let rows = query
            .order_by_desc(withdrawal_requests::Column::RequestedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }
}
