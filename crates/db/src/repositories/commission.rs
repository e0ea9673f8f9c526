//! Commission repository: at-most-once distribution and reconciliation.
//!
//! Distribution settles a sold plot's commission exactly once. The
//! pending→paid flip on the plot row is the gate; the unique
//! `(plot_id, broker_id, level)` key on commission wallet transactions is
//! the schema-level backstop behind it.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QuerySelect, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use plotbook_core::commission::{
    BrokerRef, CommissionError, CommissionPolicy, CommissionService, CreditTarget, PlannedCredit,
};
use plotbook_core::payment::{PaymentError, PaymentProgress, PaymentService};
use plotbook_core::plot::PlotStatus;

use crate::entities::{brokers, plots, sea_orm_active_enums, wallet_transactions};

use super::broker::walk_upline;
use super::plot::live_payments;

/// Error types for commission distribution.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    /// Plot not found.
    #[error("Plot not found: {0}")]
    PlotNotFound(Uuid),

    /// Plot is not in a distributable state.
    #[error("Commission requires a sold plot, found '{status}'")]
    InvalidPlotState {
        /// Status the plot was found in.
        status: PlotStatus,
    },

    /// Payment arithmetic could not derive progress, usually because the
    /// plot has no total amount.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Planning rejected the inputs.
    #[error(transparent)]
    Planning(#[from] CommissionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl DistributionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PlotNotFound(_) => "PLOT_NOT_FOUND",
            Self::InvalidPlotState { .. } => "INVALID_PLOT_STATE",
            Self::Payment(e) => e.error_code(),
            Self::Planning(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::PlotNotFound(_) => 404,
            Self::InvalidPlotState { .. } => 409,
            Self::Payment(e) => e.http_status_code(),
            Self::Planning(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Result of a distribution attempt.
#[derive(Debug, Clone)]
pub enum DistributionOutcome {
    /// Credits were written for the first time.
    Distributed {
        /// One entry per credited broker, direct first.
        credits: Vec<PlannedCredit>,
        /// Sum of all credited amounts.
        total_commission: Decimal,
    },
    /// Commission was already settled by an earlier call.
    AlreadyDistributed,
    /// Plot sold without a broker; settled with zero credits.
    NoBroker,
}

/// Result of reconciling a plot's derived state.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Payment progress derived from the live payment history.
    pub progress: PaymentProgress,
    /// Whether reconcile flipped the plot from booked to sold.
    pub marked_sold: bool,
    /// Whether stored progress columns differed and were rewritten.
    pub progress_repaired: bool,
    /// Distribution result when the plot ends up sold.
    pub distribution: Option<DistributionOutcome>,
}

/// Commission repository for settling sold plots.
#[derive(Debug, Clone)]
pub struct CommissionRepository {
    db: DatabaseConnection,
}

impl CommissionRepository {
    /// Creates a new commission repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Distributes commission for a sold plot exactly once.
    ///
    /// Safe to call repeatedly: a plot whose commission is already settled
    /// reports [`DistributionOutcome::AlreadyDistributed`] without touching
    /// any wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is missing, not sold, has no total
    /// amount, or a write fails; any error rolls the whole distribution
    /// back, including the settled flag.
    pub async fn distribute(
        &self,
        plot_id: Uuid,
        policy: &CommissionPolicy,
    ) -> Result<DistributionOutcome, DistributionError> {
        let txn = self.db.begin().await?;
        let outcome = distribute_in_txn(&txn, plot_id, policy).await?;
        txn.commit().await?;
        Ok(outcome)
    }

    /// Re-derives a plot's paid state from its live payment history and
    /// repairs stored progress, a missed sale flip, and a missed
    /// distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is missing, has no total amount, or a
    /// write fails.
    pub async fn reconcile(
        &self,
        plot_id: Uuid,
        policy: &CommissionPolicy,
    ) -> Result<ReconcileOutcome, DistributionError> {
        let txn = self.db.begin().await?;

        let plot = plots::Entity::find_by_id(plot_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(DistributionError::PlotNotFound(plot_id))?;

        let (_, payments_sum) = live_payments(&txn, plot_id).await?;
        let progress =
            PaymentService::progress(plot.total_amount, plot.booking_amount, payments_sum)?;

        let status: PlotStatus = plot.status.clone().into();
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

        let progress_repaired = plot.remaining_amount != progress.remaining_amount
            || plot.paid_percent != progress.paid_percent.round_dp(4);
        let marked_sold =
            status == PlotStatus::Booked && progress.paid_percent >= policy.sale_trigger_percent;

        if progress_repaired || marked_sold {
            let mut active: plots::ActiveModel = plot.into();
            if progress_repaired {
                active.remaining_amount = Set(progress.remaining_amount);
                active.paid_percent = Set(progress.paid_percent.round_dp(4));
            }
            if marked_sold {
                active.status = Set(sea_orm_active_enums::PlotStatus::Sold);
                active.sold_at = Set(Some(now));
            }
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }

        let distribution = if marked_sold || status == PlotStatus::Sold {
            Some(distribute_in_txn(&txn, plot_id, policy).await?)
        } else {
            None
        };

        txn.commit().await?;

        tracing::info!(
            plot_id = %plot_id,
            marked_sold,
            progress_repaired,
            "plot reconciled"
        );

        Ok(ReconcileOutcome {
            progress,
            marked_sold,
            progress_repaired,
            distribution,
        })
    }
}

/// Runs the distribution steps against an open transaction.
///
/// The caller owns commit/rollback; errors here must abort the whole
/// transaction so no partial credit survives.
pub(crate) async fn distribute_in_txn(
    txn: &DatabaseTransaction,
    plot_id: Uuid,
    policy: &CommissionPolicy,
) -> Result<DistributionOutcome, DistributionError> {
    // At-most-once gate: only a still-pending row matches, so a concurrent
    // caller sees zero rows affected and bails out without writing credits.
    let flipped = plots::Entity::update_many()
        .col_expr(
            plots::Column::CommissionStatus,
            sea_orm::sea_query::Expr::value(sea_orm_active_enums::CommissionStatus::Paid),
        )
        .col_expr(
            plots::Column::UpdatedAt,
            sea_orm::sea_query::Expr::value(Utc::now()),
        )
        .filter(plots::Column::Id.eq(plot_id))
        .filter(plots::Column::CommissionStatus.eq(sea_orm_active_enums::CommissionStatus::Pending))
        .exec(txn)
        .await?;

    if flipped.rows_affected == 0 {
        let plot = plots::Entity::find_by_id(plot_id).one(txn).await?;
        return match plot {
            None => Err(DistributionError::PlotNotFound(plot_id)),
            Some(_) => Ok(DistributionOutcome::AlreadyDistributed),
        };
    }

    let plot = plots::Entity::find_by_id(plot_id)
        .one(txn)
        .await?
        .ok_or(DistributionError::PlotNotFound(plot_id))?;

    // A failed state check rolls the flip back with the transaction.
    if plot.status != sea_orm_active_enums::PlotStatus::Sold {
        return Err(DistributionError::InvalidPlotState {
            status: plot.status.into(),
        });
    }

    let total_amount = plot
        .total_amount
        .ok_or(PaymentError::MissingTotalAmount)?;

    let Some(broker_id) = plot.broker_id else {
        tracing::info!(plot_id = %plot_id, "plot sold without broker, commission settled with no credits");
        return Ok(DistributionOutcome::NoBroker);
    };

    let Some(seller) = brokers::Entity::find_by_id(broker_id).one(txn).await? else {
        tracing::warn!(
            plot_id = %plot_id,
            broker_id = %broker_id,
            "plot references a missing broker, commission settled with no credits"
        );
        return Ok(DistributionOutcome::NoBroker);
    };

    let chain = walk_upline(txn, &seller, policy.schedule.max_upline_depth()).await?;

    let seller_ref = BrokerRef {
        id: seller.id,
        name: seller.name,
    };

    let plan = CommissionService::plan(
        plot_id,
        total_amount,
        Some(&seller_ref),
        &chain,
        &policy.schedule,
    )?;

    for credit in &plan.credits {
        upsert_wallet(txn, credit).await?;
        insert_commission_entry(txn, plot_id, credit).await?;
    }

    let total_commission = plan.total_commission();

    tracing::info!(
        plot_id = %plot_id,
        broker_id = %seller_ref.id,
        credits = plan.credits.len(),
        total_commission = %total_commission,
        "commission distributed"
    );

    Ok(DistributionOutcome::Distributed {
        credits: plan.credits,
        total_commission,
    })
}

/// Credits a wallet in place, seeding the row on first credit.
async fn upsert_wallet(txn: &DatabaseTransaction, credit: &PlannedCredit) -> Result<(), DbErr> {
    let (direct, downline) = match credit.target {
        CreditTarget::Direct => (credit.amount, Decimal::ZERO),
        CreditTarget::Downline => (Decimal::ZERO, credit.amount),
    };

    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        r"INSERT INTO wallets (broker_id, total_balance, direct_balance, downline_balance, updated_at)
          VALUES ($1, $2, $3, $4, now())
          ON CONFLICT (broker_id) DO UPDATE SET
              total_balance = wallets.total_balance + EXCLUDED.total_balance,
              direct_balance = wallets.direct_balance + EXCLUDED.direct_balance,
              downline_balance = wallets.downline_balance + EXCLUDED.downline_balance,
              updated_at = now()",
        [
            credit.broker_id.into(),
            credit.amount.into(),
            direct.into(),
            downline.into(),
        ],
    );

    txn.execute(stmt).await?;
    Ok(())
}

/// Appends the immutable wallet ledger row for one commission credit.
async fn insert_commission_entry(
    txn: &DatabaseTransaction,
    plot_id: Uuid,
    credit: &PlannedCredit,
) -> Result<(), DbErr> {
    let entry = wallet_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        broker_id: Set(credit.broker_id),
        kind: Set(sea_orm_active_enums::WalletTxnKind::Commission),
        amount: Set(credit.amount),
        plot_id: Set(Some(plot_id)),
        level: Set(Some(credit.level)),
        description: Set(Some(credit.description.clone())),
        created_at: Set(Utc::now().into()),
    };

    entry.insert(txn).await?;
    Ok(())
}
