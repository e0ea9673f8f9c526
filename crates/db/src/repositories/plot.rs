//! Plot repository for inventory, booking lifecycle, and payment recording.
//!
//! Every state change that involves money runs inside one database
//! transaction with the plot row locked, so derived progress, the sale
//! flip, and commission distribution can never partially apply.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use plotbook_core::commission::CommissionPolicy;
use plotbook_core::payment::{PaymentError, PaymentProgress, PaymentService, PlotFinancials};
use plotbook_core::plot::{LifecycleAction, LifecycleError, LifecycleService, PlotStatus};
use plotbook_shared::types::{PageRequest, PageResponse};

use crate::entities::{brokers, payments, plots, sea_orm_active_enums};

use super::commission::{distribute_in_txn, DistributionError, DistributionOutcome};

/// Error types for plot operations.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// Plot not found.
    #[error("Plot not found: {0}")]
    PlotNotFound(Uuid),

    /// Plot number already exists within the project.
    #[error("Plot '{plot_number}' already exists in project '{project}'")]
    DuplicatePlotNumber {
        /// Project the duplicate was found in.
        project: String,
        /// The conflicting plot number.
        plot_number: String,
    },

    /// Referenced broker not found.
    #[error("Broker not found: {0}")]
    BrokerNotFound(Uuid),

    /// Total amount must be positive when present.
    #[error("Total amount must be greater than zero")]
    NonPositiveTotalAmount,

    /// Total amount can only change while the plot is available.
    #[error("Total amount is locked while the plot is '{status}'")]
    TotalAmountLocked {
        /// Status the plot was found in.
        status: PlotStatus,
    },

    /// Lifecycle rules rejected the transition.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Payment arithmetic rejected the operation.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Commission distribution failed.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PlotError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PlotNotFound(_) => "PLOT_NOT_FOUND",
            Self::DuplicatePlotNumber { .. } => "DUPLICATE_PLOT_NUMBER",
            Self::BrokerNotFound(_) => "BROKER_NOT_FOUND",
            Self::NonPositiveTotalAmount => "NON_POSITIVE_TOTAL_AMOUNT",
            Self::TotalAmountLocked { .. } => "TOTAL_AMOUNT_LOCKED",
            Self::Lifecycle(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::Distribution(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::PlotNotFound(_) | Self::BrokerNotFound(_) => 404,
            Self::DuplicatePlotNumber { .. } | Self::TotalAmountLocked { .. } => 409,
            Self::NonPositiveTotalAmount => 400,
            Self::Lifecycle(e) => e.http_status_code(),
            Self::Payment(e) => e.http_status_code(),
            Self::Distribution(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating a plot.
#[derive(Debug, Clone)]
pub struct CreatePlotInput {
    /// Project or scheme the plot belongs to.
    pub project: String,
    /// Plot number, unique within the project.
    pub plot_number: String,
    /// Plot area in square feet.
    pub area_sqft: Option<Decimal>,
    /// Free-form description.
    pub description: Option<String>,
    /// Sale price; may be set later while the plot is available.
    pub total_amount: Option<Decimal>,
}

/// Input for updating a plot's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlotInput {
    /// Plot area in square feet.
    pub area_sqft: Option<Option<Decimal>>,
    /// Free-form description.
    pub description: Option<Option<String>>,
    /// Sale price; only changeable while the plot is available.
    pub total_amount: Option<Option<Decimal>>,
}

/// Filter options for listing plots.
#[derive(Debug, Clone, Default)]
pub struct PlotFilter {
    /// Filter by project name.
    pub project: Option<String>,
    /// Filter by lifecycle status.
    pub status: Option<PlotStatus>,
    /// Filter by referring broker.
    pub broker_id: Option<Uuid>,
}

/// Input for booking a plot.
#[derive(Debug, Clone)]
pub struct BookPlotInput {
    /// Buyer the plot is booked for.
    pub buyer_name: String,
    /// Amount paid at booking time.
    pub booking_amount: Decimal,
    /// Referring broker, if any.
    pub broker_id: Option<Uuid>,
}

/// Input for recording an installment payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Payment amount.
    pub amount: Decimal,
    /// Date the payment was made; defaults to today.
    pub paid_on: Option<NaiveDate>,
    /// Payment method, free-form.
    pub method: Option<String>,
    /// Notes for the receipt.
    pub notes: Option<String>,
}

/// Result of recording a payment.
#[derive(Debug, Clone)]
pub struct PaymentRecorded {
    /// The stored payment row.
    pub payment: payments::Model,
    /// Derived progress after this payment.
    pub progress: PaymentProgress,
    /// Whether this payment pushed the plot over the sale trigger.
    pub sale_triggered: bool,
    /// Distribution outcome when the sale fired.
    pub distribution: Option<DistributionOutcome>,
}

/// Plot repository for inventory CRUD and the booking/payment lifecycle.
#[derive(Debug, Clone)]
pub struct PlotRepository {
    db: DatabaseConnection,
}

impl PlotRepository {
    /// Creates a new plot repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new plot in the available state.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot number already exists in the project,
    /// the total amount is not positive, or the insert fails.
    pub async fn create_plot(&self, input: CreatePlotInput) -> Result<plots::Model, PlotError> {
        // Unique (project, plot_number) is also enforced by the schema;
        // checking first gives the caller a typed error instead of DbErr.
        let existing = plots::Entity::find()
            .filter(plots::Column::Project.eq(&input.project))
            .filter(plots::Column::PlotNumber.eq(&input.plot_number))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(PlotError::DuplicatePlotNumber {
                project: input.project,
                plot_number: input.plot_number,
            });
        }

        if let Some(total) = input.total_amount {
            if total <= Decimal::ZERO {
                return Err(PlotError::NonPositiveTotalAmount);
            }
        }

        let now = Utc::now().into();
        let plot = plots::ActiveModel {
            id: Set(Uuid::new_v4()),
            project: Set(input.project),
            plot_number: Set(input.plot_number),
            area_sqft: Set(input.area_sqft),
            description: Set(input.description),
            status: Set(sea_orm_active_enums::PlotStatus::Available),
            total_amount: Set(input.total_amount),
            booking_amount: Set(Decimal::ZERO),
            remaining_amount: Set(input.total_amount.unwrap_or(Decimal::ZERO)),
            paid_percent: Set(Decimal::ZERO),
            broker_id: Set(None),
            buyer_name: Set(None),
            commission_status: Set(sea_orm_active_enums::CommissionStatus::Pending),
            booked_at: Set(None),
            sold_at: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = plot.insert(&self.db).await?;
        Ok(created)
    }

    /// Gets a plot by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is not found or the query fails.
    pub async fn get_plot(&self, id: Uuid) -> Result<plots::Model, PlotError> {
        plots::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PlotError::PlotNotFound(id))
    }

    /// Lists plots ordered by project and plot number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_plots(
        &self,
        filter: PlotFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<plots::Model>, PlotError> {
        let mut count_query = plots::Entity::find();
        let mut query = plots::Entity::find();

        if let Some(project) = &filter.project {
            count_query = count_query.filter(plots::Column::Project.eq(project));
            query = query.filter(plots::Column::Project.eq(project));
        }

        if let Some(status) = filter.status {
            let db_status: sea_orm_active_enums::PlotStatus = status.into();
            count_query = count_query.filter(plots::Column::Status.eq(db_status.clone()));
            query = query.filter(plots::Column::Status.eq(db_status));
        }

        if let Some(broker_id) = filter.broker_id {
            count_query = count_query.filter(plots::Column::BrokerId.eq(broker_id));
            query = query.filter(plots::Column::BrokerId.eq(broker_id));
        }

        let total = count_query.count(&self.db).await?;

        let rows = query
            .order_by_asc(plots::Column::Project)
            .order_by_asc(plots::Column::PlotNumber)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Updates a plot's descriptive fields.
    ///
    /// The total amount is only changeable while the plot is available;
    /// once a cycle starts the price is locked so derived progress cannot
    /// shift under live payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is not found, the price change is not
    /// allowed, or the update fails.
    pub async fn update_plot(
        &self,
        id: Uuid,
        input: UpdatePlotInput,
    ) -> Result<plots::Model, PlotError> {
        let plot = self.get_plot(id).await?;

        if let Some(new_total) = &input.total_amount {
            if plot.status != sea_orm_active_enums::PlotStatus::Available {
                return Err(PlotError::TotalAmountLocked {
                    status: plot.status.into(),
                });
            }
            if let Some(total) = new_total {
                if *total <= Decimal::ZERO {
                    return Err(PlotError::NonPositiveTotalAmount);
                }
            }
        }

        let mut active: plots::ActiveModel = plot.into();

        if let Some(area_sqft) = input.area_sqft {
            active.area_sqft = Set(area_sqft);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(total_amount) = input.total_amount {
            active.total_amount = Set(total_amount);
            // Available plots have no booking or payments yet.
            active.remaining_amount = Set(total_amount.unwrap_or(Decimal::ZERO));
            active.paid_percent = Set(Decimal::ZERO);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a plot. Only available plots can be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is not found, is not available, or the
    /// delete fails.
    pub async fn delete_plot(&self, id: Uuid) -> Result<(), PlotError> {
        let plot = self.get_plot(id).await?;

        LifecycleService::can_delete(plot.status.clone().into())?;

        plot.delete(&self.db).await?;
        Ok(())
    }

    /// Books an available plot for a buyer.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot or broker is missing, the plot is not
    /// available, the booking input is invalid, or a write fails.
    pub async fn book_plot(
        &self,
        id: Uuid,
        input: BookPlotInput,
    ) -> Result<plots::Model, PlotError> {
        let txn = self.db.begin().await?;

        let plot = plots::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PlotError::PlotNotFound(id))?;

        if let Some(broker_id) = input.broker_id {
            let broker = brokers::Entity::find_by_id(broker_id).one(&txn).await?;
            if broker.is_none() {
                return Err(PlotError::BrokerNotFound(broker_id));
            }
        }

        let action = LifecycleService::book(
            plot.status.clone().into(),
            input.buyer_name,
            input.booking_amount,
            input.broker_id,
        )?;

        let total_amount = plot.total_amount;
        let mut active: plots::ActiveModel = plot.into();

        if let LifecycleAction::Book {
            new_status,
            buyer_name,
            booking_amount,
            broker_id,
            booked_at,
        } = action
        {
            let (remaining, percent) = match total_amount {
                Some(_) => {
                    let progress =
                        PaymentService::progress(total_amount, booking_amount, Decimal::ZERO)?;
                    (
                        progress.remaining_amount,
                        progress.paid_percent.round_dp(4),
                    )
                }
                // An unpriced plot books with zeroed progress until the
                // total amount is known.
                None => (Decimal::ZERO, Decimal::ZERO),
            };

            active.status = Set(new_status.into());
            active.buyer_name = Set(Some(buyer_name));
            active.booking_amount = Set(booking_amount);
            active.remaining_amount = Set(remaining);
            active.paid_percent = Set(percent);
            active.broker_id = Set(broker_id);
            active.booked_at = Set(Some(booked_at.into()));
            active.cancelled_at = Set(None);
            active.updated_at = Set(Utc::now().into());
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(plot_id = %id, "plot booked");

        Ok(updated)
    }

    /// Cancels a booking, returning the plot to inventory.
    ///
    /// The gate check runs against progress derived from the live payment
    /// history inside the same transaction that reverts the row, and the
    /// cycle's payments are tombstoned rather than deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is missing, not booked, the paid
    /// percentage has reached the cancellation limit, or a write fails.
    pub async fn cancel_booking(
        &self,
        id: Uuid,
        policy: &CommissionPolicy,
    ) -> Result<plots::Model, PlotError> {
        let txn = self.db.begin().await?;

        let plot = plots::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PlotError::PlotNotFound(id))?;

        let (_, payments_sum) = live_payments(&txn, id).await?;

        let paid_percent = match plot.total_amount {
            Some(_) => {
                PaymentService::progress(plot.total_amount, plot.booking_amount, payments_sum)?
                    .paid_percent
            }
            // No price means no meaningful progress; the gate stays open.
            None => Decimal::ZERO,
        };

        let action = LifecycleService::cancel(
            plot.status.clone().into(),
            paid_percent,
            policy.cancellation_limit_percent,
        )?;

        let total_amount = plot.total_amount;
        let mut active: plots::ActiveModel = plot.into();

        if let LifecycleAction::Cancel {
            new_status,
            cancelled_at,
        } = action
        {
            active.status = Set(new_status.into());
            active.buyer_name = Set(None);
            active.broker_id = Set(None);
            active.booking_amount = Set(Decimal::ZERO);
            active.remaining_amount = Set(total_amount.unwrap_or(Decimal::ZERO));
            active.paid_percent = Set(Decimal::ZERO);
            active.booked_at = Set(None);
            active.cancelled_at = Set(Some(cancelled_at.into()));
            active.updated_at = Set(Utc::now().into());
        }

        let updated = active.update(&txn).await?;

        // Tombstone the cycle's payments: they stay on record for audit but
        // never count toward a later booking's derived progress.
        payments::Entity::update_many()
            .col_expr(
                payments::Column::VoidedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(payments::Column::PlotId.eq(id))
            .filter(payments::Column::VoidedAt.is_null())
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(plot_id = %id, "booking cancelled");

        Ok(updated)
    }

    /// Records an installment payment against a booked plot.
    ///
    /// Appends the payment, rewrites the stored progress columns from the
    /// derived values, flips the plot to sold when the trigger is crossed,
    /// and distributes commission — all in one transaction on the locked
    /// plot row.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is missing or not booked, the amount is
    /// invalid or exceeds the remaining balance, or any write fails; an
    /// error rolls back the payment, the flip, and any credits together.
    pub async fn record_payment(
        &self,
        id: Uuid,
        input: RecordPaymentInput,
        policy: &CommissionPolicy,
    ) -> Result<PaymentRecorded, PlotError> {
        let txn = self.db.begin().await?;

        let plot = plots::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PlotError::PlotNotFound(id))?;

        let (_, prior_sum) = live_payments(&txn, id).await?;

        let status: PlotStatus = plot.status.clone().into();
        let financials = PlotFinancials {
            status,
            total_amount: plot.total_amount,
            booking_amount: plot.booking_amount,
        };

        let outcome =
            PaymentService::evaluate(&financials, prior_sum, input.amount, policy.sale_trigger_percent)?;

        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            plot_id: Set(id),
            amount: Set(outcome.amount),
            paid_on: Set(input.paid_on.unwrap_or_else(|| now.date_naive())),
            method: Set(input.method),
            notes: Set(input.notes),
            voided_at: Set(None),
            created_at: Set(now.into()),
        };
        let payment = payment.insert(&txn).await?;

        let mut active: plots::ActiveModel = plot.into();
        active.remaining_amount = Set(outcome.progress.remaining_amount);
        active.paid_percent = Set(outcome.progress.paid_percent.round_dp(4));

        if outcome.sale_triggered {
            let sale = LifecycleService::mark_sold(status)?;
            if let LifecycleAction::MarkSold {
                new_status,
                sold_at,
            } = sale
            {
                active.status = Set(new_status.into());
                active.sold_at = Set(Some(sold_at.into()));
            }
        }

        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        let distribution = if outcome.sale_triggered {
            Some(distribute_in_txn(&txn, id, policy).await?)
        } else {
            None
        };

        txn.commit().await?;

        tracing::info!(
            plot_id = %id,
            amount = %outcome.amount,
            paid_percent = %outcome.progress.paid_percent,
            sale_triggered = outcome.sale_triggered,
            "payment recorded"
        );

        Ok(PaymentRecorded {
            payment,
            progress: outcome.progress,
            sale_triggered: outcome.sale_triggered,
            distribution,
        })
    }

    /// Lists the live payments recorded against a plot, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot is not found or the query fails.
    pub async fn list_payments(&self, plot_id: Uuid) -> Result<Vec<payments::Model>, PlotError> {
        // Existence check keeps a missing plot distinct from an empty history.
        let plot = self.get_plot(plot_id).await?;

        let (rows, _) = live_payments(&self.db, plot.id).await?;
        Ok(rows)
    }
}

/// Loads the live (non-voided) payments against a plot, oldest first,
/// together with their sum.
pub(crate) async fn live_payments<C>(
    conn: &C,
    plot_id: Uuid,
) -> Result<(Vec<payments::Model>, Decimal), DbErr>
where
    C: ConnectionTrait,
{
    let rows = payments::Entity::find()
        .filter(payments::Column::PlotId.eq(plot_id))
        .filter(payments::Column::VoidedAt.is_null())
        .order_by_asc(payments::Column::PaidOn)
        .order_by_asc(payments::Column::CreatedAt)
        .all(conn)
        .await?;

    let total: Decimal = rows.iter().map(|p| p.amount).sum();
    Ok((rows, total))
}
