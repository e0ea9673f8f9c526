//! Payment evaluation service.
//!
//! This module provides the core business logic for validating a payment
//! and deriving the plot's new financial position before persistence.

use rust_decimal::Decimal;

use crate::payment::error::PaymentError;
use crate::payment::types::{PaymentOutcome, PaymentProgress, PlotFinancials};

/// Payment evaluation service.
///
/// This service contains pure business logic with no database dependencies.
/// It validates a payment against the plot's financials and derives the
/// resulting progress from the payment-history sum.
pub struct PaymentService;

impl PaymentService {
    /// Validate a payment and derive the plot's new financial position.
    ///
    /// Remaining amount and paid percentage are always re-derived from
    /// `booking_amount + prior_payments_total`, never read from stored
    /// columns, so repeated recomputation cannot drift.
    ///
    /// # Arguments
    ///
    /// * `plot` - The plot's financial snapshot
    /// * `prior_payments_total` - Sum of all payments already recorded
    /// * `amount` - The new payment amount
    /// * `sale_trigger_percent` - Paid percentage at which the plot sells
    ///
    /// # Returns
    ///
    /// The outcome carrying the new progress and whether this payment
    /// triggers the sale.
    ///
    /// # Errors
    ///
    /// * `PaymentError::NonPositiveAmount` - amount is zero or negative
    /// * `PaymentError::InvalidPlotState` - plot is not booked
    /// * `PaymentError::MissingTotalAmount` - plot has no positive total
    /// * `PaymentError::PaymentExceedsBalance` - amount exceeds the remaining balance
    pub fn evaluate(
        plot: &PlotFinancials,
        prior_payments_total: Decimal,
        amount: Decimal,
        sale_trigger_percent: Decimal,
    ) -> Result<PaymentOutcome, PaymentError> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount);
        }
        if !plot.status.accepts_payments() {
            return Err(PaymentError::InvalidPlotState {
                status: plot.status,
            });
        }

        let total = usable_total(plot.total_amount)?;

        let before = derive(total, plot.booking_amount, prior_payments_total);
        if amount > before.remaining_amount {
            return Err(PaymentError::PaymentExceedsBalance {
                amount,
                remaining: before.remaining_amount,
            });
        }

        let progress = derive(total, plot.booking_amount, prior_payments_total + amount);
        let sale_triggered = progress.paid_percent >= sale_trigger_percent;

        Ok(PaymentOutcome {
            amount,
            progress,
            sale_triggered,
        })
    }

    /// Re-derive payment progress from the payment-history sum.
    ///
    /// Used wherever the stored remaining amount and paid percentage must
    /// be recomputed: after each payment, on booking, and during
    /// reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MissingTotalAmount` when the plot has no
    /// positive total amount to derive percentages from.
    pub fn progress(
        total_amount: Option<Decimal>,
        booking_amount: Decimal,
        payments_sum: Decimal,
    ) -> Result<PaymentProgress, PaymentError> {
        let total = usable_total(total_amount)?;
        Ok(derive(total, booking_amount, payments_sum))
    }
}

/// Require a positive total amount.
fn usable_total(total_amount: Option<Decimal>) -> Result<Decimal, PaymentError> {
    total_amount
        .filter(|t| *t > Decimal::ZERO)
        .ok_or(PaymentError::MissingTotalAmount)
}

/// Derive progress from a known-positive total.
fn derive(total: Decimal, booking_amount: Decimal, payments_sum: Decimal) -> PaymentProgress {
    let paid_total = booking_amount + payments_sum;
    PaymentProgress {
        paid_total,
        remaining_amount: total - paid_total,
        paid_percent: paid_total * Decimal::ONE_HUNDRED / total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::PlotStatus;
    use rust_decimal_macros::dec;

    fn booked_plot(total: Decimal, booking: Decimal) -> PlotFinancials {
        PlotFinancials {
            status: PlotStatus::Booked,
            total_amount: Some(total),
            booking_amount: booking,
        }
    }

    #[test]
    fn test_partial_payment_below_trigger() {
        let plot = booked_plot(dec!(1000000), dec!(100000));
        let outcome = PaymentService::evaluate(&plot, dec!(0), dec!(150000), dec!(50)).unwrap();

        assert_eq!(outcome.progress.paid_total, dec!(250000));
        assert_eq!(outcome.progress.remaining_amount, dec!(750000));
        assert_eq!(outcome.progress.paid_percent, dec!(25));
        assert!(!outcome.sale_triggered);
    }

    #[test]
    fn test_payment_crossing_trigger() {
        let plot = booked_plot(dec!(1000000), dec!(100000));
        let outcome =
            PaymentService::evaluate(&plot, dec!(150000), dec!(250000), dec!(50)).unwrap();

        assert_eq!(outcome.progress.paid_total, dec!(500000));
        assert_eq!(outcome.progress.paid_percent, dec!(50));
        assert!(outcome.sale_triggered);
    }

    #[test]
    fn test_payment_exactly_at_trigger_fires() {
        let plot = booked_plot(dec!(200000), dec!(0));
        let outcome = PaymentService::evaluate(&plot, dec!(0), dec!(100000), dec!(50)).unwrap();
        assert_eq!(outcome.progress.paid_percent, dec!(50));
        assert!(outcome.sale_triggered);
    }

    #[test]
    fn test_payment_to_full_balance() {
        let plot = booked_plot(dec!(500000), dec!(50000));
        let outcome =
            PaymentService::evaluate(&plot, dec!(250000), dec!(200000), dec!(50)).unwrap();

        assert_eq!(outcome.progress.paid_total, dec!(500000));
        assert_eq!(outcome.progress.remaining_amount, dec!(0));
        assert_eq!(outcome.progress.paid_percent, dec!(100));
        assert!(outcome.sale_triggered);
        assert!(!outcome.progress.is_overpaid());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let plot = booked_plot(dec!(1000000), dec!(0));
        let result = PaymentService::evaluate(&plot, dec!(0), dec!(0), dec!(50));
        assert!(matches!(result, Err(PaymentError::NonPositiveAmount)));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let plot = booked_plot(dec!(1000000), dec!(0));
        let result = PaymentService::evaluate(&plot, dec!(0), dec!(-5000), dec!(50));
        assert!(matches!(result, Err(PaymentError::NonPositiveAmount)));
    }

    #[test]
    fn test_non_booked_statuses_rejected() {
        for status in [PlotStatus::Available, PlotStatus::Sold, PlotStatus::Cancelled] {
            let plot = PlotFinancials {
                status,
                total_amount: Some(dec!(1000000)),
                booking_amount: dec!(0),
            };
            let result = PaymentService::evaluate(&plot, dec!(0), dec!(1000), dec!(50));
            assert!(
                matches!(result, Err(PaymentError::InvalidPlotState { .. })),
                "status {status} should reject payments"
            );
        }
    }

    #[test]
    fn test_missing_total_rejected() {
        let plot = PlotFinancials {
            status: PlotStatus::Booked,
            total_amount: None,
            booking_amount: dec!(10000),
        };
        let result = PaymentService::evaluate(&plot, dec!(0), dec!(1000), dec!(50));
        assert!(matches!(result, Err(PaymentError::MissingTotalAmount)));
    }

    #[test]
    fn test_zero_total_rejected() {
        let plot = booked_plot(dec!(0), dec!(0));
        let result = PaymentService::evaluate(&plot, dec!(0), dec!(1000), dec!(50));
        assert!(matches!(result, Err(PaymentError::MissingTotalAmount)));
    }

    #[test]
    fn test_overpayment_rejected_with_balance() {
        let plot = booked_plot(dec!(1000000), dec!(100000));
        let result = PaymentService::evaluate(&plot, dec!(400000), dec!(500001), dec!(50));

        match result {
            Err(PaymentError::PaymentExceedsBalance { amount, remaining }) => {
                assert_eq!(amount, dec!(500001));
                assert_eq!(remaining, dec!(500000));
            }
            other => panic!("expected PaymentExceedsBalance, got {other:?}"),
        }
    }

    #[test]
    fn test_payment_equal_to_remaining_accepted() {
        let plot = booked_plot(dec!(1000000), dec!(100000));
        let outcome =
            PaymentService::evaluate(&plot, dec!(400000), dec!(500000), dec!(50)).unwrap();
        assert_eq!(outcome.progress.remaining_amount, dec!(0));
    }

    #[test]
    fn test_already_overpaid_plot_rejects_any_payment() {
        // Booking above total: remaining is already negative.
        let plot = booked_plot(dec!(100000), dec!(120000));
        let result = PaymentService::evaluate(&plot, dec!(0), dec!(1), dec!(50));
        assert!(matches!(
            result,
            Err(PaymentError::PaymentExceedsBalance { .. })
        ));
    }

    #[test]
    fn test_progress_derivation() {
        let progress = PaymentService::progress(Some(dec!(1000000)), dec!(100000), dec!(150000))
            .unwrap();
        assert_eq!(progress.paid_total, dec!(250000));
        assert_eq!(progress.remaining_amount, dec!(750000));
        assert_eq!(progress.paid_percent, dec!(25));
    }

    #[test]
    fn test_progress_non_terminating_percent() {
        let progress =
            PaymentService::progress(Some(dec!(300000)), dec!(0), dec!(100000)).unwrap();
        assert_eq!(progress.paid_percent.round_dp(4), dec!(33.3333));
    }

    #[test]
    fn test_progress_reports_overpaid() {
        let progress =
            PaymentService::progress(Some(dec!(100000)), dec!(50000), dec!(60000)).unwrap();
        assert_eq!(progress.paid_percent, dec!(110));
        assert_eq!(progress.remaining_amount, dec!(-10000));
        assert!(progress.is_overpaid());
    }

    #[test]
    fn test_progress_missing_total() {
        let result = PaymentService::progress(None, dec!(10000), dec!(0));
        assert!(matches!(result, Err(PaymentError::MissingTotalAmount)));
    }
}
