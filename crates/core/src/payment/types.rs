//! Payment domain types for evaluation and reporting.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::plot::PlotStatus;

/// The financial snapshot of a plot needed to evaluate a payment.
///
/// Deliberately excludes the stored remaining amount and paid percentage:
/// evaluation always re-derives both from the payment-history sum, so a
/// drifted stored value can never influence the outcome.
#[derive(Debug, Clone)]
pub struct PlotFinancials {
    /// The plot's current sale status.
    pub status: PlotStatus,
    /// The full price of the plot, if set.
    pub total_amount: Option<Decimal>,
    /// The amount paid at booking time.
    pub booking_amount: Decimal,
}

/// Derived payment progress for a plot.
///
/// All three fields come from the same derivation:
/// `paid_total = booking + Σ payments`, `remaining = total − paid_total`,
/// `paid_percent = 100 × paid_total / total`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentProgress {
    /// Total amount paid so far (booking plus all payments).
    pub paid_total: Decimal,
    /// Amount still outstanding.
    pub remaining_amount: Decimal,
    /// Percentage of the total paid, on a 0-100 scale.
    pub paid_percent: Decimal,
}

impl PaymentProgress {
    /// Returns true if more than the full price has been recorded.
    ///
    /// Over 100% is reported as-is rather than clamped: it is a
    /// data-quality signal the caller should surface.
    #[must_use]
    pub fn is_overpaid(&self) -> bool {
        self.paid_percent > Decimal::ONE_HUNDRED
    }
}

/// Outcome of evaluating a new payment against a plot.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The payment amount that was evaluated.
    pub amount: Decimal,
    /// Progress after the payment is applied.
    pub progress: PaymentProgress,
    /// True when this payment pushes the paid percentage to or past
    /// the sale trigger, so the plot should be marked sold and
    /// commission distribution should run.
    pub sale_triggered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overpaid_reported_not_clamped() {
        let progress = PaymentProgress {
            paid_total: dec!(110000),
            remaining_amount: dec!(-10000),
            paid_percent: dec!(110),
        };
        assert!(progress.is_overpaid());
        assert_eq!(progress.paid_percent, dec!(110));
    }

    #[test]
    fn test_exactly_full_is_not_overpaid() {
        let progress = PaymentProgress {
            paid_total: dec!(100000),
            remaining_amount: dec!(0),
            paid_percent: dec!(100),
        };
        assert!(!progress.is_overpaid());
    }
}
