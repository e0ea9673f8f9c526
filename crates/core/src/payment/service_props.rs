//! Property-based tests for PaymentService.
//!
//! Feature: payment-ledger
//! - Property 1: Paid-percentage derivation
//! - Property 2: Balance conservation
//! - Property 3: Overpayment rejection

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::PaymentError;
use super::service::PaymentService;
use super::types::PlotFinancials;
use crate::plot::PlotStatus;

/// Strategy to generate plot totals (1.00 to 10,000,000.00).
fn plot_total() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a fraction of an amount (0% to 100%).
fn fraction() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|bp| Decimal::new(bp, 4))
}

/// Helper to build a booked plot snapshot.
fn booked(total: Decimal, booking: Decimal) -> PlotFinancials {
    PlotFinancials {
        status: PlotStatus::Booked,
        total_amount: Some(total),
        booking_amount: booking,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Paid-percentage derivation
    // =========================================================================

    /// Property 1.1: Paid percentage always equals 100 x paid / total.
    ///
    /// *For any* total, booking, and payment history, the derived percentage
    /// SHALL equal the ratio of the history sum to the total, with values
    /// over 100 reported as-is.
    #[test]
    fn prop_percent_derived_from_history(
        total in plot_total(),
        booking_frac in fraction(),
        payments_frac in fraction(),
    ) {
        let booking = (total * booking_frac).round_dp(2);
        let payments_sum = (total * payments_frac).round_dp(2);

        let progress = PaymentService::progress(Some(total), booking, payments_sum).unwrap();

        let expected = (booking + payments_sum) * Decimal::ONE_HUNDRED / total;
        prop_assert_eq!(progress.paid_percent, expected);
        prop_assert_eq!(progress.is_overpaid(), expected > Decimal::ONE_HUNDRED);
    }

    /// Property 1.2: Percentage is recomputed, never accumulated.
    ///
    /// Deriving progress twice from the same history SHALL give identical
    /// results (no drift between recomputations).
    #[test]
    fn prop_derivation_is_stable(
        total in plot_total(),
        payments_frac in fraction(),
    ) {
        let payments_sum = (total * payments_frac).round_dp(2);

        let first = PaymentService::progress(Some(total), Decimal::ZERO, payments_sum).unwrap();
        let second = PaymentService::progress(Some(total), Decimal::ZERO, payments_sum).unwrap();

        prop_assert_eq!(first.paid_percent, second.paid_percent);
        prop_assert_eq!(first.remaining_amount, second.remaining_amount);
    }

    // =========================================================================
    // Property 2: Balance conservation
    // =========================================================================

    /// Property 2.1: Booking + payments + remaining always equals total.
    #[test]
    fn prop_balance_conservation(
        total in plot_total(),
        booking_frac in fraction(),
        payments_frac in fraction(),
    ) {
        let booking = (total * booking_frac).round_dp(2);
        let payments_sum = (total * payments_frac).round_dp(2);

        let progress = PaymentService::progress(Some(total), booking, payments_sum).unwrap();

        prop_assert_eq!(booking + payments_sum + progress.remaining_amount, total);
    }

    /// Property 2.2: An accepted payment reduces remaining by exactly its amount.
    #[test]
    fn prop_accepted_payment_reduces_remaining(
        total in plot_total(),
        amount_frac in fraction(),
    ) {
        let amount = (total * amount_frac).round_dp(2);
        prop_assume!(amount > Decimal::ZERO);

        let plot = booked(total, Decimal::ZERO);
        let outcome = PaymentService::evaluate(&plot, Decimal::ZERO, amount, Decimal::ONE_HUNDRED)
            .unwrap();

        prop_assert_eq!(outcome.progress.remaining_amount, total - amount);
        prop_assert!(outcome.progress.paid_percent <= Decimal::ONE_HUNDRED);
    }

    // =========================================================================
    // Property 3: Overpayment rejection
    // =========================================================================

    /// Property 3.1: Payments above the remaining balance are rejected
    /// and carry the derived remaining amount in the error.
    #[test]
    fn prop_overpayment_rejected(
        total in plot_total(),
        paid_frac in fraction(),
        excess in 1i64..1_000_000i64,
    ) {
        let prior = (total * paid_frac).round_dp(2);
        let remaining = total - prior;
        let amount = remaining + Decimal::new(excess, 2);

        let plot = booked(total, Decimal::ZERO);
        let result = PaymentService::evaluate(&plot, prior, amount, Decimal::ONE_HUNDRED);

        match result {
            Err(PaymentError::PaymentExceedsBalance { remaining: r, .. }) => {
                prop_assert_eq!(r, remaining);
            }
            other => prop_assert!(false, "expected PaymentExceedsBalance, got {:?}", other),
        }
    }

    /// Property 3.2: The sale trigger fires exactly when the derived
    /// percentage reaches the threshold.
    #[test]
    fn prop_sale_trigger_boundary(
        total in plot_total(),
        amount_frac in fraction(),
    ) {
        let amount = (total * amount_frac).round_dp(2);
        prop_assume!(amount > Decimal::ZERO);

        let trigger = Decimal::new(50, 0);
        let plot = booked(total, Decimal::ZERO);
        let outcome = PaymentService::evaluate(&plot, Decimal::ZERO, amount, trigger).unwrap();

        let expected = outcome.progress.paid_percent >= trigger;
        prop_assert_eq!(outcome.sale_triggered, expected);
    }
}
