//! Lifecycle service for plot state transitions.
//!
//! This module implements the core state machine logic for moving
//! plots through the sale lifecycle.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::plot::error::LifecycleError;
use crate::plot::types::{LifecycleAction, PlotStatus};

/// Stateless service for managing plot lifecycle transitions.
///
/// All methods are associated functions that validate and execute
/// state transitions, returning the appropriate `LifecycleAction`
/// with audit trail information.
pub struct LifecycleService;

impl LifecycleService {
    /// Book an available plot for a buyer.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the plot
    /// * `buyer_name` - The buyer the plot is booked for (must be non-empty)
    /// * `booking_amount` - The amount paid at booking time (must be non-negative)
    /// * `broker_id` - The referring broker, if any
    ///
    /// # Returns
    /// * `Ok(LifecycleAction::Book)` if the transition is valid
    /// * `Err(LifecycleError::InvalidTransition)` if not in Available status
    /// * `Err(LifecycleError::BuyerNameRequired)` if the buyer name is empty
    /// * `Err(LifecycleError::NegativeBookingAmount)` if the amount is negative
    pub fn book(
        current_status: PlotStatus,
        buyer_name: String,
        booking_amount: Decimal,
        broker_id: Option<Uuid>,
    ) -> Result<LifecycleAction, LifecycleError> {
        if buyer_name.trim().is_empty() {
            return Err(LifecycleError::BuyerNameRequired);
        }
        if booking_amount < Decimal::ZERO {
            return Err(LifecycleError::NegativeBookingAmount);
        }

        match current_status {
            PlotStatus::Available => Ok(LifecycleAction::Book {
                new_status: PlotStatus::Booked,
                buyer_name,
                booking_amount,
                broker_id,
                booked_at: Utc::now(),
            }),
            _ => Err(LifecycleError::InvalidTransition {
                from: current_status,
                to: PlotStatus::Booked,
            }),
        }
    }

    /// Mark a booked plot as sold.
    ///
    /// Invoked when the paid percentage crosses the sale trigger.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the plot
    ///
    /// # Returns
    /// * `Ok(LifecycleAction::MarkSold)` if the transition is valid
    /// * `Err(LifecycleError::InvalidTransition)` if not in Booked status
    pub fn mark_sold(current_status: PlotStatus) -> Result<LifecycleAction, LifecycleError> {
        match current_status {
            PlotStatus::Booked => Ok(LifecycleAction::MarkSold {
                new_status: PlotStatus::Sold,
                sold_at: Utc::now(),
            }),
            _ => Err(LifecycleError::InvalidTransition {
                from: current_status,
                to: PlotStatus::Sold,
            }),
        }
    }

    /// Cancel a booking, returning the plot to inventory.
    ///
    /// Cancellation is gated: once the paid percentage reaches the
    /// configured limit the booking can no longer be reverted.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the plot
    /// * `paid_percent` - The plot's current paid percentage
    /// * `cancellation_limit_percent` - The configured gate (typically 50)
    ///
    /// # Returns
    /// * `Ok(LifecycleAction::Cancel)` if the transition is valid
    /// * `Err(LifecycleError::InvalidTransition)` if not in Booked status
    /// * `Err(LifecycleError::CancellationGateClosed)` if paid percentage is at or above the gate
    pub fn cancel(
        current_status: PlotStatus,
        paid_percent: Decimal,
        cancellation_limit_percent: Decimal,
    ) -> Result<LifecycleAction, LifecycleError> {
        match current_status {
            PlotStatus::Booked => {
                if paid_percent >= cancellation_limit_percent {
                    return Err(LifecycleError::CancellationGateClosed {
                        paid_percent,
                        limit: cancellation_limit_percent,
                    });
                }
                Ok(LifecycleAction::Cancel {
                    new_status: PlotStatus::Available,
                    cancelled_at: Utc::now(),
                })
            }
            _ => Err(LifecycleError::InvalidTransition {
                from: current_status,
                to: PlotStatus::Available,
            }),
        }
    }

    /// Check whether a plot may be deleted.
    ///
    /// Only plots still in inventory are deletable; booked and sold
    /// plots carry payment history that must be preserved.
    ///
    /// # Errors
    /// Returns `LifecycleError::CanOnlyDeleteAvailable` for any non-available status.
    pub fn can_delete(current_status: PlotStatus) -> Result<(), LifecycleError> {
        match current_status {
            PlotStatus::Available => Ok(()),
            _ => Err(LifecycleError::CanOnlyDeleteAvailable),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Available → Booked (book)
    /// - Booked → Sold (payment threshold)
    /// - Booked → Available (cancel)
    ///
    /// # Arguments
    /// * `from` - The current status
    /// * `to` - The target status
    ///
    /// # Returns
    /// `true` if the transition is valid, `false` otherwise
    #[must_use]
    pub fn is_valid_transition(from: PlotStatus, to: PlotStatus) -> bool {
        matches!(
            (from, to),
            (PlotStatus::Available, PlotStatus::Booked)
                | (PlotStatus::Booked, PlotStatus::Sold | PlotStatus::Available)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_book_from_available() {
        let broker = Uuid::new_v4();
        let result = LifecycleService::book(
            PlotStatus::Available,
            "Asha Verma".to_string(),
            dec!(50000),
            Some(broker),
        );
        assert!(result.is_ok());
        let action = result.unwrap();
        assert_eq!(action.new_status(), PlotStatus::Booked);
        if let LifecycleAction::Book {
            buyer_name,
            booking_amount,
            broker_id,
            ..
        } = action
        {
            assert_eq!(buyer_name, "Asha Verma");
            assert_eq!(booking_amount, dec!(50000));
            assert_eq!(broker_id, Some(broker));
        } else {
            panic!("expected Book action");
        }
    }

    #[test]
    fn test_book_from_booked_fails() {
        let result = LifecycleService::book(
            PlotStatus::Booked,
            "Asha Verma".to_string(),
            dec!(50000),
            None,
        );
        assert!(matches!(result, Err(LifecycleError::InvalidTransition { .. })));
    }

    #[test]
    fn test_book_from_sold_fails() {
        let result =
            LifecycleService::book(PlotStatus::Sold, "Asha Verma".to_string(), dec!(0), None);
        assert!(matches!(result, Err(LifecycleError::InvalidTransition { .. })));
    }

    #[test]
    fn test_book_empty_buyer_fails() {
        let result =
            LifecycleService::book(PlotStatus::Available, "   ".to_string(), dec!(0), None);
        assert!(matches!(result, Err(LifecycleError::BuyerNameRequired)));
    }

    #[test]
    fn test_book_negative_amount_fails() {
        let result = LifecycleService::book(
            PlotStatus::Available,
            "Asha Verma".to_string(),
            dec!(-1),
            None,
        );
        assert!(matches!(result, Err(LifecycleError::NegativeBookingAmount)));
    }

    #[test]
    fn test_book_zero_amount_allowed() {
        let result =
            LifecycleService::book(PlotStatus::Available, "Asha Verma".to_string(), dec!(0), None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_mark_sold_from_booked() {
        let result = LifecycleService::mark_sold(PlotStatus::Booked);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().new_status(), PlotStatus::Sold);
    }

    #[test]
    fn test_mark_sold_from_available_fails() {
        let result = LifecycleService::mark_sold(PlotStatus::Available);
        assert!(matches!(result, Err(LifecycleError::InvalidTransition { .. })));
    }

    #[test]
    fn test_mark_sold_from_sold_fails() {
        let result = LifecycleService::mark_sold(PlotStatus::Sold);
        assert!(matches!(result, Err(LifecycleError::InvalidTransition { .. })));
    }

    #[test]
    fn test_cancel_below_gate() {
        let result = LifecycleService::cancel(PlotStatus::Booked, dec!(49.9999), dec!(50));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().new_status(), PlotStatus::Available);
    }

    #[test]
    fn test_cancel_at_gate_fails() {
        let result = LifecycleService::cancel(PlotStatus::Booked, dec!(50), dec!(50));
        assert!(matches!(
            result,
            Err(LifecycleError::CancellationGateClosed { .. })
        ));
    }

    #[test]
    fn test_cancel_above_gate_fails() {
        let result = LifecycleService::cancel(PlotStatus::Booked, dec!(75), dec!(50));
        assert!(matches!(
            result,
            Err(LifecycleError::CancellationGateClosed { .. })
        ));
    }

    #[test]
    fn test_cancel_from_available_fails() {
        let result = LifecycleService::cancel(PlotStatus::Available, dec!(0), dec!(50));
        assert!(matches!(result, Err(LifecycleError::InvalidTransition { .. })));
    }

    #[test]
    fn test_cancel_from_sold_fails() {
        let result = LifecycleService::cancel(PlotStatus::Sold, dec!(100), dec!(50));
        assert!(matches!(result, Err(LifecycleError::InvalidTransition { .. })));
    }

    #[test]
    fn test_can_delete_available() {
        assert!(LifecycleService::can_delete(PlotStatus::Available).is_ok());
    }

    #[test]
    fn test_can_delete_rejects_other_statuses() {
        for status in [PlotStatus::Booked, PlotStatus::Sold, PlotStatus::Cancelled] {
            assert!(matches!(
                LifecycleService::can_delete(status),
                Err(LifecycleError::CanOnlyDeleteAvailable)
            ));
        }
    }

    #[test]
    fn test_valid_transitions() {
        assert!(LifecycleService::is_valid_transition(
            PlotStatus::Available,
            PlotStatus::Booked
        ));
        assert!(LifecycleService::is_valid_transition(
            PlotStatus::Booked,
            PlotStatus::Sold
        ));
        assert!(LifecycleService::is_valid_transition(
            PlotStatus::Booked,
            PlotStatus::Available
        ));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!LifecycleService::is_valid_transition(
            PlotStatus::Available,
            PlotStatus::Sold
        ));
        assert!(!LifecycleService::is_valid_transition(
            PlotStatus::Sold,
            PlotStatus::Booked
        ));
        assert!(!LifecycleService::is_valid_transition(
            PlotStatus::Sold,
            PlotStatus::Available
        ));
        assert!(!LifecycleService::is_valid_transition(
            PlotStatus::Cancelled,
            PlotStatus::Booked
        ));
        assert!(!LifecycleService::is_valid_transition(
            PlotStatus::Available,
            PlotStatus::Available
        ));
    }
}
