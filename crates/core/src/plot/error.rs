//! Plot error types for lifecycle operations.
//!
//! This module defines all error types that can occur during
//! plot lifecycle operations such as booking, cancellation, and deletion.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::plot::types::PlotStatus;

/// Errors that can occur during plot lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: PlotStatus,
        /// The attempted target status.
        to: PlotStatus,
    },

    /// Cancellation attempted at or above the paid-percentage gate.
    #[error("Cannot cancel booking: {paid_percent}% paid is at or above the {limit}% limit")]
    CancellationGateClosed {
        /// The plot's current paid percentage.
        paid_percent: Decimal,
        /// The configured cancellation limit.
        limit: Decimal,
    },

    /// Deletion attempted against a plot that is not available.
    #[error("Can only delete available plots")]
    CanOnlyDeleteAvailable,

    /// Booking requires a buyer name.
    #[error("Buyer name is required")]
    BuyerNameRequired,

    /// Booking amount cannot be negative.
    #[error("Booking amount cannot be negative")]
    NegativeBookingAmount,
}

impl LifecycleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::CancellationGateClosed { .. } => "CANCELLATION_GATE_CLOSED",
            Self::CanOnlyDeleteAvailable => "CAN_ONLY_DELETE_AVAILABLE",
            Self::BuyerNameRequired => "BUYER_NAME_REQUIRED",
            Self::NegativeBookingAmount => "NEGATIVE_BOOKING_AMOUNT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::CanOnlyDeleteAvailable
            | Self::BuyerNameRequired
            | Self::NegativeBookingAmount => 400,

            Self::CancellationGateClosed { .. } => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_transition_error() {
        let err = LifecycleError::InvalidTransition {
            from: PlotStatus::Sold,
            to: PlotStatus::Booked,
        };
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(err.http_status_code(), 400);
        assert!(err.to_string().contains("sold"));
        assert!(err.to_string().contains("booked"));
    }

    #[test]
    fn test_cancellation_gate_error() {
        let err = LifecycleError::CancellationGateClosed {
            paid_percent: dec!(62.5),
            limit: dec!(50),
        };
        assert_eq!(err.error_code(), "CANCELLATION_GATE_CLOSED");
        assert_eq!(err.http_status_code(), 422);
        assert!(err.to_string().contains("62.5"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_delete_error() {
        let err = LifecycleError::CanOnlyDeleteAvailable;
        assert_eq!(err.error_code(), "CAN_ONLY_DELETE_AVAILABLE");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_booking_validation_errors() {
        assert_eq!(LifecycleError::BuyerNameRequired.error_code(), "BUYER_NAME_REQUIRED");
        assert_eq!(LifecycleError::BuyerNameRequired.http_status_code(), 400);
        assert_eq!(
            LifecycleError::NegativeBookingAmount.error_code(),
            "NEGATIVE_BOOKING_AMOUNT"
        );
        assert_eq!(LifecycleError::NegativeBookingAmount.http_status_code(), 400);
    }
}
