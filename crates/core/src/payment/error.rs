//! Payment error types for evaluation failures.
//!
//! Every error here is raised before any state is written: a rejected
//! payment leaves the plot's remaining amount and paid percentage unchanged.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::plot::PlotStatus;

/// Errors that can occur during payment evaluation.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment amount must be positive.
    #[error("Payment amount must be positive")]
    NonPositiveAmount,

    /// Payment attempted against a plot that is not booked.
    #[error("Plot is {status}, payments require a booked plot")]
    InvalidPlotState {
        /// The plot's actual status.
        status: PlotStatus,
    },

    /// The plot has no usable total amount, so percentages cannot be derived.
    #[error("Plot has no total amount set")]
    MissingTotalAmount,

    /// Payment exceeds the remaining balance.
    #[error("Payment of {amount} exceeds remaining balance of {remaining}")]
    PaymentExceedsBalance {
        /// The attempted payment amount.
        amount: Decimal,
        /// The remaining balance derived from payment history.
        remaining: Decimal,
    },
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::InvalidPlotState { .. } => "INVALID_PLOT_STATE",
            Self::MissingTotalAmount => "MISSING_TOTAL_AMOUNT",
            Self::PaymentExceedsBalance { .. } => "PAYMENT_EXCEEDS_BALANCE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount
            | Self::InvalidPlotState { .. }
            | Self::PaymentExceedsBalance { .. } => 400,

            Self::MissingTotalAmount => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PaymentError::NonPositiveAmount.error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            PaymentError::InvalidPlotState {
                status: PlotStatus::Sold
            }
            .error_code(),
            "INVALID_PLOT_STATE"
        );
        assert_eq!(
            PaymentError::MissingTotalAmount.error_code(),
            "MISSING_TOTAL_AMOUNT"
        );
        assert_eq!(
            PaymentError::PaymentExceedsBalance {
                amount: dec!(100),
                remaining: dec!(50),
            }
            .error_code(),
            "PAYMENT_EXCEEDS_BALANCE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(PaymentError::NonPositiveAmount.http_status_code(), 400);
        assert_eq!(
            PaymentError::InvalidPlotState {
                status: PlotStatus::Available
            }
            .http_status_code(),
            400
        );
        assert_eq!(PaymentError::MissingTotalAmount.http_status_code(), 422);
        assert_eq!(
            PaymentError::PaymentExceedsBalance {
                amount: dec!(100),
                remaining: dec!(50),
            }
            .http_status_code(),
            400
        );
    }

    #[test]
    fn test_error_display() {
        let err = PaymentError::PaymentExceedsBalance {
            amount: dec!(600000),
            remaining: dec!(500000),
        };
        assert_eq!(
            err.to_string(),
            "Payment of 600000 exceeds remaining balance of 500000"
        );

        let err = PaymentError::InvalidPlotState {
            status: PlotStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "Plot is cancelled, payments require a booked plot");
    }
}
