//! Wallet error types for balance operations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// Withdrawal amount must be positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// Withdrawal exceeds the wallet's total balance.
    #[error("Requested {requested} but only {available} is available")]
    InsufficientBalance {
        /// The requested amount.
        requested: Decimal,
        /// The wallet's total balance.
        available: Decimal,
    },
}

impl BalanceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount => 400,
            Self::InsufficientBalance { .. } => 422,
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
            BalanceError::NonPositiveAmount.error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(BalanceError::NonPositiveAmount.http_status_code(), 400);

        let err = BalanceError::InsufficientBalance {
            requested: dec!(5000),
            available: dec!(1200),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.to_string(), "Requested 5000 but only 1200 is available");
    }
}
