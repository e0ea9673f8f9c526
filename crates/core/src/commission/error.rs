//! Commission error types for plan computation.

use thiserror::Error;

/// Errors that can occur while planning commission.
#[derive(Debug, Error)]
pub enum CommissionError {
    /// Commission is a percentage of the plot total, which must be positive.
    #[error("Cannot plan commission without a positive total amount")]
    NonPositiveTotalAmount,
}

impl CommissionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveTotalAmount => "NON_POSITIVE_TOTAL_AMOUNT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveTotalAmount => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CommissionError::NonPositiveTotalAmount.error_code(),
            "NON_POSITIVE_TOTAL_AMOUNT"
        );
        assert_eq!(
            CommissionError::NonPositiveTotalAmount.http_status_code(),
            422
        );
    }
}
