//! Payment evaluation and paid-percentage arithmetic.
//!
//! This module implements the pure half of the payment ledger:
//! - Validation of incoming payments against plot financials
//! - Derivation of remaining amount and paid percentage from the
//!   payment-history sum (never incrementally)
//! - Sale-trigger detection against the configured threshold
//!
//! # Modules
//!
//! - `types` - Payment domain types (PlotFinancials, PaymentOutcome)
//! - `error` - Payment-specific error types
//! - `service` - Payment evaluation logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PaymentError;
pub use service::PaymentService;
pub use types::{PaymentOutcome, PaymentProgress, PlotFinancials};
