//! Commission schedules and distribution planning.
//!
//! This module implements the pure half of commission distribution:
//! given a sold plot, the selling broker, and the broker's upline chain,
//! it plans the exact wallet credits to apply. Rates and upline depth are
//! data on the schedule, not code.
//!
//! # Modules
//!
//! - `schedule` - Rate schedule and commission policy
//! - `types` - Plan types (PlannedCredit, CommissionPlan, BrokerRef)
//! - `error` - Commission-specific error types
//! - `service` - Plan computation

pub mod error;
pub mod schedule;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::CommissionError;
pub use schedule::{CommissionPolicy, CommissionSchedule};
pub use service::CommissionService;
pub use types::{BrokerRef, CommissionPlan, CreditTarget, PlannedCredit};
