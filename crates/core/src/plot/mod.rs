//! Plot lifecycle management.
//!
//! This module implements the sale-state machine for plots:
//! - Status and commission-status domain types
//! - Lifecycle actions with audit trail data
//! - State transition validation
//!
//! # Modules
//!
//! - `types` - Plot domain types (PlotStatus, CommissionStatus, LifecycleAction)
//! - `error` - Plot-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

pub use error::LifecycleError;
pub use service::LifecycleService;
pub use types::{CommissionStatus, LifecycleAction, PlotStatus};
