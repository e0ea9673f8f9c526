//! Core business logic for Plotbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `plot` - Plot lifecycle state machine (available, booked, sold)
//! - `payment` - Payment evaluation and paid-percentage arithmetic
//! - `commission` - Commission schedules and distribution planning
//! - `wallet` - Broker wallet balances and withdrawal arithmetic

pub mod commission;
pub mod payment;
pub mod plot;
pub mod wallet;
