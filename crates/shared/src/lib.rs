//! Shared types and configuration for Plotbook.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for list endpoints
//! - Configuration management (server, database, commission policy)

pub mod config;
pub mod types;

pub use config::{AppConfig, CommissionSettings};
