//! Broker wallet balances and withdrawal arithmetic.
//!
//! Wallets hold two buckets: direct-sale commission and downline
//! (referral) commission. The total is always derived from the two,
//! and withdrawals drain the downline bucket before touching direct
//! earnings.
//!
//! # Modules
//!
//! - `types` - Wallet domain types (WalletBalances, WalletTxnKind, WithdrawalStatus)
//! - `error` - Wallet-specific error types

pub mod error;
pub mod types;

pub use error::BalanceError;
pub use types::{WalletBalances, WalletTxnKind, WithdrawalStatus};
