//! `SeaORM` entity definitions.

pub mod brokers;
pub mod payments;
pub mod plots;
pub mod sea_orm_active_enums;
pub mod wallet_transactions;
pub mod wallets;
pub mod withdrawal_requests;
