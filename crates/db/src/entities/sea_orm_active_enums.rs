//! `SeaORM` active enums mapping Postgres enum types.
//!
//! Conversions to and from the core domain enums live here so
//! repositories can hand rows straight to the business logic.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use plotbook_core::plot;
use plotbook_core::wallet;

/// Postgres enum `plot_status`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plot_status")]
#[serde(rename_all = "lowercase")]
pub enum PlotStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "booked")]
    Booked,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<PlotStatus> for plot::PlotStatus {
    fn from(status: PlotStatus) -> Self {
        match status {
            PlotStatus::Available => Self::Available,
            PlotStatus::Booked => Self::Booked,
            PlotStatus::Sold => Self::Sold,
            PlotStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<plot::PlotStatus> for PlotStatus {
    fn from(status: plot::PlotStatus) -> Self {
        match status {
            plot::PlotStatus::Available => Self::Available,
            plot::PlotStatus::Booked => Self::Booked,
            plot::PlotStatus::Sold => Self::Sold,
            plot::PlotStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Postgres enum `commission_status`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "commission_status")]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl From<CommissionStatus> for plot::CommissionStatus {
    fn from(status: CommissionStatus) -> Self {
        match status {
            CommissionStatus::Pending => Self::Pending,
            CommissionStatus::Paid => Self::Paid,
        }
    }
}

impl From<plot::CommissionStatus> for CommissionStatus {
    fn from(status: plot::CommissionStatus) -> Self {
        match status {
            plot::CommissionStatus::Pending => Self::Pending,
            plot::CommissionStatus::Paid => Self::Paid,
        }
    }
}

/// Postgres enum `wallet_txn_kind`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_txn_kind")]
#[serde(rename_all = "lowercase")]
pub enum WalletTxnKind {
    #[sea_orm(string_value = "commission")]
    Commission,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl From<WalletTxnKind> for wallet::WalletTxnKind {
    fn from(kind: WalletTxnKind) -> Self {
        match kind {
            WalletTxnKind::Commission => Self::Commission,
            WalletTxnKind::Withdrawal => Self::Withdrawal,
            WalletTxnKind::Adjustment => Self::Adjustment,
        }
    }
}

impl From<wallet::WalletTxnKind> for WalletTxnKind {
    fn from(kind: wallet::WalletTxnKind) -> Self {
        match kind {
            wallet::WalletTxnKind::Commission => Self::Commission,
            wallet::WalletTxnKind::Withdrawal => Self::Withdrawal,
            wallet::WalletTxnKind::Adjustment => Self::Adjustment,
        }
    }
}

/// Postgres enum `withdrawal_status`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "withdrawal_status")]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<WithdrawalStatus> for wallet::WithdrawalStatus {
    fn from(status: WithdrawalStatus) -> Self {
        match status {
            WithdrawalStatus::Pending => Self::Pending,
            WithdrawalStatus::Approved => Self::Approved,
            WithdrawalStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<wallet::WithdrawalStatus> for WithdrawalStatus {
    fn from(status: wallet::WithdrawalStatus) -> Self {
        match status {
            wallet::WithdrawalStatus::Pending => Self::Pending,
            wallet::WithdrawalStatus::Approved => Self::Approved,
            wallet::WithdrawalStatus::Rejected => Self::Rejected,
        }
    }
}
