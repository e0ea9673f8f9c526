//! Wallet domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::commission::CreditTarget;
use crate::wallet::error::BalanceError;

/// The two commission buckets of a broker wallet.
///
/// The total balance is always derived from the buckets; it is never
/// stored independently of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletBalances {
    /// Commission earned from the broker's own sales.
    pub direct: Decimal,
    /// Commission earned from downline (referred) sales.
    pub downline: Decimal,
}

impl WalletBalances {
    /// An empty wallet.
    pub const ZERO: Self = Self {
        direct: Decimal::ZERO,
        downline: Decimal::ZERO,
    };

    /// Creates balances from the two buckets.
    #[must_use]
    pub const fn new(direct: Decimal, downline: Decimal) -> Self {
        Self { direct, downline }
    }

    /// The wallet's total balance.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.direct + self.downline
    }

    /// Apply a commission credit to the targeted bucket.
    #[must_use]
    pub fn apply(&self, target: CreditTarget, amount: Decimal) -> Self {
        match target {
            CreditTarget::Direct => Self {
                direct: self.direct + amount,
                downline: self.downline,
            },
            CreditTarget::Downline => Self {
                direct: self.direct,
                downline: self.downline + amount,
            },
        }
    }

    /// Withdraw an amount, draining the downline bucket before direct
    /// earnings.
    ///
    /// # Errors
    ///
    /// * `BalanceError::NonPositiveAmount` - amount is zero or negative
    /// * `BalanceError::InsufficientBalance` - amount exceeds the total balance
    pub fn withdraw(&self, amount: Decimal) -> Result<Self, BalanceError> {
        if amount <= Decimal::ZERO {
            return Err(BalanceError::NonPositiveAmount);
        }
        let available = self.total();
        if amount > available {
            return Err(BalanceError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let from_downline = amount.min(self.downline);
        let from_direct = amount - from_downline;
        Ok(Self {
            direct: self.direct - from_direct,
            downline: self.downline - from_downline,
        })
    }
}

/// Kind of a wallet ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletTxnKind {
    /// Commission credit from a plot sale.
    Commission,
    /// Approved withdrawal debit.
    Withdrawal,
    /// Manual correction.
    Adjustment,
}

impl WalletTxnKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commission => "commission",
            Self::Withdrawal => "withdrawal",
            Self::Adjustment => "adjustment",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "commission" => Some(Self::Commission),
            "withdrawal" => Some(Self::Withdrawal),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

impl fmt::Display for WalletTxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved and debited from the wallet.
    Approved,
    /// Rejected; the wallet is untouched.
    Rejected,
}

impl WithdrawalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once a decision has been recorded.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_is_derived() {
        let balances = WalletBalances::new(dec!(60000), dec!(25000));
        assert_eq!(balances.total(), dec!(85000));
        assert_eq!(WalletBalances::ZERO.total(), dec!(0));
    }

    #[test]
    fn test_apply_direct_credit() {
        let balances = WalletBalances::ZERO.apply(CreditTarget::Direct, dec!(60000));
        assert_eq!(balances.direct, dec!(60000));
        assert_eq!(balances.downline, dec!(0));
    }

    #[test]
    fn test_apply_downline_credit() {
        let balances = WalletBalances::new(dec!(100), dec!(200))
            .apply(CreditTarget::Downline, dec!(5000));
        assert_eq!(balances.direct, dec!(100));
        assert_eq!(balances.downline, dec!(5200));
    }

    #[test]
    fn test_withdraw_drains_downline_first() {
        let balances = WalletBalances::new(dec!(60000), dec!(25000));
        let after = balances.withdraw(dec!(20000)).unwrap();
        assert_eq!(after.direct, dec!(60000));
        assert_eq!(after.downline, dec!(5000));
    }

    #[test]
    fn test_withdraw_crosses_into_direct() {
        let balances = WalletBalances::new(dec!(60000), dec!(25000));
        let after = balances.withdraw(dec!(30000)).unwrap();
        assert_eq!(after.direct, dec!(55000));
        assert_eq!(after.downline, dec!(0));
    }

    #[test]
    fn test_withdraw_entire_balance() {
        let balances = WalletBalances::new(dec!(60000), dec!(25000));
        let after = balances.withdraw(dec!(85000)).unwrap();
        assert_eq!(after, WalletBalances::ZERO);
    }

    #[test]
    fn test_withdraw_more_than_total_fails() {
        let balances = WalletBalances::new(dec!(100), dec!(50));
        let result = balances.withdraw(dec!(150.01));
        match result {
            Err(BalanceError::InsufficientBalance {
                requested,
                available,
            }) => {
                assert_eq!(requested, dec!(150.01));
                assert_eq!(available, dec!(150));
            }
            other => panic!("expected InsufficientBalance, got {other:?}"),
        }
    }

    #[test]
    fn test_withdraw_non_positive_fails() {
        let balances = WalletBalances::new(dec!(100), dec!(0));
        assert!(matches!(
            balances.withdraw(dec!(0)),
            Err(BalanceError::NonPositiveAmount)
        ));
        assert!(matches!(
            balances.withdraw(dec!(-5)),
            Err(BalanceError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_txn_kind_round_trip() {
        for kind in [
            WalletTxnKind::Commission,
            WalletTxnKind::Withdrawal,
            WalletTxnKind::Adjustment,
        ] {
            assert_eq!(WalletTxnKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(WalletTxnKind::parse("refund"), None);
    }

    #[test]
    fn test_withdrawal_status_round_trip() {
        for status in [
            WithdrawalStatus::Pending,
            WithdrawalStatus::Approved,
            WithdrawalStatus::Rejected,
        ] {
            assert_eq!(WithdrawalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WithdrawalStatus::parse("open"), None);
    }

    #[test]
    fn test_withdrawal_status_decided() {
        assert!(!WithdrawalStatus::Pending.is_decided());
        assert!(WithdrawalStatus::Approved.is_decided());
        assert!(WithdrawalStatus::Rejected.is_decided());
    }
}
