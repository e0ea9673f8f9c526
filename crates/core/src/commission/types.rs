//! Commission plan types.
//!
//! A plan is the pure description of the wallet credits a distribution
//! will apply; the persistence layer executes it inside one transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A broker reference used when planning commission.
#[derive(Debug, Clone)]
pub struct BrokerRef {
    /// The broker's id.
    pub id: Uuid,
    /// The broker's display name, used in credit descriptions.
    pub name: String,
}

/// Which wallet bucket a credit lands in.
///
/// Direct sale commission and referral (downline) commission are
/// tracked separately so a broker can see earned-vs-referred income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditTarget {
    /// The broker's own-sale balance.
    Direct,
    /// The broker's referral-income balance.
    Downline,
}

impl CreditTarget {
    /// Returns the string representation of the target.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Downline => "downline",
        }
    }
}

impl fmt::Display for CreditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One wallet credit a commission plan will apply.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCredit {
    /// The broker receiving the credit.
    pub broker_id: Uuid,
    /// Referral level: 0 is the seller, 1 the seller's upline, 2 the
    /// upline's upline.
    pub level: i16,
    /// The wallet bucket the credit lands in.
    pub target: CreditTarget,
    /// The credit amount.
    pub amount: Decimal,
    /// Human-readable description recorded on the wallet transaction.
    pub description: String,
}

/// The full set of credits for one plot's commission distribution.
#[derive(Debug, Clone, Serialize)]
pub struct CommissionPlan {
    /// The plot the commission is for.
    pub plot_id: Uuid,
    /// The credits to apply, ordered by level.
    pub credits: Vec<PlannedCredit>,
}

impl CommissionPlan {
    /// Total commission across all credits.
    #[must_use]
    pub fn total_commission(&self) -> Decimal {
        self.credits.iter().map(|c| c.amount).sum()
    }

    /// Returns true if the plan credits nobody.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_credit_target_as_str() {
        assert_eq!(CreditTarget::Direct.as_str(), "direct");
        assert_eq!(CreditTarget::Downline.as_str(), "downline");
    }

    #[test]
    fn test_total_commission_sums_credits() {
        let plot_id = Uuid::new_v4();
        let plan = CommissionPlan {
            plot_id,
            credits: vec![
                PlannedCredit {
                    broker_id: Uuid::new_v4(),
                    level: 0,
                    target: CreditTarget::Direct,
                    amount: dec!(60000),
                    description: String::new(),
                },
                PlannedCredit {
                    broker_id: Uuid::new_v4(),
                    level: 1,
                    target: CreditTarget::Downline,
                    amount: dec!(20000),
                    description: String::new(),
                },
            ],
        };
        assert_eq!(plan.total_commission(), dec!(80000));
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_empty_plan() {
        let plan = CommissionPlan {
            plot_id: Uuid::new_v4(),
            credits: vec![],
        };
        assert_eq!(plan.total_commission(), Decimal::ZERO);
        assert!(plan.is_empty());
    }
}
