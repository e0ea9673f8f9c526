//! Commission plan computation.
//!
//! This module turns a sold plot, its selling broker, and the broker's
//! upline chain into the exact set of wallet credits to apply.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::commission::error::CommissionError;
use crate::commission::schedule::CommissionSchedule;
use crate::commission::types::{BrokerRef, CommissionPlan, CreditTarget, PlannedCredit};

/// Commission planning service.
///
/// This service contains pure business logic with no database dependencies.
/// The upline chain is resolved by the caller; planning never walks the
/// referral tree itself.
pub struct CommissionService;

impl CommissionService {
    /// Plan the wallet credits for one plot's commission distribution.
    ///
    /// Every rate applies to the plot's total amount, not to any payment
    /// increment. Level 0 is the seller's direct commission; levels 1..n
    /// follow the upline chain in order, capped by the schedule's depth.
    /// Chain entries beyond that depth are ignored. Levels whose rate is
    /// not positive produce no credit.
    ///
    /// # Arguments
    ///
    /// * `plot_id` - The plot being distributed
    /// * `total_amount` - The plot's full price (must be positive)
    /// * `seller` - The selling broker; `None` yields an empty plan
    /// * `upline_chain` - The seller's upline chain, nearest first
    /// * `schedule` - The rate schedule to apply
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::NonPositiveTotalAmount` when the total
    /// is zero or negative.
    pub fn plan(
        plot_id: Uuid,
        total_amount: Decimal,
        seller: Option<&BrokerRef>,
        upline_chain: &[BrokerRef],
        schedule: &CommissionSchedule,
    ) -> Result<CommissionPlan, CommissionError> {
        if total_amount <= Decimal::ZERO {
            return Err(CommissionError::NonPositiveTotalAmount);
        }

        let Some(seller) = seller else {
            return Ok(CommissionPlan {
                plot_id,
                credits: vec![],
            });
        };

        let mut credits = Vec::with_capacity(1 + schedule.max_upline_depth());

        if schedule.direct_rate_percent > Decimal::ZERO {
            credits.push(PlannedCredit {
                broker_id: seller.id,
                level: 0,
                target: CreditTarget::Direct,
                amount: percent_of(total_amount, schedule.direct_rate_percent),
                description: "Direct commission for plot sale".to_string(),
            });
        }

        for (idx, (upline, rate)) in upline_chain
            .iter()
            .zip(schedule.upline_rate_percents.iter())
            .enumerate()
        {
            if *rate <= Decimal::ZERO {
                continue;
            }
            let level = i16::try_from(idx + 1).unwrap_or(i16::MAX);
            credits.push(PlannedCredit {
                broker_id: upline.id,
                level,
                target: CreditTarget::Downline,
                amount: percent_of(total_amount, *rate),
                description: format!("Level {level} commission from {}'s sale", seller.name),
            });
        }

        Ok(CommissionPlan { plot_id, credits })
    }
}

/// Percentage of an amount, rounded to the ledger's 4-decimal scale.
#[must_use]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    (amount * percent / Decimal::ONE_HUNDRED).round_dp(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn broker(name: &str) -> BrokerRef {
        BrokerRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_solo_seller_gets_direct_only() {
        let seller = broker("Arjun");
        let plan = CommissionService::plan(
            Uuid::new_v4(),
            dec!(1000000),
            Some(&seller),
            &[],
            &CommissionSchedule::default(),
        )
        .unwrap();

        assert_eq!(plan.credits.len(), 1);
        let credit = &plan.credits[0];
        assert_eq!(credit.broker_id, seller.id);
        assert_eq!(credit.level, 0);
        assert_eq!(credit.target, CreditTarget::Direct);
        assert_eq!(credit.amount, dec!(60000));
        assert_eq!(credit.description, "Direct commission for plot sale");
        assert_eq!(plan.total_commission(), dec!(60000));
    }

    #[test]
    fn test_two_level_chain() {
        let seller = broker("Arjun");
        let level1 = broker("Bina");
        let level2 = broker("Chetan");
        let chain = vec![level1.clone(), level2.clone()];

        let plan = CommissionService::plan(
            Uuid::new_v4(),
            dec!(1000000),
            Some(&seller),
            &chain,
            &CommissionSchedule::default(),
        )
        .unwrap();

        assert_eq!(plan.credits.len(), 3);

        assert_eq!(plan.credits[0].amount, dec!(60000));
        assert_eq!(plan.credits[0].target, CreditTarget::Direct);

        assert_eq!(plan.credits[1].broker_id, level1.id);
        assert_eq!(plan.credits[1].level, 1);
        assert_eq!(plan.credits[1].target, CreditTarget::Downline);
        assert_eq!(plan.credits[1].amount, dec!(20000));
        assert_eq!(
            plan.credits[1].description,
            "Level 1 commission from Arjun's sale"
        );

        assert_eq!(plan.credits[2].broker_id, level2.id);
        assert_eq!(plan.credits[2].level, 2);
        assert_eq!(plan.credits[2].amount, dec!(5000));
        assert_eq!(
            plan.credits[2].description,
            "Level 2 commission from Arjun's sale"
        );

        // 8.5% of the total across all three levels.
        assert_eq!(plan.total_commission(), dec!(85000));
    }

    #[test]
    fn test_one_level_chain_is_eight_percent() {
        let seller = broker("Arjun");
        let chain = vec![broker("Bina")];

        let plan = CommissionService::plan(
            Uuid::new_v4(),
            dec!(1000000),
            Some(&seller),
            &chain,
            &CommissionSchedule::default(),
        )
        .unwrap();

        assert_eq!(plan.credits.len(), 2);
        assert_eq!(plan.total_commission(), dec!(80000));
    }

    #[test]
    fn test_chain_beyond_schedule_depth_ignored() {
        let seller = broker("Arjun");
        let chain = vec![broker("Bina"), broker("Chetan"), broker("Divya")];

        let plan = CommissionService::plan(
            Uuid::new_v4(),
            dec!(1000000),
            Some(&seller),
            &chain,
            &CommissionSchedule::default(),
        )
        .unwrap();

        // Default schedule pays two upline levels; Divya gets nothing.
        assert_eq!(plan.credits.len(), 3);
        assert_eq!(plan.total_commission(), dec!(85000));
    }

    #[test]
    fn test_no_seller_yields_empty_plan() {
        let plan = CommissionService::plan(
            Uuid::new_v4(),
            dec!(1000000),
            None,
            &[],
            &CommissionSchedule::default(),
        )
        .unwrap();

        assert!(plan.is_empty());
        assert_eq!(plan.total_commission(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_level_skipped() {
        let seller = broker("Arjun");
        let chain = vec![broker("Bina"), broker("Chetan")];
        let schedule = CommissionSchedule::new(dec!(6), vec![dec!(2), dec!(0)]);

        let plan =
            CommissionService::plan(Uuid::new_v4(), dec!(1000000), Some(&seller), &chain, &schedule)
                .unwrap();

        assert_eq!(plan.credits.len(), 2);
        assert_eq!(plan.credits[1].level, 1);
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let seller = broker("Arjun");
        for total in [dec!(0), dec!(-100)] {
            let result = CommissionService::plan(
                Uuid::new_v4(),
                total,
                Some(&seller),
                &[],
                &CommissionSchedule::default(),
            );
            assert!(matches!(
                result,
                Err(CommissionError::NonPositiveTotalAmount)
            ));
        }
    }

    #[test]
    fn test_percent_of_rounds_to_ledger_scale() {
        assert_eq!(percent_of(dec!(1000000), dec!(6)), dec!(60000));
        assert_eq!(percent_of(dec!(333333), dec!(0.5)), dec!(1666.665));
        assert_eq!(percent_of(dec!(10001.23), dec!(0.5)), dec!(50.0062));
    }
}
