//! Property-based tests for CommissionService.
//!
//! Feature: commission-planning
//! - Property 1: Plan shape
//! - Property 2: Rate arithmetic

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schedule::CommissionSchedule;
use super::service::{percent_of, CommissionService};
use super::types::{BrokerRef, CreditTarget};

/// Strategy to generate plot totals (1.00 to 10,000,000.00).
fn plot_total() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate an upline chain of 0 to 5 brokers.
fn upline_chain() -> impl Strategy<Value = Vec<BrokerRef>> {
    (0usize..=5).prop_map(|len| {
        (0..len)
            .map(|i| BrokerRef {
                id: Uuid::new_v4(),
                name: format!("upline-{i}"),
            })
            .collect()
    })
}

fn seller() -> BrokerRef {
    BrokerRef {
        id: Uuid::new_v4(),
        name: "seller".to_string(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Plan shape
    // =========================================================================

    /// Property 1.1: Credit count is one direct credit plus one per upline
    /// level, capped by the schedule depth.
    #[test]
    fn prop_credit_count_capped_by_depth(
        total in plot_total(),
        chain in upline_chain(),
    ) {
        let schedule = CommissionSchedule::default();
        let seller = seller();
        let plan =
            CommissionService::plan(Uuid::new_v4(), total, Some(&seller), &chain, &schedule)
                .unwrap();

        let expected = 1 + chain.len().min(schedule.max_upline_depth());
        prop_assert_eq!(plan.credits.len(), expected);
    }

    /// Property 1.2: Levels start at 0 and increase by one; level 0 targets
    /// the direct balance, every other level the downline balance.
    #[test]
    fn prop_levels_and_targets_ordered(
        total in plot_total(),
        chain in upline_chain(),
    ) {
        let seller = seller();
        let plan = CommissionService::plan(
            Uuid::new_v4(),
            total,
            Some(&seller),
            &chain,
            &CommissionSchedule::default(),
        )
        .unwrap();

        for (idx, credit) in plan.credits.iter().enumerate() {
            prop_assert_eq!(credit.level, idx as i16);
            let expected_target = if idx == 0 {
                CreditTarget::Direct
            } else {
                CreditTarget::Downline
            };
            prop_assert_eq!(credit.target, expected_target);
            prop_assert!(credit.amount > Decimal::ZERO);
        }
    }

    /// Property 1.3: Without a seller the plan is empty no matter the chain.
    #[test]
    fn prop_no_seller_empty_plan(
        total in plot_total(),
        chain in upline_chain(),
    ) {
        let plan = CommissionService::plan(
            Uuid::new_v4(),
            total,
            None,
            &chain,
            &CommissionSchedule::default(),
        )
        .unwrap();
        prop_assert!(plan.is_empty());
    }

    // =========================================================================
    // Property 2: Rate arithmetic
    // =========================================================================

    /// Property 2.1: Each credit is exactly its level's rate applied to the
    /// plot total, and the plan total is their sum.
    #[test]
    fn prop_credits_match_schedule_rates(
        total in plot_total(),
        chain in upline_chain(),
    ) {
        let schedule = CommissionSchedule::default();
        let seller = seller();
        let plan =
            CommissionService::plan(Uuid::new_v4(), total, Some(&seller), &chain, &schedule)
                .unwrap();

        let mut expected_total = Decimal::ZERO;
        for credit in &plan.credits {
            let rate = if credit.level == 0 {
                schedule.direct_rate_percent
            } else {
                schedule.upline_rate_percents[(credit.level - 1) as usize]
            };
            prop_assert_eq!(credit.amount, percent_of(total, rate));
            expected_total += credit.amount;
        }
        prop_assert_eq!(plan.total_commission(), expected_total);
    }

    /// Property 2.2: With the default schedule the plan total is 6%, 8%,
    /// or 8.5% of the plot total depending on available upline levels.
    #[test]
    fn prop_default_schedule_totals(
        total in plot_total(),
        chain in upline_chain(),
    ) {
        let seller = seller();
        let plan = CommissionService::plan(
            Uuid::new_v4(),
            total,
            Some(&seller),
            &chain,
            &CommissionSchedule::default(),
        )
        .unwrap();

        let expected = match chain.len() {
            0 => percent_of(total, Decimal::new(6, 0)),
            1 => percent_of(total, Decimal::new(6, 0)) + percent_of(total, Decimal::new(2, 0)),
            _ => {
                percent_of(total, Decimal::new(6, 0))
                    + percent_of(total, Decimal::new(2, 0))
                    + percent_of(total, Decimal::new(5, 1))
            }
        };
        prop_assert_eq!(plan.total_commission(), expected);
    }
}
