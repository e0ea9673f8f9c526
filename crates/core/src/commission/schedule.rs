//! Commission rate schedule and policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use plotbook_shared::CommissionSettings;

/// Commission rates for a plot sale, as percentages of the plot's
/// total amount.
///
/// The upline vector is ordered by level: index 0 is the seller's
/// direct upline (level 1), index 1 the upline's upline (level 2),
/// and so on. Upline depth is the vector length, so depth and rates
/// change together through configuration, never through code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    /// Rate credited to the selling broker (level 0).
    pub direct_rate_percent: Decimal,
    /// Rates credited up the referral chain, ordered by level.
    pub upline_rate_percents: Vec<Decimal>,
}

impl CommissionSchedule {
    /// Creates a schedule from explicit rates.
    #[must_use]
    pub fn new(direct_rate_percent: Decimal, upline_rate_percents: Vec<Decimal>) -> Self {
        Self {
            direct_rate_percent,
            upline_rate_percents,
        }
    }

    /// Maximum number of upline levels this schedule pays.
    #[must_use]
    pub fn max_upline_depth(&self) -> usize {
        self.upline_rate_percents.len()
    }

    /// Sum of every rate in the schedule.
    #[must_use]
    pub fn total_rate_percent(&self) -> Decimal {
        self.direct_rate_percent + self.upline_rate_percents.iter().copied().sum::<Decimal>()
    }
}

impl Default for CommissionSchedule {
    /// 6% direct, 2% to the first upline, 0.5% to the second.
    fn default() -> Self {
        Self {
            direct_rate_percent: Decimal::new(6, 0),
            upline_rate_percents: vec![Decimal::new(2, 0), Decimal::new(5, 1)],
        }
    }
}

/// Thresholds and rates governing plot sales and commission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionPolicy {
    /// Paid percentage at which a booked plot becomes sold and
    /// commission distribution runs.
    pub sale_trigger_percent: Decimal,
    /// Paid percentage at or above which a booking can no longer
    /// be cancelled.
    pub cancellation_limit_percent: Decimal,
    /// The rate schedule applied at distribution time.
    pub schedule: CommissionSchedule,
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        Self {
            sale_trigger_percent: Decimal::new(50, 0),
            cancellation_limit_percent: Decimal::new(50, 0),
            schedule: CommissionSchedule::default(),
        }
    }
}

impl From<&CommissionSettings> for CommissionPolicy {
    fn from(settings: &CommissionSettings) -> Self {
        Self {
            sale_trigger_percent: settings.sale_trigger_percent,
            cancellation_limit_percent: settings.cancellation_limit_percent,
            schedule: CommissionSchedule::new(
                settings.direct_rate_percent,
                settings.upline_rate_percents.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_schedule() {
        let schedule = CommissionSchedule::default();
        assert_eq!(schedule.direct_rate_percent, dec!(6));
        assert_eq!(schedule.upline_rate_percents, vec![dec!(2), dec!(0.5)]);
        assert_eq!(schedule.max_upline_depth(), 2);
        assert_eq!(schedule.total_rate_percent(), dec!(8.5));
    }

    #[test]
    fn test_default_policy() {
        let policy = CommissionPolicy::default();
        assert_eq!(policy.sale_trigger_percent, dec!(50));
        assert_eq!(policy.cancellation_limit_percent, dec!(50));
        assert_eq!(policy.schedule, CommissionSchedule::default());
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = CommissionSettings {
            sale_trigger_percent: dec!(75),
            cancellation_limit_percent: dec!(40),
            direct_rate_percent: dec!(5),
            upline_rate_percents: vec![dec!(1)],
        };
        let policy = CommissionPolicy::from(&settings);
        assert_eq!(policy.sale_trigger_percent, dec!(75));
        assert_eq!(policy.cancellation_limit_percent, dec!(40));
        assert_eq!(policy.schedule.direct_rate_percent, dec!(5));
        assert_eq!(policy.schedule.max_upline_depth(), 1);
    }

    #[test]
    fn test_empty_upline_schedule() {
        let schedule = CommissionSchedule::new(dec!(6), vec![]);
        assert_eq!(schedule.max_upline_depth(), 0);
        assert_eq!(schedule.total_rate_percent(), dec!(6));
    }
}
