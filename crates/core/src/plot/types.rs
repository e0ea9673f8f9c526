//! Plot domain types for sale-state management.
//!
//! This module defines the core types used for tracking a plot's
//! position in the sale lifecycle and its lifecycle transitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Sale status of a plot.
///
/// Plots progress through these states over a booking cycle.
/// The valid transitions are:
/// - Available → Booked (book)
/// - Booked → Sold (payment threshold reached)
/// - Booked → Available (cancel, gated by paid percentage)
///
/// `Sold` and `Cancelled` are terminal for a booking cycle: a sold plot
/// is not reused and a cancelled plot accepts no further operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStatus {
    /// Plot is in inventory and can be booked.
    Available,
    /// Plot has a buyer and accepts payments.
    Booked,
    /// Plot is fully committed; the sale is final (immutable).
    Sold,
    /// Plot has been withdrawn from sale (immutable).
    Cancelled,
}

impl PlotStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Sold => "sold",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(Self::Available),
            "booked" => Some(Self::Booked),
            "sold" => Some(Self::Sold),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the plot accepts payments in this status.
    #[must_use]
    pub fn accepts_payments(&self) -> bool {
        matches!(self, Self::Booked)
    }

    /// Returns true if this status ends the booking cycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sold | Self::Cancelled)
    }
}

impl fmt::Display for PlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Commission settlement status of a plot.
///
/// Transitions pending → paid at most once per plot; the conditional
/// flip on this flag is the at-most-once guard for distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    /// Commission has not been distributed for this plot.
    Pending,
    /// Commission has been distributed; further distribution is a no-op.
    Paid,
}

impl CommissionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle action representing a state transition with audit data.
///
/// Each variant captures the action performed, the resulting status,
/// and the fields the persistence layer must write alongside it.
#[derive(Debug, Clone)]
pub enum LifecycleAction {
    /// Book an available plot for a buyer.
    Book {
        /// The new status after booking.
        new_status: PlotStatus,
        /// The buyer the plot is booked for.
        buyer_name: String,
        /// The amount paid at booking time.
        booking_amount: Decimal,
        /// The referring broker, if any.
        broker_id: Option<Uuid>,
        /// When the plot was booked.
        booked_at: DateTime<Utc>,
    },
    /// Mark a booked plot as sold.
    MarkSold {
        /// The new status after the sale.
        new_status: PlotStatus,
        /// When the plot was sold.
        sold_at: DateTime<Utc>,
    },
    /// Cancel a booking, returning the plot to inventory.
    ///
    /// Buyer, broker, and booking financials are cleared by the
    /// persistence layer when applying this action.
    Cancel {
        /// The new status after cancellation (Available).
        new_status: PlotStatus,
        /// When the booking was cancelled.
        cancelled_at: DateTime<Utc>,
    },
}

impl LifecycleAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> PlotStatus {
        match self {
            Self::Book { new_status, .. }
            | Self::MarkSold { new_status, .. }
            | Self::Cancel { new_status, .. } => *new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_status_as_str() {
        assert_eq!(PlotStatus::Available.as_str(), "available");
        assert_eq!(PlotStatus::Booked.as_str(), "booked");
        assert_eq!(PlotStatus::Sold.as_str(), "sold");
        assert_eq!(PlotStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_plot_status_parse() {
        assert_eq!(PlotStatus::parse("available"), Some(PlotStatus::Available));
        assert_eq!(PlotStatus::parse("BOOKED"), Some(PlotStatus::Booked));
        assert_eq!(PlotStatus::parse("Sold"), Some(PlotStatus::Sold));
        assert_eq!(PlotStatus::parse("cancelled"), Some(PlotStatus::Cancelled));
        assert_eq!(PlotStatus::parse("invalid"), None);
    }

    #[test]
    fn test_plot_status_display() {
        assert_eq!(format!("{}", PlotStatus::Available), "available");
        assert_eq!(format!("{}", PlotStatus::Sold), "sold");
    }

    #[test]
    fn test_plot_status_accepts_payments() {
        assert!(!PlotStatus::Available.accepts_payments());
        assert!(PlotStatus::Booked.accepts_payments());
        assert!(!PlotStatus::Sold.accepts_payments());
        assert!(!PlotStatus::Cancelled.accepts_payments());
    }

    #[test]
    fn test_plot_status_terminal() {
        assert!(!PlotStatus::Available.is_terminal());
        assert!(!PlotStatus::Booked.is_terminal());
        assert!(PlotStatus::Sold.is_terminal());
        assert!(PlotStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_commission_status_round_trip() {
        assert_eq!(
            CommissionStatus::parse(CommissionStatus::Pending.as_str()),
            Some(CommissionStatus::Pending)
        );
        assert_eq!(
            CommissionStatus::parse(CommissionStatus::Paid.as_str()),
            Some(CommissionStatus::Paid)
        );
        assert_eq!(CommissionStatus::parse("settled"), None);
    }

    #[test]
    fn test_commission_status_display() {
        assert_eq!(format!("{}", CommissionStatus::Pending), "pending");
        assert_eq!(format!("{}", CommissionStatus::Paid), "paid");
    }

    #[test]
    fn test_action_new_status() {
        let action = LifecycleAction::MarkSold {
            new_status: PlotStatus::Sold,
            sold_at: Utc::now(),
        };
        assert_eq!(action.new_status(), PlotStatus::Sold);
    }
}
