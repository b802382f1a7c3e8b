//! Leave request domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leavebook_shared::types::{LeaveRequestId, LeaveTypeId, UserId};

use crate::calendar::DateRange;

/// Hours charged for one full working day.
const FULL_DAY_HOURS: u32 = 8;
/// Hours charged for one half working day.
const HALF_DAY_HOURS: u32 = 4;

/// Status of a leave request.
///
/// - Pending → Approved (approve)
/// - Pending → Declined (decline)
/// - Pending → Cancelled (cancel)
///
/// Any status may additionally be hard deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// Awaiting review; hours are held in `scheduled`.
    Pending,
    /// Approved; hours are counted in `used`.
    Approved,
    /// Declined by a reviewer.
    Declined,
    /// Withdrawn before review.
    Cancelled,
}

impl LeaveStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "declined" => Some(Self::Declined),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the request still awaits review.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the request occupies its dates for overlap checks.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hours charged per working day.
#[must_use]
pub fn hours_per_day(half_day: bool) -> Decimal {
    Decimal::from(if half_day { HALF_DAY_HOURS } else { FULL_DAY_HOURS })
}

/// Chargeable hours for a number of working days.
#[must_use]
pub fn chargeable_hours(working_days: u32, half_day: bool) -> Decimal {
    Decimal::from(working_days) * hours_per_day(half_day)
}

/// Input of the create operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLeaveRequest {
    /// Leave type to charge.
    pub leave_type_id: LeaveTypeId,
    /// First day of absence (inclusive).
    pub start_date: NaiveDate,
    /// Last day of absence (inclusive).
    pub end_date: NaiveDate,
    /// Charge half days instead of full days.
    #[serde(default)]
    pub half_day: bool,
    /// Free-text note from the requester.
    #[serde(default)]
    pub note: Option<String>,
    /// Owner of the request when filed by someone else.
    #[serde(default)]
    pub on_behalf_of: Option<UserId>,
}

impl NewLeaveRequest {
    /// The requested date range, or `None` if `start_date > end_date`.
    #[must_use]
    pub fn range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }

    /// The request owner: `on_behalf_of` or the principal.
    #[must_use]
    pub fn owner(&self, principal: UserId) -> UserId {
        self.on_behalf_of.unwrap_or(principal)
    }
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Request ID.
    pub id: LeaveRequestId,
    /// Owner of the request.
    pub user_id: UserId,
    /// Leave type charged.
    pub leave_type_id: LeaveTypeId,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Half-day flag.
    pub half_day: bool,
    /// Hours charged against the balance.
    pub total_hours: Decimal,
    /// Current status.
    pub status: LeaveStatus,
    /// Requester note.
    pub note: Option<String>,
    /// Reviewer, set on approve/decline and on auto-approval.
    pub reviewer_id: Option<UserId>,
    /// Reviewer note.
    pub reviewer_note: Option<String>,
    /// When the request was reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// True if the request was approved at creation.
    pub auto_approved: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// The year whose balance this request is charged to.
    #[must_use]
    pub fn charge_year(&self) -> i32 {
        use chrono::Datelike;
        self.start_date.year()
    }
}

/// Status change produced by a review or cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Status before the change.
    pub from: LeaveStatus,
    /// Status after the change.
    pub to: LeaveStatus,
    /// Acting principal.
    pub actor: UserId,
    /// Optional reviewer note.
    pub note: Option<String>,
    /// When the change happened.
    pub at: DateTime<Utc>,
}

impl Transition {
    /// Returns true if the transition records a review (approve or decline).
    #[must_use]
    pub const fn is_review(&self) -> bool {
        matches!(self.to, LeaveStatus::Approved | LeaveStatus::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(LeaveStatus::Pending, "pending")]
    #[case(LeaveStatus::Approved, "approved")]
    #[case(LeaveStatus::Declined, "declined")]
    #[case(LeaveStatus::Cancelled, "cancelled")]
    fn test_status_str_roundtrip(#[case] status: LeaveStatus, #[case] s: &str) {
        assert_eq!(status.as_str(), s);
        assert_eq!(LeaveStatus::parse(s), Some(status));
        assert_eq!(LeaveStatus::parse(&s.to_uppercase()), Some(status));
    }

    #[test]
    fn test_status_parse_unknown() {
        assert_eq!(LeaveStatus::parse("voided"), None);
    }

    #[test]
    fn test_active_statuses() {
        assert!(LeaveStatus::Pending.is_active());
        assert!(LeaveStatus::Approved.is_active());
        assert!(!LeaveStatus::Declined.is_active());
        assert!(!LeaveStatus::Cancelled.is_active());
    }

    #[rstest]
    #[case(3, false, dec!(24))]
    #[case(3, true, dec!(12))]
    #[case(1, true, dec!(4))]
    #[case(0, false, dec!(0))]
    fn test_chargeable_hours(#[case] days: u32, #[case] half: bool, #[case] expected: Decimal) {
        assert_eq!(chargeable_hours(days, half), expected);
    }

    #[test]
    fn test_owner_defaults_to_principal() {
        let principal = UserId::new();
        let mut input = NewLeaveRequest {
            leave_type_id: LeaveTypeId::new(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(),
            half_day: false,
            note: None,
            on_behalf_of: None,
        };
        assert_eq!(input.owner(principal), principal);

        let report = UserId::new();
        input.on_behalf_of = Some(report);
        assert_eq!(input.owner(principal), report);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let input = NewLeaveRequest {
            leave_type_id: LeaveTypeId::new(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
            half_day: false,
            note: None,
            on_behalf_of: None,
        };
        assert!(input.range().is_none());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&LeaveStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
