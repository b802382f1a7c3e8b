//! Leave policy rules.
//!
//! A policy is stored as JSON mapping a leave-type code to its rule:
//!
//! ```json
//! {
//!   "ANNUAL": {
//!     "enabled": true,
//!     "yearly_allowance_hours": 160,
//!     "accrual": "monthly",
//!     "carry_over": { "max_hours": 40, "expires_after_months": 3 },
//!     "request_rules": {
//!       "min_notice_days": 7,
//!       "max_consecutive_hours": 80,
//!       "requires_approval": true,
//!       "auto_approve_up_to_hours": 8,
//!       "document_required_over_hours": 24
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::balance::{BalanceKey, LeaveBalance, carry_over_hours};

/// Policy errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Stored rule JSON could not be parsed.
    #[error("Malformed leave policy: {0}")]
    Malformed(String),

    /// The leave type is switched off for this policy.
    #[error("Leave type {0} is disabled by policy")]
    Disabled(String),

    /// Not enough notice before the first day of leave.
    #[error("At least {required} days notice required, got {actual}")]
    NoticeTooShort {
        /// Minimum notice in days.
        required: u32,
        /// Days between today and the start date.
        actual: i64,
    },

    /// The request exceeds the longest allowed single absence.
    #[error("Request of {requested}h exceeds maximum of {max}h")]
    TooLong {
        /// Hours requested.
        requested: Decimal,
        /// Policy maximum.
        max: Decimal,
    },
}

/// How the yearly allowance becomes available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualStyle {
    /// The whole allowance is available from January 1st.
    #[default]
    Upfront,
    /// One twelfth of the allowance accrues at the start of each month.
    Monthly,
}

impl AccrualStyle {
    /// Part of `allowance` not yet accrued for leave starting on `start`.
    ///
    /// Carried-over and adjustment hours are never withheld.
    #[must_use]
    pub fn unaccrued(self, allowance: Decimal, start: NaiveDate) -> Decimal {
        match self {
            Self::Upfront => Decimal::ZERO,
            Self::Monthly => {
                let months_ahead = Decimal::from(12 - start.month());
                (allowance * months_ahead / Decimal::from(12)).round_dp(2)
            }
        }
    }
}

/// Carry-over settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOverRule {
    /// Cap on hours rolled into the next year.
    pub max_hours: Decimal,
    /// Carried hours lapse this many months into the new year.
    #[serde(default)]
    pub expires_after_months: Option<u32>,
}

impl CarryOverRule {
    /// True when carry-over into `year` has lapsed by `today`.
    #[must_use]
    pub fn has_expired(&self, year: i32, today: NaiveDate) -> bool {
        let Some(months) = self.expires_after_months else {
            return false;
        };
        NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|jan1| jan1.checked_add_months(Months::new(months)))
            .is_some_and(|lapse| today >= lapse)
    }
}

fn approval_required_by_default() -> bool {
    true
}

/// Per-request restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRules {
    /// Minimum days between today and the start date.
    #[serde(default)]
    pub min_notice_days: Option<u32>,
    /// Longest allowed single request in hours.
    #[serde(default)]
    pub max_consecutive_hours: Option<Decimal>,
    /// When false every request of this type is approved on creation.
    #[serde(default = "approval_required_by_default")]
    pub requires_approval: bool,
    /// Requests up to this many hours are approved on creation.
    #[serde(default)]
    pub auto_approve_up_to_hours: Option<Decimal>,
    /// Requests above this many hours need a supporting document.
    #[serde(default)]
    pub document_required_over_hours: Option<Decimal>,
}

impl Default for RequestRules {
    fn default() -> Self {
        Self {
            min_notice_days: None,
            max_consecutive_hours: None,
            requires_approval: true,
            auto_approve_up_to_hours: None,
            document_required_over_hours: None,
        }
    }
}

impl RequestRules {
    /// Checks a request starting on `start` for `hours`, filed on `today`.
    pub fn validate(
        &self,
        start: NaiveDate,
        today: NaiveDate,
        hours: Decimal,
    ) -> Result<(), PolicyError> {
        if let Some(required) = self.min_notice_days {
            let actual = (start - today).num_days();
            if actual < i64::from(required) {
                return Err(PolicyError::NoticeTooShort { required, actual });
            }
        }
        if let Some(max) = self.max_consecutive_hours
            && hours > max
        {
            return Err(PolicyError::TooLong {
                requested: hours,
                max,
            });
        }
        Ok(())
    }

    /// True when a request of `hours` skips review.
    #[must_use]
    pub fn approves_automatically(&self, hours: Decimal) -> bool {
        !self.requires_approval || self.auto_approve_up_to_hours.is_some_and(|max| hours <= max)
    }

    /// True when a request of `hours` needs a supporting document.
    #[must_use]
    pub fn requires_document(&self, hours: Decimal) -> bool {
        self.document_required_over_hours.is_some_and(|min| hours > min)
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Rule for one leave type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTypeRule {
    /// Whether requests of this type are accepted.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Yearly entitlement in hours; zero means uncapped.
    #[serde(default)]
    pub yearly_allowance_hours: Decimal,
    /// Accrual schedule of the allowance.
    #[serde(default)]
    pub accrual: AccrualStyle,
    /// Carry-over settings, absent when unused hours lapse.
    #[serde(default)]
    pub carry_over: Option<CarryOverRule>,
    /// Request restrictions.
    #[serde(default)]
    pub request_rules: RequestRules,
}

/// Leave-type code → rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeavePolicy {
    /// Rules keyed by leave-type code.
    pub rules: BTreeMap<String, LeaveTypeRule>,
}

impl LeavePolicy {
    /// Parses the stored JSON rules.
    pub fn from_json(value: serde_json::Value) -> Result<Self, PolicyError> {
        serde_json::from_value(value).map_err(|e| PolicyError::Malformed(e.to_string()))
    }

    /// Looks up the rule for a leave-type code, ignoring ASCII case.
    #[must_use]
    pub fn rule(&self, code: &str) -> Option<&LeaveTypeRule> {
        self.rules.get(code).or_else(|| {
            self.rules
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(code))
                .map(|(_, rule)| rule)
        })
    }

    /// Opening balance for `key`, initialized on `today`.
    ///
    /// Allowance comes from the rule; carry-over is taken from the previous
    /// year's row when the rule allows it and it has not lapsed yet. A type
    /// without a rule opens uncapped.
    #[must_use]
    pub fn opening_balance(
        &self,
        key: BalanceKey,
        code: &str,
        previous: Option<&LeaveBalance>,
        today: NaiveDate,
    ) -> LeaveBalance {
        let Some(rule) = self.rule(code) else {
            return LeaveBalance::opening(key, Decimal::ZERO, Decimal::ZERO);
        };
        let carried = match (&rule.carry_over, previous) {
            (Some(carry), Some(prev)) if !carry.has_expired(key.year, today) => {
                carry_over_hours(prev.remaining(), carry.max_hours)
            }
            _ => Decimal::ZERO,
        };
        LeaveBalance::opening(key, rule.yearly_allowance_hours, carried)
    }

    /// Applies the type's rules to a new request. Types without a rule pass.
    pub fn check_request(
        &self,
        code: &str,
        start: NaiveDate,
        today: NaiveDate,
        hours: Decimal,
    ) -> Result<(), PolicyError> {
        match self.rule(code) {
            None => Ok(()),
            Some(rule) if !rule.enabled => Err(PolicyError::Disabled(code.to_string())),
            Some(rule) => rule.request_rules.validate(start, today, hours),
        }
    }

    /// Accrual schedule of a type; types without a rule accrue upfront.
    #[must_use]
    pub fn accrual(&self, code: &str) -> AccrualStyle {
        self.rule(code).map(|r| r.accrual).unwrap_or_default()
    }

    /// True when the type's rules approve a request of `hours` on creation.
    #[must_use]
    pub fn approves_automatically(&self, code: &str, hours: Decimal) -> bool {
        self.rule(code)
            .is_some_and(|r| r.request_rules.approves_automatically(hours))
    }

    /// True when the type's rules want a document for `hours`.
    #[must_use]
    pub fn requires_document(&self, code: &str, hours: Decimal) -> bool {
        self.rule(code)
            .is_some_and(|r| r.request_rules.requires_document(hours))
    }
}
