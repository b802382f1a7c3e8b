//! Balance ledger types and arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leavebook_shared::types::{LeaveTypeId, UserId};

use super::error::BalanceError;

/// Identifies exactly one balance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    /// Balance owner.
    pub user_id: UserId,
    /// Leave type the hours belong to.
    pub leave_type_id: LeaveTypeId,
    /// Calendar year.
    pub year: i32,
}

impl BalanceKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(user_id: UserId, leave_type_id: LeaveTypeId, year: i32) -> Self {
        Self {
            user_id,
            leave_type_id,
            year,
        }
    }

    /// Key of the same user and type one year earlier.
    #[must_use]
    pub const fn previous_year(&self) -> Self {
        Self::new(self.user_id, self.leave_type_id, self.year - 1)
    }
}

/// Hour counters for one [`BalanceKey`].
///
/// `remaining` is never stored and never clamped; it may go negative after
/// an adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Row key.
    pub key: BalanceKey,
    /// Yearly entitlement. Zero means uncapped.
    pub allowance: Decimal,
    /// Hours consumed by approved requests.
    pub used: Decimal,
    /// Hours reserved by pending requests.
    pub scheduled: Decimal,
    /// Hours rolled in from the previous year.
    pub carried_over: Decimal,
    /// Manual signed correction.
    pub adjustment: Decimal,
}

impl LeaveBalance {
    /// Opening state for a freshly initialized row.
    #[must_use]
    pub fn opening(key: BalanceKey, allowance: Decimal, carried_over: Decimal) -> Self {
        Self {
            key,
            allowance,
            used: Decimal::ZERO,
            scheduled: Decimal::ZERO,
            carried_over,
            adjustment: Decimal::ZERO,
        }
    }

    /// `allowance + carried_over + adjustment - used - scheduled`.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.allowance + self.carried_over + self.adjustment - self.used - self.scheduled
    }

    /// True when the balance carries no cap.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.allowance.is_zero()
    }

    /// Checks that `hours` fit in the remaining balance.
    ///
    /// Uncapped balances accept any amount.
    pub fn ensure_affordable(&self, hours: Decimal) -> Result<(), BalanceError> {
        self.ensure_affordable_withholding(hours, Decimal::ZERO)
    }

    /// Like [`Self::ensure_affordable`], with `withheld` hours of the
    /// allowance not yet available.
    pub fn ensure_affordable_withholding(
        &self,
        hours: Decimal,
        withheld: Decimal,
    ) -> Result<(), BalanceError> {
        if self.is_unlimited() {
            return Ok(());
        }
        let available = self.remaining() - withheld;
        if hours > available {
            return Err(BalanceError::Insufficient {
                requested: hours,
                available,
            });
        }
        Ok(())
    }

    /// Holds hours for a pending request.
    pub fn reserve(&mut self, hours: Decimal) {
        self.scheduled += hours;
    }

    /// Moves reserved hours into `used` on approval.
    pub fn commit_reserved(&mut self, hours: Decimal) {
        self.scheduled -= hours;
        self.used += hours;
    }

    /// Releases reserved hours on decline, cancel or delete.
    pub fn release_reserved(&mut self, hours: Decimal) {
        self.scheduled -= hours;
    }

    /// Consumes hours directly (auto-approval).
    pub fn charge(&mut self, hours: Decimal) {
        self.used += hours;
    }

    /// Returns consumed hours when an approved request is deleted.
    pub fn refund(&mut self, hours: Decimal) {
        self.used -= hours;
    }
}

/// Hours rolled into a new year: the previous remaining, floored at zero and
/// capped at `max_hours`.
#[must_use]
pub fn carry_over_hours(previous_remaining: Decimal, max_hours: Decimal) -> Decimal {
    previous_remaining
        .max(Decimal::ZERO)
        .min(max_hours.max(Decimal::ZERO))
}
