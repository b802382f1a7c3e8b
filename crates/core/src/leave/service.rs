//! Leave request state machine and authorization rules.
//!
//! Everything here is pure: callers load the request, the principal's
//! decisions and the locked balance, then apply what this service returns.

use chrono::Utc;
use rust_decimal::Decimal;

use leavebook_shared::types::UserId;

use crate::balance::LeaveBalance;
use crate::calendar::DateRange;
use crate::leave::error::LeaveError;
use crate::leave::types::{LeaveStatus, Transition};
use crate::permission::{Decision, RecordScope};

/// Stateless service for leave request transitions.
pub struct LeaveService;

impl LeaveService {
    /// Status of a newly created request.
    ///
    /// Creators holding unconditional approve permission are auto-approved,
    /// as are requests the leave type's rules approve without review.
    #[must_use]
    pub fn initial_status(approve: &Decision, approved_by_policy: bool) -> LeaveStatus {
        if approve.is_unconditional() || approved_by_policy {
            LeaveStatus::Approved
        } else {
            LeaveStatus::Pending
        }
    }

    /// Checks affordability and books a new request against the balance.
    pub fn book_new(
        balance: &mut LeaveBalance,
        status: LeaveStatus,
        hours: Decimal,
    ) -> Result<(), LeaveError> {
        Self::book_new_withholding(balance, status, hours, Decimal::ZERO)
    }

    /// [`Self::book_new`] with `withheld` allowance hours not yet accrued.
    pub fn book_new_withholding(
        balance: &mut LeaveBalance,
        status: LeaveStatus,
        hours: Decimal,
        withheld: Decimal,
    ) -> Result<(), LeaveError> {
        balance.ensure_affordable_withholding(hours, withheld)?;
        match status {
            LeaveStatus::Approved => balance.charge(hours),
            LeaveStatus::Pending => balance.reserve(hours),
            LeaveStatus::Declined | LeaveStatus::Cancelled => {
                return Err(LeaveError::InvalidState {
                    status,
                    action: "create",
                });
            }
        }
        Ok(())
    }

    /// Approve a pending request.
    pub fn approve(
        current: LeaveStatus,
        reviewer: UserId,
        note: Option<String>,
    ) -> Result<Transition, LeaveError> {
        Self::from_pending(current, LeaveStatus::Approved, "approve", reviewer, note)
    }

    /// Decline a pending request.
    pub fn decline(
        current: LeaveStatus,
        reviewer: UserId,
        note: Option<String>,
    ) -> Result<Transition, LeaveError> {
        Self::from_pending(current, LeaveStatus::Declined, "decline", reviewer, note)
    }

    /// Cancel a pending request.
    pub fn cancel(current: LeaveStatus, actor: UserId) -> Result<Transition, LeaveError> {
        Self::from_pending(current, LeaveStatus::Cancelled, "cancel", actor, None)
    }

    fn from_pending(
        current: LeaveStatus,
        to: LeaveStatus,
        action: &'static str,
        actor: UserId,
        note: Option<String>,
    ) -> Result<Transition, LeaveError> {
        if !current.is_pending() {
            return Err(LeaveError::InvalidState {
                status: current,
                action,
            });
        }
        Ok(Transition {
            from: current,
            to,
            actor,
            note,
            at: Utc::now(),
        })
    }

    /// Balance effect of a transition out of pending.
    pub fn apply_transition(balance: &mut LeaveBalance, transition: &Transition, hours: Decimal) {
        match transition.to {
            LeaveStatus::Approved => balance.commit_reserved(hours),
            LeaveStatus::Declined | LeaveStatus::Cancelled => balance.release_reserved(hours),
            LeaveStatus::Pending => {}
        }
    }

    /// Balance effect of hard-deleting a request in `status`.
    pub fn apply_delete(balance: &mut LeaveBalance, status: LeaveStatus, hours: Decimal) {
        match status {
            LeaveStatus::Approved => balance.refund(hours),
            LeaveStatus::Pending => balance.release_reserved(hours),
            LeaveStatus::Declined | LeaveStatus::Cancelled => {}
        }
    }

    /// Elevated reviewers may review anything; others only their reports.
    #[must_use]
    pub fn can_review(scope: &RecordScope, elevated: bool) -> bool {
        elevated || scope.is_manager_of_owner()
    }

    /// Owners may delete their own pending requests regardless of grants.
    #[must_use]
    pub fn can_delete(delete: &Decision, scope: &RecordScope, status: LeaveStatus) -> bool {
        delete.permits(scope) || (scope.is_owner() && status.is_pending())
    }

    /// Owners may always cancel; others need delete permission on the record.
    #[must_use]
    pub fn can_cancel(delete: &Decision, scope: &RecordScope) -> bool {
        scope.is_owner() || delete.permits(scope)
    }

    /// Returns the first active range overlapping `candidate`.
    pub fn find_overlap<'a, I>(candidate: &DateRange, existing: I) -> Option<&'a DateRange>
    where
        I: IntoIterator<Item = (&'a DateRange, LeaveStatus)>,
    {
        existing
            .into_iter()
            .find(|(range, status)| status.is_active() && range.overlaps(candidate))
            .map(|(range, _)| range)
    }
}
