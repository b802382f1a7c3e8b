//! Property-based tests for LeaveService.

use proptest::prelude::*;
use rust_decimal::Decimal;

use leavebook_shared::types::{LeaveTypeId, UserId};

use crate::balance::{BalanceKey, LeaveBalance};
use crate::leave::error::LeaveError;
use crate::leave::service::LeaveService;
use crate::leave::types::LeaveStatus;

fn arb_status() -> impl Strategy<Value = LeaveStatus> {
    prop_oneof![
        Just(LeaveStatus::Pending),
        Just(LeaveStatus::Approved),
        Just(LeaveStatus::Declined),
        Just(LeaveStatus::Cancelled),
    ]
}

fn arb_hours() -> impl Strategy<Value = Decimal> {
    (1u32..200).prop_map(|n| Decimal::from(n * 4))
}

fn balance(allowance: Decimal) -> LeaveBalance {
    LeaveBalance::opening(
        BalanceKey::new(UserId::new(), LeaveTypeId::new(), 2026),
        allowance,
        Decimal::ZERO,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Only pending requests can be reviewed or cancelled.
    #[test]
    fn prop_transitions_require_pending(status in arb_status()) {
        let actor = UserId::new();
        let results = [
            LeaveService::approve(status, actor, None),
            LeaveService::decline(status, actor, None),
            LeaveService::cancel(status, actor),
        ];
        for result in results {
            if status.is_pending() {
                prop_assert!(result.is_ok());
            } else {
                let is_invalid_state = matches!(result, Err(LeaveError::InvalidState { .. }));
                prop_assert!(is_invalid_state);
            }
        }
    }

    /// Create followed by delete restores the balance exactly.
    #[test]
    fn prop_create_then_delete_restores(
        allowance in arb_hours(),
        hours in arb_hours(),
        auto in any::<bool>(),
    ) {
        let original = balance(allowance);
        let mut b = original.clone();
        let status = if auto { LeaveStatus::Approved } else { LeaveStatus::Pending };

        if LeaveService::book_new(&mut b, status, hours).is_ok() {
            LeaveService::apply_delete(&mut b, status, hours);
        }
        prop_assert_eq!(b, original);
    }

    /// Approving twice mutates the balance once.
    #[test]
    fn prop_second_approval_rejected(hours in arb_hours()) {
        let mut b = balance(Decimal::ZERO);
        let reviewer = UserId::new();
        LeaveService::book_new(&mut b, LeaveStatus::Pending, hours).unwrap();

        let first = LeaveService::approve(LeaveStatus::Pending, reviewer, None).unwrap();
        LeaveService::apply_transition(&mut b, &first, hours);
        let after_first = b.clone();

        prop_assert!(LeaveService::approve(first.to, reviewer, None).is_err());
        prop_assert_eq!(b, after_first);
    }

    /// Any full lifecycle keeps the remaining identity.
    #[test]
    fn prop_lifecycle_keeps_identity(
        allowance in arb_hours(),
        hours in arb_hours(),
        outcome in prop_oneof![
            Just(LeaveStatus::Approved),
            Just(LeaveStatus::Declined),
            Just(LeaveStatus::Cancelled),
        ],
        delete in any::<bool>(),
    ) {
        let mut b = balance(allowance);
        let actor = UserId::new();
        if LeaveService::book_new(&mut b, LeaveStatus::Pending, hours).is_err() {
            return Ok(());
        }
        let transition = match outcome {
            LeaveStatus::Approved => LeaveService::approve(LeaveStatus::Pending, actor, None),
            LeaveStatus::Declined => LeaveService::decline(LeaveStatus::Pending, actor, None),
            _ => LeaveService::cancel(LeaveStatus::Pending, actor),
        }
        .unwrap();
        LeaveService::apply_transition(&mut b, &transition, hours);
        if delete {
            LeaveService::apply_delete(&mut b, transition.to, hours);
        }

        prop_assert_eq!(
            b.remaining(),
            b.allowance + b.carried_over + b.adjustment - b.used - b.scheduled
        );
        prop_assert!(b.scheduled >= Decimal::ZERO);
        prop_assert!(b.used >= Decimal::ZERO);
        if delete || outcome != LeaveStatus::Approved {
            prop_assert_eq!(b.remaining(), allowance);
        }
    }
}
