//! Property-based tests for balance ledger arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use leavebook_shared::types::{LeaveTypeId, UserId};

use super::types::{BalanceKey, LeaveBalance, carry_over_hours};

/// Hours in half-hour steps between 0 and 500.
fn arb_hours() -> impl Strategy<Value = Decimal> {
    (0i64..1000).prop_map(|n| Decimal::new(n * 5, 1))
}

fn arb_signed_hours() -> impl Strategy<Value = Decimal> {
    (-400i64..400).prop_map(|n| Decimal::new(n * 5, 1))
}

#[derive(Debug, Clone, Copy)]
enum Movement {
    Reserve,
    Commit,
    Release,
    Charge,
    Refund,
}

fn arb_movement() -> impl Strategy<Value = (Movement, Decimal)> {
    (
        prop_oneof![
            Just(Movement::Reserve),
            Just(Movement::Commit),
            Just(Movement::Release),
            Just(Movement::Charge),
            Just(Movement::Refund),
        ],
        arb_hours(),
    )
}

fn expected_remaining(b: &LeaveBalance) -> Decimal {
    b.allowance + b.carried_over + b.adjustment - b.used - b.scheduled
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The remaining identity holds after any sequence of movements.
    #[test]
    fn prop_remaining_identity_holds(
        allowance in arb_hours(),
        carried in arb_hours(),
        adjustment in arb_signed_hours(),
        movements in prop::collection::vec(arb_movement(), 0..20),
    ) {
        let key = BalanceKey::new(UserId::new(), LeaveTypeId::new(), 2026);
        let mut balance = LeaveBalance::opening(key, allowance, carried);
        balance.adjustment = adjustment;

        for (movement, hours) in movements {
            match movement {
                Movement::Reserve => balance.reserve(hours),
                Movement::Commit => balance.commit_reserved(hours),
                Movement::Release => balance.release_reserved(hours),
                Movement::Charge => balance.charge(hours),
                Movement::Refund => balance.refund(hours),
            }
            prop_assert_eq!(balance.remaining(), expected_remaining(&balance));
        }
    }

    /// Approval moves hours between counters without changing remaining.
    #[test]
    fn prop_commit_preserves_remaining(allowance in arb_hours(), hours in arb_hours()) {
        let key = BalanceKey::new(UserId::new(), LeaveTypeId::new(), 2026);
        let mut balance = LeaveBalance::opening(key, allowance, Decimal::ZERO);
        balance.reserve(hours);
        let before = balance.remaining();
        balance.commit_reserved(hours);
        prop_assert_eq!(balance.remaining(), before);
    }

    /// A reservation followed by its release is a no-op.
    #[test]
    fn prop_reserve_release_roundtrip(allowance in arb_hours(), hours in arb_hours()) {
        let key = BalanceKey::new(UserId::new(), LeaveTypeId::new(), 2026);
        let original = LeaveBalance::opening(key, allowance, Decimal::ZERO);
        let mut balance = original.clone();
        balance.reserve(hours);
        balance.release_reserved(hours);
        prop_assert_eq!(balance, original);
    }

    /// Affordability agrees with remaining for capped balances.
    #[test]
    fn prop_affordability_matches_remaining(
        allowance in arb_hours().prop_filter("capped", |a| !a.is_zero()),
        used in arb_hours(),
        hours in arb_hours(),
    ) {
        let key = BalanceKey::new(UserId::new(), LeaveTypeId::new(), 2026);
        let mut balance = LeaveBalance::opening(key, allowance, Decimal::ZERO);
        balance.charge(used);
        prop_assert_eq!(
            balance.ensure_affordable(hours).is_ok(),
            hours <= balance.remaining()
        );
    }

    /// Carry-over is always within `[0, max]` and never exceeds what was left.
    #[test]
    fn prop_carry_over_bounded(previous in arb_signed_hours(), max in arb_hours()) {
        let carried = carry_over_hours(previous, max);
        prop_assert!(carried >= Decimal::ZERO);
        prop_assert!(carried <= max);
        prop_assert!(carried <= previous.max(Decimal::ZERO));
    }
}
