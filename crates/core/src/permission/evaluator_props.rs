//! Property-based tests for permission evaluation.

use proptest::prelude::*;
use leavebook_shared::types::UserId;
use uuid::Uuid;

use super::evaluator::{Decision, RecordScope, evaluate};
use super::types::{Action, Condition, Grant, Resource};

fn arb_resource() -> impl Strategy<Value = Resource> {
    prop_oneof![Just(Resource::LeaveRequests), Just(Resource::LeaveBalances)]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Create),
        Just(Action::Read),
        Just(Action::Approve),
        Just(Action::Delete),
    ]
}

fn arb_condition() -> impl Strategy<Value = Option<Condition>> {
    prop_oneof![
        Just(None),
        Just(Some(Condition::OwnRecordsOnly)),
        Just(Some(Condition::DirectReportsOnly)),
    ]
}

fn arb_grant() -> impl Strategy<Value = Grant> {
    (arb_resource(), arb_action(), arb_condition()).prop_map(|(resource, action, condition)| {
        Grant {
            resource,
            action,
            condition,
        }
    })
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The decision is independent of grant order.
    #[test]
    fn prop_evaluation_order_independent(
        grants in prop::collection::vec(arb_grant(), 0..8),
        resource in arb_resource(),
        action in arb_action(),
    ) {
        let forward = evaluate(&grants, resource, action);
        let reversed: Vec<Grant> = grants.iter().rev().copied().collect();
        prop_assert_eq!(forward, evaluate(&reversed, resource, action));
    }

    /// Adding a grant never makes a decision less permissive.
    #[test]
    fn prop_adding_grants_is_monotonic(
        grants in prop::collection::vec(arb_grant(), 0..8),
        extra in arb_grant(),
        principal in arb_user(),
        owner in arb_user(),
        manager in prop::option::of(arb_user()),
    ) {
        let scope = RecordScope { principal, owner, owner_manager: manager };
        let before = evaluate(&grants, extra.resource, extra.action);

        let mut more = grants.clone();
        more.push(extra);
        let after = evaluate(&more, extra.resource, extra.action);

        prop_assert!(after.is_allowed());
        if before.permits(&scope) {
            prop_assert!(after.permits(&scope));
        }
    }

    /// Allowed iff some grant matches; unconditional iff some matching grant has no condition.
    #[test]
    fn prop_decision_reflects_matching_grants(
        grants in prop::collection::vec(arb_grant(), 0..8),
        resource in arb_resource(),
        action in arb_action(),
    ) {
        let matching: Vec<&Grant> = grants.iter().filter(|g| g.matches(resource, action)).collect();
        let decision = evaluate(&grants, resource, action);

        prop_assert_eq!(decision.is_allowed(), !matching.is_empty());
        prop_assert_eq!(
            decision.is_unconditional(),
            matching.iter().any(|g| g.condition.is_none())
        );
        if let Decision::Conditional(conditions) = &decision {
            for g in matching {
                prop_assert!(conditions.contains(&g.condition.unwrap()));
            }
        }
    }
}
