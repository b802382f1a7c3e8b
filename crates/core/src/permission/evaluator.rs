//! Grant resolution and record-scoped permission checks.

use std::collections::BTreeSet;

use leavebook_shared::types::UserId;
use serde::{Deserialize, Serialize};

use super::types::{Action, Condition, Grant, Resource};

/// Outcome of evaluating a principal's grants for one `(resource, action)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "conditions", rename_all = "snake_case")]
pub enum Decision {
    /// No role grants the action.
    Denied,
    /// At least one role grants the action without conditions.
    Unconditional,
    /// Allowed, restricted by the union of every triggered condition.
    Conditional(BTreeSet<Condition>),
}

/// The record a scoped check is performed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordScope {
    /// Acting principal.
    pub principal: UserId,
    /// Owner of the record.
    pub owner: UserId,
    /// Manager of the record owner, if any.
    pub owner_manager: Option<UserId>,
}

impl RecordScope {
    /// Returns true if the principal owns the record.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.principal == self.owner
    }

    /// Returns true if the principal manages the record owner.
    #[must_use]
    pub fn is_manager_of_owner(&self) -> bool {
        self.owner_manager == Some(self.principal)
    }
}

impl Decision {
    /// Returns true unless the decision is [`Decision::Denied`].
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Denied)
    }

    /// Returns true if no condition restricts the grant.
    #[must_use]
    pub fn is_unconditional(&self) -> bool {
        matches!(self, Self::Unconditional)
    }

    /// Returns true if `condition` is among the triggered conditions.
    #[must_use]
    pub fn has_condition(&self, condition: Condition) -> bool {
        match self {
            Self::Conditional(conditions) => conditions.contains(&condition),
            Self::Denied | Self::Unconditional => false,
        }
    }

    /// Checks the decision against a concrete record.
    ///
    /// When several conditions are present, satisfying any one of them is
    /// sufficient.
    #[must_use]
    pub fn permits(&self, scope: &RecordScope) -> bool {
        match self {
            Self::Denied => false,
            Self::Unconditional => true,
            Self::Conditional(conditions) => conditions.iter().any(|c| match c {
                Condition::OwnRecordsOnly => scope.is_owner(),
                Condition::DirectReportsOnly => scope.is_manager_of_owner(),
            }),
        }
    }
}

/// Folds grants into a decision for `(resource, action)`.
///
/// An empty grant list (principal without roles) is denied. Any matching
/// unconditional grant wins; otherwise conditions of all matching grants are
/// unioned.
pub fn evaluate<'a, I>(grants: I, resource: Resource, action: Action) -> Decision
where
    I: IntoIterator<Item = &'a Grant>,
{
    let mut conditions = BTreeSet::new();
    let mut matched = false;

    for grant in grants.into_iter().filter(|g| g.matches(resource, action)) {
        match grant.condition {
            None => return Decision::Unconditional,
            Some(condition) => {
                matched = true;
                conditions.insert(condition);
            }
        }
    }

    if matched {
        Decision::Conditional(conditions)
    } else {
        Decision::Denied
    }
}
