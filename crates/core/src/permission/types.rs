//! Permission vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Leave requests.
    LeaveRequests,
    /// Leave balances.
    LeaveBalances,
}

impl Resource {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LeaveRequests => "leave_requests",
            Self::LeaveBalances => "leave_balances",
        }
    }

    /// Parses a resource name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "leave_requests" => Some(Self::LeaveRequests),
            "leave_balances" => Some(Self::LeaveBalances),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action performed on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create a record.
    Create,
    /// Read a record.
    Read,
    /// Approve a record.
    Approve,
    /// Delete a record.
    Delete,
}

impl Action {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Approve => "approve",
            Self::Delete => "delete",
        }
    }

    /// Parses an action name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" => Some(Self::Create),
            "read" => Some(Self::Read),
            "approve" => Some(Self::Approve),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record-scoping condition attached to a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Only records owned by the principal.
    OwnRecordsOnly,
    /// Only records owned by users the principal manages.
    DirectReportsOnly,
}

impl Condition {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OwnRecordsOnly => "own_records_only",
            Self::DirectReportsOnly => "direct_reports_only",
        }
    }

    /// Parses a condition name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "own_records_only" => Some(Self::OwnRecordsOnly),
            "direct_reports_only" => Some(Self::DirectReportsOnly),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One permission triple granted by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Resource the grant covers.
    pub resource: Resource,
    /// Action the grant allows.
    pub action: Action,
    /// Optional record-scoping condition.
    pub condition: Option<Condition>,
}

impl Grant {
    /// Creates an unconditional grant.
    #[must_use]
    pub const fn unconditional(resource: Resource, action: Action) -> Self {
        Self {
            resource,
            action,
            condition: None,
        }
    }

    /// Creates a grant restricted by `condition`.
    #[must_use]
    pub const fn scoped(resource: Resource, action: Action, condition: Condition) -> Self {
        Self {
            resource,
            action,
            condition: Some(condition),
        }
    }

    /// Returns true if this grant covers `(resource, action)`.
    #[must_use]
    pub fn matches(&self, resource: Resource, action: Action) -> bool {
        self.resource == resource && self.action == action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_storage_names() {
        for resource in [Resource::LeaveRequests, Resource::LeaveBalances] {
            assert_eq!(Resource::parse(resource.as_str()), Some(resource));
        }
        for action in [Action::Create, Action::Read, Action::Approve, Action::Delete] {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
        for condition in [Condition::OwnRecordsOnly, Condition::DirectReportsOnly] {
            assert_eq!(Condition::parse(condition.as_str()), Some(condition));
        }
    }

    #[test]
    fn test_parse_unknown_values() {
        assert_eq!(Resource::parse("payroll"), None);
        assert_eq!(Action::parse("update"), None);
        assert_eq!(Condition::parse("same_department_only"), None);
        assert_eq!(Condition::parse("OWN_RECORDS_ONLY"), Some(Condition::OwnRecordsOnly));
    }

    #[test]
    fn test_grant_matches() {
        let grant = Grant::scoped(
            Resource::LeaveRequests,
            Action::Delete,
            Condition::OwnRecordsOnly,
        );
        assert!(grant.matches(Resource::LeaveRequests, Action::Delete));
        assert!(!grant.matches(Resource::LeaveRequests, Action::Approve));
        assert!(!grant.matches(Resource::LeaveBalances, Action::Delete));
    }
}
