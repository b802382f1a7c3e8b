//! Permission store: roles, grants and manager relations.

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use leavebook_core::leave::LeaveError;
use leavebook_core::permission::{
    Action, Condition, Decision, Grant, RecordScope, Resource, evaluate,
};
use leavebook_shared::LeaveConfig;
use leavebook_shared::types::{RoleId, UserId};

use crate::entities::{role_permissions, roles, user_roles, users};

use super::error::map_db_err;

/// Repository resolving a principal's permissions.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    db: DatabaseConnection,
}

impl PermissionRepository {
    /// Creates a new permission repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Roles assigned to a user.
    pub async fn roles_of(&self, user_id: UserId) -> Result<Vec<roles::Model>, LeaveError> {
        roles_of(&self.db, user_id).await
    }

    /// Grants held through the given roles.
    pub async fn list_permissions(&self, role_ids: &[RoleId]) -> Result<Vec<Grant>, LeaveError> {
        list_permissions(&self.db, role_ids).await
    }

    /// Manager of a user, if any.
    pub async fn manager_of(&self, user_id: UserId) -> Result<Option<UserId>, LeaveError> {
        manager_of(&self.db, user_id).await
    }

    /// Resolves the decision for `(resource, action)`.
    pub async fn evaluate(
        &self,
        principal: UserId,
        resource: Resource,
        action: Action,
    ) -> Result<Decision, LeaveError> {
        let roles = self.roles_of(principal).await?;
        if roles.is_empty() {
            return Ok(Decision::Denied);
        }
        let role_ids: Vec<RoleId> = roles.iter().map(|r| RoleId::from_uuid(r.id)).collect();
        let grants = self.list_permissions(&role_ids).await?;
        Ok(evaluate(&grants, resource, action))
    }

    /// Builds the record scope for `owner`, fetching the manager only when
    /// the decision depends on it.
    pub async fn scope_for(
        &self,
        decision: &Decision,
        principal: UserId,
        owner: UserId,
    ) -> Result<RecordScope, LeaveError> {
        let owner_manager = if decision.has_condition(Condition::DirectReportsOnly) {
            self.manager_of(owner).await?
        } else {
            None
        };
        Ok(RecordScope {
            principal,
            owner,
            owner_manager,
        })
    }

    /// Returns true if `principal` may perform `action` on a record owned by
    /// `owner`. Lack of permission is `false`, never an error.
    pub async fn can_access(
        &self,
        principal: UserId,
        resource: Resource,
        action: Action,
        owner: UserId,
    ) -> Result<bool, LeaveError> {
        let decision = self.evaluate(principal, resource, action).await?;
        if !decision.is_allowed() {
            return Ok(false);
        }
        let scope = self.scope_for(&decision, principal, owner).await?;
        Ok(decision.permits(&scope))
    }

    /// Returns true if the principal holds one of the configured reviewer roles.
    pub async fn has_elevated_role(
        &self,
        principal: UserId,
        config: &LeaveConfig,
    ) -> Result<bool, LeaveError> {
        let roles = self.roles_of(principal).await?;
        Ok(roles.iter().any(|r| config.is_elevated_role(&r.name)))
    }
}

async fn roles_of<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<Vec<roles::Model>, LeaveError> {
    let role_ids: Vec<Uuid> = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id.into_inner()))
        .all(conn)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(|ur| ur.role_id)
        .collect();

    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    roles::Entity::find()
        .filter(roles::Column::Id.is_in(role_ids))
        .all(conn)
        .await
        .map_err(map_db_err)
}

async fn list_permissions<C: ConnectionTrait>(
    conn: &C,
    role_ids: &[RoleId],
) -> Result<Vec<Grant>, LeaveError> {
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = role_permissions::Entity::find()
        .filter(role_permissions::Column::RoleId.is_in(role_ids.iter().copied().map(RoleId::into_inner)))
        .all(conn)
        .await
        .map_err(map_db_err)?;

    Ok(rows.iter().filter_map(grant_from_row).collect())
}

/// Parses a stored permission row.
///
/// Rows naming an unknown resource, action or condition are skipped so a
/// typo can never widen access.
fn grant_from_row(row: &role_permissions::Model) -> Option<Grant> {
    let (Some(resource), Some(action)) = (Resource::parse(&row.resource), Action::parse(&row.action))
    else {
        tracing::warn!(
            permission_id = %row.id,
            resource = %row.resource,
            action = %row.action,
            "ignoring permission with unknown resource or action"
        );
        return None;
    };

    let condition = match row.condition.as_deref() {
        None => None,
        Some(raw) => match Condition::parse(raw) {
            Some(condition) => Some(condition),
            None => {
                tracing::warn!(
                    permission_id = %row.id,
                    condition = %raw,
                    "ignoring permission with unknown condition"
                );
                return None;
            }
        },
    };

    Some(Grant {
        resource,
        action,
        condition,
    })
}

pub(crate) async fn manager_of<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<Option<UserId>, LeaveError> {
    let user = users::Entity::find_by_id(user_id.into_inner())
        .one(conn)
        .await
        .map_err(map_db_err)?;
    Ok(user.and_then(|u| u.manager_id).map(UserId::from_uuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(resource: &str, action: &str, condition: Option<&str>) -> role_permissions::Model {
        role_permissions::Model {
            id: Uuid::now_v7(),
            role_id: Uuid::now_v7(),
            resource: resource.to_string(),
            action: action.to_string(),
            condition: condition.map(str::to_string),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_parse_unconditional_row() {
        let grant = grant_from_row(&row("leave_requests", "approve", None)).unwrap();
        assert_eq!(
            grant,
            Grant::unconditional(Resource::LeaveRequests, Action::Approve)
        );
    }

    #[test]
    fn test_parse_scoped_row() {
        let grant = grant_from_row(&row("leave_requests", "read", Some("direct_reports_only")))
            .unwrap();
        assert_eq!(grant.condition, Some(Condition::DirectReportsOnly));
    }

    #[test]
    fn test_unknown_condition_is_ignored() {
        assert!(grant_from_row(&row("leave_requests", "delete", Some("same_team_only"))).is_none());
    }

    #[test]
    fn test_unknown_resource_or_action_is_ignored() {
        assert!(grant_from_row(&row("payslips", "read", None)).is_none());
        assert!(grant_from_row(&row("leave_requests", "export", None)).is_none());
    }
}
