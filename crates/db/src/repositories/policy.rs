//! Leave policy and leave type store.

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use leavebook_core::leave::{LeaveError, LeavePolicy};
use leavebook_shared::types::{LeaveTypeId, UserId};

use crate::entities::{leave_policies, leave_types, users};

use super::error::map_db_err;

/// Repository resolving the policy that applies to a user.
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    db: DatabaseConnection,
}

impl PolicyRepository {
    /// Creates a new policy repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The user's assigned policy, else the default policy, else an empty one.
    pub async fn policy_for(&self, user_id: UserId) -> Result<LeavePolicy, LeaveError> {
        policy_for(&self.db, user_id).await
    }

    /// An active leave type, or `None` if it is unknown or switched off.
    pub async fn active_leave_type(
        &self,
        leave_type_id: LeaveTypeId,
    ) -> Result<Option<leave_types::Model>, LeaveError> {
        active_leave_type(&self.db, leave_type_id).await
    }
}

pub(crate) async fn policy_for<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<LeavePolicy, LeaveError> {
    let assigned = users::Entity::find_by_id(user_id.into_inner())
        .one(conn)
        .await
        .map_err(map_db_err)?
        .and_then(|u| u.policy_id);

    let policy = match assigned {
        Some(policy_id) => leave_policies::Entity::find_by_id(policy_id)
            .one(conn)
            .await
            .map_err(map_db_err)?,
        None => None,
    };

    let policy = match policy {
        Some(p) => Some(p),
        None => leave_policies::Entity::find()
            .filter(leave_policies::Column::IsDefault.eq(true))
            .one(conn)
            .await
            .map_err(map_db_err)?,
    };

    match policy {
        Some(p) => Ok(LeavePolicy::from_json(p.rules)?),
        None => Ok(LeavePolicy::default()),
    }
}

pub(crate) async fn active_leave_type<C: ConnectionTrait>(
    conn: &C,
    leave_type_id: LeaveTypeId,
) -> Result<Option<leave_types::Model>, LeaveError> {
    let leave_type = leave_types::Entity::find_by_id(leave_type_id.into_inner())
        .one(conn)
        .await
        .map_err(map_db_err)?;
    Ok(leave_type.filter(|t| t.is_active))
}

pub(crate) async fn leave_type_code<C: ConnectionTrait>(
    conn: &C,
    leave_type_id: LeaveTypeId,
) -> Result<String, LeaveError> {
    leave_types::Entity::find_by_id(leave_type_id.into_inner())
        .one(conn)
        .await
        .map_err(map_db_err)?
        .map(|t| t.code)
        .ok_or_else(|| LeaveError::not_found("leave type", leave_type_id))
}
