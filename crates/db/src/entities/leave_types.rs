//! `SeaORM` Entity for leave_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::leave_requests::Entity")]
    LeaveRequests,
    #[sea_orm(has_many = "super::leave_balances::Entity")]
    LeaveBalances,
}

impl Related<super::leave_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveRequests.def()
    }
}

impl Related<super::leave_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
