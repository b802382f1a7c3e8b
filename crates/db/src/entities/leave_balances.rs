//! `SeaORM` Entity for leave_balances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type_id: Uuid,
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub allowance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub used: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub scheduled: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub carried_over: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub adjustment: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::leave_types::Entity",
        from = "Column::LeaveTypeId",
        to = "super::leave_types::Column::Id"
    )]
    LeaveTypes,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::leave_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
