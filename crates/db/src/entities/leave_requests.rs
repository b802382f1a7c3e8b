//! `SeaORM` Entity for leave_requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LeaveStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub half_day: bool,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_hours: Decimal,
    pub status: LeaveStatus,
    pub note: Option<String>,
    pub reviewer_id: Option<Uuid>,
    pub reviewer_note: Option<String>,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub auto_approved: bool,
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
