//! `SeaORM` active enums mirroring PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_status")]
pub enum LeaveStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "declined")]
    Declined,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<LeaveStatus> for leavebook_core::leave::LeaveStatus {
    fn from(status: LeaveStatus) -> Self {
        match status {
            LeaveStatus::Pending => Self::Pending,
            LeaveStatus::Approved => Self::Approved,
            LeaveStatus::Declined => Self::Declined,
            LeaveStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<leavebook_core::leave::LeaveStatus> for LeaveStatus {
    fn from(status: leavebook_core::leave::LeaveStatus) -> Self {
        use leavebook_core::leave::LeaveStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Approved => Self::Approved,
            Core::Declined => Self::Declined,
            Core::Cancelled => Self::Cancelled,
        }
    }
}
