//! `SeaORM` entity definitions.

pub mod prelude;

pub mod audit_logs;
pub mod leave_balances;
pub mod leave_policies;
pub mod leave_requests;
pub mod leave_types;
pub mod public_holidays;
pub mod role_permissions;
pub mod roles;
pub mod sea_orm_active_enums;
pub mod user_roles;
pub mod users;
