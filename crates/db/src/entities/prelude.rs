//! Entity re-exports.

pub use super::audit_logs::Entity as AuditLogs;
pub use super::leave_balances::Entity as LeaveBalances;
pub use super::leave_policies::Entity as LeavePolicies;
pub use super::leave_requests::Entity as LeaveRequests;
pub use super::leave_types::Entity as LeaveTypes;
pub use super::public_holidays::Entity as PublicHolidays;
pub use super::role_permissions::Entity as RolePermissions;
pub use super::roles::Entity as Roles;
pub use super::user_roles::Entity as UserRoles;
pub use super::users::Entity as Users;
