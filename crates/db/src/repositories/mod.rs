//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod audit;
pub mod balance;
pub mod error;
pub mod holiday;
pub mod leave_request;
pub mod permission;
pub mod policy;

pub use audit::AuditRepository;
pub use balance::{BalanceRepository, LockedFuture};
pub use error::{is_transient, map_db_err};
pub use holiday::HolidayRepository;
pub use leave_request::LeaveRequestRepository;
pub use permission::PermissionRepository;
pub use policy::PolicyRepository;
