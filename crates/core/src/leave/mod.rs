//! Leave request lifecycle.
//!
//! # Modules
//!
//! - `types` - Request, status and hour calculation types
//! - `error` - Lifecycle error taxonomy
//! - `policy` - Per-leave-type policy rules
//! - `service` - State transitions and authorization rules

pub mod error;
pub mod policy;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LeaveError;
pub use policy::{
    AccrualStyle, CarryOverRule, LeavePolicy, LeaveTypeRule, PolicyError, RequestRules,
};
pub use service::LeaveService;
pub use types::{
    LeaveRequest, LeaveStatus, NewLeaveRequest, Transition, chargeable_hours, hours_per_day,
};
