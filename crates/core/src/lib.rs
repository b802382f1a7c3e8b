//! Core leave accounting logic for Leavebook.
//!
//! This crate contains pure business logic with no database or web
//! dependencies:
//!
//! - `calendar` - Working-day calculator over a holiday calendar
//! - `permission` - Role grant resolution and record-scoped checks
//! - `balance` - Balance ledger counters and movements
//! - `leave` - Request lifecycle state machine, policy rules and errors
//! - `audit` - Audit sink abstraction

pub mod audit;
pub mod balance;
pub mod calendar;
pub mod leave;
pub mod permission;
