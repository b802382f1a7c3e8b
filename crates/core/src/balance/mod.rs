//! Per-user, per-leave-type, per-year balance ledger.
//!
//! The ledger holds five hour counters and derives `remaining` from them on
//! every read. Movements are named so call sites read as bookkeeping:
//!
//! | Movement | Effect |
//! |---|---|
//! | `reserve` | `scheduled += h` |
//! | `commit_reserved` | `scheduled -= h`, `used += h` |
//! | `release_reserved` | `scheduled -= h` |
//! | `charge` | `used += h` |
//! | `refund` | `used -= h` |

pub mod error;
pub mod types;

#[cfg(test)]
mod types_props;

pub use error::BalanceError;
pub use types::{BalanceKey, LeaveBalance, carry_over_hours};
