//! Balance ledger errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by balance ledger checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// The requested hours exceed what the balance still has.
    #[error("Requested {requested}h exceeds remaining balance of {available}h")]
    Insufficient {
        /// Hours requested.
        requested: Decimal,
        /// Hours remaining before the request.
        available: Decimal,
    },
}
