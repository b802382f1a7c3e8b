//! Leave lifecycle error types.

use rust_decimal::Decimal;
use thiserror::Error;

use leavebook_shared::AppError;

use crate::balance::BalanceError;
use crate::leave::policy::PolicyError;
use crate::leave::types::LeaveStatus;

/// Errors returned by leave lifecycle operations.
///
/// Every variant aborts the enclosing transaction; only
/// [`LeaveError::TransientStoreFailure`] is worth retrying.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// No principal supplied.
    #[error("Authentication required")]
    Unauthorized,

    /// The principal may not perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request, user or balance does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Malformed input or a policy rule rejected the request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request overlaps an existing pending or approved request.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Not enough hours left.
    #[error("Insufficient balance: requested {requested}h, available {available}h")]
    InsufficientBalance {
        /// Hours requested.
        requested: Decimal,
        /// Hours remaining.
        available: Decimal,
    },

    /// The request is not in a state that allows the action.
    #[error("Cannot {action} a {status} request")]
    InvalidState {
        /// Current status.
        status: LeaveStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// Lock timeout, serialization failure or lost connection.
    #[error("Transient store failure: {0}")]
    TransientStoreFailure(String),

    /// Any other storage failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl LeaveError {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::InvalidInput(_) => 400,
            Self::Conflict(_) | Self::InvalidState { .. } => 409,
            Self::InsufficientBalance { .. } => 422,
            Self::TransientStoreFailure(_) => 503,
            Self::Store(_) => 500,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Conflict(_) => "CONFLICT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::TransientStoreFailure(_) => "TRANSIENT_STORE_FAILURE",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns true if the whole operation may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreFailure(_))
    }
}

impl From<BalanceError> for LeaveError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::Insufficient {
                requested,
                available,
            } => Self::InsufficientBalance {
                requested,
                available,
            },
        }
    }
}

impl From<PolicyError> for LeaveError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Malformed(_) => Self::Store(err.to_string()),
            PolicyError::Disabled(_)
            | PolicyError::NoticeTooShort { .. }
            | PolicyError::TooLong { .. } => Self::InvalidInput(err.to_string()),
        }
    }
}

impl From<LeaveError> for AppError {
    fn from(err: LeaveError) -> Self {
        let message = err.to_string();
        match err {
            LeaveError::Unauthorized => Self::Unauthorized(message),
            LeaveError::Forbidden(_) => Self::Forbidden(message),
            LeaveError::NotFound { .. } => Self::NotFound(message),
            LeaveError::InvalidInput(_) => Self::Validation(message),
            LeaveError::Conflict(_) | LeaveError::InvalidState { .. } => Self::Conflict(message),
            LeaveError::InsufficientBalance { .. } => Self::BusinessRule(message),
            LeaveError::TransientStoreFailure(_) => Self::Unavailable(message),
            LeaveError::Store(_) => Self::Database(message),
        }
    }
}
