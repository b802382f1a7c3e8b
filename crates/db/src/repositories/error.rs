//! Mapping of storage failures onto the lifecycle error taxonomy.

use sea_orm::{DbErr, RuntimeErr};

use leavebook_core::leave::LeaveError;

/// PostgreSQL SQLSTATE codes that indicate a retryable failure.
const TRANSIENT_SQLSTATES: &[&str] = &[
    "55P03", // lock_not_available
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "57014", // query_canceled
];

/// SQLSTATE raised when the active-overlap exclusion constraint rejects a row.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Classifies a `SeaORM` error.
///
/// Connection problems and lock/serialization conflicts become
/// [`LeaveError::TransientStoreFailure`]; overlapping active requests
/// rejected by the database become [`LeaveError::Conflict`]; everything
/// else is [`LeaveError::Store`].
pub fn map_db_err(err: DbErr) -> LeaveError {
    if sqlstate(&err).as_deref() == Some(EXCLUSION_VIOLATION) {
        tracing::info!(error = %err, "overlapping active leave request rejected");
        LeaveError::Conflict("overlaps an existing active leave request".into())
    } else if is_transient(&err) {
        tracing::warn!(error = %err, "transient store failure");
        LeaveError::TransientStoreFailure(err.to_string())
    } else {
        tracing::error!(error = %err, "store failure");
        LeaveError::Store(err.to_string())
    }
}

/// Returns true if retrying the whole operation may succeed.
pub fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => is_transient_runtime(runtime),
        _ => false,
    }
}

fn is_transient_runtime(err: &RuntimeErr) -> bool {
    match err {
        RuntimeErr::SqlxError(sqlx_err) => match sqlx_err {
            sqlx::Error::Database(db_err) => db_err
                .code()
                .is_some_and(|code| is_transient_sqlstate(&code)),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
            _ => false,
        },
        RuntimeErr::Internal(_) => false,
    }
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            db_err.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

/// Returns true for SQLSTATE codes listed as transient.
pub fn is_transient_sqlstate(code: &str) -> bool {
    TRANSIENT_SQLSTATES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sea_orm::ConnAcquireErr;

    #[rstest]
    #[case("55P03", true)]
    #[case("40001", true)]
    #[case("40P01", true)]
    #[case("57014", true)]
    #[case("23505", false)]
    #[case("23503", false)]
    #[case("23P01", false)]
    fn test_sqlstate_classification(#[case] code: &str, #[case] transient: bool) {
        assert_eq!(is_transient_sqlstate(code), transient);
    }

    #[test]
    fn test_connection_errors_are_transient() {
        let err = map_db_err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_errors_are_store_failures() {
        let err = map_db_err(DbErr::Custom("boom".into()));
        assert_eq!(err.error_code(), "STORE_ERROR");
        assert!(!err.is_retryable());

        let err = map_db_err(DbErr::Exec(RuntimeErr::Internal("bad".into())));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_non_database_errors_have_no_sqlstate() {
        assert_eq!(sqlstate(&DbErr::Custom("x".into())), None);
        assert_eq!(
            sqlstate(&DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut))),
            None
        );
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        let err = DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut));
        assert!(is_transient(&err));
    }
}
