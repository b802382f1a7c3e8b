//! Balance ledger store and the row-lock helper.
//!
//! Every mutation of a `leave_balances` row goes through
//! [`BalanceRepository::with_locked_balance`]:
//!
//! 1. begin a transaction and set `lock_timeout`
//! 2. lock the row with `SELECT ... FOR UPDATE`, inserting it first if absent
//! 3. run the caller's closure against the locked counters
//! 4. write the counters back and commit
//!
//! Any error in between rolls the whole transaction back.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use leavebook_core::balance::{BalanceKey, LeaveBalance};
use leavebook_core::leave::LeaveError;
use leavebook_shared::types::{LeaveTypeId, UserId};

use crate::entities::leave_balances;

use super::error::map_db_err;
use super::policy::{leave_type_code, policy_for};

/// Boxed future returned by closures passed to
/// [`BalanceRepository::with_locked_balance`].
pub type LockedFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, LeaveError>> + Send + 'c>>;

/// Repository for `leave_balances`.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
    lock_timeout: Duration,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, lock_timeout: Duration) -> Self {
        Self { db, lock_timeout }
    }

    /// Returns the balance for `key`, creating it from the user's policy if
    /// it does not exist yet.
    pub async fn get_or_init(&self, key: BalanceKey) -> Result<LeaveBalance, LeaveError> {
        if let Some(existing) = find_balance(&self.db, key).await? {
            return Ok(to_domain(&existing));
        }
        self.with_locked_balance(key, |_, balance| {
            let snapshot = balance.clone();
            Box::pin(async move { Ok(snapshot) })
        })
        .await
    }

    /// Runs `f` while holding the row lock on the balance for `key`.
    ///
    /// The closure receives the transaction (to write other rows atomically
    /// with the balance) and the locked counters. Counters are persisted and
    /// the transaction committed only if `f` succeeds.
    pub async fn with_locked_balance<T, F>(&self, key: BalanceKey, f: F) -> Result<T, LeaveError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction, &'c mut LeaveBalance) -> LockedFuture<'c, T>
            + Send,
    {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        set_lock_timeout(&txn, self.lock_timeout).await?;

        let row = lock_or_init(&txn, key).await?;
        let mut balance = to_domain(&row);
        let before = balance.clone();

        // Dropping `txn` on error rolls back.
        let value = f(&txn, &mut balance).await?;

        if balance != before {
            let mut active: leave_balances::ActiveModel = row.into();
            active.allowance = Set(balance.allowance);
            active.used = Set(balance.used);
            active.scheduled = Set(balance.scheduled);
            active.carried_over = Set(balance.carried_over);
            active.adjustment = Set(balance.adjustment);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(
            user_id = %key.user_id,
            leave_type_id = %key.leave_type_id,
            year = key.year,
            remaining = %balance.remaining(),
            "balance updated under lock"
        );

        Ok(value)
    }
}

async fn set_lock_timeout(txn: &DatabaseTransaction, timeout: Duration) -> Result<(), LeaveError> {
    let sql = format!("SET LOCAL lock_timeout = '{}ms'", timeout.as_millis());
    txn.execute_unprepared(&sql).await.map_err(map_db_err)?;
    Ok(())
}

fn key_filter(key: BalanceKey) -> sea_orm::Condition {
    sea_orm::Condition::all()
        .add(leave_balances::Column::UserId.eq(key.user_id.into_inner()))
        .add(leave_balances::Column::LeaveTypeId.eq(key.leave_type_id.into_inner()))
        .add(leave_balances::Column::Year.eq(key.year))
}

async fn find_balance<C: ConnectionTrait>(
    conn: &C,
    key: BalanceKey,
) -> Result<Option<leave_balances::Model>, LeaveError> {
    leave_balances::Entity::find()
        .filter(key_filter(key))
        .one(conn)
        .await
        .map_err(map_db_err)
}

async fn lock_balance(
    txn: &DatabaseTransaction,
    key: BalanceKey,
) -> Result<Option<leave_balances::Model>, LeaveError> {
    leave_balances::Entity::find()
        .filter(key_filter(key))
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(map_db_err)
}

/// Locks the row for `key`, inserting the opening balance first if absent.
///
/// Concurrent initializers race on the unique key; the loser's insert is a
/// no-op and it then waits on the winner's lock.
async fn lock_or_init(
    txn: &DatabaseTransaction,
    key: BalanceKey,
) -> Result<leave_balances::Model, LeaveError> {
    if let Some(row) = lock_balance(txn, key).await? {
        return Ok(row);
    }

    let opening = opening_balance(txn, key).await?;
    leave_balances::Entity::insert(leave_balances::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(key.user_id.into_inner()),
        leave_type_id: Set(key.leave_type_id.into_inner()),
        year: Set(key.year),
        allowance: Set(opening.allowance),
        used: Set(opening.used),
        scheduled: Set(opening.scheduled),
        carried_over: Set(opening.carried_over),
        adjustment: Set(opening.adjustment),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            leave_balances::Column::UserId,
            leave_balances::Column::LeaveTypeId,
            leave_balances::Column::Year,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(txn)
    .await
    .map_err(map_db_err)?;

    tracing::info!(
        user_id = %key.user_id,
        leave_type_id = %key.leave_type_id,
        year = key.year,
        allowance = %opening.allowance,
        carried_over = %opening.carried_over,
        "initialized leave balance"
    );

    lock_balance(txn, key)
        .await?
        .ok_or_else(|| LeaveError::Store(format!("balance row for {key:?} vanished after insert")))
}

async fn opening_balance<C: ConnectionTrait>(
    conn: &C,
    key: BalanceKey,
) -> Result<LeaveBalance, LeaveError> {
    let code = leave_type_code(conn, key.leave_type_id).await?;
    let policy = policy_for(conn, key.user_id).await?;
    let previous = find_balance(conn, key.previous_year())
        .await?
        .map(|row| to_domain(&row));
    let today = Utc::now().date_naive();
    Ok(policy.opening_balance(key, &code, previous.as_ref(), today))
}

/// Converts a stored row into ledger counters.
pub fn to_domain(row: &leave_balances::Model) -> LeaveBalance {
    LeaveBalance {
        key: BalanceKey::new(
            UserId::from_uuid(row.user_id),
            LeaveTypeId::from_uuid(row.leave_type_id),
            row.year,
        ),
        allowance: row.allowance,
        used: row.used,
        scheduled: row.scheduled,
        carried_over: row.carried_over,
        adjustment: row.adjustment,
    }
}
