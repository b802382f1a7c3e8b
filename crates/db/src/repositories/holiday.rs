//! Holiday calendar store.

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use leavebook_core::calendar::{DateRange, HolidaySet};
use leavebook_core::leave::LeaveError;

use crate::entities::public_holidays;

use super::error::map_db_err;

/// Repository loading public holidays into an in-memory calendar.
#[derive(Debug, Clone)]
pub struct HolidayRepository {
    db: DatabaseConnection,
}

impl HolidayRepository {
    /// Creates a new holiday repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Holidays of every region falling inside `range`.
    ///
    /// Region matching happens in [`HolidaySet`], so the same calendar serves
    /// any region.
    pub async fn calendar_for(&self, range: DateRange) -> Result<HolidaySet, LeaveError> {
        calendar_for(&self.db, range).await
    }
}

pub(crate) async fn calendar_for<C: ConnectionTrait>(
    conn: &C,
    range: DateRange,
) -> Result<HolidaySet, LeaveError> {
    let rows = public_holidays::Entity::find()
        .filter(public_holidays::Column::Date.between(range.start, range.end))
        .all(conn)
        .await
        .map_err(map_db_err)?;

    Ok(rows.into_iter().map(|h| (h.date, h.region)).collect())
}
