//! Weekend and holiday aware day counting.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::holidays::HolidayCalendar;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, returning `None` if `start` is after `end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Returns true if the two ranges share at least one calendar day.
    ///
    /// Touching ranges overlap, adjacent ranges do not.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        other.start <= self.end && other.end >= self.start
    }

    /// Iterates every day of the range.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Year the range is charged to (year of the start date).
    #[must_use]
    pub fn charge_year(&self) -> i32 {
        self.start.year()
    }
}

/// Returns true for Saturdays and Sundays.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Returns true if `date` is neither a weekend day nor a public holiday in `region`.
#[must_use]
pub fn is_working_day<C: HolidayCalendar + ?Sized>(
    calendar: &C,
    date: NaiveDate,
    region: &str,
) -> bool {
    !is_weekend(date) && !calendar.is_public_holiday(date, region)
}

/// Counts working days in `[start, end]` inclusive.
///
/// Returns 0 when `start` is after `end`.
#[must_use]
pub fn working_days<C: HolidayCalendar + ?Sized>(
    calendar: &C,
    start: NaiveDate,
    end: NaiveDate,
    region: &str,
) -> u32 {
    let Some(range) = DateRange::new(start, end) else {
        return 0;
    };

    let count = range
        .days()
        .filter(|d| is_working_day(calendar, *d, region))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
