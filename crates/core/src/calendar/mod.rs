//! Working-day calendar.
//!
//! Determines how many chargeable days a date range contains for a given
//! holiday region. Everything here is pure and safe to call outside any
//! database transaction.
//!
//! # Modules
//!
//! - `holidays` - Holiday calendar trait and an in-memory implementation
//! - `working_days` - Weekend/holiday aware day counting

pub mod holidays;
pub mod working_days;

#[cfg(test)]
mod working_days_props;

pub use holidays::{HolidayCalendar, HolidaySet, NoHolidays};
pub use working_days::{DateRange, is_weekend, is_working_day, working_days};
