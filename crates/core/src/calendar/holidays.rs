//! Public holiday lookup.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

/// Source of public holidays per region.
pub trait HolidayCalendar {
    /// Returns true if `date` is a public holiday in `region`.
    fn is_public_holiday(&self, date: NaiveDate, region: &str) -> bool;
}

/// Calendar without any public holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_public_holiday(&self, _date: NaiveDate, _region: &str) -> bool {
        false
    }
}

/// In-memory set of holidays, usually loaded for the range being charged.
///
/// Holidays registered without a region apply to every region.
#[derive(Debug, Clone, Default)]
pub struct HolidaySet {
    everywhere: BTreeSet<NaiveDate>,
    regional: BTreeMap<String, BTreeSet<NaiveDate>>,
}

impl HolidaySet {
    /// Creates an empty holiday set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a holiday. `None` as region means nationwide.
    pub fn insert(&mut self, date: NaiveDate, region: Option<&str>) {
        match region {
            Some(region) => {
                self.regional
                    .entry(region.to_lowercase())
                    .or_default()
                    .insert(date);
            }
            None => {
                self.everywhere.insert(date);
            }
        }
    }

    /// Number of distinct (date, region) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.everywhere.len() + self.regional.values().map(BTreeSet::len).sum::<usize>()
    }

    /// Returns true if no holidays are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(NaiveDate, Option<String>)> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Option<String>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (date, region) in iter {
            set.insert(date, region.as_deref());
        }
        set
    }
}

impl HolidayCalendar for HolidaySet {
    fn is_public_holiday(&self, date: NaiveDate, region: &str) -> bool {
        self.everywhere.contains(&date)
            || self
                .regional
                .get(&region.to_lowercase())
                .is_some_and(|dates| dates.contains(&date))
    }
}
