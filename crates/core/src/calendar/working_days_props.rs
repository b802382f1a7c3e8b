//! Property-based tests for the working-day calculator.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use super::holidays::{HolidaySet, NoHolidays};
use super::working_days::{DateRange, is_working_day, working_days};

/// Strategy for dates within 2020..2030.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Strategy for a valid range up to ~3 months long.
fn arb_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (arb_date(), 0i64..90).prop_map(|(start, len)| (start, start + Duration::days(len)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Working days never exceed calendar days.
    #[test]
    fn prop_working_days_bounded_by_calendar_days((start, end) in arb_range()) {
        let calendar_days = (end - start).num_days() + 1;
        let count = working_days(&NoHolidays, start, end, "x");
        prop_assert!(i64::from(count) <= calendar_days);
    }

    /// Splitting a range at any day gives the same total.
    #[test]
    fn prop_working_days_additive((start, end) in arb_range(), split in 0i64..90) {
        let mid = start + Duration::days(split);
        prop_assume!(mid < end);
        let whole = working_days(&NoHolidays, start, end, "x");
        let left = working_days(&NoHolidays, start, mid, "x");
        let right = working_days(&NoHolidays, mid + Duration::days(1), end, "x");
        prop_assert_eq!(whole, left + right);
    }

    /// Any full week contains exactly five working days without holidays.
    #[test]
    fn prop_full_week_has_five_working_days(start in arb_date()) {
        let end = start + Duration::days(6);
        prop_assert_eq!(working_days(&NoHolidays, start, end, "x"), 5);
    }

    /// Adding a holiday on a working day removes exactly one day.
    #[test]
    fn prop_holiday_removes_one_day((start, end) in arb_range(), pick in 0i64..90) {
        let holiday = start + Duration::days(pick);
        prop_assume!(holiday <= end);
        prop_assume!(is_working_day(&NoHolidays, holiday, "x"));

        let mut holidays = HolidaySet::new();
        holidays.insert(holiday, Some("x"));

        let before = working_days(&NoHolidays, start, end, "x");
        let after = working_days(&holidays, start, end, "x");
        prop_assert_eq!(after + 1, before);
    }

    /// Overlap is symmetric.
    #[test]
    fn prop_overlap_symmetric(a in arb_range(), b in arb_range()) {
        let a = DateRange::new(a.0, a.1).unwrap();
        let b = DateRange::new(b.0, b.1).unwrap();
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }
}
