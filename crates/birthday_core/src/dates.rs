//! Calendar helpers for recurring (day, month) anniversaries.
//!
//! # Responsibility
//! - Decide whether a `(day, month)` pair is a real anniversary date.
//! - Resolve the next occurrence of an anniversary relative to a date.
//!
//! # Invariants
//! - February always accepts 29 regardless of any particular year.
//! - `next_occurrence` never returns a date earlier than its reference.
//! - In common years, 29 February is observed on 28 February.

use chrono::{Datelike, NaiveDate};

const DAYS_IN_MONTH: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Returns whether `(day, month)` names a date that exists in some year.
pub fn is_real_date(day: u32, month: u32) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }
    day >= 1 && day <= DAYS_IN_MONTH[(month - 1) as usize]
}

/// Returns whether `year` has a 29 February.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Resolves the concrete date an anniversary falls on in `year`.
///
/// Returns `None` only when `(day, month)` fails [`is_real_date`].
pub fn observed_in_year(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    if !is_real_date(day, month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        // Only 29/02 in a common year reaches this point.
        NaiveDate::from_ymd_opt(year, 2, 28)
    })
}

/// Computes the nearest occurrence of `(day, month)` on or after `reference`.
///
/// Time of day plays no part: callers pass the reference as a calendar date
/// in the operational timezone.
///
/// Returns `None` when `(day, month)` is not a real date.
pub fn next_occurrence(day: u32, month: u32, reference: NaiveDate) -> Option<NaiveDate> {
    let this_year = observed_in_year(day, month, reference.year())?;
    if this_year >= reference {
        return Some(this_year);
    }
    observed_in_year(day, month, reference.year() + 1)
}

/// Returns every stored `(day, month)` key that is celebrated on `date`.
///
/// On 28 February of a common year this includes `(29, 2)`.
pub fn anniversary_keys_on(date: NaiveDate) -> Vec<(u32, u32)> {
    let mut keys = vec![(date.day(), date.month())];
    if date.month() == 2 && date.day() == 28 && !is_leap_year(date.year()) {
        keys.push((29, 2));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::{anniversary_keys_on, is_real_date, next_occurrence, observed_in_year};
    use chrono::{Datelike, NaiveDate};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn is_real_date_follows_fixed_month_table() {
        assert!(is_real_date(29, 2));
        assert!(is_real_date(31, 12));
        assert!(is_real_date(1, 1));
        assert!(!is_real_date(30, 2));
        assert!(!is_real_date(31, 4));
        assert!(!is_real_date(0, 5));
        assert!(!is_real_date(15, 13));
        assert!(!is_real_date(15, 0));
    }

    #[test]
    fn next_occurrence_keeps_today_and_later_dates_in_current_year() {
        let reference = date(2026, 6, 15);
        assert_eq!(next_occurrence(15, 6, reference), Some(date(2026, 6, 15)));
        assert_eq!(next_occurrence(31, 12, reference), Some(date(2026, 12, 31)));
    }

    #[test]
    fn next_occurrence_rolls_past_dates_into_next_year() {
        let reference = date(2026, 6, 15);
        assert_eq!(next_occurrence(1, 1, reference), Some(date(2027, 1, 1)));
        assert_eq!(next_occurrence(14, 6, reference), Some(date(2027, 6, 14)));
    }

    #[test]
    fn next_occurrence_handles_leap_day() {
        assert_eq!(next_occurrence(29, 2, date(2028, 1, 10)), Some(date(2028, 2, 29)));
        assert_eq!(next_occurrence(29, 2, date(2026, 1, 10)), Some(date(2026, 2, 28)));
        assert_eq!(next_occurrence(29, 2, date(2027, 3, 1)), Some(date(2028, 2, 29)));
    }

    #[test]
    fn next_occurrence_rejects_unreal_dates() {
        assert_eq!(next_occurrence(31, 4, date(2026, 1, 1)), None);
        assert_eq!(observed_in_year(30, 2, 2028), None);
    }

    #[test]
    fn next_occurrence_is_never_before_reference_across_a_year() {
        let start = date(2027, 1, 1);
        for offset in 0..365 {
            let reference = start + chrono::Duration::days(offset);
            for (day, month) in [(1, 1), (29, 2), (9, 6), (31, 12)] {
                let next = next_occurrence(day, month, reference).unwrap();
                assert!(next >= reference);
                assert!(next.year() == reference.year() || next.year() == reference.year() + 1);
                assert_eq!(next.month(), month);
            }
        }
    }

    #[test]
    fn anniversary_keys_include_leap_day_on_common_year_february_28() {
        assert_eq!(anniversary_keys_on(date(2026, 2, 28)), vec![(28, 2), (29, 2)]);
        assert_eq!(anniversary_keys_on(date(2028, 2, 28)), vec![(28, 2)]);
        assert_eq!(anniversary_keys_on(date(2028, 2, 29)), vec![(29, 2)]);
    }
}
