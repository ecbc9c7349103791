//! Expected-occurrence counting over a pact window.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{is_due, CadenceRule, PactMode, WeekdaySet};

/// Inclusive date range over which occurrences are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PactWindow {
    pub start_date: NaiveDate,
    pub as_of: NaiveDate,
}

impl PactWindow {
    pub fn new(start_date: NaiveDate, as_of: NaiveDate) -> Self {
        Self { start_date, as_of }
    }

    /// Inverted windows (`as_of` before `start_date`) are empty.
    pub fn is_empty(&self) -> bool {
        self.as_of < self.start_date
    }

    /// Number of calendar days in the window, counting both endpoints.
    pub fn day_count(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        ((self.as_of - self.start_date).num_days() + 1) as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.as_of
    }

    /// Every date in the window, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let as_of = self.as_of;
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= as_of)
    }
}

/// Number of Mondays in `[start, end]`, without iterating.
pub fn count_mondays(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let offset = (7 - start.weekday().num_days_from_monday()) % 7;
    let first_monday = start + Duration::days(offset as i64);
    if first_monday > end {
        return 0;
    }
    ((end - first_monday).num_days() / 7 + 1) as u32
}

/// How many times a participant was due between `start_date` and `as_of`.
///
/// Daily and weekly non-relay pacts use closed forms; every other
/// combination walks the window day by day through [`is_due`].
pub fn expected_occurrences(
    rule: &CadenceRule,
    mode: PactMode,
    relay_assignment: Option<&WeekdaySet>,
    start_date: NaiveDate,
    as_of: NaiveDate,
) -> u32 {
    let window = PactWindow::new(start_date, as_of);
    if window.is_empty() {
        return 0;
    }

    match (mode, rule) {
        (PactMode::Relay, _) | (_, CadenceRule::Custom { .. }) => window
            .dates()
            .filter(|d| is_due(rule, mode, relay_assignment, *d))
            .count() as u32,
        (_, CadenceRule::Daily) => window.day_count(),
        (_, CadenceRule::Weekly) => count_mondays(start_date, as_of),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_day_count_inclusive() {
        assert_eq!(PactWindow::new(date(2024, 1, 1), date(2024, 1, 10)).day_count(), 10);
        assert_eq!(PactWindow::new(date(2024, 1, 1), date(2024, 1, 1)).day_count(), 1);
        assert_eq!(PactWindow::new(date(2024, 1, 2), date(2024, 1, 1)).day_count(), 0);
        assert_eq!(PactWindow::new(date(2024, 1, 1), date(2024, 1, 10)).dates().count(), 10);
    }

    #[test]
    fn test_daily_counts_every_day() {
        let n = expected_occurrences(
            &CadenceRule::Daily,
            PactMode::Individual,
            None,
            date(2024, 1, 1),
            date(2024, 1, 10),
        );
        assert_eq!(n, 10);
    }

    #[test]
    fn test_inverted_range_is_zero() {
        let n = expected_occurrences(
            &CadenceRule::Daily,
            PactMode::Group,
            None,
            date(2024, 2, 1),
            date(2024, 1, 31),
        );
        assert_eq!(n, 0);
    }

    #[test]
    fn test_weekly_counts_mondays() {
        // January 2024 Mondays: 1, 8, 15, 22, 29
        let n = expected_occurrences(
            &CadenceRule::Weekly,
            PactMode::Individual,
            None,
            date(2024, 1, 1),
            date(2024, 1, 31),
        );
        assert_eq!(n, 5);
        // Tuesday..Sunday holds no Monday
        assert_eq!(count_mondays(date(2024, 1, 2), date(2024, 1, 7)), 0);
        assert_eq!(count_mondays(date(2024, 1, 2), date(2024, 1, 8)), 1);
    }

    #[test]
    fn test_custom_counts_listed_days() {
        let rule = CadenceRule::custom(WeekdaySet::from_numbers([1, 3, 5]).unwrap());
        // Two full weeks starting Monday 2024-01-01
        let n = expected_occurrences(
            &rule,
            PactMode::Group,
            None,
            date(2024, 1, 1),
            date(2024, 1, 14),
        );
        assert_eq!(n, 6);
    }

    #[test]
    fn test_relay_counts_assignment_not_cadence() {
        let wednesday = WeekdaySet::from_numbers([3]).unwrap();
        let n = expected_occurrences(
            &CadenceRule::Daily,
            PactMode::Relay,
            Some(&wednesday),
            date(2024, 1, 1),
            date(2024, 1, 31),
        );
        // Wednesdays: 3, 10, 17, 24, 31
        assert_eq!(n, 5);

        let none = expected_occurrences(
            &CadenceRule::Daily,
            PactMode::Relay,
            None,
            date(2024, 1, 1),
            date(2024, 1, 31),
        );
        assert_eq!(none, 0);
    }
}
