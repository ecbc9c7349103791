//! Gap-tolerant streak detection over check-in history.
//!
//! A streak is a run of `success` check-ins where consecutive successes are at
//! most [`GAP_TOLERANCE_DAYS`] apart. Any `fold` breaks the run. The same
//! tolerance applies to every cadence, so a daily pact may go quiet for up to
//! a week without losing its streak.
//!
//! The current streak additionally expires when the most recent success is
//! more than the tolerance before the reference date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pact::CheckInRecord;

/// Maximum number of days between consecutive successes in one streak.
pub const GAP_TOLERANCE_DAYS: i64 = 7;

/// Current and longest streak for one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    /// Length of the unbroken success run ending at the latest check-in
    pub current: u32,
    /// Longest success run anywhere in the history
    pub longest: u32,
}

/// Gap tolerance used when detecting streaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
    pub gap_tolerance_days: i64,
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            gap_tolerance_days: GAP_TOLERANCE_DAYS,
        }
    }
}

impl StreakPolicy {
    pub fn with_tolerance(gap_tolerance_days: i64) -> Self {
        Self { gap_tolerance_days }
    }

    fn within_tolerance(&self, earlier: NaiveDate, later: NaiveDate) -> bool {
        (later - earlier).num_days() <= self.gap_tolerance_days
    }

    /// Longest success run, scanning forward.
    pub fn longest_streak(&self, history: &[CheckInRecord]) -> u32 {
        let mut run = 0u32;
        let mut last_success: Option<NaiveDate> = None;
        let mut longest = 0u32;

        for record in history {
            if !record.is_success() {
                run = 0;
                last_success = None;
                continue;
            }

            run = match last_success {
                Some(prev) if self.within_tolerance(prev, record.date) => run + 1,
                _ => 1,
            };
            last_success = Some(record.date);
            longest = longest.max(run);
        }

        longest
    }

    /// Success run ending at the most recent record, scanning backward.
    ///
    /// Zero when the latest record is a fold or the latest success has
    /// expired relative to `as_of`.
    pub fn current_streak(&self, history: &[CheckInRecord], as_of: NaiveDate) -> u32 {
        let Some(latest) = history.last() else {
            return 0;
        };
        if !latest.is_success() || !self.within_tolerance(latest.date, as_of) {
            return 0;
        }

        let mut current = 1u32;
        let mut previous = latest.date;
        for record in history.iter().rev().skip(1) {
            if !record.is_success() || !self.within_tolerance(record.date, previous) {
                break;
            }
            current += 1;
            previous = record.date;
        }

        current
    }

    pub fn compute(&self, history: &[CheckInRecord], as_of: NaiveDate) -> Streaks {
        Streaks {
            current: self.current_streak(history, as_of),
            longest: self.longest_streak(history),
        }
    }
}

/// Current and longest streaks with the default 7-day tolerance.
///
/// `history` must already be sorted ascending by date; it is not re-sorted.
pub fn compute_streaks(history: &[CheckInRecord], as_of: NaiveDate) -> Streaks {
    StreakPolicy::default().compute(history, as_of)
}

/// Same as [`compute_streaks`] with an explicit policy.
pub fn compute_streaks_with(
    history: &[CheckInRecord],
    as_of: NaiveDate,
    policy: &StreakPolicy,
) -> Streaks {
    policy.compute(history, as_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pact::Outcome;
    use chrono::Duration;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    /// Build a history from `(day offset, outcome)` pairs relative to `base()`.
    fn history(entries: &[(i64, Outcome)]) -> Vec<CheckInRecord> {
        entries
            .iter()
            .map(|(offset, outcome)| {
                CheckInRecord::new("pact", "user", base() + Duration::days(*offset), *outcome)
            })
            .collect()
    }

    const S: Outcome = Outcome::Success;
    const F: Outcome = Outcome::Fold;

    #[test]
    fn test_empty_history() {
        assert_eq!(compute_streaks(&[], base()), Streaks { current: 0, longest: 0 });
    }

    #[test]
    fn test_trailing_fold_breaks_current() {
        let h = history(&[(0, S), (1, S), (2, S), (3, F)]);
        let streaks = compute_streaks(&h, base() + Duration::days(3));
        assert_eq!(streaks, Streaks { current: 0, longest: 3 });
    }

    #[test]
    fn test_single_success_expires() {
        let h = history(&[(0, S)]);
        assert_eq!(compute_streaks(&h, base() + Duration::days(10)).current, 0);
        assert_eq!(compute_streaks(&h, base() + Duration::days(10)).longest, 1);
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let h = history(&[(0, S)]);
        assert_eq!(compute_streaks(&h, base() + Duration::days(7)).current, 1);
        assert_eq!(compute_streaks(&h, base() + Duration::days(8)).current, 0);
    }

    #[test]
    fn test_gap_within_tolerance_keeps_run() {
        // Six silent days between successes still counts as unbroken
        let h = history(&[(0, S), (7, S), (14, S)]);
        assert_eq!(
            compute_streaks(&h, base() + Duration::days(14)),
            Streaks {
                current: 3,
                longest: 3
            }
        );
    }

    #[test]
    fn test_gap_beyond_tolerance_restarts_run() {
        let h = history(&[(0, S), (1, S), (2, S), (10, S), (11, S)]);
        let streaks = compute_streaks(&h, base() + Duration::days(11));
        assert_eq!(streaks, Streaks { current: 2, longest: 3 });
    }

    #[test]
    fn test_fold_in_middle_splits_runs() {
        let h = history(&[(0, S), (1, S), (2, F), (3, S), (4, S), (5, S), (6, S)]);
        let streaks = compute_streaks(&h, base() + Duration::days(6));
        assert_eq!(streaks, Streaks { current: 4, longest: 4 });
    }

    #[test]
    fn test_fold_does_not_lower_longest() {
        let h = history(&[(0, S), (1, S), (2, S), (3, S), (4, F), (5, S)]);
        let streaks = compute_streaks(&h, base() + Duration::days(5));
        assert_eq!(streaks, Streaks { current: 1, longest: 4 });
    }

    #[test]
    fn test_only_folds() {
        let h = history(&[(0, F), (1, F)]);
        assert_eq!(compute_streaks(&h, base() + Duration::days(1)), Streaks::default());
    }

    #[test]
    fn test_custom_policy_tolerance() {
        let h = history(&[(0, S), (2, S), (4, S)]);
        let strict = StreakPolicy::with_tolerance(1);
        let streaks = compute_streaks_with(&h, base() + Duration::days(4), &strict);
        assert_eq!(streaks, Streaks { current: 1, longest: 1 });

        let lenient = compute_streaks(&h, base() + Duration::days(4));
        assert_eq!(lenient, Streaks { current: 3, longest: 3 });
    }
}
