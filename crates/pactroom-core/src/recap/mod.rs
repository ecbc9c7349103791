//! Weekly recap generation.
//!
//! A recap looks back over the last `window_days` (default 7) ending at the
//! reference date and reports, per participant, how many times they were due,
//! how they answered, and what they missed. Participants who folded or missed
//! a due day get a roast line; the best performer is called out as the
//! standout.

mod roast;

use std::cmp::Reverse;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cadence::{expected_occurrences, is_due, PactWindow};
use crate::error::Result;
use crate::pact::{CheckInHistory, CheckInRecord, Outcome, Pact, Participant};
use crate::stats::{completion_rate, StreakPolicy};
use crate::storage::{CheckInReader, DateRange, PactReader};

pub use roast::{pick_roast, RoastReason};

/// Recap settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapConfig {
    pub window_days: u32,
    pub roast_on_fold: bool,
    pub roast_on_missed: bool,
    pub streak_policy: StreakPolicy,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            roast_on_fold: true,
            roast_on_missed: true,
            streak_policy: StreakPolicy::default(),
        }
    }
}

/// One participant's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapEntry {
    pub user_id: String,
    /// Due dates inside the recap window
    pub due: u32,
    pub successes: u32,
    pub folds: u32,
    /// Due dates in the window with no check-in at all
    pub missed: u32,
    pub completion_rate_percent: u32,
    /// Streak over the whole history, as of the recap date
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roast {
    pub user_id: String,
    pub reason: RoastReason,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRecap {
    pub pact_id: String,
    pub pact_name: String,
    pub window: PactWindow,
    pub entries: Vec<RecapEntry>,
    pub total_due: u64,
    pub total_successes: u64,
    pub total_folds: u64,
    pub total_missed: u64,
    pub completion_rate_percent: u32,
    /// Best completion rate among participants who were due at least once
    pub standout: Option<String>,
    pub roasts: Vec<Roast>,
}

impl WeeklyRecap {
    pub fn entry(&self, user_id: &str) -> Option<&RecapEntry> {
        self.entries.iter().find(|e| e.user_id == user_id)
    }
}

/// Recap window ending at `as_of`, clipped to the pact start.
pub fn recap_window(pact: &Pact, as_of: NaiveDate, window_days: u32) -> PactWindow {
    let lookback = Duration::days(i64::from(window_days.max(1)) - 1);
    let start = as_of
        .checked_sub_signed(lookback)
        .unwrap_or(NaiveDate::MIN)
        .max(pact.start_date);
    PactWindow::new(start, as_of)
}

/// Build the recap for the window ending at `as_of`.
pub fn weekly_recap(
    pact: &Pact,
    participants: &[Participant],
    history: &[CheckInRecord],
    as_of: NaiveDate,
    config: &RecapConfig,
) -> WeeklyRecap {
    let window = recap_window(pact, as_of, config.window_days);
    let mut entries = Vec::new();
    let mut roasts = Vec::new();

    for participant in participants.iter().filter(|p| p.pact_id == pact.id) {
        let own = CheckInHistory::sorted(
            history
                .iter()
                .filter(|r| {
                    r.pact_id == pact.id && r.user_id == participant.user_id && r.date <= as_of
                })
                .cloned()
                .collect(),
        );
        let in_window: Vec<&CheckInRecord> = own
            .records()
            .iter()
            .filter(|r| window.contains(r.date))
            .collect();

        let relay = participant.relay_assignment.as_ref();
        let due = expected_occurrences(
            &pact.cadence,
            pact.mode,
            relay,
            window.start_date,
            window.as_of,
        );
        let successes = in_window
            .iter()
            .filter(|r| r.outcome == Outcome::Success)
            .count() as u32;
        let folds = in_window
            .iter()
            .filter(|r| r.outcome == Outcome::Fold)
            .count() as u32;
        let missed = window
            .dates()
            .filter(|d| is_due(&pact.cadence, pact.mode, relay, *d))
            .filter(|d| !in_window.iter().any(|r| r.date == *d))
            .count() as u32;
        let streaks = config.streak_policy.compute(own.records(), as_of);

        if config.roast_on_fold && folds > 0 {
            roasts.push(roast_for(pact, &participant.user_id, as_of, RoastReason::Folded));
        } else if config.roast_on_missed && missed > 0 {
            roasts.push(roast_for(pact, &participant.user_id, as_of, RoastReason::Missed));
        }

        entries.push(RecapEntry {
            user_id: participant.user_id.clone(),
            due,
            successes,
            folds,
            missed,
            completion_rate_percent: completion_rate(successes.into(), due.into()),
            current_streak: streaks.current,
        });
    }

    let total_due: u64 = entries.iter().map(|e| u64::from(e.due)).sum();
    let total_successes: u64 = entries.iter().map(|e| u64::from(e.successes)).sum();
    let total_folds = entries.iter().map(|e| u64::from(e.folds)).sum();
    let total_missed = entries.iter().map(|e| u64::from(e.missed)).sum();

    let standout = entries
        .iter()
        .filter(|e| e.due > 0)
        .max_by_key(|e| {
            (
                e.completion_rate_percent,
                e.current_streak,
                Reverse(e.user_id.as_str()),
            )
        })
        .map(|e| e.user_id.clone());

    tracing::info!(
        pact_id = %pact.id,
        start = %window.start_date,
        end = %window.as_of,
        participants = entries.len(),
        roasts = roasts.len(),
        "generated weekly recap"
    );

    WeeklyRecap {
        pact_id: pact.id.clone(),
        pact_name: pact.name.clone(),
        window,
        entries,
        total_due,
        total_successes,
        total_folds,
        total_missed,
        completion_rate_percent: completion_rate(total_successes, total_due),
        standout,
        roasts,
    }
}

fn roast_for(pact: &Pact, user_id: &str, as_of: NaiveDate, reason: RoastReason) -> Roast {
    Roast {
        user_id: user_id.to_string(),
        reason,
        line: pick_roast(&pact.id, user_id, as_of, reason),
    }
}

/// Read the pact through the collaborator readers and build its recap.
///
/// Returns `None` for an unknown pact.
///
/// # Errors
/// Returns an error only if a reader fails.
pub fn load_weekly_recap<R>(
    reader: &R,
    pact_id: &str,
    as_of: NaiveDate,
    config: &RecapConfig,
) -> Result<Option<WeeklyRecap>>
where
    R: PactReader + CheckInReader + ?Sized,
{
    let Some(pact) = reader.pact(pact_id)? else {
        return Ok(None);
    };
    let participants = reader.participants(pact_id)?;
    let history = reader.check_ins(pact_id, None, DateRange::until(as_of))?;
    Ok(Some(weekly_recap(&pact, &participants, &history, as_of, config)))
}
