//! Per-participant and pact-level accountability statistics.
//!
//! Combines expected occurrences, success/fold tallies and streaks into
//! [`DerivedStats`] for each participant plus [`PactTotals`] for the pact.
//! Everything is recomputed from the snapshot on every call.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::streak::StreakPolicy;
use crate::cadence::expected_occurrences;
use crate::error::Result;
use crate::pact::{CheckInHistory, CheckInRecord, Outcome, Pact, Participant};
use crate::storage::{CheckInReader, DateRange, PactReader};

/// Statistics for one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub user_id: String,
    /// Due dates between the pact start and the reference date
    pub expected_occurrences: u32,
    /// Successes plus folds
    pub total_check_ins: u32,
    pub success_count: u32,
    pub fold_count: u32,
    /// `round(success / expected * 100)`, 0 when nothing was expected
    pub completion_rate_percent: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Sums and rates across all participants of a pact.
///
/// Sums are `u64` so long-lived pacts with many participants cannot overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PactTotals {
    pub participant_count: u32,
    pub total_expected: u64,
    pub total_check_ins: u64,
    pub success_count: u64,
    pub fold_count: u64,
    pub overall_completion_rate: u32,
}

/// Complete statistics for a pact as of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PactStats {
    pub pact_id: String,
    pub as_of: NaiveDate,
    pub per_participant: Vec<DerivedStats>,
    pub totals: PactTotals,
}

impl PactStats {
    /// All-zero statistics, used for unknown pacts and empty pacts.
    pub fn empty(pact_id: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            pact_id: pact_id.into(),
            as_of,
            per_participant: Vec::new(),
            totals: PactTotals::default(),
        }
    }

    pub fn participant(&self, user_id: &str) -> Option<&DerivedStats> {
        self.per_participant.iter().find(|s| s.user_id == user_id)
    }
}

/// Rounded percentage, 0 when the denominator is 0.
pub fn completion_rate(successes: u64, expected: u64) -> u32 {
    if expected == 0 {
        return 0;
    }
    (successes as f64 / expected as f64 * 100.0).round() as u32
}

/// Aggregator for pact statistics.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    policy: StreakPolicy,
}

impl StatsAggregator {
    /// Create an aggregator using the default 7-day streak tolerance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: StreakPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StreakPolicy {
        &self.policy
    }

    /// Compute statistics for `pact` as of `as_of`.
    ///
    /// Records belonging to other pacts, to users who are not participants, or
    /// dated after `as_of` are ignored. Each participant's records are sorted
    /// here before streak detection.
    pub fn aggregate(
        &self,
        pact: &Pact,
        participants: &[Participant],
        history: &[CheckInRecord],
        as_of: NaiveDate,
    ) -> PactStats {
        let mut by_user: HashMap<&str, Vec<CheckInRecord>> = HashMap::new();
        for record in history {
            if record.pact_id == pact.id && record.date <= as_of {
                by_user
                    .entry(record.user_id.as_str())
                    .or_default()
                    .push(record.clone());
            }
        }

        let mut per_participant = Vec::with_capacity(participants.len());
        let mut totals = PactTotals::default();

        for participant in participants {
            if participant.pact_id != pact.id {
                tracing::warn!(
                    pact_id = %pact.id,
                    other_pact = %participant.pact_id,
                    user_id = %participant.user_id,
                    "skipping participant of a different pact"
                );
                continue;
            }

            let records = by_user
                .remove(participant.user_id.as_str())
                .unwrap_or_default();
            let stats = self.participant_stats(pact, participant, records, as_of);

            totals.participant_count = totals.participant_count.saturating_add(1);
            totals.total_expected += u64::from(stats.expected_occurrences);
            totals.total_check_ins += u64::from(stats.total_check_ins);
            totals.success_count += u64::from(stats.success_count);
            totals.fold_count += u64::from(stats.fold_count);
            per_participant.push(stats);
        }

        totals.overall_completion_rate =
            completion_rate(totals.success_count, totals.total_expected);

        tracing::debug!(
            pact_id = %pact.id,
            %as_of,
            participants = totals.participant_count,
            expected = totals.total_expected,
            successes = totals.success_count,
            rate = totals.overall_completion_rate,
            "aggregated pact statistics"
        );

        PactStats {
            pact_id: pact.id.clone(),
            as_of,
            per_participant,
            totals,
        }
    }

    fn participant_stats(
        &self,
        pact: &Pact,
        participant: &Participant,
        records: Vec<CheckInRecord>,
        as_of: NaiveDate,
    ) -> DerivedStats {
        let history = CheckInHistory::sorted(records);

        let (success_count, fold_count) =
            history.records().iter().fold((0u32, 0u32), |(s, f), r| match r.outcome {
                Outcome::Success => (s.saturating_add(1), f),
                Outcome::Fold => (s, f.saturating_add(1)),
            });

        let expected = expected_occurrences(
            &pact.cadence,
            pact.mode,
            participant.relay_assignment.as_ref(),
            pact.start_date,
            as_of,
        );
        let streaks = self.policy.compute(history.records(), as_of);

        DerivedStats {
            user_id: participant.user_id.clone(),
            expected_occurrences: expected,
            total_check_ins: success_count.saturating_add(fold_count),
            success_count,
            fold_count,
            completion_rate_percent: completion_rate(success_count.into(), expected.into()),
            current_streak: streaks.current,
            longest_streak: streaks.longest,
        }
    }
}

/// Aggregate with the default streak policy.
pub fn aggregate(
    pact: &Pact,
    participants: &[Participant],
    history: &[CheckInRecord],
    as_of: NaiveDate,
) -> PactStats {
    StatsAggregator::new().aggregate(pact, participants, history, as_of)
}

/// Read a pact's snapshot through the collaborator readers and aggregate it.
///
/// An unknown pact yields [`PactStats::empty`] rather than an error.
///
/// # Errors
/// Returns an error only if a reader fails.
pub fn pact_stats<R>(
    reader: &R,
    aggregator: &StatsAggregator,
    pact_id: &str,
    as_of: NaiveDate,
) -> Result<PactStats>
where
    R: PactReader + CheckInReader + ?Sized,
{
    let Some(pact) = reader.pact(pact_id)? else {
        tracing::debug!(pact_id, "unknown pact, returning empty statistics");
        return Ok(PactStats::empty(pact_id, as_of));
    };
    let participants = reader.participants(pact_id)?;
    let history = reader.check_ins(pact_id, None, DateRange::until(as_of))?;
    Ok(aggregator.aggregate(&pact, &participants, &history, as_of))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::{CadenceRule, PactMode, WeekdaySet};
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_pact() -> Pact {
        Pact::new("p1", "Morning run", CadenceRule::Daily, PactMode::Individual, date(2024, 1, 1))
    }

    #[test]
    fn test_completion_rate_rounding() {
        assert_eq!(completion_rate(8, 10), 80);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 8), 13); // 12.5 rounds away from zero
        assert_eq!(completion_rate(5, 0), 0);
    }

    #[test]
    fn test_daily_scenario_eighty_percent() {
        let pact = daily_pact();
        let participants = vec![Participant::new("p1", "ana")];
        let history: Vec<CheckInRecord> = (0..10)
            .map(|i| {
                let outcome = if i == 3 || i == 6 { Outcome::Fold } else { Outcome::Success };
                CheckInRecord::new("p1", "ana", date(2024, 1, 1) + Duration::days(i), outcome)
            })
            .collect();

        let stats = aggregate(&pact, &participants, &history, date(2024, 1, 10));
        let ana = stats.participant("ana").unwrap();

        assert_eq!(ana.expected_occurrences, 10);
        assert_eq!(ana.success_count, 8);
        assert_eq!(ana.fold_count, 2);
        assert_eq!(ana.total_check_ins, 10);
        assert_eq!(ana.completion_rate_percent, 80);
        assert_eq!(ana.current_streak, 3);
        assert_eq!(ana.longest_streak, 3);
        assert_eq!(stats.totals.overall_completion_rate, 80);
    }

    #[test]
    fn test_zero_participants_all_zero() {
        let stats = aggregate(&daily_pact(), &[], &[], date(2024, 1, 10));
        assert!(stats.per_participant.is_empty());
        assert_eq!(stats.totals, PactTotals::default());
    }

    #[test]
    fn test_zero_expected_rate_is_zero() {
        let pact = Pact::new(
            "p1",
            "Never",
            CadenceRule::custom(WeekdaySet::EMPTY),
            PactMode::Group,
            date(2024, 1, 1),
        );
        let participants = vec![Participant::new("p1", "ana")];
        let history = vec![CheckInRecord::new("p1", "ana", date(2024, 1, 2), Outcome::Success)];

        let stats = aggregate(&pact, &participants, &history, date(2024, 1, 10));
        let ana = stats.participant("ana").unwrap();
        assert_eq!(ana.expected_occurrences, 0);
        assert_eq!(ana.success_count, 1);
        assert_eq!(ana.completion_rate_percent, 0);
        assert_eq!(stats.totals.overall_completion_rate, 0);
    }

    #[test]
    fn test_ignores_foreign_and_future_records() {
        let pact = daily_pact();
        let participants = vec![Participant::new("p1", "ana")];
        let history = vec![
            CheckInRecord::new("p1", "ana", date(2024, 1, 1), Outcome::Success),
            CheckInRecord::new("p2", "ana", date(2024, 1, 2), Outcome::Success),
            CheckInRecord::new("p1", "stranger", date(2024, 1, 2), Outcome::Success),
            CheckInRecord::new("p1", "ana", date(2024, 1, 20), Outcome::Fold),
        ];

        let stats = aggregate(&pact, &participants, &history, date(2024, 1, 2));
        assert_eq!(stats.totals.total_check_ins, 1);
        assert_eq!(stats.participant("ana").unwrap().fold_count, 0);
    }

    #[test]
    fn test_unsorted_input_is_sorted_per_participant() {
        let pact = daily_pact();
        let participants = vec![Participant::new("p1", "ana")];
        let history = vec![
            CheckInRecord::new("p1", "ana", date(2024, 1, 3), Outcome::Success),
            CheckInRecord::new("p1", "ana", date(2024, 1, 1), Outcome::Fold),
            CheckInRecord::new("p1", "ana", date(2024, 1, 2), Outcome::Success),
        ];

        let stats = aggregate(&pact, &participants, &history, date(2024, 1, 3));
        let ana = stats.participant("ana").unwrap();
        assert_eq!(ana.current_streak, 2);
        assert_eq!(ana.longest_streak, 2);
    }

    #[test]
    fn test_relay_totals_sum_participants() {
        let pact = Pact::new(
            "p1",
            "Relay",
            CadenceRule::custom(WeekdaySet::from_numbers([1, 3, 5]).unwrap()),
            PactMode::Relay,
            date(2024, 1, 1),
        );
        let participants = vec![
            Participant::new("p1", "a").with_relay(WeekdaySet::from_numbers([1, 5]).unwrap()),
            Participant::new("p1", "b").with_relay(WeekdaySet::from_numbers([3]).unwrap()),
        ];
        let history = vec![
            CheckInRecord::new("p1", "a", date(2024, 1, 1), Outcome::Success),
            CheckInRecord::new("p1", "b", date(2024, 1, 3), Outcome::Success),
            CheckInRecord::new("p1", "a", date(2024, 1, 5), Outcome::Fold),
        ];

        // Week of 2024-01-01: a due Mon+Fri, b due Wed
        let stats = aggregate(&pact, &participants, &history, date(2024, 1, 7));
        assert_eq!(stats.participant("a").unwrap().expected_occurrences, 2);
        assert_eq!(stats.participant("a").unwrap().completion_rate_percent, 50);
        assert_eq!(stats.participant("b").unwrap().expected_occurrences, 1);
        assert_eq!(stats.participant("b").unwrap().completion_rate_percent, 100);
        assert_eq!(stats.totals.total_expected, 3);
        assert_eq!(stats.totals.total_check_ins, 3);
        assert_eq!(stats.totals.overall_completion_rate, 67);
    }

    #[test]
    fn test_totals_do_not_overflow_u32() {
        // ~3.65M due days each; 1200 participants exceed u32::MAX in total
        let pact = Pact::new(
            "p1",
            "Forever",
            CadenceRule::Daily,
            PactMode::Individual,
            date(1, 1, 1),
        );
        let participants: Vec<Participant> =
            (0..1200).map(|i| Participant::new("p1", format!("u{i}"))).collect();

        let stats = aggregate(&pact, &participants, &[], date(9999, 12, 31));
        let per_user = u64::from(stats.per_participant[0].expected_occurrences);
        assert_eq!(per_user, 3_652_059);
        assert_eq!(stats.totals.total_expected, per_user * 1200);
        assert!(stats.totals.total_expected > u64::from(u32::MAX));
        assert_eq!(stats.totals.overall_completion_rate, 0);
    }

    #[test]
    fn test_policy_changes_streaks_only() {
        let pact = daily_pact();
        let participants = vec![Participant::new("p1", "ana")];
        let history = vec![
            CheckInRecord::new("p1", "ana", date(2024, 1, 1), Outcome::Success),
            CheckInRecord::new("p1", "ana", date(2024, 1, 3), Outcome::Success),
        ];

        let strict = StatsAggregator::with_policy(StreakPolicy::with_tolerance(1));
        let stats = strict.aggregate(&pact, &participants, &history, date(2024, 1, 3));
        let ana = stats.participant("ana").unwrap();
        assert_eq!(ana.longest_streak, 1);
        assert_eq!(ana.success_count, 2);
    }
}
