//! Pact, participant and check-in records.
//!
//! These are plain snapshots handed to the engine by whatever reads them from
//! storage. Nothing here enforces the one-check-in-per-day rule; the store
//! does that.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cadence::{CadenceRule, PactMode, PactWindow, WeekdaySet};
use crate::error::ValidationError;

/// A shared recurring commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pact {
    pub id: String,
    pub name: String,
    pub cadence: CadenceRule,
    pub mode: PactMode,
    /// First calendar day occurrences are counted from
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Pact {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cadence: CadenceRule,
        mode: PactMode,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cadence,
            mode,
            start_date,
            created_at: Utc::now(),
        }
    }

    /// Window from the pact's start up to `as_of`.
    pub fn window(&self, as_of: NaiveDate) -> PactWindow {
        PactWindow::new(self.start_date, as_of)
    }
}

/// A user's membership in a pact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub pact_id: String,
    pub user_id: String,
    /// Weekdays this participant covers in a relay pact
    #[serde(default)]
    pub relay_assignment: Option<WeekdaySet>,
}

impl Participant {
    pub fn new(pact_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            pact_id: pact_id.into(),
            user_id: user_id.into(),
            relay_assignment: None,
        }
    }

    pub fn with_relay(mut self, assignment: WeekdaySet) -> Self {
        self.relay_assignment = Some(assignment);
        self
    }
}

/// Outcome of a single check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Commitment kept
    Success,
    /// Commitment abandoned for the day
    Fold,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Fold => "fold",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Outcome::Success),
            "fold" => Ok(Outcome::Fold),
            other => Err(ValidationError::InvalidValue {
                field: "outcome".to_string(),
                message: format!("unknown outcome '{other}' (expected success or fold)"),
            }),
        }
    }
}

/// A dated check-in by one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub pact_id: String,
    pub user_id: String,
    /// Calendar day the check-in counts for
    pub date: NaiveDate,
    pub outcome: Outcome,
    /// Only used to order same-day records and for display
    pub created_at: DateTime<Utc>,
}

impl CheckInRecord {
    pub fn new(
        pact_id: impl Into<String>,
        user_id: impl Into<String>,
        date: NaiveDate,
        outcome: Outcome,
    ) -> Self {
        Self {
            pact_id: pact_id.into(),
            user_id: user_id.into(),
            date,
            outcome,
            created_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Check-in records sorted ascending by date.
///
/// The streak calculator trusts its input order; this type is where that
/// order is established or verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckInHistory {
    records: Vec<CheckInRecord>,
}

impl CheckInHistory {
    /// Sort records by `(date, created_at)`.
    pub fn sorted(mut records: Vec<CheckInRecord>) -> Self {
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Self { records }
    }

    /// Accept records that are already in ascending date order.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnsortedHistory`] at the first record dated
    /// before its predecessor.
    pub fn try_from_sorted(records: Vec<CheckInRecord>) -> Result<Self, ValidationError> {
        ensure_sorted(&records)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[CheckInRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of a single user, order preserved.
    pub fn for_user(&self, user_id: &str) -> CheckInHistory {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect(),
        }
    }
}

impl AsRef<[CheckInRecord]> for CheckInHistory {
    fn as_ref(&self) -> &[CheckInRecord] {
        &self.records
    }
}

/// Verify that `records` are in ascending date order.
///
/// # Errors
/// Returns [`ValidationError::UnsortedHistory`] naming the first offending record.
pub fn ensure_sorted(records: &[CheckInRecord]) -> Result<(), ValidationError> {
    for (index, pair) in records.windows(2).enumerate() {
        if pair[1].date < pair[0].date {
            return Err(ValidationError::UnsortedHistory {
                index: index + 1,
                date: pair[1].date,
                previous: pair[0].date,
            });
        }
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
/// Returns [`ValidationError::InvalidDate`] for anything else.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(user: &str, day: u32, outcome: Outcome) -> CheckInRecord {
        CheckInRecord::new("p1", user, NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), outcome)
    }

    #[test]
    fn test_sorted_orders_by_date_then_created_at() {
        let mut late = record("a", 2, Outcome::Success);
        late.created_at = late.created_at + Duration::hours(1);
        let early = record("b", 2, Outcome::Fold);
        let first = record("a", 1, Outcome::Success);

        let history = CheckInHistory::sorted(vec![late.clone(), early.clone(), first.clone()]);
        assert_eq!(history.records(), &[first, early, late]);
    }

    #[test]
    fn test_try_from_sorted_rejects_out_of_order() {
        let err = CheckInHistory::try_from_sorted(vec![
            record("a", 3, Outcome::Success),
            record("a", 5, Outcome::Success),
            record("a", 4, Outcome::Fold),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnsortedHistory {
                index: 2,
                date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                previous: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            }
        );
    }

    #[test]
    fn test_try_from_sorted_accepts_same_day_records() {
        let history = CheckInHistory::try_from_sorted(vec![
            record("a", 3, Outcome::Success),
            record("b", 3, Outcome::Fold),
        ])
        .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.for_user("b").len(), 1);
    }

    #[test]
    fn test_outcome_parse_and_serde() {
        assert_eq!("SUCCESS".parse::<Outcome>().unwrap(), Outcome::Success);
        assert!("skip".parse::<Outcome>().is_err());
        assert_eq!(serde_json::to_string(&Outcome::Fold).unwrap(), "\"fold\"");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            parse_date("2023-02-29"),
            Err(ValidationError::InvalidDate("2023-02-29".to_string()))
        );
    }
}
