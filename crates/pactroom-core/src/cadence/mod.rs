//! Cadence evaluation for pacts.
//!
//! This module answers the leaf question of the engine: is a commitment due
//! for a given participant on a given calendar date? Counting due dates over a
//! window lives in [`occurrences`].
//!
//! Decision order:
//! - **Relay** pacts: the participant's relay assignment replaces the base
//!   cadence entirely, whatever the cadence kind.
//! - **Daily**: due on every date.
//! - **Weekly**: due on Mondays.
//! - **Custom**: due on the listed weekdays; an empty list is never due.

mod occurrences;
mod weekday;

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use occurrences::{count_mondays, expected_occurrences, PactWindow};
pub use weekday::{weekday_number, WeekdaySet};

/// How often a pact recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CadenceRule {
    /// Due every calendar day
    Daily,
    /// Due once a week, on Monday
    Weekly,
    /// Due on an explicit set of weekdays
    Custom {
        #[serde(default)]
        weekdays: WeekdaySet,
    },
}

impl CadenceRule {
    pub fn custom(weekdays: WeekdaySet) -> Self {
        CadenceRule::Custom { weekdays }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CadenceRule::Daily => "daily",
            CadenceRule::Weekly => "weekly",
            CadenceRule::Custom { .. } => "custom",
        }
    }

    /// Parse a cadence from its kind name plus optional weekday list.
    ///
    /// The weekday list is only read for `custom`; a missing list yields an
    /// empty (never due) custom cadence.
    ///
    /// # Errors
    /// Returns a validation error for an unknown kind or malformed weekdays.
    pub fn parse(kind: &str, weekdays: Option<&str>) -> Result<Self, ValidationError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(CadenceRule::Daily),
            "weekly" => Ok(CadenceRule::Weekly),
            "custom" => {
                let weekdays = match weekdays {
                    Some(days) => days.parse()?,
                    None => WeekdaySet::EMPTY,
                };
                Ok(CadenceRule::Custom { weekdays })
            }
            other => Err(ValidationError::InvalidValue {
                field: "cadence".to_string(),
                message: format!("unknown cadence '{other}' (expected daily, weekly or custom)"),
            }),
        }
    }
}

impl fmt::Display for CadenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CadenceRule::Custom { weekdays } => write!(f, "custom({weekdays})"),
            other => f.write_str(other.kind()),
        }
    }
}

/// How participants share a pact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PactMode {
    /// Each participant follows the base cadence on their own
    #[default]
    Individual,
    /// Everyone follows the base cadence together
    Group,
    /// Participants take turns on assigned weekdays
    Relay,
}

impl PactMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PactMode::Individual => "individual",
            PactMode::Group => "group",
            PactMode::Relay => "relay",
        }
    }
}

impl fmt::Display for PactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PactMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(PactMode::Individual),
            "group" => Ok(PactMode::Group),
            "relay" => Ok(PactMode::Relay),
            other => Err(ValidationError::InvalidValue {
                field: "mode".to_string(),
                message: format!(
                    "unknown pact mode '{other}' (expected individual, group or relay)"
                ),
            }),
        }
    }
}

/// Whether a commitment is due for one participant on `date`.
///
/// In relay mode the participant's assignment overrides `rule` entirely; a
/// relay participant without an assignment is never due.
pub fn is_due(
    rule: &CadenceRule,
    mode: PactMode,
    relay_assignment: Option<&WeekdaySet>,
    date: NaiveDate,
) -> bool {
    if mode == PactMode::Relay {
        return relay_assignment.is_some_and(|days| days.contains_date(date));
    }

    match rule {
        CadenceRule::Daily => true,
        CadenceRule::Weekly => date.weekday() == Weekday::Mon,
        CadenceRule::Custom { weekdays } => weekdays.contains_date(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days(numbers: &[u8]) -> WeekdaySet {
        WeekdaySet::from_numbers(numbers.iter().copied()).unwrap()
    }

    // 2024-01-01 is a Monday
    fn january_week() -> impl Iterator<Item = NaiveDate> {
        (1..=7).map(|d| date(2024, 1, d))
    }

    #[test]
    fn test_daily_due_every_day() {
        for mode in [PactMode::Individual, PactMode::Group] {
            assert!(january_week().all(|d| is_due(&CadenceRule::Daily, mode, None, d)));
        }
    }

    #[test]
    fn test_weekly_due_only_on_monday() {
        let due: Vec<NaiveDate> = january_week()
            .filter(|d| is_due(&CadenceRule::Weekly, PactMode::Group, None, *d))
            .collect();
        assert_eq!(due, vec![date(2024, 1, 1)]);
    }

    #[test]
    fn test_custom_due_on_listed_days() {
        let rule = CadenceRule::custom(days(&[1, 3, 5]));
        let due: Vec<u32> = january_week()
            .filter(|d| is_due(&rule, PactMode::Individual, None, *d))
            .map(|d| d.day())
            .collect();
        assert_eq!(due, vec![1, 3, 5]);
    }

    #[test]
    fn test_custom_empty_never_due() {
        let rule = CadenceRule::custom(WeekdaySet::EMPTY);
        assert!(!january_week().any(|d| is_due(&rule, PactMode::Individual, None, d)));
    }

    #[test]
    fn test_relay_overrides_daily() {
        let wednesday = days(&[3]);
        for d in january_week() {
            let due = is_due(&CadenceRule::Daily, PactMode::Relay, Some(&wednesday), d);
            assert_eq!(due, d.weekday() == Weekday::Wed, "date {d}");
        }
    }

    #[test]
    fn test_relay_without_assignment_never_due() {
        assert!(!january_week().any(|d| is_due(&CadenceRule::Daily, PactMode::Relay, None, d)));
    }

    #[test]
    fn test_assignment_ignored_outside_relay() {
        let wednesday = days(&[3]);
        // Monday is due for a weekly group pact even though the assignment says Wednesday
        assert!(is_due(&CadenceRule::Weekly, PactMode::Group, Some(&wednesday), date(2024, 1, 1)));
        assert!(!is_due(&CadenceRule::Weekly, PactMode::Group, Some(&wednesday), date(2024, 1, 3)));
    }

    #[test]
    fn test_relay_independent_of_custom_base_set() {
        let rule = CadenceRule::custom(days(&[1, 3, 5]));
        let a = days(&[1, 5]);
        let b = days(&[3]);
        let wednesday = date(2024, 1, 3);
        assert!(!is_due(&rule, PactMode::Relay, Some(&a), wednesday));
        assert!(is_due(&rule, PactMode::Relay, Some(&b), wednesday));
    }

    #[test]
    fn test_cadence_serde_tagged() {
        let rule = CadenceRule::custom(days(&[1, 3]));
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, r#"{"kind":"custom","weekdays":[1,3]}"#);

        let daily: CadenceRule = serde_json::from_str(r#"{"kind":"daily"}"#).unwrap();
        assert_eq!(daily, CadenceRule::Daily);

        let bare_custom: CadenceRule = serde_json::from_str(r#"{"kind":"custom"}"#).unwrap();
        assert_eq!(bare_custom, CadenceRule::custom(WeekdaySet::EMPTY));
    }

    #[test]
    fn test_parse_cadence_and_mode() {
        assert_eq!(CadenceRule::parse("Daily", None).unwrap(), CadenceRule::Daily);
        assert_eq!(
            CadenceRule::parse("custom", Some("mon,fri")).unwrap(),
            CadenceRule::custom(days(&[1, 5]))
        );
        assert!(CadenceRule::parse("hourly", None).is_err());
        assert_eq!("relay".parse::<PactMode>().unwrap(), PactMode::Relay);
        assert!("solo".parse::<PactMode>().is_err());
    }
}
