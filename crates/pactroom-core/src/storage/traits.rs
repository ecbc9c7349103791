use chrono::NaiveDate;

use crate::error::Result;
use crate::pact::{CheckInRecord, Pact, Participant};

/// Inclusive date bounds for a history query. Open on a side when `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Everything ever recorded.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn until(to: NaiveDate) -> Self {
        Self { from: None, to: Some(to) }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }
}

/// Reads pact definitions and their participants.
pub trait PactReader {
    /// The pact with this id, or `None` if it does not exist.
    fn pact(&self, pact_id: &str) -> Result<Option<Pact>>;

    /// Every participant of the pact, ordered by user id.
    fn participants(&self, pact_id: &str) -> Result<Vec<Participant>>;
}

/// Reads check-in history.
///
/// Implementations return records sorted ascending by `(date, created_at)`.
pub trait CheckInReader {
    fn check_ins(
        &self,
        pact_id: &str,
        user_id: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<CheckInRecord>>;
}
