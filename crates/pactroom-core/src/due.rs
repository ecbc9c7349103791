//! Who owes a check-in on a given day.
//!
//! The due board combines the cadence evaluator with that day's check-ins so
//! a caller can tell, per participant, whether they are due and whether they
//! have already answered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cadence::is_due;
use crate::error::Result;
use crate::pact::{CheckInRecord, Outcome, Pact, Participant};
use crate::storage::{CheckInReader, DateRange, PactReader};

/// A participant's standing for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    /// Not due and nothing recorded
    NotDue,
    /// Due and nothing recorded yet
    Pending,
    /// Success recorded (whether or not the day was due)
    Succeeded,
    /// Fold recorded
    Folded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueEntry {
    pub user_id: String,
    pub due: bool,
    pub status: DueStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueBoard {
    pub pact_id: String,
    pub date: NaiveDate,
    pub entries: Vec<DueEntry>,
    pub due_count: u32,
    pub pending_count: u32,
    pub succeeded_count: u32,
    pub folded_count: u32,
}

impl DueBoard {
    pub fn empty(pact_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            pact_id: pact_id.into(),
            date,
            entries: Vec::new(),
            due_count: 0,
            pending_count: 0,
            succeeded_count: 0,
            folded_count: 0,
        }
    }

    pub fn entry(&self, user_id: &str) -> Option<&DueEntry> {
        self.entries.iter().find(|e| e.user_id == user_id)
    }

    /// Users who are due and have not checked in.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.status == DueStatus::Pending)
            .map(|e| e.user_id.as_str())
    }
}

/// Build the due board for `date`.
///
/// A record on `date` decides the status even when the day is not due.
pub fn due_board(
    pact: &Pact,
    participants: &[Participant],
    history: &[CheckInRecord],
    date: NaiveDate,
) -> DueBoard {
    let mut board = DueBoard::empty(pact.id.clone(), date);

    for participant in participants.iter().filter(|p| p.pact_id == pact.id) {
        let due = is_due(
            &pact.cadence,
            pact.mode,
            participant.relay_assignment.as_ref(),
            date,
        );
        let record = history
            .iter()
            .filter(|r| {
                r.pact_id == pact.id && r.user_id == participant.user_id && r.date == date
            })
            .max_by_key(|r| r.created_at);

        let status = match (record.map(|r| r.outcome), due) {
            (Some(Outcome::Success), _) => DueStatus::Succeeded,
            (Some(Outcome::Fold), _) => DueStatus::Folded,
            (None, true) => DueStatus::Pending,
            (None, false) => DueStatus::NotDue,
        };

        if due {
            board.due_count += 1;
        }
        match status {
            DueStatus::Pending => board.pending_count += 1,
            DueStatus::Succeeded => board.succeeded_count += 1,
            DueStatus::Folded => board.folded_count += 1,
            DueStatus::NotDue => {}
        }

        board.entries.push(DueEntry {
            user_id: participant.user_id.clone(),
            due,
            status,
        });
    }

    board
}

/// Read the pact through the collaborator readers and build its due board.
///
/// An unknown pact yields an empty board.
///
/// # Errors
/// Returns an error only if a reader fails.
pub fn load_due_board<R>(reader: &R, pact_id: &str, date: NaiveDate) -> Result<DueBoard>
where
    R: PactReader + CheckInReader + ?Sized,
{
    let Some(pact) = reader.pact(pact_id)? else {
        return Ok(DueBoard::empty(pact_id, date));
    };
    let participants = reader.participants(pact_id)?;
    let history = reader.check_ins(pact_id, None, DateRange::between(date, date))?;
    Ok(due_board(&pact, &participants, &history, date))
}
