//! SQLite-backed pact store.
//!
//! Provides persistent storage for:
//! - Pacts and their cadence rules
//! - Participants and relay assignments
//! - Dated check-ins (one per participant per day)
//!
//! The store implements [`PactReader`] and [`CheckInReader`] so the engine can
//! be fed from it directly.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use super::migrations;
use super::traits::{CheckInReader, DateRange, PactReader};
use super::data_dir;
use crate::cadence::{CadenceRule, PactMode, WeekdaySet};
use crate::error::{DatabaseError, Result};
use crate::pact::{CheckInRecord, Outcome, Pact, Participant};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite database for pacts, participants and check-ins.
pub struct PactStore {
    conn: Connection,
}

impl PactStore {
    /// Open the store at `<data dir>/pactroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("pactroom.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened pact store");
        Self::init(conn)
    }

    /// Open an in-memory store (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Insert a new pact.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including a duplicate id).
    pub fn create_pact(&self, pact: &Pact) -> Result<()> {
        let weekdays = match &pact.cadence {
            CadenceRule::Custom { weekdays } => Some(encode_weekdays(weekdays)),
            _ => None,
        };
        self.conn.execute(
            "INSERT INTO pacts
                 (id, name, cadence_kind, cadence_weekdays, mode, start_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                pact.id,
                pact.name,
                pact.cadence.kind(),
                weekdays,
                pact.mode.as_str(),
                pact.start_date.format(DATE_FORMAT).to_string(),
                encode_timestamp(&pact.created_at),
            ],
        )?;
        tracing::info!(
            pact_id = %pact.id,
            cadence = %pact.cadence,
            mode = %pact.mode,
            "created pact"
        );
        Ok(())
    }

    /// Every pact, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn list_pacts(&self) -> Result<Vec<Pact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, cadence_kind, cadence_weekdays, mode, start_date, created_at
             FROM pacts ORDER BY created_at, id",
        )?;
        let pacts = stmt
            .query_map([], row_to_pact)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pacts)
    }

    /// Add a participant to an existing pact.
    ///
    /// # Errors
    /// Returns [`DatabaseError::PactNotFound`] if the pact does not exist.
    pub fn add_participant(&self, participant: &Participant) -> Result<()> {
        self.require_pact(&participant.pact_id)?;
        self.conn.execute(
            "INSERT INTO participants (pact_id, user_id, relay_assignment) VALUES (?1, ?2, ?3)",
            params![
                participant.pact_id,
                participant.user_id,
                participant.relay_assignment.as_ref().map(encode_weekdays),
            ],
        )?;
        tracing::info!(
            pact_id = %participant.pact_id,
            user_id = %participant.user_id,
            "added participant"
        );
        Ok(())
    }

    /// Replace (or clear) a participant's relay assignment.
    ///
    /// # Errors
    /// Returns [`DatabaseError::ParticipantNotFound`] if the user is not in the pact.
    pub fn set_relay_assignment(
        &self,
        pact_id: &str,
        user_id: &str,
        assignment: Option<&WeekdaySet>,
    ) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE participants SET relay_assignment = ?3 WHERE pact_id = ?1 AND user_id = ?2",
            params![pact_id, user_id, assignment.map(encode_weekdays)],
        )?;
        if updated == 0 {
            return Err(DatabaseError::ParticipantNotFound {
                pact_id: pact_id.to_string(),
                user_id: user_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Record a check-in.
    ///
    /// # Errors
    /// Returns [`DatabaseError::ParticipantNotFound`] for a non-participant and
    /// [`DatabaseError::DuplicateCheckIn`] if one already exists for that date.
    pub fn record_check_in(&self, record: &CheckInRecord) -> Result<()> {
        self.require_participant(&record.pact_id, &record.user_id)?;
        let inserted = self.conn.execute(
            "INSERT INTO check_ins (pact_id, user_id, date, outcome, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.pact_id,
                record.user_id,
                record.date.format(DATE_FORMAT).to_string(),
                record.outcome.as_str(),
                encode_timestamp(&record.created_at),
            ],
        );

        match inserted {
            Ok(_) => {
                tracing::debug!(
                    pact_id = %record.pact_id,
                    user_id = %record.user_id,
                    date = %record.date,
                    outcome = %record.outcome,
                    "recorded check-in"
                );
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(DatabaseError::DuplicateCheckIn {
                    pact_id: record.pact_id.clone(),
                    user_id: record.user_id.clone(),
                    date: record.date,
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a check-in. Returns whether one existed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn delete_check_in(&self, pact_id: &str, user_id: &str, date: NaiveDate) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM check_ins WHERE pact_id = ?1 AND user_id = ?2 AND date = ?3",
            params![pact_id, user_id, date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn require_pact(&self, pact_id: &str) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pacts WHERE id = ?1)",
            [pact_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DatabaseError::PactNotFound(pact_id.to_string()).into());
        }
        Ok(())
    }

    fn require_participant(&self, pact_id: &str, user_id: &str) -> Result<()> {
        self.require_pact(pact_id)?;
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM participants WHERE pact_id = ?1 AND user_id = ?2)",
            [pact_id, user_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DatabaseError::ParticipantNotFound {
                pact_id: pact_id.to_string(),
                user_id: user_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl PactReader for PactStore {
    fn pact(&self, pact_id: &str) -> Result<Option<Pact>> {
        let pact = self
            .conn
            .query_row(
                "SELECT id, name, cadence_kind, cadence_weekdays, mode, start_date, created_at
                 FROM pacts WHERE id = ?1",
                [pact_id],
                row_to_pact,
            )
            .optional()?;
        Ok(pact)
    }

    fn participants(&self, pact_id: &str) -> Result<Vec<Participant>> {
        let mut stmt = self.conn.prepare(
            "SELECT pact_id, user_id, relay_assignment FROM participants
             WHERE pact_id = ?1 ORDER BY user_id",
        )?;
        let participants = stmt
            .query_map([pact_id], |row| {
                let relay: Option<String> = row.get(2)?;
                Ok(Participant {
                    pact_id: row.get(0)?,
                    user_id: row.get(1)?,
                    relay_assignment: relay.map(|s| decode_weekdays(2, &s)).transpose()?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(participants)
    }
}

impl CheckInReader for PactStore {
    fn check_ins(
        &self,
        pact_id: &str,
        user_id: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<CheckInRecord>> {
        let from = range.from.map(|d| d.format(DATE_FORMAT).to_string());
        let to = range.to.map(|d| d.format(DATE_FORMAT).to_string());

        let mut stmt = self.conn.prepare(
            "SELECT pact_id, user_id, date, outcome, created_at FROM check_ins
             WHERE pact_id = ?1
               AND (?2 IS NULL OR user_id = ?2)
               AND (?3 IS NULL OR date >= ?3)
               AND (?4 IS NULL OR date <= ?4)
             ORDER BY date, created_at, id",
        )?;
        let records = stmt
            .query_map(params![pact_id, user_id, from, to], row_to_check_in)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_weekdays(set: &WeekdaySet) -> String {
    set.numbers()
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn decode_weekdays(idx: usize, s: &str) -> rusqlite::Result<WeekdaySet> {
    s.parse().map_err(|e| conversion_error(idx, e))
}

fn decode_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn decode_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn row_to_pact(row: &Row<'_>) -> rusqlite::Result<Pact> {
    let kind: String = row.get(2)?;
    let weekdays: Option<String> = row.get(3)?;
    let mode: String = row.get(4)?;
    let start_date: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(Pact {
        id: row.get(0)?,
        name: row.get(1)?,
        cadence: CadenceRule::parse(&kind, weekdays.as_deref())
            .map_err(|e| conversion_error(2, e))?,
        mode: mode.parse::<PactMode>().map_err(|e| conversion_error(4, e))?,
        start_date: decode_date(5, &start_date)?,
        created_at: decode_timestamp(6, &created_at)?,
    })
}

fn row_to_check_in(row: &Row<'_>) -> rusqlite::Result<CheckInRecord> {
    let date: String = row.get(2)?;
    let outcome: String = row.get(3)?;
    let created_at: String = row.get(4)?;

    Ok(CheckInRecord {
        pact_id: row.get(0)?,
        user_id: row.get(1)?,
        date: decode_date(2, &date)?,
        outcome: outcome.parse::<Outcome>().map_err(|e| conversion_error(3, e))?,
        created_at: decode_timestamp(4, &created_at)?,
    })
}
