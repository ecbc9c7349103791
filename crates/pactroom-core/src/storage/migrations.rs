//! Database schema migrations for pactroom.
//!
//! Migrations are versioned and applied automatically when opening the store.
//! The `schema_version` table tracks the current migration version.

use indoc::indoc;
use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);
    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    if current_version < CURRENT_SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = CURRENT_SCHEMA_VERSION,
            "applied database migrations"
        );
    }
    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: pacts, participants and check-ins.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(indoc! {"
        CREATE TABLE IF NOT EXISTS pacts (
            id               TEXT PRIMARY KEY,
            name             TEXT NOT NULL,
            cadence_kind     TEXT NOT NULL,
            cadence_weekdays TEXT,
            mode             TEXT NOT NULL,
            start_date       TEXT NOT NULL,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS participants (
            pact_id          TEXT NOT NULL REFERENCES pacts(id) ON DELETE CASCADE,
            user_id          TEXT NOT NULL,
            relay_assignment TEXT,
            PRIMARY KEY (pact_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS check_ins (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            pact_id    TEXT NOT NULL REFERENCES pacts(id) ON DELETE CASCADE,
            user_id    TEXT NOT NULL,
            date       TEXT NOT NULL,
            outcome    TEXT NOT NULL CHECK (outcome IN ('success', 'fold')),
            created_at TEXT NOT NULL,
            UNIQUE (pact_id, user_id, date)
        );
    "})?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: indexes for history range queries.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(indoc! {"
        CREATE INDEX IF NOT EXISTS idx_check_ins_pact_date ON check_ins(pact_id, date);
        CREATE INDEX IF NOT EXISTS idx_check_ins_pact_user_date
            ON check_ins(pact_id, user_id, date);
    "})?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_SCHEMA_VERSION);

        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('pacts', 'participants', 'check_ins')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_SCHEMA_VERSION);
    }
}
