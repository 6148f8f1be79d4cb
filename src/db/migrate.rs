use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension};

/// Ensure that the `log` table exists; it also records applied migrations.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Create the base schema. Every statement is idempotent.
fn create_base_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            description     TEXT NOT NULL DEFAULT '',
            total_sessions  INTEGER NOT NULL CHECK(total_sessions >= 1),
            start_date      TEXT NOT NULL,
            end_date        TEXT NOT NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS participants (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            program_id      INTEGER NOT NULL REFERENCES programs(id),
            name            TEXT NOT NULL,
            email           TEXT NOT NULL DEFAULT '',
            phone           TEXT NOT NULL DEFAULT '',
            department      TEXT,
            position        TEXT,
            gift_received   INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS attendance (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            participant_id  INTEGER NOT NULL REFERENCES participants(id),
            program_id      INTEGER NOT NULL REFERENCES programs(id),
            session_number  INTEGER NOT NULL CHECK(session_number >= 1),
            signature_data  TEXT NOT NULL DEFAULT '',
            attended_at     TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_participants_program ON participants(program_id);
        CREATE INDEX IF NOT EXISTS idx_attendance_program ON attendance(program_id, participant_id);
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Copy the participant's program onto attendance rows that disagree with it.
/// Must run before the tuple de-duplication, which it can feed.
fn migrate_align_attendance_program(conn: &Connection) -> AppResult<()> {
    let version = "20250301_0001_align_attendance_program";
    if is_applied(conn, version)? {
        return Ok(());
    }

    let fixed = conn
        .execute(
            "UPDATE attendance
             SET program_id = (SELECT p.program_id FROM participants p WHERE p.id = attendance.participant_id)
             WHERE EXISTS (
                 SELECT 1 FROM participants p
                 WHERE p.id = attendance.participant_id AND p.program_id != attendance.program_id
             )",
            [],
        )
        .map_err(|e| AppError::Migration(format!("{version}: {e}")))?;

    if fixed > 0 {
        warning(format!(
            "Realigned program of {fixed} attendance record(s) with their participant."
        ));
    }

    mark_applied(conn, version, "Aligned attendance.program_id with participants")?;
    Ok(())
}

/// Collapse duplicate (participant, program, session) rows, keeping the most
/// recent signature, then make the tuple unique.
fn migrate_unique_attendance_tuple(conn: &Connection) -> AppResult<()> {
    let version = "20250301_0002_unique_attendance_tuple";
    if is_applied(conn, version)? {
        return Ok(());
    }

    let removed = conn
        .execute(
            "DELETE FROM attendance WHERE id NOT IN (
                 SELECT id FROM (
                     SELECT id, ROW_NUMBER() OVER (
                         PARTITION BY participant_id, program_id, session_number
                         ORDER BY julianday(attended_at) DESC, id DESC
                     ) AS rn
                     FROM attendance
                 ) WHERE rn = 1
             )",
            [],
        )
        .map_err(|e| AppError::Migration(format!("{version}: {e}")))?;

    if removed > 0 {
        warning(format!("Removed {removed} duplicate attendance record(s)."));
    }

    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_tuple
             ON attendance(participant_id, program_id, session_number);",
    )
    .map_err(|e| AppError::Migration(format!("{version}: {e}")))?;

    mark_applied(conn, version, "Unique attendance per participant, program and session")?;
    success(format!("Migration applied: {version}"));
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    let fresh = !table_exists(conn, "programs")?;
    create_base_tables(conn)?;
    if fresh {
        success("Created programs, participants and attendance tables.");
    }

    migrate_align_attendance_program(conn)?;
    migrate_unique_attendance_tuple(conn)?;

    Ok(())
}
