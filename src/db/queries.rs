use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::Participant;
use crate::models::program::Program;
use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const PROGRAM_COLUMNS: &str =
    "id, name, description, total_sessions, start_date, end_date, created_at, updated_at";
const PARTICIPANT_COLUMNS: &str = "id, program_id, name, email, phone, department, position, \
     gift_received, created_at, updated_at";
const ATTENDANCE_COLUMNS: &str =
    "id, participant_id, program_id, session_number, signature_data, attended_at, created_at";

fn date_column(row: &Row, name: &str) -> Result<NaiveDate> {
    let raw: String = row.get(name)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(raw.clone())),
        )
    })
}

pub fn map_program(row: &Row) -> Result<Program> {
    Ok(Program {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        total_sessions: row.get("total_sessions")?,
        start_date: date_column(row, "start_date")?,
        end_date: date_column(row, "end_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn map_participant(row: &Row) -> Result<Participant> {
    Ok(Participant {
        id: row.get("id")?,
        program_id: row.get("program_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        department: row.get("department")?,
        position: row.get("position")?,
        gift_received: row.get::<_, i32>("gift_received")? == 1,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn map_attendance(row: &Row) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.get("id")?,
        participant_id: row.get("participant_id")?,
        program_id: row.get("program_id")?,
        session_number: row.get("session_number")?,
        signature_data: row.get("signature_data")?,
        attended_at: row.get("attended_at")?,
        created_at: row.get("created_at")?,
    })
}

/// `None` as id lets SQLite assign the next autoincrement value.
fn explicit_id(id: i64) -> Option<i64> {
    if id > 0 { Some(id) } else { None }
}

// ---------------------------
// Programs
// ---------------------------

pub fn load_programs(conn: &Connection) -> AppResult<Vec<Program>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROGRAM_COLUMNS} FROM programs ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map([], map_program)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_program(conn: &Connection, id: i64) -> AppResult<Option<Program>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = ?1"
    ))?;
    Ok(stmt.query_row([id], map_program).optional()?)
}

pub fn insert_program(conn: &Connection, p: &Program) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO programs (id, name, description, total_sessions, start_date, end_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            explicit_id(p.id),
            p.name,
            p.description,
            p.total_sessions,
            p.start_str(),
            p.end_str(),
            p.created_at,
            p.updated_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_program(conn: &Connection, p: &Program) -> AppResult<()> {
    conn.execute(
        "UPDATE programs
         SET name = ?1, description = ?2, total_sessions = ?3,
             start_date = ?4, end_date = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            p.name,
            p.description,
            p.total_sessions,
            p.start_str(),
            p.end_str(),
            p.updated_at,
            p.id,
        ],
    )?;
    Ok(())
}

// ---------------------------
// Participants
// ---------------------------

pub fn load_participants(conn: &Connection, program_id: Option<i64>) -> AppResult<Vec<Participant>> {
    let mut out = Vec::new();

    match program_id {
        Some(pid) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE program_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([pid], map_participant)?;
            for r in rows {
                out.push(r?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PARTICIPANT_COLUMNS} FROM participants ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([], map_participant)?;
            for r in rows {
                out.push(r?);
            }
        }
    }

    Ok(out)
}

pub fn load_participant(conn: &Connection, id: i64) -> AppResult<Option<Participant>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?1"
    ))?;
    Ok(stmt.query_row([id], map_participant).optional()?)
}

pub fn insert_participant(conn: &Connection, p: &Participant) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO participants (id, program_id, name, email, phone, department, position, gift_received, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            explicit_id(p.id),
            p.program_id,
            p.name,
            p.email,
            p.phone,
            p.department,
            p.position,
            if p.gift_received { 1 } else { 0 },
            p.created_at,
            p.updated_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_participant(conn: &Connection, p: &Participant) -> AppResult<()> {
    conn.execute(
        "UPDATE participants
         SET name = ?1, email = ?2, phone = ?3, department = ?4,
             position = ?5, gift_received = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            p.name,
            p.email,
            p.phone,
            p.department,
            p.position,
            if p.gift_received { 1 } else { 0 },
            p.updated_at,
            p.id,
        ],
    )?;
    Ok(())
}

pub fn set_gift_received(
    conn: &Connection,
    participant_id: i64,
    received: bool,
    updated_at: &str,
) -> AppResult<usize> {
    let changed = conn.execute(
        "UPDATE participants SET gift_received = ?1, updated_at = ?2 WHERE id = ?3",
        params![if received { 1 } else { 0 }, updated_at, participant_id],
    )?;
    Ok(changed)
}

// ---------------------------
// Attendance
// ---------------------------

pub fn load_attendance(conn: &Connection, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(pid) = filter.program_id {
        clauses.push("program_id = ?");
        values.push(Box::new(pid));
    }
    if let Some(id) = filter.participant_id {
        clauses.push("participant_id = ?");
        values.push(Box::new(id));
    }
    if let Some(s) = filter.session_number {
        clauses.push("session_number = ?");
        values.push(Box::new(s));
    }
    // attended_at is RFC 3339: its first 10 chars are the local calendar date
    if let Some(from) = filter.from {
        clauses.push("substr(attended_at, 1, 10) >= ?");
        values.push(Box::new(from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = filter.to {
        clauses.push("substr(attended_at, 1, 10) <= ?");
        values.push(Box::new(to.format("%Y-%m-%d").to_string()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance {where_sql} ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        map_attendance,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_attendance_by_tuple(
    conn: &Connection,
    participant_id: i64,
    program_id: i64,
    session_number: u32,
) -> AppResult<Option<AttendanceRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance
         WHERE participant_id = ?1 AND program_id = ?2 AND session_number = ?3"
    ))?;
    Ok(stmt
        .query_row(params![participant_id, program_id, session_number], map_attendance)
        .optional()?)
}

/// Insert or replace the record of one tuple. On conflict the existing row
/// keeps its id and `created_at`; signature and `attended_at` are replaced.
pub fn upsert_attendance(conn: &Connection, u: &AttendanceUpsert) -> AppResult<AttendanceRecord> {
    conn.execute(
        "INSERT INTO attendance (participant_id, program_id, session_number, signature_data, attended_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(participant_id, program_id, session_number)
         DO UPDATE SET signature_data = excluded.signature_data,
                       attended_at    = excluded.attended_at",
        params![
            u.participant_id,
            u.program_id,
            u.session_number,
            u.signature_data,
            u.attended_at,
        ],
    )?;

    load_attendance_by_tuple(conn, u.participant_id, u.program_id, u.session_number)?.ok_or_else(
        || AppError::Other(format!("attendance row for {:?} vanished after upsert", u.tuple())),
    )
}

/// Raw insert preserving id and timestamps (seed import).
pub fn insert_attendance_record(conn: &Connection, r: &AttendanceRecord) -> AppResult<()> {
    conn.execute(
        "INSERT INTO attendance (id, participant_id, program_id, session_number, signature_data, attended_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            explicit_id(r.id),
            r.participant_id,
            r.program_id,
            r.session_number,
            r.signature_data,
            r.attended_at,
            r.created_at,
        ],
    )?;
    Ok(())
}

pub fn delete_attendance(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM attendance WHERE id = ?1", [id])?)
}

pub fn count_rows(conn: &Connection, table: &str) -> AppResult<i64> {
    let sql = match table {
        "programs" => "SELECT COUNT(*) FROM programs",
        "participants" => "SELECT COUNT(*) FROM participants",
        "attendance" => "SELECT COUNT(*) FROM attendance",
        other => return Err(AppError::Other(format!("unknown table {other}"))),
    };
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}
