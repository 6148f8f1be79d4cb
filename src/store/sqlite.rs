use super::snapshot::Snapshot;
use super::{RecordStore, not_found};
use crate::db::initialize::{init_db, is_empty};
use crate::db::log::audit_log;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::{NewParticipant, Participant, ParticipantChanges};
use crate::models::program::{NewProgram, Program, ProgramChanges};
use chrono::Local;
use rusqlite::Connection;

/// The remote tier: a SQLite database.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &str, busy_timeout_ms: u64) -> AppResult<Self> {
        let pool = DbPool::with_timeout(path, busy_timeout_ms).map_err(|e| AppError::Db(e).into_store_error())?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Copy a whole data set into an empty database, keeping its ids.
    /// Returns false (and writes nothing) when the database already has programs.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> AppResult<bool> {
        self.run(|conn| {
            if !is_empty(conn)? {
                return Ok(false);
            }

            let tx = conn.transaction()?;
            for p in &snapshot.hierarchy.programs {
                queries::insert_program(&tx, p)?;
            }
            for p in &snapshot.hierarchy.participants {
                queries::insert_participant(&tx, p)?;
            }
            for r in &snapshot.records {
                queries::insert_attendance_record(&tx, r)?;
            }
            tx.commit()?;
            Ok(true)
        })
    }

    fn run<T>(&mut self, f: impl FnOnce(&mut Connection) -> AppResult<T>) -> AppResult<T> {
        f(&mut self.pool.conn).map_err(AppError::into_store_error)
    }
}

fn require_program(conn: &Connection, id: i64) -> AppResult<Program> {
    queries::load_program(conn, id)?.ok_or_else(|| not_found("program", id))
}

fn require_participant(conn: &Connection, id: i64) -> AppResult<Participant> {
    queries::load_participant(conn, id)?.ok_or_else(|| not_found("participant", id))
}

impl RecordStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn list_programs(&mut self) -> AppResult<Vec<Program>> {
        self.run(|conn| queries::load_programs(conn))
    }

    fn get_program(&mut self, id: i64) -> AppResult<Program> {
        self.run(|conn| require_program(conn, id))
    }

    fn create_program(&mut self, input: &NewProgram) -> AppResult<Program> {
        input.validate()?;
        self.run(|conn| {
            let id = queries::insert_program(conn, &input.clone().into_program(0))?;
            require_program(conn, id)
        })
    }

    fn update_program(&mut self, id: i64, changes: &ProgramChanges) -> AppResult<Program> {
        self.run(|conn| {
            let updated = changes.apply_to(&require_program(conn, id)?)?;
            queries::update_program(conn, &updated)?;
            Ok(updated)
        })
    }

    fn list_participants(&mut self, program_id: Option<i64>) -> AppResult<Vec<Participant>> {
        self.run(|conn| queries::load_participants(conn, program_id))
    }

    fn get_participant(&mut self, id: i64) -> AppResult<Participant> {
        self.run(|conn| require_participant(conn, id))
    }

    fn create_participant(&mut self, input: &NewParticipant) -> AppResult<Participant> {
        input.validate()?;
        self.run(|conn| {
            require_program(conn, input.program_id)?;
            let id = queries::insert_participant(conn, &input.clone().into_participant(0))?;
            require_participant(conn, id)
        })
    }

    fn update_participant(&mut self, id: i64, changes: &ParticipantChanges) -> AppResult<Participant> {
        self.run(|conn| {
            let updated = changes.apply_to(&require_participant(conn, id)?)?;
            queries::update_participant(conn, &updated)?;
            Ok(updated)
        })
    }

    fn set_gift_status(&mut self, participant_id: i64, received: bool) -> AppResult<Participant> {
        self.run(|conn| {
            let now = Local::now().to_rfc3339();
            if queries::set_gift_received(conn, participant_id, received, &now)? == 0 {
                return Err(not_found("participant", participant_id));
            }
            require_participant(conn, participant_id)
        })
    }

    fn list_attendance(&mut self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        self.run(|conn| queries::load_attendance(conn, filter))
    }

    fn upsert_attendance(&mut self, upserts: &[AttendanceUpsert]) -> AppResult<Vec<AttendanceRecord>> {
        if upserts.is_empty() {
            return Ok(Vec::new());
        }

        self.run(|conn| {
            for u in upserts {
                let participant = require_participant(conn, u.participant_id)?;
                require_program(conn, u.program_id)?;
                if participant.program_id != u.program_id {
                    return Err(AppError::ProgramMismatch {
                        participant_id: participant.id,
                        expected: participant.program_id,
                        found: u.program_id,
                    });
                }
            }

            // one transaction: either every tuple is written or none
            let tx = conn.transaction()?;
            let mut out = Vec::with_capacity(upserts.len());
            for u in upserts {
                out.push(queries::upsert_attendance(&tx, u)?);
            }
            tx.commit()?;
            Ok(out)
        })
    }

    fn delete_attendance(&mut self, id: i64) -> AppResult<()> {
        self.run(|conn| {
            if queries::delete_attendance(conn, id)? == 0 {
                return Err(not_found("attendance record", id));
            }
            Ok(())
        })
    }

    fn log(&mut self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        self.run(|conn| audit_log(conn, operation, target, message))
    }
}
