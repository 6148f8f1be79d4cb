use super::RecordStore;
use super::snapshot::{Hierarchy, Snapshot};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::{NewParticipant, Participant, ParticipantChanges};
use crate::models::program::{NewProgram, Program, ProgramChanges};
use crate::ui::messages::warning;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const HIERARCHY_FILE: &str = "hierarchy.json";
pub const ATTENDANCE_FILE: &str = "attendance.json";

/// Locally persisted copy of the data set: two JSON files in one directory.
///
/// The files are only valid together. Every write rewrites both through
/// temporary files and renames.
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn hierarchy_path(&self) -> PathBuf {
        self.dir.join(HIERARCHY_FILE)
    }

    pub fn attendance_path(&self) -> PathBuf {
        self.dir.join(ATTENDANCE_FILE)
    }

    /// Read both files.
    ///
    /// An interrupted save is settled first. `Ok(None)` when neither file
    /// exists, an error when only one exists or either fails to parse. Records that break the tuple or program
    /// invariants are dropped and the cleaned cache is written back.
    pub fn load(&self) -> AppResult<Option<Snapshot>> {
        self.recover_interrupted_save()?;

        let hierarchy = read_optional(&self.hierarchy_path())?;
        let records = read_optional(&self.attendance_path())?;

        let (hierarchy, records) = match (hierarchy, records) {
            (None, None) => return Ok(None),
            (Some(h), Some(r)) => (h, r),
            (Some(_), None) => {
                return Err(AppError::StoreUnavailable(format!(
                    "{} is missing",
                    self.attendance_path().display()
                )));
            }
            (None, Some(_)) => {
                return Err(AppError::StoreUnavailable(format!(
                    "{} is missing",
                    self.hierarchy_path().display()
                )));
            }
        };

        let hierarchy: Hierarchy = serde_json::from_str(&hierarchy).map_err(|e| {
            AppError::StoreUnavailable(format!("{}: {e}", self.hierarchy_path().display()))
        })?;
        let records: Vec<AttendanceRecord> = serde_json::from_str(&records).map_err(|e| {
            AppError::StoreUnavailable(format!("{}: {e}", self.attendance_path().display()))
        })?;

        let mut snapshot = Snapshot::new(hierarchy, records);
        let report = snapshot.reconcile();
        if !report.is_clean() {
            warning(format!(
                "Cache cleaned: {} orphan, {} mismatched and {} duplicate attendance record(s) dropped.",
                report.orphans, report.mismatched, report.duplicates
            ));
            self.save(&snapshot)?;
        }

        Ok(Some(snapshot))
    }

    /// Replace both files.
    ///
    /// Both temporary files are fully written before the hierarchy is
    /// renamed, and the attendance file is renamed last. A lone pending
    /// attendance file therefore marks a complete save that stopped between
    /// the two renames; `load` finishes it.
    pub fn save(&self, snapshot: &Snapshot) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(store_io)?;

        let hierarchy_tmp = pending_path(&self.hierarchy_path());
        let attendance_tmp = pending_path(&self.attendance_path());
        write_synced(&hierarchy_tmp, &snapshot.hierarchy)?;
        write_synced(&attendance_tmp, &snapshot.records)?;

        fs::rename(&hierarchy_tmp, self.hierarchy_path()).map_err(store_io)?;
        fs::rename(&attendance_tmp, self.attendance_path()).map_err(store_io)?;
        Ok(())
    }

    /// Settle what an interrupted `save` left behind: roll a save that
    /// stopped between the renames forward, discard one that stopped earlier.
    fn recover_interrupted_save(&self) -> AppResult<()> {
        let hierarchy_tmp = pending_path(&self.hierarchy_path());
        let attendance_tmp = pending_path(&self.attendance_path());

        match (hierarchy_tmp.exists(), attendance_tmp.exists()) {
            (false, true) => {
                warning("Completing an interrupted cache write.");
                fs::rename(&attendance_tmp, self.attendance_path()).map_err(store_io)?;
            }
            (true, _) => {
                fs::remove_file(&hierarchy_tmp).map_err(store_io)?;
                if attendance_tmp.exists() {
                    fs::remove_file(&attendance_tmp).map_err(store_io)?;
                }
            }
            (false, false) => {}
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.hierarchy_path().exists() || self.attendance_path().exists()
    }

    fn current(&self) -> AppResult<Snapshot> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Load, change, save. Nothing is written when `change` fails.
    fn modify<T>(&self, change: impl FnOnce(&mut Snapshot) -> AppResult<T>) -> AppResult<T> {
        let mut snapshot = self.current()?;
        let out = change(&mut snapshot)?;
        self.save(&snapshot)?;
        Ok(out)
    }
}

fn read_optional(path: &Path) -> AppResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(store_io(e)),
    }
}

/// Temporary file a save writes before renaming it over `path`.
pub fn pending_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

fn write_synced<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path).map_err(store_io)?;
    file.write_all(json.as_bytes()).map_err(store_io)?;
    file.sync_all().map_err(store_io)?;
    Ok(())
}

fn store_io(e: std::io::Error) -> AppError {
    AppError::Io(e).into_store_error()
}

impl RecordStore for CacheStore {
    fn backend_name(&self) -> &'static str {
        "cache"
    }

    fn list_programs(&mut self) -> AppResult<Vec<Program>> {
        Ok(self.current()?.hierarchy.programs)
    }

    fn get_program(&mut self, id: i64) -> AppResult<Program> {
        self.current()?.program(id).cloned()
    }

    fn create_program(&mut self, input: &NewProgram) -> AppResult<Program> {
        self.modify(|s| s.add_program(input))
    }

    fn update_program(&mut self, id: i64, changes: &ProgramChanges) -> AppResult<Program> {
        self.modify(|s| s.edit_program(id, changes))
    }

    fn list_participants(&mut self, program_id: Option<i64>) -> AppResult<Vec<Participant>> {
        Ok(self.current()?.participants_of(program_id))
    }

    fn get_participant(&mut self, id: i64) -> AppResult<Participant> {
        self.current()?.participant(id).cloned()
    }

    fn create_participant(&mut self, input: &NewParticipant) -> AppResult<Participant> {
        self.modify(|s| s.add_participant(input))
    }

    fn update_participant(&mut self, id: i64, changes: &ParticipantChanges) -> AppResult<Participant> {
        self.modify(|s| s.edit_participant(id, changes))
    }

    fn set_gift_status(&mut self, participant_id: i64, received: bool) -> AppResult<Participant> {
        self.modify(|s| s.set_gift(participant_id, received))
    }

    fn list_attendance(&mut self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        Ok(self.current()?.attendance(filter))
    }

    fn upsert_attendance(&mut self, upserts: &[AttendanceUpsert]) -> AppResult<Vec<AttendanceRecord>> {
        if upserts.is_empty() {
            return Ok(Vec::new());
        }
        self.modify(|s| s.upsert(upserts))
    }

    fn delete_attendance(&mut self, id: i64) -> AppResult<()> {
        self.modify(|s| s.remove_attendance(id))
    }
}
