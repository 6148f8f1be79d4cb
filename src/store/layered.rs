use super::RecordStore;
use super::cache::CacheStore;
use super::seed::SeedStore;
use super::snapshot::{Hierarchy, Snapshot};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::{NewParticipant, Participant, ParticipantChanges};
use crate::models::program::{NewProgram, Program, ProgramChanges};
use crate::ui::messages::warning;

/// Remote tier when configured, else the cache, else the seed data.
///
/// Reads fall through the tiers on store failures. Writes go to the remote
/// tier when there is one, otherwise to the cache; they never fall back.
/// The cache mirrors the remote after the first remote read and after every
/// remote write, so a later fallback serves the last known remote state.
pub struct LayeredStore {
    remote: Option<Box<dyn RecordStore>>,
    cache: CacheStore,
    seed: SeedStore,
    cache_ready: bool,
    mirrored: bool,
    degraded: bool,
}

impl LayeredStore {
    pub fn new(remote: Option<Box<dyn RecordStore>>, cache: CacheStore, seed: SeedStore) -> Self {
        Self {
            remote,
            cache,
            seed,
            cache_ready: false,
            mirrored: false,
            degraded: false,
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Make sure the cache holds a valid data set, writing the seed data
    /// into it when it is missing or unreadable.
    fn ensure_cache(&mut self) {
        if self.cache_ready {
            return;
        }

        match self.cache.load() {
            Ok(Some(_)) => self.cache_ready = true,
            Ok(None) => self.seed_cache(),
            Err(e) => {
                warning(format!("Cache unreadable ({e}); restoring seed data."));
                self.seed_cache();
            }
        }
    }

    fn seed_cache(&mut self) {
        match self.cache.save(self.seed.snapshot()) {
            Ok(()) => self.cache_ready = true,
            Err(e) => warning(format!(
                "Cannot write cache in {} ({e}); serving seed data.",
                self.cache.dir().display()
            )),
        }
    }

    /// Replace the cache with the remote data set. A remote write has
    /// already committed at this point, so failures only warn.
    fn mirror_remote(&mut self) {
        let Some(remote) = self.remote.as_mut() else {
            return;
        };

        let result = remote_snapshot(remote.as_mut()).and_then(|snapshot| self.cache.save(&snapshot));
        match result {
            Ok(()) => {
                self.cache_ready = true;
                self.mirrored = true;
            }
            Err(e) => {
                self.mirrored = false;
                warning(format!(
                    "Cannot update cache in {} ({e}); it may be stale.",
                    self.cache.dir().display()
                ));
            }
        }
    }

    fn read<T>(&mut self, mut op: impl FnMut(&mut dyn RecordStore) -> AppResult<T>) -> AppResult<T> {
        if let Some(remote) = self.remote.as_mut() {
            match op(remote.as_mut()) {
                Ok(v) => {
                    if !self.mirrored {
                        self.mirror_remote();
                    }
                    return Ok(v);
                }
                Err(e) if e.is_store_failure() => {
                    if !self.degraded {
                        warning(format!("{} read failed ({e}); using local cache.", remote.backend_name()));
                        self.degraded = true;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        self.ensure_cache();
        if self.cache_ready {
            match op(&mut self.cache) {
                Ok(v) => return Ok(v),
                Err(e) if e.is_store_failure() => {
                    warning(format!("Cache read failed ({e}); using seed data."));
                    self.cache_ready = false;
                }
                Err(e) => return Err(e),
            }
        }

        op(&mut self.seed)
    }

    fn write<T>(&mut self, op: impl FnOnce(&mut dyn RecordStore) -> AppResult<T>) -> AppResult<T> {
        if let Some(remote) = self.remote.as_mut() {
            let out = op(remote.as_mut())?;
            self.mirror_remote();
            return Ok(out);
        }

        self.ensure_cache();
        if !self.cache_ready {
            return Err(AppError::StoreUnavailable(format!(
                "cache in {} is not writable",
                self.cache.dir().display()
            )));
        }
        op(&mut self.cache)
    }
}

fn remote_snapshot(remote: &mut dyn RecordStore) -> AppResult<Snapshot> {
    let hierarchy = Hierarchy {
        programs: remote.list_programs()?,
        participants: remote.list_participants(None)?,
    };
    let records = remote.list_attendance(&AttendanceFilter::default())?;
    Ok(Snapshot::new(hierarchy, records))
}

impl RecordStore for LayeredStore {
    fn backend_name(&self) -> &'static str {
        match &self.remote {
            Some(remote) => remote.backend_name(),
            None => self.cache.backend_name(),
        }
    }

    fn list_programs(&mut self) -> AppResult<Vec<Program>> {
        self.read(|s| s.list_programs())
    }

    fn get_program(&mut self, id: i64) -> AppResult<Program> {
        self.read(|s| s.get_program(id))
    }

    fn create_program(&mut self, input: &NewProgram) -> AppResult<Program> {
        self.write(|s| s.create_program(input))
    }

    fn update_program(&mut self, id: i64, changes: &ProgramChanges) -> AppResult<Program> {
        self.write(|s| s.update_program(id, changes))
    }

    fn list_participants(&mut self, program_id: Option<i64>) -> AppResult<Vec<Participant>> {
        self.read(|s| s.list_participants(program_id))
    }

    fn get_participant(&mut self, id: i64) -> AppResult<Participant> {
        self.read(|s| s.get_participant(id))
    }

    fn create_participant(&mut self, input: &NewParticipant) -> AppResult<Participant> {
        self.write(|s| s.create_participant(input))
    }

    fn update_participant(&mut self, id: i64, changes: &ParticipantChanges) -> AppResult<Participant> {
        self.write(|s| s.update_participant(id, changes))
    }

    fn set_gift_status(&mut self, participant_id: i64, received: bool) -> AppResult<Participant> {
        self.write(|s| s.set_gift_status(participant_id, received))
    }

    fn list_attendance(&mut self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        self.read(|s| s.list_attendance(filter))
    }

    fn upsert_attendance(&mut self, upserts: &[AttendanceUpsert]) -> AppResult<Vec<AttendanceRecord>> {
        self.write(|s| s.upsert_attendance(upserts))
    }

    fn delete_attendance(&mut self, id: i64) -> AppResult<()> {
        self.write(|s| s.delete_attendance(id))
    }

    fn log(&mut self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        match self.remote.as_mut() {
            Some(remote) => remote.log(operation, target, message),
            None => Ok(()),
        }
    }
}
