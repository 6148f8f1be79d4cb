//! Record store adapter: one read/write contract over the three backing
//! tiers (SQLite database, JSON cache files, built-in seed data).

pub mod cache;
pub mod layered;
pub mod seed;
pub mod snapshot;
pub mod sqlite;

use crate::config::{Backend, Config};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::{NewParticipant, Participant, ParticipantChanges};
use crate::models::program::{NewProgram, Program, ProgramChanges};
use crate::ui::messages::warning;
use std::cmp::Ordering;

pub use cache::CacheStore;
pub use layered::LayeredStore;
pub use seed::SeedStore;
pub use snapshot::Snapshot;
pub use sqlite::SqliteStore;

/// Storage contract shared by every tier.
///
/// Lists come back in insertion order (ascending id). Writes are flushed
/// before returning; a write that cannot be performed returns
/// `StoreUnavailable` and leaves the store untouched.
pub trait RecordStore {
    /// Short tier name for messages ("sqlite", "cache", ...).
    fn backend_name(&self) -> &'static str;

    fn list_programs(&mut self) -> AppResult<Vec<Program>>;
    fn get_program(&mut self, id: i64) -> AppResult<Program>;
    fn create_program(&mut self, input: &NewProgram) -> AppResult<Program>;
    fn update_program(&mut self, id: i64, changes: &ProgramChanges) -> AppResult<Program>;

    fn list_participants(&mut self, program_id: Option<i64>) -> AppResult<Vec<Participant>>;
    fn get_participant(&mut self, id: i64) -> AppResult<Participant>;
    fn create_participant(&mut self, input: &NewParticipant) -> AppResult<Participant>;
    fn update_participant(&mut self, id: i64, changes: &ParticipantChanges) -> AppResult<Participant>;
    fn set_gift_status(&mut self, participant_id: i64, received: bool) -> AppResult<Participant>;

    fn list_attendance(&mut self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>>;

    /// Insert or replace one record per tuple, all or nothing.
    /// Results come back in the order of `upserts`.
    fn upsert_attendance(&mut self, upserts: &[AttendanceUpsert]) -> AppResult<Vec<AttendanceRecord>>;
    fn delete_attendance(&mut self, id: i64) -> AppResult<()>;

    /// Audit trail hook; tiers without a log ignore it.
    fn log(&mut self, _operation: &str, _target: &str, _message: &str) -> AppResult<()> {
        Ok(())
    }
}

/// Build the store selected by the configuration.
pub fn open_store(cfg: &Config) -> AppResult<Box<dyn RecordStore>> {
    let cache = CacheStore::new(crate::utils::path::expand_tilde(&cfg.cache_dir));

    match cfg.backend {
        Backend::Seed => Ok(Box::new(SeedStore::new())),
        Backend::Cache => Ok(Box::new(LayeredStore::new(None, cache, SeedStore::new()))),
        Backend::Sqlite => {
            let db_path = crate::utils::path::expand_tilde(&cfg.database);
            let remote: Option<Box<dyn RecordStore>> =
                match SqliteStore::open(&db_path.to_string_lossy(), cfg.busy_timeout_ms) {
                    Ok(store) => Some(Box::new(store)),
                    Err(e) => {
                        warning(format!(
                            "Database {} unavailable ({e}); using local cache.",
                            db_path.display()
                        ));
                        None
                    }
                };
            Ok(Box::new(LayeredStore::new(remote, cache, SeedStore::new())))
        }
    }
}

/// Order used by attendance-taking lists: case-insensitive name with Latin
/// accents folded ("Émile" next to "Emile"), then raw name, then id.
///
/// Not a full locale collation: letters outside the folded Latin range
/// compare by code point.
pub fn compare_names(a: &Participant, b: &Participant) -> Ordering {
    sort_key(&a.name)
        .cmp(&sort_key(&b.name))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn sort_key(name: &str) -> String {
    name.to_lowercase().chars().map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ł' | 'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        c => c,
    }
}

pub fn sort_by_name(participants: &mut [Participant]) {
    participants.sort_by(compare_names);
}

pub(crate) fn not_found(entity: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{entity} {id}"))
}

pub(crate) fn read_only(tier: &str) -> AppError {
    AppError::StoreUnavailable(format!("the {tier} tier is read-only"))
}
