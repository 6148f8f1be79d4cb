#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rattendance::models::participant::NewParticipant;
use rattendance::models::program::NewProgram;
use rattendance::store::{CacheStore, RecordStore, SqliteStore};
use chrono::NaiveDate;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rat() -> Command {
    cargo_bin_cmd!("rattendance")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a unique, empty cache directory inside the system temp dir
pub fn setup_cache_dir(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance_cache", name));
    fs::remove_dir_all(&path).ok();
    path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize a DB loaded with the demo data set
pub fn init_db_with_seed(db_path: &str, cache_dir: &str) {
    rat()
        .args(["--db", db_path, "--cache-dir", cache_dir, "--test", "init", "--seed"])
        .assert()
        .success();
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
}

/// A program with `sessions` sessions and `names.len()` participants.
/// Returns the program id and the participant ids in `names` order.
pub fn add_program_with(store: &mut dyn RecordStore, sessions: u32, names: &[&str]) -> (i64, Vec<i64>) {
    let program = store
        .create_program(&NewProgram {
            name: format!("Course {sessions}"),
            description: String::new(),
            total_sessions: sessions,
            start_date: date("2025-03-01"),
            end_date: date("2025-03-31"),
        })
        .expect("create program");

    let ids = names
        .iter()
        .map(|name| {
            store
                .create_participant(&NewParticipant {
                    program_id: program.id,
                    name: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    phone: String::new(),
                    department: None,
                    position: None,
                })
                .expect("create participant")
                .id
        })
        .collect();

    (program.id, ids)
}

pub fn sqlite_store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("in-memory store")
}

/// Empty cache store in a fresh temp dir
pub fn cache_store(name: &str) -> CacheStore {
    CacheStore::new(setup_cache_dir(name))
}
