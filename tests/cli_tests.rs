mod common;
use common::{init_db_with_seed, rat, setup_cache_dir, setup_test_db, temp_out};
use predicates::str::contains;
use std::fs;

/// Fresh seeded database plus an empty cache dir.
fn seeded(name: &str) -> (String, String) {
    let db_path = setup_test_db(name);
    let cache = setup_cache_dir(name).to_string_lossy().to_string();
    init_db_with_seed(&db_path, &cache);
    (db_path, cache)
}

fn args<'a>(db: &'a str, cache: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    let mut v = vec!["--db", db, "--cache-dir", cache];
    v.extend_from_slice(rest);
    v
}

#[test]
fn test_init_seed_and_program_list() {
    let (db, cache) = seeded("cli_init");

    rat()
        .args(args(&db, &cache, &["program", "list"]))
        .assert()
        .success()
        .stdout(contains("Web Development Basics"))
        .stdout(contains("Introduction to Cloud Computing"));
}

#[test]
fn test_init_seed_twice_keeps_data() {
    let (db, cache) = seeded("cli_init_twice");

    rat()
        .args(["--db", &db, "--cache-dir", &cache, "--test", "init", "--seed"])
        .assert()
        .success()
        .stderr(contains("demo data not loaded"));
}

#[test]
fn test_program_add_and_participant_add() {
    let (db, cache) = seeded("cli_add");

    rat()
        .args(args(
            &db,
            &cache,
            &[
                "program", "add", "--name", "Rust Basics", "--sessions", "3", "--start", "2025-09-01", "--end",
                "2025-09-03",
            ],
        ))
        .assert()
        .success()
        .stdout(contains("Program 6 created: Rust Basics (3 sessions)"));

    rat()
        .args(args(&db, &cache, &["participant", "add", "--program", "6", "--name", "Ada Park"]))
        .assert()
        .success()
        .stdout(contains("Ada Park"));

    rat()
        .args(args(&db, &cache, &["participant", "list", "--program", "6"]))
        .assert()
        .success()
        .stdout(contains("Ada Park"));
}

#[test]
fn test_program_add_rejects_zero_sessions() {
    let (db, cache) = seeded("cli_zero_sessions");

    rat()
        .args(args(
            &db,
            &cache,
            &["program", "add", "--name", "Empty", "--sessions", "0", "--start", "2025-09-01", "--end", "2025-09-02"],
        ))
        .assert()
        .failure();
}

#[test]
fn test_attend_single_session_and_status() {
    let (db, cache) = seeded("cli_attend");

    rat()
        .args(args(
            &db,
            &cache,
            &["attend", "--program", "1", "--participant", "1", "--session", "3", "--signature", "sig-data"],
        ))
        .assert()
        .success()
        .stdout(contains("Session 3 signed for participant 1."));

    rat()
        .args(args(&db, &cache, &["status", "--participant", "1"]))
        .assert()
        .success()
        .stdout(contains("Kim Minsu"))
        .stdout(contains("1, 2, 3"))
        .stdout(contains("4, 5"));
}

#[test]
fn test_attend_twice_keeps_one_record() {
    let (db, cache) = seeded("cli_attend_twice");

    for sig in ["first", "second"] {
        rat()
            .args(args(
                &db,
                &cache,
                &["attend", "--program", "2", "--participant", "10", "--session", "1", "--signature", sig],
            ))
            .assert()
            .success();
    }

    let out = rat()
        .args(args(&db, &cache, &["report", "--program", "2", "--json"]))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).expect("report is JSON");

    // program 2 starts with 4 seed records
    assert_eq!(report["totals"]["attendance_records"], 5);
}

#[test]
fn test_attend_invalid_session_fails() {
    let (db, cache) = seeded("cli_invalid_session");

    rat()
        .args(args(
            &db,
            &cache,
            &["attend", "--program", "2", "--participant", "7", "--session", "4", "--signature", "sig"],
        ))
        .assert()
        .failure()
        .stderr(contains("Invalid session number 4"));
}

#[test]
fn test_attend_wrong_program_fails() {
    let (db, cache) = seeded("cli_wrong_program");

    rat()
        .args(args(
            &db,
            &cache,
            &["attend", "--program", "1", "--participant", "7", "--session", "1", "--signature", "sig"],
        ))
        .assert()
        .failure()
        .stderr(contains("belongs to program 2"));
}

#[test]
fn test_attend_requires_signature() {
    let (db, cache) = seeded("cli_no_signature");

    rat()
        .args(args(&db, &cache, &["attend", "--program", "1", "--participant", "1", "--session", "3"]))
        .assert()
        .failure();
}

#[test]
fn test_attend_all_remaining_sessions() {
    let (db, cache) = seeded("cli_attend_all");

    rat()
        .args(args(
            &db,
            &cache,
            &["attend", "--program", "1", "--participant", "1", "--all", "--signature", "sig"],
        ))
        .assert()
        .success()
        .stdout(contains("3 session(s) signed."));

    rat()
        .args(args(
            &db,
            &cache,
            &["attend", "--program", "1", "--participant", "1", "--all", "--signature", "sig"],
        ))
        .assert()
        .success()
        .stdout(contains("nothing to do"));
}

#[test]
fn test_attend_signature_from_file() {
    let (db, cache) = seeded("cli_signature_file");
    let sig = temp_out("cli_signature_file", "txt");
    fs::write(&sig, "data:image/png;base64,AAAA\n").expect("signature file");

    rat()
        .args(args(
            &db,
            &cache,
            &[
                "attend", "--program", "3", "--participant", "12", "--session", "1", "--session", "2",
                "--signature-file", &sig,
            ],
        ))
        .assert()
        .success()
        .stdout(contains("2 session(s) signed, 2 new."));
}

#[test]
fn test_gift_toggle_and_list() {
    let (db, cache) = seeded("cli_gift");

    rat()
        .args(args(&db, &cache, &["gift", "set", "1", "--toggle"]))
        .assert()
        .success()
        .stdout(contains("Gift status of Kim Minsu (id 1): Received"));

    rat()
        .args(args(&db, &cache, &["gift", "set", "1", "--not-received"]))
        .assert()
        .success()
        .stdout(contains("Not received"));

    rat()
        .args(args(&db, &cache, &["gift", "list", "--program", "1", "--received", "true"]))
        .assert()
        .success()
        .stdout(contains("Lee Younghee"))
        .stdout(contains("3/3 gift(s) handed out."));
}

#[test]
fn test_report_json() {
    let (db, cache) = seeded("cli_report");

    let out = rat()
        .args(args(&db, &cache, &["report", "--json"]))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&out).expect("report is JSON");
    assert_eq!(report["totals"]["programs"], 5);
    assert_eq!(report["totals"]["participants"], 25);
    assert_eq!(report["totals"]["attendance_records"], 10);
    assert_eq!(report["totals"]["complete_participants"], 0);
    assert_eq!(report["programs"][0]["sessions"].as_array().map(Vec::len), Some(5));
    assert_eq!(report["incomplete"].as_array().map(Vec::len), Some(25));
}

#[test]
fn test_export_csv_single_program() {
    let (db, cache) = seeded("cli_export_csv");
    let out = temp_out("cli_export_csv", "csv");

    rat()
        .args(args(&db, &cache, &["export", "--format", "csv", "--program", "2", "--file", &out]))
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&out).expect("csv written");
    assert!(content.contains("Data Analysis Workshop (3 sessions, 5 participants)"));
    assert!(content.contains("Session 1,Session 2,Session 3,Attended,Rate"));
    assert!(content.contains("Lim Hyunwoo"));
    assert!(content.contains("66.7%"));
    assert!(!content.contains("Web Development Basics"));
}

#[test]
fn test_export_json_all_programs() {
    let (db, cache) = seeded("cli_export_json");
    let out = temp_out("cli_export_json", "json");

    rat()
        .args(args(&db, &cache, &["export", "--format", "json", "--file", &out]))
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("json written");
    let tables: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let tables = tables.as_array().expect("array of tables");
    assert_eq!(tables.len(), 5);
    assert_eq!(tables[0]["program_name"], "Web Development Basics");
    assert_eq!(tables[0]["headers"].as_array().map(Vec::len), Some(8 + 5));
}

#[test]
fn test_export_xlsx_and_pdf() {
    let (db, cache) = seeded("cli_export_bin");
    let xlsx = temp_out("cli_export_bin", "xlsx");
    let pdf = temp_out("cli_export_bin", "pdf");

    rat()
        .args(args(&db, &cache, &["export", "--format", "excel", "--file", &xlsx]))
        .assert()
        .success();
    let bytes = fs::read(&xlsx).expect("xlsx written");
    assert!(bytes.starts_with(b"PK"));

    rat()
        .args(args(&db, &cache, &["export", "--format", "pdf", "--file", &pdf]))
        .assert()
        .success()
        .stdout(contains("PDF (5 page(s)) export completed"));
    let bytes = fs::read(&pdf).expect("pdf written");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_export_relative_path_fails() {
    let (db, cache) = seeded("cli_export_relative");

    rat()
        .args(args(&db, &cache, &["export", "--format", "csv", "--file", "relative.csv"]))
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_export_existing_file_with_force() {
    let (db, cache) = seeded("cli_export_force");
    let out = temp_out("cli_export_force", "csv");
    fs::write(&out, "old").expect("existing file");

    rat()
        .args(args(&db, &cache, &["export", "--format", "csv", "--file", &out, "--force"]))
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("csv written");
    assert!(content.contains("Web Development Basics"));
}

#[test]
fn test_cache_backend_round_trip() {
    let db = setup_test_db("cli_cache_backend");
    let cache = setup_cache_dir("cli_cache_backend").to_string_lossy().to_string();

    rat()
        .args(args(&db, &cache, &["--backend", "cache", "program", "list"]))
        .assert()
        .success()
        .stdout(contains("UI/UX Design Seminar"));

    rat()
        .args(args(
            &db,
            &cache,
            &[
                "--backend", "cache", "attend", "--program", "4", "--participant", "16", "--session", "6",
                "--signature", "sig",
            ],
        ))
        .assert()
        .success();

    let records = fs::read_to_string(std::path::Path::new(&cache).join("attendance.json")).expect("cache file");
    assert!(records.contains("\"participant_id\": 16"));
}

#[test]
fn test_sqlite_writes_reach_cache_backend() {
    let (db, cache) = seeded("cli_mirror");

    rat()
        .args(args(
            &db,
            &cache,
            &[
                "program", "add", "--name", "Offline Ready", "--sessions", "2", "--start", "2025-09-01", "--end",
                "2025-09-02",
            ],
        ))
        .assert()
        .success();

    rat()
        .args(args(&db, &cache, &["--backend", "cache", "program", "list"]))
        .assert()
        .success()
        .stdout(contains("Offline Ready"));
}

#[test]
fn test_seed_backend_is_read_only() {
    let db = setup_test_db("cli_seed_backend");
    let cache = setup_cache_dir("cli_seed_backend").to_string_lossy().to_string();

    rat()
        .args(args(&db, &cache, &["--backend", "seed", "status", "--program", "2"]))
        .assert()
        .success()
        .stdout(contains("Kang Taewoo"));

    rat()
        .args(args(&db, &cache, &["--backend", "seed", "gift", "set", "1", "--received"]))
        .assert()
        .failure()
        .stderr(contains("Store unavailable"));
}

#[test]
fn test_attendance_delete() {
    let (db, cache) = seeded("cli_attendance_del");

    rat()
        .args(args(&db, &cache, &["attendance", "del", "10"]))
        .assert()
        .success()
        .stdout(contains("Attendance record 10 deleted."));

    rat()
        .args(args(&db, &cache, &["attendance", "del", "10"]))
        .assert()
        .failure()
        .stderr(contains("Not found"));
}

#[test]
fn test_backup_sqlite_compressed() {
    let (db, cache) = seeded("cli_backup");
    let out = temp_out("cli_backup", "sqlite");
    let zip = out.replace(".sqlite", ".zip");
    fs::remove_file(&zip).ok();

    rat()
        .args(args(&db, &cache, &["backup", "--file", &out, "--compress"]))
        .assert()
        .success()
        .stdout(contains("Backup created"));

    assert!(std::path::Path::new(&zip).exists());
}

#[test]
fn test_db_check_and_log() {
    let (db, cache) = seeded("cli_db_check");

    rat()
        .args(args(&db, &cache, &["db", "--check"]))
        .assert()
        .success()
        .stdout(contains("Integrity check passed."));

    rat()
        .args(args(&db, &cache, &["log", "--print"]))
        .assert()
        .success()
        .stdout(contains("seed"));
}
