mod common;
use common::{add_program_with, cache_store, sqlite_store};
use rattendance::core::attendance::{AttendanceLogic, validate_session};
use rattendance::core::roster::load_roster;
use rattendance::core::stats::{gift_overview, incomplete_participants, is_complete, participant_attendance_rate};
use rattendance::errors::AppError;
use rattendance::export::model::build_program_rows;
use rattendance::models::attendance::AttendanceFilter;
use rattendance::models::program::ProgramChanges;
use rattendance::store::RecordStore;
use std::collections::BTreeSet;

fn records_of(store: &mut dyn RecordStore, participant: i64, program: i64) -> usize {
    store
        .list_attendance(&AttendanceFilter::for_participant(participant, program))
        .expect("list attendance")
        .len()
}

// ---------------------------
// Shared checks, run on every writable tier
// ---------------------------

fn check_resign_is_idempotent(store: &mut dyn RecordStore) {
    let (program, ids) = add_program_with(store, 5, &["Ana"]);
    let ana = ids[0];

    let first = AttendanceLogic::record_single_session(store, ana, program, 2, "sig-a").expect("first signature");
    let second = AttendanceLogic::record_single_session(store, ana, program, 2, "sig-b").expect("second signature");

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(second.signature_data, "sig-b");
    assert_eq!(records_of(store, ana, program), 1);
}

fn check_out_of_range_sessions(store: &mut dyn RecordStore) {
    let (program, ids) = add_program_with(store, 3, &["Ben"]);

    for bad in [0, 4, -1] {
        let err = AttendanceLogic::record_single_session(store, ids[0], program, bad, "sig").unwrap_err();
        assert!(
            matches!(err, AppError::InvalidSession { session, total: 3 } if session == bad),
            "unexpected error for {bad}: {err}"
        );
    }
    assert_eq!(records_of(store, ids[0], program), 0);
}

fn check_bulk_all_or_nothing(store: &mut dyn RecordStore) {
    let (program, ids) = add_program_with(store, 4, &["Cleo"]);

    let err = AttendanceLogic::record_bulk_sessions(store, ids[0], program, &[1, 2, 9], "sig").unwrap_err();
    assert!(matches!(err, AppError::InvalidSession { session: 9, total: 4 }));
    assert_eq!(records_of(store, ids[0], program), 0);

    let outcome =
        AttendanceLogic::record_bulk_sessions(store, ids[0], program, &[3, 1, 3], "sig").expect("bulk write");
    assert_eq!(outcome.created_count, 2);
    let sessions: Vec<u32> = outcome.records.iter().map(|r| r.session_number).collect();
    assert_eq!(sessions, vec![1, 3]);

    let again =
        AttendanceLogic::record_bulk_sessions(store, ids[0], program, &[1, 2], "sig2").expect("second bulk");
    assert_eq!(again.created_count, 1);
    assert_eq!(records_of(store, ids[0], program), 3);
}

fn check_all_remaining(store: &mut dyn RecordStore) {
    let (program, ids) = add_program_with(store, 5, &["Dario"]);
    let dario = ids[0];

    let kept = AttendanceLogic::record_single_session(store, dario, program, 2, "early").expect("session 2");

    let outcome =
        AttendanceLogic::record_all_remaining_sessions(store, dario, program, "late").expect("remaining");
    assert_eq!(outcome.created_count, 4);
    let sessions: Vec<u32> = outcome.records.iter().map(|r| r.session_number).collect();
    assert_eq!(sessions, vec![1, 3, 4, 5]);

    let all = store
        .list_attendance(&AttendanceFilter::for_participant(dario, program))
        .expect("list");
    assert_eq!(all.len(), 5);
    let untouched = all.iter().find(|r| r.session_number == 2).expect("session 2 record");
    assert_eq!(untouched, &kept);

    let nothing =
        AttendanceLogic::record_all_remaining_sessions(store, dario, program, "again").expect("no-op");
    assert_eq!(nothing.created_count, 0);
    assert!(nothing.records.is_empty());
}

fn check_program_mismatch(store: &mut dyn RecordStore) {
    let (first, _) = add_program_with(store, 3, &["Eva"]);
    let (_, other) = add_program_with(store, 4, &["Finn"]);

    let err = AttendanceLogic::record_single_session(store, other[0], first, 1, "sig").unwrap_err();
    assert!(matches!(err, AppError::ProgramMismatch { found, .. } if found == first));
    assert!(
        store
            .list_attendance(&AttendanceFilter::default())
            .expect("list")
            .is_empty()
    );
}

fn check_status(store: &mut dyn RecordStore) {
    let (program, ids) = add_program_with(store, 4, &["Gus"]);
    AttendanceLogic::record_bulk_sessions(store, ids[0], program, &[1, 3], "sig").expect("bulk");

    let status = AttendanceLogic::list_attendance_status(store, ids[0], program).expect("status");
    assert_eq!(status.attended, BTreeSet::from([1, 3]));
    assert_eq!(status.remaining, BTreeSet::from([2, 4]));
    assert!(!status.is_complete());
}

// ---------------------------
// SQLite tier
// ---------------------------

#[test]
fn sqlite_resign_keeps_one_record() {
    check_resign_is_idempotent(&mut sqlite_store());
}

#[test]
fn sqlite_rejects_out_of_range_sessions() {
    check_out_of_range_sessions(&mut sqlite_store());
}

#[test]
fn sqlite_bulk_is_all_or_nothing() {
    check_bulk_all_or_nothing(&mut sqlite_store());
}

#[test]
fn sqlite_all_remaining_fills_gaps_only() {
    check_all_remaining(&mut sqlite_store());
}

#[test]
fn sqlite_rejects_program_mismatch() {
    check_program_mismatch(&mut sqlite_store());
}

#[test]
fn sqlite_status_lists_attended_and_remaining() {
    check_status(&mut sqlite_store());
}

// ---------------------------
// Cache tier
// ---------------------------

#[test]
fn cache_resign_keeps_one_record() {
    check_resign_is_idempotent(&mut cache_store("att_resign"));
}

#[test]
fn cache_rejects_out_of_range_sessions() {
    check_out_of_range_sessions(&mut cache_store("att_range"));
}

#[test]
fn cache_bulk_is_all_or_nothing() {
    check_bulk_all_or_nothing(&mut cache_store("att_bulk"));
}

#[test]
fn cache_all_remaining_fills_gaps_only() {
    check_all_remaining(&mut cache_store("att_remaining"));
}

#[test]
fn cache_rejects_program_mismatch() {
    check_program_mismatch(&mut cache_store("att_mismatch"));
}

#[test]
fn cache_status_lists_attended_and_remaining() {
    check_status(&mut cache_store("att_status"));
}

fn check_three_session_walkthrough(store: &mut dyn RecordStore) {
    let (program, ids) = add_program_with(store, 3, &["Hana"]);
    let hana = ids[0];

    AttendanceLogic::record_single_session(store, hana, program, 2, "sig-2").expect("session 2");
    let outcome =
        AttendanceLogic::record_all_remaining_sessions(store, hana, program, "sig-rest").expect("remaining");
    let signed: Vec<u32> = outcome.records.iter().map(|r| r.session_number).collect();
    assert_eq!(signed, vec![1, 3]);
    assert_eq!(outcome.created_count, 2);

    let status = AttendanceLogic::list_attendance_status(store, hana, program).expect("status");
    assert_eq!(status.attended, BTreeSet::from([1, 2, 3]));
    assert!(status.remaining.is_empty());

    let roster = load_roster(store, program).expect("roster");
    let participant = &roster.participants[0];
    assert!(is_complete(participant, &roster));
    assert_eq!(participant_attendance_rate(participant, &roster), 1.0);
}

fn check_shortened_program_counts_agree(store: &mut dyn RecordStore) {
    let (program, ids) = add_program_with(store, 5, &["Ivo"]);
    let ivo = ids[0];
    AttendanceLogic::record_bulk_sessions(store, ivo, program, &[2, 3, 4, 5], "sig").expect("bulk");

    store
        .update_program(
            program,
            &ProgramChanges {
                total_sessions: Some(3),
                ..Default::default()
            },
        )
        .expect("shorten program");

    let status = AttendanceLogic::list_attendance_status(store, ivo, program).expect("status");
    assert_eq!(status.attended, BTreeSet::from([2, 3]));
    assert_eq!(status.remaining, BTreeSet::from([1]));

    let roster = load_roster(store, program).expect("roster");
    let participant = &roster.participants[0];
    assert!(!is_complete(participant, &roster));
    assert!((participant_attendance_rate(participant, &roster) - 2.0 / 3.0).abs() < 1e-9);

    let rosters = vec![roster];
    let incomplete = incomplete_participants(&rosters);
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].attended, 2);
    assert!(!gift_overview(&rosters, None)[0].eligible);

    let rows = build_program_rows(&rosters[0]);
    assert_eq!(rows[0].sessions, vec![false, true, true]);
    assert_eq!(rows[0].total_attended, 2);
    assert_eq!(rows[0].rate, "66.7%");

    // the records above the new total are still stored
    assert_eq!(records_of(store, ivo, program), 4);
}

#[test]
fn sqlite_three_session_walkthrough() {
    check_three_session_walkthrough(&mut sqlite_store());
}

#[test]
fn cache_three_session_walkthrough() {
    check_three_session_walkthrough(&mut cache_store("att_walkthrough"));
}

#[test]
fn sqlite_shortened_program_counts_agree() {
    check_shortened_program_counts_agree(&mut sqlite_store());
}

#[test]
fn cache_shortened_program_counts_agree() {
    check_shortened_program_counts_agree(&mut cache_store("att_shortened"));
}

// ---------------------------
// Preconditions
// ---------------------------

#[test]
fn missing_program_or_participant_is_not_found() {
    let mut store = sqlite_store();
    let (program, ids) = add_program_with(&mut store, 3, &["Hana"]);

    let err = AttendanceLogic::record_single_session(&mut store, ids[0], 999, 1, "sig").unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = AttendanceLogic::record_single_session(&mut store, 999, program, 1, "sig").unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn blank_signature_and_empty_bulk_are_rejected() {
    let mut store = sqlite_store();
    let (program, ids) = add_program_with(&mut store, 3, &["Ivo"]);

    let err = AttendanceLogic::record_single_session(&mut store, ids[0], program, 1, "   ").unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = AttendanceLogic::record_bulk_sessions(&mut store, ids[0], program, &[], "sig").unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn shortened_program_limits_new_sessions() {
    let mut store = sqlite_store();
    let (program, ids) = add_program_with(&mut store, 5, &["Jo"]);
    AttendanceLogic::record_single_session(&mut store, ids[0], program, 5, "sig").expect("session 5");

    store
        .update_program(
            program,
            &ProgramChanges {
                total_sessions: Some(3),
                ..Default::default()
            },
        )
        .expect("shorten program");

    let err = AttendanceLogic::record_single_session(&mut store, ids[0], program, 5, "sig").unwrap_err();
    assert!(matches!(err, AppError::InvalidSession { session: 5, total: 3 }));

    let status = AttendanceLogic::list_attendance_status(&mut store, ids[0], program).expect("status");
    assert!(status.attended.is_empty());
    assert_eq!(status.remaining.len(), 3);
}

#[test]
fn validate_session_bounds() {
    let mut store = sqlite_store();
    let (program, _) = add_program_with(&mut store, 2, &[]);
    let program = store.get_program(program).expect("program");

    assert_eq!(validate_session(&program, 1).expect("1 is valid"), 1);
    assert_eq!(validate_session(&program, 2).expect("2 is valid"), 2);
    assert!(validate_session(&program, 3).is_err());
    assert!(validate_session(&program, i64::MAX).is_err());
}
