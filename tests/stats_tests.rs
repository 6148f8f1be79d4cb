mod common;
use common::date;
use rattendance::core::stats::{
    counted_sessions, gift_overview, incomplete_participants, is_complete, participant_attendance_rate,
    program_completion_rate, program_stats, report_totals,
};
use rattendance::models::attendance::AttendanceUpsert;
use rattendance::models::participant::NewParticipant;
use rattendance::models::program::NewProgram;
use rattendance::models::roster::ProgramRoster;
use rattendance::utils::formatting::{percent, percent_one_decimal};
use std::collections::BTreeSet;

/// Program `program_id` with `total` sessions; each entry is a participant
/// name with the sessions they signed. Participant ids start at
/// `program_id * 100`.
fn roster(program_id: i64, total: u32, people: &[(&str, &[u32])]) -> ProgramRoster {
    let program = NewProgram {
        name: format!("Program {program_id}"),
        description: String::new(),
        total_sessions: total,
        start_date: date("2025-01-06"),
        end_date: date("2025-02-28"),
    }
    .into_program(program_id);

    let mut participants = Vec::new();
    let mut records = Vec::new();
    for (i, (name, sessions)) in people.iter().enumerate() {
        let id = program_id * 100 + i as i64;
        participants.push(
            NewParticipant {
                program_id,
                name: name.to_string(),
                email: String::new(),
                phone: String::new(),
                department: None,
                position: None,
            }
            .into_participant(id),
        );
        for &s in sessions.iter() {
            let rid = records.len() as i64 + 1;
            records.push(AttendanceUpsert::new(id, program_id, s, "sig").into_record(rid));
        }
    }

    ProgramRoster::new(program, participants, records)
}

#[test]
fn attendance_rate_counts_distinct_sessions() {
    let r = roster(1, 4, &[("Ana", &[1, 2, 2, 4])]);
    let ana = &r.participants[0];

    assert!((participant_attendance_rate(ana, &r) - 0.75).abs() < 1e-9);
    assert!(!is_complete(ana, &r));
}

#[test]
fn attendance_rate_ignores_sessions_beyond_total() {
    // sessions 4 and 5 were signed before the program was shortened to 3
    let r = roster(1, 3, &[("Ben", &[1, 2, 3, 4, 5]), ("Cleo", &[2, 3, 4, 5])]);
    let ben = &r.participants[0];
    let cleo = &r.participants[1];

    assert_eq!(counted_sessions(ben, &r), BTreeSet::from([1, 2, 3]));
    assert_eq!(participant_attendance_rate(ben, &r), 1.0);
    assert!(is_complete(ben, &r));

    assert_eq!(counted_sessions(cleo, &r), BTreeSet::from([2, 3]));
    assert!((participant_attendance_rate(cleo, &r) - 2.0 / 3.0).abs() < 1e-9);
    assert!(!is_complete(cleo, &r));

    let stats = program_stats(&r);
    assert_eq!(stats.participants[1].attended, 2);
    assert!(!stats.participants[1].complete);
    assert!((stats.completion_rate - 0.5).abs() < 1e-9);
}

#[test]
fn rates_render_as_percentages() {
    assert_eq!(percent(0.75), "75%");
    assert_eq!(percent(1.0), "100%");
    assert_eq!(percent(0.0), "0%");
    assert_eq!(percent(2.0 / 3.0), "67%");

    assert_eq!(percent_one_decimal(2.0 / 3.0), "66.7%");
    assert_eq!(percent_one_decimal(0.75), "75.0%");
    assert_eq!(percent_one_decimal(1.0), "100.0%");
}

#[test]
fn completion_rate_of_program() {
    let r = roster(1, 2, &[("Ana", &[1, 2]), ("Ben", &[1]), ("Cleo", &[]), ("Dario", &[2, 1])]);
    assert!((program_completion_rate(&r) - 0.5).abs() < 1e-9);

    let empty = roster(2, 2, &[]);
    assert_eq!(program_completion_rate(&empty), 0.0);
}

#[test]
fn incomplete_participants_grouped_by_program() {
    let rosters = vec![
        roster(1, 2, &[("Ana", &[1, 2]), ("Ben", &[1])]),
        roster(2, 3, &[("Cleo", &[]), ("Dario", &[1, 2, 3]), ("Eva", &[3])]),
    ];

    let entries = incomplete_participants(&rosters);
    let summary: Vec<(i64, &str, usize, u32)> = entries
        .iter()
        .map(|e| (e.program.id, e.participant.name.as_str(), e.attended, e.total))
        .collect();

    assert_eq!(
        summary,
        vec![(1, "Ben", 1, 2), (2, "Cleo", 0, 3), (2, "Eva", 1, 3)]
    );
}

#[test]
fn gift_flag_is_independent_of_attendance() {
    let mut r = roster(1, 2, &[("Ana", &[1, 2]), ("Ben", &[])]);
    r.participants[1].gift_received = true;
    let rosters = vec![r];

    let all = gift_overview(&rosters, None);
    assert_eq!(all.len(), 2);

    let ana = &all[0];
    assert!(ana.eligible);
    assert!(!ana.gift_received);

    let ben = &all[1];
    assert!(!ben.eligible);
    assert!(ben.gift_received);

    let received = gift_overview(&rosters, Some(true));
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].participant.name, "Ben");

    let pending = gift_overview(&rosters, Some(false));
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].participant.name, "Ana");
}

#[test]
fn program_stats_per_session_and_overall() {
    let r = roster(1, 4, &[("Ana", &[1, 2, 3, 4]), ("Ben", &[1, 1, 3])]);
    let stats = program_stats(&r);

    assert_eq!(stats.participant_count, 2);
    assert_eq!(stats.total_sessions, 4);
    assert_eq!(stats.sessions.len(), 4);

    let per_session: Vec<usize> = stats.sessions.iter().map(|s| s.attended).collect();
    assert_eq!(per_session, vec![2, 1, 2, 1]);
    assert_eq!(stats.sessions[0].rate, 1.0);
    assert_eq!(stats.sessions[1].rate, 0.5);

    // 6 distinct slots out of 8
    assert!((stats.overall_rate - 0.75).abs() < 1e-9);
    assert!((stats.completion_rate - 0.5).abs() < 1e-9);

    let ben = &stats.participants[1];
    assert_eq!(ben.attended, 2);
    assert!(!ben.complete);
}

#[test]
fn report_totals_sum_all_programs() {
    let mut first = roster(1, 2, &[("Ana", &[1, 2]), ("Ben", &[1])]);
    first.participants[0].gift_received = true;
    let second = roster(2, 1, &[("Cleo", &[1])]);

    let totals = report_totals(&[first, second]);
    assert_eq!(totals.programs, 2);
    assert_eq!(totals.participants, 3);
    assert_eq!(totals.attendance_records, 4);
    assert_eq!(totals.complete_participants, 2);
    assert_eq!(totals.gifts_received, 1);
}
