mod common;
use common::date;
use rattendance::export::model::{
    ABSENT, GiftLabels, PRESENT, build_all_programs_tables, build_program_rows, build_program_table, build_program_table_with,
    export_file_name, program_headers,
};
use rattendance::models::attendance::AttendanceUpsert;
use rattendance::models::participant::NewParticipant;
use rattendance::models::program::NewProgram;
use rattendance::models::roster::ProgramRoster;

fn sample_roster(program_id: i64, total: u32) -> ProgramRoster {
    let program = NewProgram {
        name: format!("Leadership {program_id}"),
        description: String::new(),
        total_sessions: total,
        start_date: date("2025-04-01"),
        end_date: date("2025-04-30"),
    }
    .into_program(program_id);

    let mut ana = NewParticipant {
        program_id,
        name: "Ana Silva".into(),
        email: "ana@example.com".into(),
        phone: "555-0101".into(),
        department: Some("Sales".into()),
        position: None,
    }
    .into_participant(1);
    ana.gift_received = true;

    let ben = NewParticipant {
        program_id,
        name: "Ben Ode".into(),
        email: String::new(),
        phone: String::new(),
        department: None,
        position: Some("Engineer".into()),
    }
    .into_participant(2);

    let records = vec![
        AttendanceUpsert::new(1, program_id, 1, "a1").into_record(1),
        AttendanceUpsert::new(1, program_id, 3, "a3").into_record(2),
        AttendanceUpsert::new(2, program_id, 2, "b2").into_record(3),
    ];

    ProgramRoster::new(program, vec![ana, ben], records)
}

#[test]
fn headers_have_one_column_per_session() {
    let headers = program_headers(3);
    assert_eq!(headers.len(), 8 + 3);
    assert_eq!(&headers[..6], ["Name", "Department", "Position", "Email", "Phone", "Gift"]);
    assert_eq!(&headers[6..9], ["Session 1", "Session 2", "Session 3"]);
    assert_eq!(&headers[9..], ["Attended", "Rate"]);
}

#[test]
fn rows_mark_present_and_absent_sessions() {
    let table = build_program_table(&sample_roster(1, 3));
    assert_eq!(table.rows.len(), 2);

    let ana = &table.rows[0];
    assert_eq!(ana.sessions, vec![true, false, true]);
    assert_eq!(ana.total_attended, 2);
    assert_eq!(ana.rate, "66.7%");
    assert_eq!(ana.gift_status, "Received");
    assert_eq!(ana.department, "Sales");
    assert_eq!(ana.position, "");

    let cells = ana.cells();
    assert_eq!(cells.len(), table.headers.len());
    assert_eq!(&cells[6..9], [PRESENT, ABSENT, PRESENT]);
    assert_eq!(&cells[9..], ["2", "66.7%"]);

    let ben = &table.rows[1];
    assert_eq!(ben.gift_status, "Not received");
    assert_eq!(ben.rate, "33.3%");
}

#[test]
fn custom_gift_labels() {
    let labels = GiftLabels {
        received: "Yes".into(),
        pending: "No".into(),
    };
    let table = build_program_table_with(&sample_roster(1, 3), &labels);
    let gifts: Vec<&str> = table.rows.iter().map(|r| r.gift_status.as_str()).collect();
    assert_eq!(gifts, vec!["Yes", "No"]);
}

#[test]
fn title_names_sessions_and_participants() {
    let table = build_program_table(&sample_roster(7, 4));
    assert_eq!(table.title(), "Leadership 7 (4 sessions, 2 participants)");
    assert_eq!(table.cell_rows().len(), 2);
}

#[test]
fn all_programs_stay_in_separate_tables() {
    let tables = build_all_programs_tables(&[sample_roster(1, 3), sample_roster(2, 5)]);
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].headers.len(), 11);
    assert_eq!(tables[1].headers.len(), 13);
    assert_eq!(tables[1].rows[0].sessions.len(), 5);
}

#[test]
fn file_names_carry_program_and_date() {
    let d = date("2025-05-02");
    assert_eq!(export_file_name(Some("Sales 2025"), "csv", d), "Sales 2025_2025-05-02.csv");
    assert_eq!(export_file_name(Some("Q1/Q2: intro"), "pdf", d), "Q1_Q2_ intro_2025-05-02.pdf");
    assert_eq!(export_file_name(None, "xlsx", d), "all_programs_2025-05-02.xlsx");
}

#[test]
fn program_without_participants_has_no_rows() {
    let mut roster = sample_roster(3, 2);
    roster.participants.clear();
    assert!(build_program_rows(&roster).is_empty());
    assert_eq!(build_program_table(&roster).title(), "Leadership 3 (2 sessions, 0 participants)");
}
