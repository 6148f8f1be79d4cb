//! Tabular projection of rosters for the export writers. No I/O here.

use crate::core::stats::{counted_sessions, participant_attendance_rate};
use crate::models::roster::ProgramRoster;
use crate::utils::formatting::percent_one_decimal;
use crate::utils::path::sanitize_file_stem;
use chrono::NaiveDate;
use serde::Serialize;

pub const PRESENT: &str = "Present";
pub const ABSENT: &str = "Absent";

/// Text of the gift column.
#[derive(Debug, Clone)]
pub struct GiftLabels {
    pub received: String,
    pub pending: String,
}

impl Default for GiftLabels {
    fn default() -> Self {
        Self {
            received: "Received".to_string(),
            pending: "Not received".to_string(),
        }
    }
}

/// One participant line of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramRow {
    pub name: String,
    pub department: String,
    pub position: String,
    pub email: String,
    pub phone: String,
    pub gift_status: String,
    /// `sessions[i]` is session `i + 1`.
    pub sessions: Vec<bool>,
    pub total_attended: usize,
    pub rate: String,
}

impl ProgramRow {
    /// Cells in `program_headers` order, sessions as Present/Absent.
    pub fn cells(&self) -> Vec<String> {
        let mut out = vec![
            self.name.clone(),
            self.department.clone(),
            self.position.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.gift_status.clone(),
        ];
        out.extend(
            self.sessions
                .iter()
                .map(|&present| if present { PRESENT } else { ABSENT }.to_string()),
        );
        out.push(self.total_attended.to_string());
        out.push(self.rate.clone());
        out
    }
}

/// One program's export table. Programs are never merged into one table.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramTable {
    pub program_id: i64,
    pub program_name: String,
    pub total_sessions: u32,
    pub headers: Vec<String>,
    pub rows: Vec<ProgramRow>,
}

impl ProgramTable {
    pub fn title(&self) -> String {
        format!(
            "{} ({} sessions, {} participants)",
            self.program_name,
            self.total_sessions,
            self.rows.len()
        )
    }

    pub fn cell_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(ProgramRow::cells).collect()
    }
}

/// Header row for a program with `total_sessions` sessions.
pub fn program_headers(total_sessions: u32) -> Vec<String> {
    let mut headers: Vec<String> = ["Name", "Department", "Position", "Email", "Phone", "Gift"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    headers.extend((1..=total_sessions).map(|s| format!("Session {s}")));
    headers.push("Attended".to_string());
    headers.push("Rate".to_string());
    headers
}

pub fn build_program_rows(roster: &ProgramRoster) -> Vec<ProgramRow> {
    build_program_rows_with(roster, &GiftLabels::default())
}

pub fn build_program_rows_with(roster: &ProgramRoster, labels: &GiftLabels) -> Vec<ProgramRow> {
    let program = &roster.program;

    roster
        .participants
        .iter()
        .map(|p| {
            let attended = counted_sessions(p, roster);
            ProgramRow {
                name: p.name.clone(),
                department: p.department_str().to_string(),
                position: p.position_str().to_string(),
                email: p.email.clone(),
                phone: p.phone.clone(),
                gift_status: if p.gift_received {
                    labels.received.clone()
                } else {
                    labels.pending.clone()
                },
                sessions: program.sessions().map(|s| attended.contains(&s)).collect(),
                total_attended: attended.len(),
                rate: percent_one_decimal(participant_attendance_rate(p, roster)),
            }
        })
        .collect()
}

pub fn build_program_table(roster: &ProgramRoster) -> ProgramTable {
    build_program_table_with(roster, &GiftLabels::default())
}

pub fn build_program_table_with(roster: &ProgramRoster, labels: &GiftLabels) -> ProgramTable {
    ProgramTable {
        program_id: roster.program.id,
        program_name: roster.program.name.clone(),
        total_sessions: roster.program.total_sessions,
        headers: program_headers(roster.program.total_sessions),
        rows: build_program_rows_with(roster, labels),
    }
}

pub fn build_all_programs_tables(rosters: &[ProgramRoster]) -> Vec<ProgramTable> {
    build_all_programs_tables_with(rosters, &GiftLabels::default())
}

pub fn build_all_programs_tables_with(rosters: &[ProgramRoster], labels: &GiftLabels) -> Vec<ProgramTable> {
    rosters
        .iter()
        .map(|r| build_program_table_with(r, labels))
        .collect()
}

/// `{program}_{date}.{ext}`, or `all_programs_{date}.{ext}` without a program.
pub fn export_file_name(program_name: Option<&str>, ext: &str, date: NaiveDate) -> String {
    let stem = match program_name {
        Some(name) => sanitize_file_stem(name),
        None => "all_programs".to_string(),
    };
    format!("{stem}_{}.{ext}", date.format("%Y-%m-%d"))
}
