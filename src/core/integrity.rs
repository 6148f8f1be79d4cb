//! Store-level consistency checks used by `db --check`.

use crate::errors::AppResult;
use crate::models::attendance::{AttendanceFilter, AttendanceRecord};
use crate::store::RecordStore;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// More than one record for the same (participant, program, session).
    DuplicateTuple { participant_id: i64, program_id: i64, session_number: u32, ids: Vec<i64> },
    /// The record's program differs from its participant's program.
    ProgramMismatch { record_id: i64, participant_id: i64, record_program: i64, participant_program: i64 },
    /// Session number outside `1..=total_sessions` (e.g. after the program was shortened).
    SessionOutOfRange { record_id: i64, session_number: u32, total: u32 },
    /// Record pointing at a participant or program that does not exist.
    Orphan { record_id: i64 },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::DuplicateTuple {
                participant_id,
                program_id,
                session_number,
                ids,
            } => write!(
                f,
                "duplicate records {ids:?} for participant {participant_id}, program {program_id}, session {session_number}"
            ),
            IntegrityIssue::ProgramMismatch {
                record_id,
                participant_id,
                record_program,
                participant_program,
            } => write!(
                f,
                "record {record_id}: program {record_program} but participant {participant_id} is in program {participant_program}"
            ),
            IntegrityIssue::SessionOutOfRange {
                record_id,
                session_number,
                total,
            } => write!(f, "record {record_id}: session {session_number} outside 1..={total}"),
            IntegrityIssue::Orphan { record_id } => {
                write!(f, "record {record_id}: unknown participant or program")
            }
        }
    }
}

pub fn check_store(store: &mut dyn RecordStore) -> AppResult<Vec<IntegrityIssue>> {
    let programs: HashMap<i64, u32> = store
        .list_programs()?
        .into_iter()
        .map(|p| (p.id, p.total_sessions))
        .collect();
    let owners: HashMap<i64, i64> = store
        .list_participants(None)?
        .into_iter()
        .map(|p| (p.id, p.program_id))
        .collect();
    let records = store.list_attendance(&AttendanceFilter::default())?;

    Ok(check_records(&programs, &owners, &records))
}

fn check_records(
    programs: &HashMap<i64, u32>,
    owners: &HashMap<i64, i64>,
    records: &[AttendanceRecord],
) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let mut by_tuple: HashMap<(i64, i64, u32), Vec<i64>> = HashMap::new();

    for r in records {
        by_tuple.entry(r.tuple()).or_default().push(r.id);

        let (Some(&owner), Some(&total)) = (owners.get(&r.participant_id), programs.get(&r.program_id))
        else {
            issues.push(IntegrityIssue::Orphan { record_id: r.id });
            continue;
        };

        if owner != r.program_id {
            issues.push(IntegrityIssue::ProgramMismatch {
                record_id: r.id,
                participant_id: r.participant_id,
                record_program: r.program_id,
                participant_program: owner,
            });
        }
        if r.session_number < 1 || r.session_number > total {
            issues.push(IntegrityIssue::SessionOutOfRange {
                record_id: r.id,
                session_number: r.session_number,
                total,
            });
        }
    }

    let mut duplicates: Vec<_> = by_tuple.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
    duplicates.sort();
    for ((participant_id, program_id, session_number), ids) in duplicates {
        issues.push(IntegrityIssue::DuplicateTuple {
            participant_id,
            program_id,
            session_number,
            ids,
        });
    }

    issues
}
