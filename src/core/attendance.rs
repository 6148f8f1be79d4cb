use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::Participant;
use crate::models::program::Program;
use crate::store::RecordStore;
use crate::ui::messages::warning;
use crate::utils::formatting::session_list;
use std::collections::BTreeSet;

/// Result of a multi-session write.
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    /// Sessions that had no record before the call.
    pub created_count: usize,
    /// Written records, in ascending session order.
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceStatus {
    pub program: Program,
    pub participant: Participant,
    pub attended: BTreeSet<u32>,
    pub remaining: BTreeSet<u32>,
}

impl AttendanceStatus {
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Check a requested session number against the stored program.
pub fn validate_session(program: &Program, session: i64) -> AppResult<u32> {
    match u32::try_from(session) {
        Ok(s) if (1..=program.total_sessions).contains(&s) => Ok(s),
        _ => Err(AppError::InvalidSession {
            session,
            total: program.total_sessions,
        }),
    }
}

fn require_signature(signature: &str) -> AppResult<()> {
    if signature.trim().is_empty() {
        return Err(AppError::InvalidInput("signature must not be empty".into()));
    }
    Ok(())
}

/// Load program and participant and check that they belong together.
fn load_pair(
    store: &mut dyn RecordStore,
    participant_id: i64,
    program_id: i64,
) -> AppResult<(Program, Participant)> {
    let program = store.get_program(program_id)?;
    let participant = store.get_participant(participant_id)?;

    if participant.program_id != program.id {
        return Err(AppError::ProgramMismatch {
            participant_id,
            expected: participant.program_id,
            found: program.id,
        });
    }

    Ok((program, participant))
}

fn attended_sessions(
    store: &mut dyn RecordStore,
    participant_id: i64,
    program_id: i64,
) -> AppResult<BTreeSet<u32>> {
    let records = store.list_attendance(&AttendanceFilter::for_participant(participant_id, program_id))?;
    Ok(records.iter().map(|r| r.session_number).collect())
}

fn audit(store: &mut dyn RecordStore, participant: &Participant, program: &Program, sessions: &BTreeSet<u32>) {
    let target = format!("participant {} / program {}", participant.id, program.id);
    let message = format!("{} signed session(s) {}", participant.name, session_list(sessions));
    if let Err(e) = store.log("attend", &target, &message) {
        warning(format!("Attendance saved but the audit entry failed: {e}"));
    }
}

/// Attendance workflow: validation, idempotent writes and status queries.
pub struct AttendanceLogic;

impl AttendanceLogic {
    /// Sign one session. Signing a session twice replaces the signature of
    /// the existing record.
    pub fn record_single_session(
        store: &mut dyn RecordStore,
        participant_id: i64,
        program_id: i64,
        session: i64,
        signature: &str,
    ) -> AppResult<AttendanceRecord> {
        require_signature(signature)?;
        let (program, participant) = load_pair(store, participant_id, program_id)?;
        let session = validate_session(&program, session)?;

        let upsert = AttendanceUpsert::new(participant_id, program_id, session, signature);
        let record = store
            .upsert_attendance(std::slice::from_ref(&upsert))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Other("store returned no record".into()))?;

        audit(store, &participant, &program, &BTreeSet::from([session]));
        Ok(record)
    }

    /// Sign several sessions with one signature. Every session is validated
    /// before anything is written; the write itself is a single atomic call.
    pub fn record_bulk_sessions(
        store: &mut dyn RecordStore,
        participant_id: i64,
        program_id: i64,
        sessions: &[i64],
        signature: &str,
    ) -> AppResult<BulkOutcome> {
        if sessions.is_empty() {
            return Err(AppError::InvalidInput("no session selected".into()));
        }
        require_signature(signature)?;
        let (program, participant) = load_pair(store, participant_id, program_id)?;

        let mut wanted = BTreeSet::new();
        for &s in sessions {
            wanted.insert(validate_session(&program, s)?);
        }

        let already = attended_sessions(store, participant_id, program_id)?;
        Self::write_sessions(store, &program, &participant, &wanted, &already, signature)
    }

    /// Sign every session not attended yet. Attended sessions are left as
    /// they are; nothing is written when none remain.
    pub fn record_all_remaining_sessions(
        store: &mut dyn RecordStore,
        participant_id: i64,
        program_id: i64,
        signature: &str,
    ) -> AppResult<BulkOutcome> {
        require_signature(signature)?;
        let (program, participant) = load_pair(store, participant_id, program_id)?;

        let already = attended_sessions(store, participant_id, program_id)?;
        let remaining: BTreeSet<u32> = program.sessions().filter(|s| !already.contains(s)).collect();
        if remaining.is_empty() {
            return Ok(BulkOutcome::default());
        }

        Self::write_sessions(store, &program, &participant, &remaining, &already, signature)
    }

    pub fn list_attendance_status(
        store: &mut dyn RecordStore,
        participant_id: i64,
        program_id: i64,
    ) -> AppResult<AttendanceStatus> {
        let (program, participant) = load_pair(store, participant_id, program_id)?;

        // records outside the current range do not count
        let attended: BTreeSet<u32> = attended_sessions(store, participant_id, program_id)?
            .into_iter()
            .filter(|s| *s <= program.total_sessions)
            .collect();
        let remaining = program.sessions().filter(|s| !attended.contains(s)).collect();

        Ok(AttendanceStatus {
            program,
            participant,
            attended,
            remaining,
        })
    }

    fn write_sessions(
        store: &mut dyn RecordStore,
        program: &Program,
        participant: &Participant,
        sessions: &BTreeSet<u32>,
        already: &BTreeSet<u32>,
        signature: &str,
    ) -> AppResult<BulkOutcome> {
        // BTreeSet iteration keeps the ascending session order
        let upserts: Vec<AttendanceUpsert> = sessions
            .iter()
            .map(|&s| AttendanceUpsert::new(participant.id, program.id, s, signature))
            .collect();

        let records = store.upsert_attendance(&upserts)?;
        let created_count = sessions.iter().filter(|s| !already.contains(s)).count();

        audit(store, participant, program, sessions);

        Ok(BulkOutcome {
            created_count,
            records,
        })
    }
}
