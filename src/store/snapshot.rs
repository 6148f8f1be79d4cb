//! In-memory image of the whole data set, shared by the cache and seed tiers.

use super::not_found;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::{NewParticipant, Participant, ParticipantChanges};
use crate::models::program::{NewProgram, Program, ProgramChanges};
use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Programs and their participants: the content of the hierarchy file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    pub programs: Vec<Program>,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub hierarchy: Hierarchy,
    pub records: Vec<AttendanceRecord>,
}

/// What `Snapshot::reconcile` had to discard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub orphans: usize,
    pub mismatched: usize,
    pub duplicates: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.orphans == 0 && self.mismatched == 0 && self.duplicates == 0
    }
}

impl Snapshot {
    pub fn new(hierarchy: Hierarchy, records: Vec<AttendanceRecord>) -> Self {
        Self { hierarchy, records }
    }

    /// Restore the record invariants on data written by older versions or by
    /// hand: drop records of unknown participants/programs or with a program
    /// that disagrees with the participant, and keep only the newest record
    /// of each (participant, program, session) tuple.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let programs: HashSet<i64> = self.hierarchy.programs.iter().map(|p| p.id).collect();
        let owners: HashMap<i64, i64> = self
            .hierarchy
            .participants
            .iter()
            .map(|p| (p.id, p.program_id))
            .collect();

        self.records.retain(|r| match owners.get(&r.participant_id) {
            None => {
                report.orphans += 1;
                false
            }
            Some(_) if !programs.contains(&r.program_id) => {
                report.orphans += 1;
                false
            }
            Some(owner) if *owner != r.program_id => {
                report.mismatched += 1;
                false
            }
            Some(_) => true,
        });

        // newest attended_at instant wins; unparsable times lose; ties go to
        // the higher id
        let mut newest: HashMap<(i64, i64, u32), (Option<DateTime<FixedOffset>>, i64)> = HashMap::new();
        for r in &self.records {
            let candidate = (DateTime::parse_from_rfc3339(&r.attended_at).ok(), r.id);
            newest
                .entry(r.tuple())
                .and_modify(|best| {
                    if candidate > *best {
                        *best = candidate;
                    }
                })
                .or_insert(candidate);
        }

        let before = self.records.len();
        self.records
            .retain(|r| newest.get(&r.tuple()).is_some_and(|(_, id)| *id == r.id));
        report.duplicates = before - self.records.len();

        report
    }

    // ---------------------------
    // Reads
    // ---------------------------

    pub fn program(&self, id: i64) -> AppResult<&Program> {
        self.hierarchy
            .programs
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("program", id))
    }

    pub fn participant(&self, id: i64) -> AppResult<&Participant> {
        self.hierarchy
            .participants
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("participant", id))
    }

    pub fn participants_of(&self, program_id: Option<i64>) -> Vec<Participant> {
        self.hierarchy
            .participants
            .iter()
            .filter(|p| program_id.is_none_or(|id| p.program_id == id))
            .cloned()
            .collect()
    }

    pub fn attendance(&self, filter: &AttendanceFilter) -> Vec<AttendanceRecord> {
        self.records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    // ---------------------------
    // Writes (callers persist the snapshot afterwards)
    // ---------------------------

    pub fn add_program(&mut self, input: &NewProgram) -> AppResult<Program> {
        input.validate()?;
        let id = next_id(self.hierarchy.programs.iter().map(|p| p.id));
        let program = input.clone().into_program(id);
        self.hierarchy.programs.push(program.clone());
        Ok(program)
    }

    pub fn edit_program(&mut self, id: i64, changes: &ProgramChanges) -> AppResult<Program> {
        let updated = changes.apply_to(self.program(id)?)?;
        if let Some(slot) = self.hierarchy.programs.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub fn add_participant(&mut self, input: &NewParticipant) -> AppResult<Participant> {
        input.validate()?;
        self.program(input.program_id)?;
        let id = next_id(self.hierarchy.participants.iter().map(|p| p.id));
        let participant = input.clone().into_participant(id);
        self.hierarchy.participants.push(participant.clone());
        Ok(participant)
    }

    pub fn edit_participant(&mut self, id: i64, changes: &ParticipantChanges) -> AppResult<Participant> {
        let updated = changes.apply_to(self.participant(id)?)?;
        if let Some(slot) = self.hierarchy.participants.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub fn set_gift(&mut self, participant_id: i64, received: bool) -> AppResult<Participant> {
        let slot = self
            .hierarchy
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| not_found("participant", participant_id))?;
        slot.gift_received = received;
        slot.updated_at = Local::now().to_rfc3339();
        Ok(slot.clone())
    }

    /// Apply a batch of upserts. The batch is checked first, so an error
    /// leaves the snapshot unchanged.
    pub fn upsert(&mut self, upserts: &[AttendanceUpsert]) -> AppResult<Vec<AttendanceRecord>> {
        for u in upserts {
            let participant = self.participant(u.participant_id)?;
            let program = self.program(u.program_id)?;
            if participant.program_id != program.id {
                return Err(AppError::ProgramMismatch {
                    participant_id: participant.id,
                    expected: participant.program_id,
                    found: program.id,
                });
            }
        }

        let mut next = next_id(self.records.iter().map(|r| r.id));
        let mut out = Vec::with_capacity(upserts.len());

        for u in upserts {
            match self.records.iter_mut().find(|r| r.tuple() == u.tuple()) {
                Some(existing) => {
                    existing.resign(u);
                    out.push(existing.clone());
                }
                None => {
                    let record = u.clone().into_record(next);
                    next += 1;
                    self.records.push(record.clone());
                    out.push(record);
                }
            }
        }

        Ok(out)
    }

    pub fn remove_attendance(&mut self, id: i64) -> AppResult<()> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(not_found("attendance record", id));
        }
        Ok(())
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}
