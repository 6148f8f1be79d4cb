//! Derived attendance statistics.
//!
//! Every function here is pure: it reads rosters and records and never
//! touches a store.

use crate::models::attendance::AttendanceRecord;
use crate::models::participant::Participant;
use crate::models::program::Program;
use crate::models::roster::ProgramRoster;
use serde::Serialize;
use std::collections::BTreeSet;

/// Distinct sessions of `participant_id` recorded for `program_id`.
pub fn attended_sessions(records: &[AttendanceRecord], participant_id: i64, program_id: i64) -> BTreeSet<u32> {
    records
        .iter()
        .filter(|r| r.participant_id == participant_id && r.program_id == program_id)
        .map(|r| r.session_number)
        .collect()
}

/// Attended sessions within `1..=total_sessions`. Records above a shortened
/// total stay in the store but never count.
pub fn counted_sessions(participant: &Participant, roster: &ProgramRoster) -> BTreeSet<u32> {
    let total = roster.program.total_sessions;
    attended_sessions(&roster.records, participant.id, roster.program.id)
        .into_iter()
        .filter(|s| (1..=total).contains(s))
        .collect()
}

/// Counted sessions over total sessions, capped to [0, 1].
pub fn participant_attendance_rate(participant: &Participant, roster: &ProgramRoster) -> f64 {
    ratio(
        counted_sessions(participant, roster).len(),
        roster.program.total_sessions as usize,
    )
}

pub fn is_complete(participant: &Participant, roster: &ProgramRoster) -> bool {
    counted_sessions(participant, roster).len() >= roster.program.total_sessions as usize
}

/// Share of participants who completed the program; 0 without participants.
pub fn program_completion_rate(roster: &ProgramRoster) -> f64 {
    if roster.participants.is_empty() {
        return 0.0;
    }
    let complete = roster
        .participants
        .iter()
        .filter(|p| is_complete(p, roster))
        .count();
    complete as f64 / roster.participants.len() as f64
}

#[derive(Debug, Clone, Serialize)]
pub struct IncompleteEntry {
    pub participant: Participant,
    pub program: Program,
    pub attended: usize,
    pub total: u32,
}

/// Participants below their program's session count, grouped by program in
/// roster order.
pub fn incomplete_participants(rosters: &[ProgramRoster]) -> Vec<IncompleteEntry> {
    let mut out = Vec::new();
    for roster in rosters {
        for p in &roster.participants {
            let attended = counted_sessions(p, roster).len();
            if attended < roster.program.total_sessions as usize {
                out.push(IncompleteEntry {
                    participant: p.clone(),
                    program: roster.program.clone(),
                    attended,
                    total: roster.program.total_sessions,
                });
            }
        }
    }
    out
}

// ---------------------------
// Per-program statistics
// ---------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_number: u32,
    pub attended: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantStats {
    pub participant_id: i64,
    pub name: String,
    pub attended: usize,
    pub rate: f64,
    pub complete: bool,
    pub gift_received: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramStats {
    pub program_id: i64,
    pub program_name: String,
    pub total_sessions: u32,
    pub participant_count: usize,
    pub total_records: usize,
    pub sessions: Vec<SessionStats>,
    pub participants: Vec<ParticipantStats>,
    pub overall_rate: f64,
    pub completion_rate: f64,
}

pub fn program_stats(roster: &ProgramRoster) -> ProgramStats {
    let program = &roster.program;
    let enrolled = roster.participants.len();

    let per_participant: Vec<(&Participant, BTreeSet<u32>)> = roster
        .participants
        .iter()
        .map(|p| (p, counted_sessions(p, roster)))
        .collect();

    let sessions = program
        .sessions()
        .map(|s| {
            let attended = per_participant.iter().filter(|(_, set)| set.contains(&s)).count();
            SessionStats {
                session_number: s,
                attended,
                rate: ratio(attended, enrolled),
            }
        })
        .collect();

    let participants = per_participant
        .iter()
        .map(|(p, set)| ParticipantStats {
            participant_id: p.id,
            name: p.name.clone(),
            attended: set.len(),
            rate: participant_attendance_rate(p, roster),
            complete: is_complete(p, roster),
            gift_received: p.gift_received,
        })
        .collect();

    let slots: usize = per_participant.iter().map(|(_, set)| set.len()).sum();

    ProgramStats {
        program_id: program.id,
        program_name: program.name.clone(),
        total_sessions: program.total_sessions,
        participant_count: enrolled,
        total_records: roster.records.len(),
        sessions,
        participants,
        overall_rate: ratio(slots, enrolled * program.total_sessions as usize),
        completion_rate: program_completion_rate(roster),
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64).clamp(0.0, 1.0)
    }
}

// ---------------------------
// Per-participant detail
// ---------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDetailStats {
    pub participant: Participant,
    pub program_name: String,
    pub total_sessions: u32,
    pub attended: BTreeSet<u32>,
    pub missed: BTreeSet<u32>,
    pub rate: f64,
    pub complete: bool,
}

pub fn participant_detail(participant: &Participant, roster: &ProgramRoster) -> ParticipantDetailStats {
    let attended = counted_sessions(participant, roster);
    let missed = roster
        .program
        .sessions()
        .filter(|s| !attended.contains(s))
        .collect();

    ParticipantDetailStats {
        participant: participant.clone(),
        program_name: roster.program.name.clone(),
        total_sessions: roster.program.total_sessions,
        rate: participant_attendance_rate(participant, roster),
        complete: is_complete(participant, roster),
        attended,
        missed,
    }
}

// ---------------------------
// Gifts
// ---------------------------

/// Gift flag of one participant next to their attendance. `eligible` is a
/// hint for staff only; the flag is never derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct GiftEntry {
    pub participant: Participant,
    pub program_name: String,
    pub attended: usize,
    pub total_sessions: u32,
    pub rate: f64,
    pub eligible: bool,
    pub gift_received: bool,
}

/// All participants of `rosters` with their gift flag, optionally only those
/// whose flag equals `received`.
pub fn gift_overview(rosters: &[ProgramRoster], received: Option<bool>) -> Vec<GiftEntry> {
    let mut out = Vec::new();
    for roster in rosters {
        for p in &roster.participants {
            if received.is_some_and(|r| r != p.gift_received) {
                continue;
            }
            out.push(GiftEntry {
                participant: p.clone(),
                program_name: roster.program.name.clone(),
                attended: counted_sessions(p, roster).len(),
                total_sessions: roster.program.total_sessions,
                rate: participant_attendance_rate(p, roster),
                eligible: is_complete(p, roster),
                gift_received: p.gift_received,
            });
        }
    }
    out
}

// ---------------------------
// Report totals
// ---------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub programs: usize,
    pub participants: usize,
    pub attendance_records: usize,
    pub complete_participants: usize,
    pub gifts_received: usize,
}

pub fn report_totals(rosters: &[ProgramRoster]) -> ReportTotals {
    let mut totals = ReportTotals {
        programs: rosters.len(),
        ..ReportTotals::default()
    };
    for roster in rosters {
        totals.participants += roster.participants.len();
        totals.attendance_records += roster.records.len();
        totals.complete_participants += roster
            .participants
            .iter()
            .filter(|p| is_complete(p, roster))
            .count();
        totals.gifts_received += roster.participants.iter().filter(|p| p.gift_received).count();
    }
    totals
}
