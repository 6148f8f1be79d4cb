use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub participant_id: i64,
    pub program_id: i64,     // copy of the participant's program
    pub session_number: u32, // 1..=program.total_sessions
    pub signature_data: String,
    pub attended_at: String, // RFC 3339, refreshed on re-signature
    pub created_at: String,  // RFC 3339, kept on re-signature
}

impl AttendanceRecord {
    /// Key of the uniqueness invariant.
    pub fn tuple(&self) -> (i64, i64, u32) {
        (self.participant_id, self.program_id, self.session_number)
    }

    /// Calendar date of `attended_at`, if it parses.
    pub fn attended_date(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.attended_at)
            .map(|dt| dt.date_naive())
            .ok()
    }

    /// Replace signature and timestamp, keeping id and creation time.
    pub fn resign(&mut self, upsert: &AttendanceUpsert) {
        self.signature_data = upsert.signature_data.clone();
        self.attended_at = upsert.attended_at.clone();
    }
}

/// One requested write for a (participant, program, session) tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceUpsert {
    pub participant_id: i64,
    pub program_id: i64,
    pub session_number: u32,
    pub signature_data: String,
    pub attended_at: String,
}

impl AttendanceUpsert {
    pub fn new(participant_id: i64, program_id: i64, session_number: u32, signature: &str) -> Self {
        Self {
            participant_id,
            program_id,
            session_number,
            signature_data: signature.to_string(),
            attended_at: Local::now().to_rfc3339(),
        }
    }

    pub fn tuple(&self) -> (i64, i64, u32) {
        (self.participant_id, self.program_id, self.session_number)
    }

    pub fn into_record(self, id: i64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            participant_id: self.participant_id,
            program_id: self.program_id,
            session_number: self.session_number,
            signature_data: self.signature_data,
            created_at: self.attended_at.clone(),
            attended_at: self.attended_at,
        }
    }
}

/// Read filter of `list_attendance`; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub program_id: Option<i64>,
    pub participant_id: Option<i64>,
    pub session_number: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AttendanceFilter {
    pub fn for_program(program_id: i64) -> Self {
        Self {
            program_id: Some(program_id),
            ..Self::default()
        }
    }

    pub fn for_participant(participant_id: i64, program_id: i64) -> Self {
        Self {
            program_id: Some(program_id),
            participant_id: Some(participant_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, r: &AttendanceRecord) -> bool {
        if self.program_id.is_some_and(|id| id != r.program_id) {
            return false;
        }
        if self.participant_id.is_some_and(|id| id != r.participant_id) {
            return false;
        }
        if self.session_number.is_some_and(|s| s != r.session_number) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(day) = r.attended_date() else {
                return false;
            };
            if self.from.is_some_and(|from| day < from) {
                return false;
            }
            if self.to.is_some_and(|to| day > to) {
                return false;
            }
        }
        true
    }
}
