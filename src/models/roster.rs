use super::{attendance::AttendanceRecord, participant::Participant, program::Program};

/// A program together with its participants and attendance records.
/// Statistics and export projections are computed from this shape only.
#[derive(Debug, Clone)]
pub struct ProgramRoster {
    pub program: Program,
    pub participants: Vec<Participant>,
    pub records: Vec<AttendanceRecord>,
}

impl ProgramRoster {
    pub fn new(program: Program, participants: Vec<Participant>, records: Vec<AttendanceRecord>) -> Self {
        Self {
            program,
            participants,
            records,
        }
    }
}
