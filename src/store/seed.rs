use super::snapshot::{Hierarchy, Snapshot};
use super::{RecordStore, read_only};
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceFilter, AttendanceRecord, AttendanceUpsert};
use crate::models::participant::{NewParticipant, Participant, ParticipantChanges};
use crate::models::program::{NewProgram, Program, ProgramChanges};
use chrono::NaiveDate;

const SEED_CREATED_AT: &str = "2024-01-01T00:00:00+00:00";

// id, name, description, sessions, start (y, m, d), end (y, m, d)
type ProgramRow = (i64, &'static str, &'static str, u32, (i32, u32, u32), (i32, u32, u32));

const PROGRAMS: &[ProgramRow] = &[
    (
        1,
        "Web Development Basics",
        "HTML, CSS and JavaScript from the basics to hands-on practice",
        5,
        (2024, 1, 15),
        (2024, 1, 19),
    ),
    (
        2,
        "Data Analysis Workshop",
        "Practical data analysis with Python",
        3,
        (2024, 1, 22),
        (2024, 1, 24),
    ),
    (
        3,
        "UI/UX Design Seminar",
        "User-centred design thinking and practice",
        4,
        (2024, 1, 29),
        (2024, 2, 1),
    ),
    (
        4,
        "Mobile App Development",
        "Cross-platform app development with React Native",
        6,
        (2024, 2, 5),
        (2024, 2, 10),
    ),
    (
        5,
        "Introduction to Cloud Computing",
        "From AWS basics to deployment",
        4,
        (2024, 2, 12),
        (2024, 2, 15),
    ),
];

// id, program, name, email, phone, gift received
const PARTICIPANTS: &[(i64, i64, &str, &str, &str, bool)] = &[
    (1, 1, "Kim Minsu", "minsu@example.com", "010-1234-5678", false),
    (2, 1, "Lee Younghee", "younghee@example.com", "010-2345-6789", true),
    (3, 1, "Park Chulsoo", "chulsoo@example.com", "010-3456-7890", false),
    (4, 1, "Jung Sujin", "sujin@example.com", "010-4567-8901", true),
    (5, 1, "Choi Donghyun", "donghyun@example.com", "010-5678-9012", false),
    (6, 1, "Han Soyoung", "soyoung@example.com", "010-6789-0123", true),
    (7, 2, "Kang Taewoo", "taewoo@example.com", "010-7890-1234", false),
    (8, 2, "Yoon Jihye", "jihye@example.com", "010-8901-2345", false),
    (9, 2, "Lim Hyunwoo", "hyunwoo@example.com", "010-9012-3456", true),
    (10, 2, "Song Mirae", "mirae@example.com", "010-0123-4567", false),
    (11, 2, "Cho Seongmin", "seongmin@example.com", "010-1234-5679", true),
    (12, 3, "Bae Junho", "junho@example.com", "010-2345-6780", false),
    (13, 3, "Shin Yerin", "yerin@example.com", "010-3456-7891", false),
    (14, 3, "Oh Gunwoo", "gunwoo@example.com", "010-4567-8902", true),
    (15, 3, "Hong Daeun", "daeun@example.com", "010-5678-9013", false),
    (16, 4, "Seo Jihoon", "jihoon@example.com", "010-6789-0124", false),
    (17, 4, "Kim Nayeon", "nayeon@example.com", "010-7890-1235", true),
    (18, 4, "Lee Junseok", "junseok@example.com", "010-8901-2346", false),
    (19, 4, "Park Haneul", "haneul@example.com", "010-9012-3457", false),
    (20, 4, "Jung Woojin", "woojin@example.com", "010-0123-4568", true),
    (21, 5, "Choi Yeeun", "yeeun@example.com", "010-1234-5680", false),
    (22, 5, "Jang Minho", "minho@example.com", "010-2345-6781", false),
    (23, 5, "Ahn Subin", "subin@example.com", "010-3456-7892", true),
    (24, 5, "Hwang Jiwon", "jiwon@example.com", "010-4567-8903", false),
    (25, 5, "Moon Seongho", "seongho@example.com", "010-5678-9014", true),
];

// id, participant, program, session, attended_at
const RECORDS: &[(i64, i64, i64, u32, &str)] = &[
    (1, 1, 1, 1, "2024-01-15T09:00:00+00:00"),
    (2, 1, 1, 2, "2024-01-16T09:00:00+00:00"),
    (3, 2, 1, 1, "2024-01-15T09:05:00+00:00"),
    (4, 2, 1, 2, "2024-01-16T09:03:00+00:00"),
    (5, 2, 1, 3, "2024-01-17T09:02:00+00:00"),
    (6, 3, 1, 1, "2024-01-15T09:10:00+00:00"),
    (7, 7, 2, 1, "2024-01-22T10:00:00+00:00"),
    (8, 8, 2, 1, "2024-01-22T10:05:00+00:00"),
    (9, 9, 2, 1, "2024-01-22T10:02:00+00:00"),
    (10, 9, 2, 2, "2024-01-23T10:00:00+00:00"),
];

fn date((y, m, d): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// The built-in demo data set.
pub fn seed_snapshot() -> Snapshot {
    let programs = PROGRAMS
        .iter()
        .filter_map(|&(id, name, description, total, start, end)| {
            Some(Program {
                id,
                name: name.to_string(),
                description: description.to_string(),
                total_sessions: total,
                start_date: date(start)?,
                end_date: date(end)?,
                created_at: SEED_CREATED_AT.to_string(),
                updated_at: SEED_CREATED_AT.to_string(),
            })
        })
        .collect();

    let participants = PARTICIPANTS
        .iter()
        .map(|&(id, program_id, name, email, phone, gift)| Participant {
            id,
            program_id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            department: None,
            position: None,
            gift_received: gift,
            created_at: SEED_CREATED_AT.to_string(),
            updated_at: SEED_CREATED_AT.to_string(),
        })
        .collect();

    let names: Vec<(i64, &str)> = PARTICIPANTS.iter().map(|p| (p.0, p.2)).collect();
    let records = RECORDS
        .iter()
        .map(|&(id, participant_id, program_id, session, at)| {
            let who = names
                .iter()
                .find(|(pid, _)| *pid == participant_id)
                .map(|(_, n)| *n)
                .unwrap_or("participant");
            AttendanceRecord {
                id,
                participant_id,
                program_id,
                session_number: session,
                signature_data: format!("{who}_signature_{session}"),
                attended_at: at.to_string(),
                created_at: at.to_string(),
            }
        })
        .collect();

    Snapshot::new(
        Hierarchy {
            programs,
            participants,
        },
        records,
    )
}

/// Last-resort tier: serves the built-in data set and refuses writes.
pub struct SeedStore {
    data: Snapshot,
}

impl Default for SeedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedStore {
    pub fn new() -> Self {
        Self {
            data: seed_snapshot(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.data
    }
}

impl RecordStore for SeedStore {
    fn backend_name(&self) -> &'static str {
        "seed"
    }

    fn list_programs(&mut self) -> AppResult<Vec<Program>> {
        Ok(self.data.hierarchy.programs.clone())
    }

    fn get_program(&mut self, id: i64) -> AppResult<Program> {
        self.data.program(id).cloned()
    }

    fn create_program(&mut self, _input: &NewProgram) -> AppResult<Program> {
        Err(read_only("seed"))
    }

    fn update_program(&mut self, _id: i64, _changes: &ProgramChanges) -> AppResult<Program> {
        Err(read_only("seed"))
    }

    fn list_participants(&mut self, program_id: Option<i64>) -> AppResult<Vec<Participant>> {
        Ok(self.data.participants_of(program_id))
    }

    fn get_participant(&mut self, id: i64) -> AppResult<Participant> {
        self.data.participant(id).cloned()
    }

    fn create_participant(&mut self, _input: &NewParticipant) -> AppResult<Participant> {
        Err(read_only("seed"))
    }

    fn update_participant(&mut self, _id: i64, _changes: &ParticipantChanges) -> AppResult<Participant> {
        Err(read_only("seed"))
    }

    fn set_gift_status(&mut self, _participant_id: i64, _received: bool) -> AppResult<Participant> {
        Err(read_only("seed"))
    }

    fn list_attendance(&mut self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        Ok(self.data.attendance(filter))
    }

    fn upsert_attendance(&mut self, _upserts: &[AttendanceUpsert]) -> AppResult<Vec<AttendanceRecord>> {
        Err(read_only("seed"))
    }

    fn delete_attendance(&mut self, _id: i64) -> AppResult<()> {
        Err(read_only("seed"))
    }
}
