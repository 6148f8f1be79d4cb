use crate::errors::{AppError, AppResult};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub total_sessions: u32, // ⇔ programs.total_sessions (>= 1)
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: String, // RFC 3339
    pub updated_at: String,
}

impl Program {
    /// Session numbers a participant must attend, in ascending order.
    pub fn sessions(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.total_sessions
    }

    pub fn start_str(&self) -> String {
        self.start_date.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end_date.format("%Y-%m-%d").to_string()
    }
}

/// Input of `program add`.
#[derive(Debug, Clone)]
pub struct NewProgram {
    pub name: String,
    pub description: String,
    pub total_sessions: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewProgram {
    pub fn validate(&self) -> AppResult<()> {
        validate_fields(
            &self.name,
            self.total_sessions,
            self.start_date,
            self.end_date,
        )
    }

    /// Materialize the program with the given id, stamping both timestamps.
    pub fn into_program(self, id: i64) -> Program {
        let now = Local::now().to_rfc3339();
        Program {
            id,
            name: self.name,
            description: self.description,
            total_sessions: self.total_sessions,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial update of `program edit`; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProgramChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_sessions: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProgramChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.total_sessions.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Apply the changes on a copy of `current` and validate the result.
    pub fn apply_to(&self, current: &Program) -> AppResult<Program> {
        let mut p = current.clone();
        if let Some(name) = &self.name {
            p.name = name.clone();
        }
        if let Some(desc) = &self.description {
            p.description = desc.clone();
        }
        if let Some(total) = self.total_sessions {
            p.total_sessions = total;
        }
        if let Some(start) = self.start_date {
            p.start_date = start;
        }
        if let Some(end) = self.end_date {
            p.end_date = end;
        }
        validate_fields(&p.name, p.total_sessions, p.start_date, p.end_date)?;
        p.updated_at = Local::now().to_rfc3339();
        Ok(p)
    }
}

fn validate_fields(name: &str, total: u32, start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("program name must not be empty".into()));
    }
    if total < 1 {
        return Err(AppError::InvalidInput(
            "a program needs at least one session".into(),
        ));
    }
    if start > end {
        return Err(AppError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}
