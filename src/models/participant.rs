use crate::errors::{AppError, AppResult};
use chrono::Local;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub program_id: i64, // owning program, exactly one
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    pub gift_received: bool, // toggled by staff, never derived
    pub created_at: String,
    pub updated_at: String,
}

impl Participant {
    pub fn department_str(&self) -> &str {
        self.department.as_deref().unwrap_or("")
    }

    pub fn position_str(&self) -> &str {
        self.position.as_deref().unwrap_or("")
    }
}

/// Input of `participant add`.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub program_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl NewParticipant {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "participant name must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn into_participant(self, id: i64) -> Participant {
        let now = Local::now().to_rfc3339();
        Participant {
            id,
            program_id: self.program_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            department: none_if_blank(self.department),
            position: none_if_blank(self.position),
            gift_received: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial update of `participant edit`. The owning program cannot change:
/// attendance records carry a copy of it.
#[derive(Debug, Clone, Default)]
pub struct ParticipantChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub gift_received: Option<bool>,
}

impl ParticipantChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.position.is_none()
            && self.gift_received.is_none()
    }

    pub fn apply_to(&self, current: &Participant) -> AppResult<Participant> {
        let mut p = current.clone();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::InvalidInput(
                    "participant name must not be empty".into(),
                ));
            }
            p.name = name.clone();
        }
        if let Some(email) = &self.email {
            p.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            p.phone = phone.clone();
        }
        if let Some(dep) = &self.department {
            p.department = none_if_blank(Some(dep.clone()));
        }
        if let Some(pos) = &self.position {
            p.position = none_if_blank(Some(pos.clone()));
        }
        if let Some(gift) = self.gift_received {
            p.gift_received = gift;
        }
        p.updated_at = Local::now().to_rfc3339();
        Ok(p)
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
