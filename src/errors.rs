//! Unified application error type.
//! All modules (store, core, export, cli) return AppError so that every
//! failure reaches `main` through the same path.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Invalid session number {session}: program has sessions 1..={total}")]
    InvalidSession { session: i64, total: u32 },

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ---------------------------
    // Lookup / integrity errors
    // ---------------------------
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(
        "Participant {participant_id} belongs to program {expected}, not to program {found}"
    )]
    ProgramMismatch {
        participant_id: i64,
        expected: i64,
        found: i64,
    },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Collapse low-level backend failures into `StoreUnavailable`.
    /// Validation and lookup errors pass through untouched.
    pub fn into_store_error(self) -> AppError {
        match self {
            AppError::Db(e) => AppError::StoreUnavailable(e.to_string()),
            AppError::Io(e) => AppError::StoreUnavailable(e.to_string()),
            AppError::Json(e) => AppError::StoreUnavailable(e.to_string()),
            other => other,
        }
    }

    /// True for failures of the backing store itself (as opposed to a
    /// rejected request). Used by the layered store to decide on fallback.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable(_) | AppError::Db(_) | AppError::Io(_) | AppError::Json(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
