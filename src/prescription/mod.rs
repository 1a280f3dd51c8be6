//! Prescription notes: OCR text → medication entries, plus the validation
//! gate every add/edit/save goes through.
//!
//! Flow: `sanitize` → optional `correction` → `extractor::extract` →
//! `WorkingSet` (user edits, each re-validated) → `crate::submission`.

pub mod correction;
pub mod extractor;
pub mod reference;
pub mod sanitize;
pub mod timetable;
pub mod validation;
pub mod working_set;

pub use correction::*;
pub use extractor::*;
pub use reference::*;
pub use sanitize::*;
pub use timetable::*;
pub use validation::*;
pub use working_set::*;

use thiserror::Error;

// ═══════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════

/// Which entry field a validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Name,
    Dosage,
    Days,
    Schedule,
}

/// A field rejected by one of the validators. `Display` is the user-facing reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Medicine name cannot be empty")]
    EmptyName,

    #[error("Medicine name is too long ({length} characters, max {max})", max = MAX_NAME_LEN)]
    NameTooLong { length: usize },

    #[error("Dosage cannot be empty")]
    EmptyDosage,

    #[error("Invalid dosage format: \"{0}\". Examples: 500mg, 5ml, 1/2, 2 tablet")]
    InvalidDosage(String),

    #[error("Days cannot be empty")]
    EmptyDays,

    #[error("Invalid days format: \"{0}\". Examples: 5 days, 2 weeks, 1 month, as needed")]
    InvalidDays(String),

    #[error("Schedule cannot be empty")]
    EmptySchedule,

    #[error("Invalid schedule: \"{token}\". Valid options: {}", vocabulary_list())]
    InvalidScheduleToken { token: String },
}

impl ValidationError {
    pub fn field(&self) -> EntryField {
        match self {
            ValidationError::EmptyName | ValidationError::NameTooLong { .. } => EntryField::Name,
            ValidationError::EmptyDosage | ValidationError::InvalidDosage(_) => EntryField::Dosage,
            ValidationError::EmptyDays | ValidationError::InvalidDays(_) => EntryField::Days,
            ValidationError::EmptySchedule | ValidationError::InvalidScheduleToken { .. } => {
                EntryField::Schedule
            }
        }
    }
}

/// Errors from working-set operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrescriptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No medication entry at position {0}")]
    EntryNotFound(usize),

    #[error("Entry {entry} has no schedule token at position {token}")]
    IntervalTokenNotFound { entry: usize, token: usize },
}
