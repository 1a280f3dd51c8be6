// Field validators for medication entries.
// Every add, edit and submission passes through these; a failure blocks the
// whole operation. Inputs are trimmed before matching.

use std::sync::LazyLock;

use regex::Regex;

use super::ValidationError;
use crate::models::{EntryFields, MedicationEntry, ScheduleToken, SCHEDULE_VOCABULARY};

/// Maximum medicine name length, in characters.
pub const MAX_NAME_LEN: usize = 50;

static RE_DOSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+mg|[0-9]+ml|[0-9]+\s*/\s*[0-9]+|[0-9.]+\s*(mg|ml|g|tablet|tab|tabs)?)$").unwrap()
});
static RE_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9]+\s*(days?|weeks?|months?)|as\s+needed)$").unwrap());

/// Vocabulary rendered for error messages: "morning, afternoon, ...".
pub fn vocabulary_list() -> String {
    SCHEDULE_VOCABULARY
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let length = trimmed.chars().count();
    if length > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { length });
    }
    Ok(())
}

/// Accepts e.g. `500mg`, `5ml`, `1/2`, `2 tablet`, `0.5 g`, `2`.
pub fn validate_dosage(dosage: &str) -> Result<(), ValidationError> {
    let trimmed = dosage.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDosage);
    }
    if !RE_DOSAGE.is_match(trimmed) {
        return Err(ValidationError::InvalidDosage(trimmed.to_string()));
    }
    Ok(())
}

/// Accepts `<int> day(s)|week(s)|month(s)` or `as needed`.
pub fn validate_days(days: &str) -> Result<(), ValidationError> {
    let trimmed = days.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDays);
    }
    if !RE_DAYS.is_match(trimmed) {
        return Err(ValidationError::InvalidDays(trimmed.to_string()));
    }
    Ok(())
}

/// Parse a comma-separated schedule into canonical tokens, first-seen order,
/// duplicates dropped. The first token outside the vocabulary fails the
/// whole schedule and is named in the error.
pub fn parse_schedule(schedule: &str) -> Result<Vec<ScheduleToken>, ValidationError> {
    if schedule.trim().is_empty() {
        return Err(ValidationError::EmptySchedule);
    }

    let mut tokens = Vec::new();
    for raw in schedule.split(',') {
        let candidate = raw.trim().to_lowercase();
        let token = ScheduleToken::from_str(&candidate)
            .ok_or(ValidationError::InvalidScheduleToken { token: candidate })?;
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    Ok(tokens)
}

pub fn validate_schedule(schedule: &str) -> Result<(), ValidationError> {
    parse_schedule(schedule).map(|_| ())
}

/// Schedule check for an already-built interval (placeholder tokens fail).
pub fn validate_interval(interval: &[ScheduleToken]) -> Result<(), ValidationError> {
    if interval.is_empty() {
        return Err(ValidationError::EmptySchedule);
    }
    match interval.iter().find(|t| !t.is_vocabulary()) {
        Some(bad) => Err(ValidationError::InvalidScheduleToken {
            token: bad.as_str().to_string(),
        }),
        None => Ok(()),
    }
}

/// Field values that passed every validator, trimmed and parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub name: String,
    pub dosage: String,
    pub days: String,
    pub interval: Vec<ScheduleToken>,
}

impl ValidatedFields {
    pub fn into_entry(self, is_popular: bool) -> MedicationEntry {
        MedicationEntry {
            name: self.name,
            dosage: self.dosage,
            interval: self.interval,
            days: self.days,
            is_popular,
        }
    }
}

/// Run all four validators in form order (name, dosage, days, schedule) and
/// stop at the first failure.
pub fn validate_fields(fields: &EntryFields) -> Result<ValidatedFields, ValidationError> {
    validate_name(&fields.name)?;
    validate_dosage(&fields.dosage)?;
    validate_days(&fields.days)?;
    let interval = parse_schedule(&fields.schedule)?;

    Ok(ValidatedFields {
        name: fields.name.trim().to_string(),
        dosage: fields.dosage.trim().to_string(),
        days: fields.days.trim().to_string(),
        interval,
    })
}

/// Re-check a stored entry before it leaves the working set.
pub fn validate_entry(entry: &MedicationEntry) -> Result<(), ValidationError> {
    validate_name(&entry.name)?;
    validate_dosage(&entry.dosage)?;
    validate_days(&entry.days)?;
    validate_interval(&entry.interval)
}
