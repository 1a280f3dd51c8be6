use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::validation::validate_fields;
use super::{PrescriptionError, ValidationError};
use crate::models::{EntryFields, MedicationEntry, ScheduleToken};

/// Validate a proposed edit against an existing entry.
///
/// Pure: on success returns the replacement entry (same `is_popular`), on
/// failure the first failing field's error. Nothing is mutated either way.
pub fn propose_edit(
    entry: &MedicationEntry,
    fields: &EntryFields,
) -> Result<MedicationEntry, ValidationError> {
    let validated = validate_fields(fields)?;
    Ok(validated.into_entry(entry.is_popular))
}

/// The in-memory collection the user reviews before submitting: extracted
/// entries followed by manual additions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingSet {
    entries: Vec<MedicationEntry>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from extractor output.
    pub fn from_extracted(entries: Vec<MedicationEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MedicationEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&MedicationEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<MedicationEntry> {
        self.entries
    }

    /// Append a manually entered medicine (`is_popular = false`).
    pub fn add(&mut self, fields: &EntryFields) -> Result<&MedicationEntry, PrescriptionError> {
        let validated = validate_fields(fields).map_err(|e| {
            warn!(field = ?e.field(), reason = %e, "Rejected new medication entry");
            e
        })?;

        self.entries.push(validated.into_entry(false));
        info!(entries = self.entries.len(), "Medication entry added");
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Replace the entry at `index` in place, all-or-nothing.
    pub fn edit(
        &mut self,
        index: usize,
        fields: &EntryFields,
    ) -> Result<&MedicationEntry, PrescriptionError> {
        let current = self
            .entries
            .get(index)
            .ok_or(PrescriptionError::EntryNotFound(index))?;

        let updated = propose_edit(current, fields).map_err(|e| {
            warn!(index, field = ?e.field(), reason = %e, "Rejected medication edit");
            e
        })?;

        self.entries[index] = updated;
        info!(index, "Medication entry updated");
        Ok(&self.entries[index])
    }

    /// Drop one schedule token from one entry. The entry itself always stays,
    /// even if its interval ends up empty.
    pub fn remove_interval_token(
        &mut self,
        entry_index: usize,
        token_index: usize,
    ) -> Result<ScheduleToken, PrescriptionError> {
        let entry = self
            .entries
            .get_mut(entry_index)
            .ok_or(PrescriptionError::EntryNotFound(entry_index))?;

        if token_index >= entry.interval.len() {
            return Err(PrescriptionError::IntervalTokenNotFound {
                entry: entry_index,
                token: token_index,
            });
        }

        let removed = entry.interval.remove(token_index);
        info!(entry = entry_index, token = %removed, "Schedule updated");
        Ok(removed)
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<MedicationEntry, PrescriptionError> {
        if index >= self.entries.len() {
            return Err(PrescriptionError::EntryNotFound(index));
        }
        let removed = self.entries.remove(index);
        info!(index, name = %removed.name, "Medication entry removed");
        Ok(removed)
    }
}
