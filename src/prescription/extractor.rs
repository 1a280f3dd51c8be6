//! Prescription text extractor.
//!
//! Finds known medicine names in recognized text and pulls out, for each,
//! a dosage, a duration and the schedule tokens. Misses degrade to the
//! `"Unknown"` sentinel; nothing in here fails.
//!
//! Dosage and duration are searched in the context windows of a medicine:
//! the text after each whole-word occurrence of its name, up to the next
//! occurrence of any matched known name. The first window that yields a value
//! wins, so a header list of names followed by one line per medicine still
//! pairs every dose with its own drug. Schedule tokens are collected from the
//! whole document and shared by every entry.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::reference::KnownMedicines;
use crate::models::{MedicationEntry, ScheduleToken, UNKNOWN};

static RE_DOSAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[0-9]+\s*/\s*[0-9]+|[0-9]+(?:\.[0-9]+)?\s*(?:mg|ml|tablet|tabs|tab|g))").unwrap()
});
static RE_DURATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bx\s*|\b)([0-9]+)\s*(days?|weeks?|months?)\b|\b(as\s+needed)\b").unwrap()
});
static RE_SCHEDULE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(mornings?|afternoons?|evenings?|before\s+meals?|after\s+meals?|1-0-1|1-0-0|0-1-0|0-0-1|1-1-1|as\s+needed)\b",
    )
    .unwrap()
});

/// One whole-word occurrence of a known name.
#[derive(Debug, Clone, Copy)]
struct NameHit {
    start: usize,
    end: usize,
}

/// Extract one entry per known medicine that occurs as a whole word in `text`.
///
/// Entries come out in `known_medicines` order, all with `is_popular = true`.
pub fn extract<S: AsRef<str>>(text: &str, known_medicines: &[S]) -> Vec<MedicationEntry> {
    let hits: Vec<(&str, Vec<NameHit>)> = known_medicines
        .iter()
        .filter_map(|name| {
            let name = name.as_ref().trim();
            let occurrences = find_name(text, name);
            (!occurrences.is_empty()).then_some((name, occurrences))
        })
        .collect();

    if hits.is_empty() {
        debug!(known = known_medicines.len(), "No known medicines found in text");
        return Vec::new();
    }

    // Start of every occurrence of every matched name, ascending.
    let mut boundaries: Vec<usize> = hits
        .iter()
        .flat_map(|(_, occurrences)| occurrences.iter().map(|hit| hit.start))
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let interval = scan_schedule_tokens(text);

    let entries: Vec<MedicationEntry> = hits
        .iter()
        .map(|(name, occurrences)| {
            let windows: Vec<&str> = occurrences
                .iter()
                .map(|hit| context_window(text, hit, &boundaries))
                .collect();

            let dosage = windows
                .iter()
                .find_map(|w| find_dosage(w))
                .unwrap_or_else(|| UNKNOWN.to_string());
            let days = windows
                .iter()
                .find_map(|w| find_duration(w))
                .unwrap_or_else(|| UNKNOWN.to_string());

            debug!(
                medicine = %name,
                occurrences = occurrences.len(),
                %dosage,
                %days,
                "Extracted medication entry"
            );

            MedicationEntry {
                name: (*name).to_string(),
                dosage,
                interval: interval.clone(),
                days,
                is_popular: true,
            }
        })
        .collect();

    info!(
        entries = entries.len(),
        schedule_tokens = interval.len(),
        "Prescription text extracted"
    );
    entries
}

/// [`extract`] against a [`KnownMedicines`] list.
pub fn extract_known(text: &str, known: &KnownMedicines) -> Vec<MedicationEntry> {
    extract(text, known.names())
}

fn find_name(text: &str, name: &str) -> Vec<NameHit> {
    if name.is_empty() {
        return Vec::new();
    }
    let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re
            .find_iter(text)
            .map(|m| NameHit {
                start: m.start(),
                end: m.end(),
            })
            .collect(),
        Err(e) => {
            warn!(medicine = %name, error = %e, "Skipping unmatchable medicine name");
            Vec::new()
        }
    }
}

/// Text after `hit` up to the next name occurrence at or past its end.
fn context_window<'t>(text: &'t str, hit: &NameHit, boundaries: &[usize]) -> &'t str {
    let end = boundaries
        .iter()
        .copied()
        .find(|&start| start >= hit.end)
        .unwrap_or(text.len());
    &text[hit.end..end]
}

/// First dosage token in the window: `1/2`, `500mg`, `2 tablet`, `0.5 g`...
///
/// A unit must end the word; a single trailing plural `s` is tolerated and
/// left out of the value ("2 tablets" yields "2 tablet"). Fractions may not
/// run into a further `/` (dates).
pub fn find_dosage(window: &str) -> Option<String> {
    RE_DOSAGE_TOKEN.find_iter(window).find_map(|m| {
        let rest = &window[m.end()..];
        let mut next = rest.chars();
        let accepted = match next.next() {
            None => true,
            Some('/') => false,
            Some(c) if c.eq_ignore_ascii_case(&'s') && !m.as_str().contains('/') => {
                !next.next().is_some_and(char::is_alphanumeric)
            }
            Some(c) => !c.is_alphanumeric(),
        };
        accepted.then(|| m.as_str().to_string())
    })
}

/// First duration in the window, normalised to `"<n> <unit>"` or `"as needed"`.
pub fn find_duration(window: &str) -> Option<String> {
    let caps = RE_DURATION_TOKEN.captures(window)?;
    if caps.get(3).is_some() {
        return Some(ScheduleToken::AsNeeded.as_str().to_string());
    }
    let count = caps.get(1)?.as_str();
    let unit = caps.get(2)?.as_str().to_lowercase();
    Some(format!("{count} {unit}"))
}

/// Every schedule token anywhere in the text, canonical, first-seen order,
/// de-duplicated; `[Unknown]` when there are none.
pub fn scan_schedule_tokens(text: &str) -> Vec<ScheduleToken> {
    let mut tokens: Vec<ScheduleToken> = Vec::new();
    for m in RE_SCHEDULE_TOKEN.find_iter(text) {
        // No vocabulary token ends in "s", so a trailing one is a plural.
        let raw = m.as_str();
        let singular = raw
            .strip_suffix('s')
            .or_else(|| raw.strip_suffix('S'))
            .unwrap_or(raw);
        let normalized = singular.split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some(token) = ScheduleToken::from_str(&normalized) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }
    if tokens.is_empty() {
        tokens.push(ScheduleToken::Unknown);
    }
    tokens
}
