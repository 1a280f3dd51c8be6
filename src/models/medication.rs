use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel stored in `dosage`/`days` (and as the lone interval token) when
/// extraction found nothing for that field.
pub const UNKNOWN: &str = "Unknown";

/// A dosing-time descriptor from the closed schedule vocabulary.
///
/// `Unknown` is not part of the vocabulary: it only appears as the single
/// placeholder of an extracted entry whose text carried no schedule at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScheduleToken {
    Morning,
    Afternoon,
    Evening,
    BeforeMeal,
    AfterMeal,
    /// 1-0-1: morning and night.
    MorningNight,
    /// 1-0-0
    MorningOnly,
    /// 0-1-0
    NoonOnly,
    /// 0-0-1
    NightOnly,
    /// 1-1-1: three times a day.
    ThriceDaily,
    AsNeeded,
    Unknown,
}

/// The schedule vocabulary in its canonical order.
pub const SCHEDULE_VOCABULARY: &[ScheduleToken] = &[
    ScheduleToken::Morning,
    ScheduleToken::Afternoon,
    ScheduleToken::Evening,
    ScheduleToken::BeforeMeal,
    ScheduleToken::AfterMeal,
    ScheduleToken::MorningNight,
    ScheduleToken::MorningOnly,
    ScheduleToken::NoonOnly,
    ScheduleToken::NightOnly,
    ScheduleToken::ThriceDaily,
    ScheduleToken::AsNeeded,
];

impl ScheduleToken {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleToken::Morning => "morning",
            ScheduleToken::Afternoon => "afternoon",
            ScheduleToken::Evening => "evening",
            ScheduleToken::BeforeMeal => "before meal",
            ScheduleToken::AfterMeal => "after meal",
            ScheduleToken::MorningNight => "1-0-1",
            ScheduleToken::MorningOnly => "1-0-0",
            ScheduleToken::NoonOnly => "0-1-0",
            ScheduleToken::NightOnly => "0-0-1",
            ScheduleToken::ThriceDaily => "1-1-1",
            ScheduleToken::AsNeeded => "as needed",
            ScheduleToken::Unknown => UNKNOWN,
        }
    }

    /// Case-insensitive vocabulary lookup after trimming. Internal spacing
    /// must match exactly ("before  meal" is rejected). Never yields `Unknown`.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        SCHEDULE_VOCABULARY
            .iter()
            .copied()
            .find(|token| token.as_str() == normalized)
    }

    /// Whether this token is a real vocabulary member (not the placeholder).
    pub fn is_vocabulary(self) -> bool {
        self != ScheduleToken::Unknown
    }
}

impl fmt::Display for ScheduleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ScheduleToken {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case(UNKNOWN) {
            return Ok(ScheduleToken::Unknown);
        }
        ScheduleToken::from_str(&value).ok_or_else(|| format!("unknown schedule token: {value}"))
    }
}

impl From<ScheduleToken> for String {
    fn from(token: ScheduleToken) -> Self {
        token.as_str().to_string()
    }
}

/// One extracted or manually entered medication record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationEntry {
    pub name: String,
    pub dosage: String,
    pub interval: Vec<ScheduleToken>,
    pub days: String,
    /// True when the name came from the known-medicine list.
    #[serde(default)]
    pub is_popular: bool,
}

impl MedicationEntry {
    /// Comma-separated schedule, as shown in (and accepted back from) an edit form.
    pub fn schedule_display(&self) -> String {
        self.interval
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True if any field still holds an extraction placeholder.
    pub fn has_placeholders(&self) -> bool {
        self.dosage == UNKNOWN
            || self.days == UNKNOWN
            || self.interval.contains(&ScheduleToken::Unknown)
    }
}

/// Raw proposed values for the add and edit operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    pub name: String,
    pub dosage: String,
    pub days: String,
    /// Comma-separated schedule tokens, e.g. "morning, after meal".
    pub schedule: String,
}

impl EntryFields {
    /// Prefill from an existing entry (what an edit form starts with).
    pub fn from_entry(entry: &MedicationEntry) -> Self {
        Self {
            name: entry.name.clone(),
            dosage: entry.dosage.clone(),
            days: entry.days.clone(),
            schedule: entry.schedule_display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lookup_is_case_insensitive() {
        assert_eq!(ScheduleToken::from_str("MORNING"), Some(ScheduleToken::Morning));
        assert_eq!(ScheduleToken::from_str("Before Meal"), Some(ScheduleToken::BeforeMeal));
        assert_eq!(ScheduleToken::from_str(" 1-0-1 "), Some(ScheduleToken::MorningNight));
    }

    #[test]
    fn token_lookup_rejects_unknown_words() {
        assert_eq!(ScheduleToken::from_str("noon"), None);
        assert_eq!(ScheduleToken::from_str("Unknown"), None);
        assert_eq!(ScheduleToken::from_str(""), None);
        assert_eq!(ScheduleToken::from_str("before   meal"), None);
    }

    #[test]
    fn vocabulary_has_eleven_tokens() {
        assert_eq!(SCHEDULE_VOCABULARY.len(), 11);
        assert!(SCHEDULE_VOCABULARY.iter().all(|t| t.is_vocabulary()));
        assert!(!ScheduleToken::Unknown.is_vocabulary());
    }

    #[test]
    fn entry_serializes_with_dashboard_field_names() {
        let entry = MedicationEntry {
            name: "Paracetamol".into(),
            dosage: "500mg".into(),
            interval: vec![ScheduleToken::Morning, ScheduleToken::BeforeMeal],
            days: "5 days".into(),
            is_popular: true,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["isPopular"], true);
        assert_eq!(json["interval"][0], "morning");
        assert_eq!(json["interval"][1], "before meal");
    }

    #[test]
    fn placeholder_interval_deserializes() {
        let json = r#"{"name":"Aspirin","dosage":"Unknown","interval":["Unknown"],"days":"Unknown"}"#;
        let entry: MedicationEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.interval, vec![ScheduleToken::Unknown]);
        assert!(!entry.is_popular);
        assert!(entry.has_placeholders());
    }

    #[test]
    fn invalid_token_fails_deserialization() {
        let json = r#"{"name":"Aspirin","dosage":"1 tab","interval":["noon"],"days":"2 days"}"#;
        assert!(serde_json::from_str::<MedicationEntry>(json).is_err());
    }

    #[test]
    fn fields_prefill_from_entry() {
        let entry = MedicationEntry {
            name: "Ibuprofen".into(),
            dosage: "200mg".into(),
            interval: vec![ScheduleToken::Morning, ScheduleToken::Evening],
            days: "3 days".into(),
            is_popular: true,
        };
        let fields = EntryFields::from_entry(&entry);
        assert_eq!(fields.schedule, "morning, evening");
        assert_eq!(fields.dosage, "200mg");
    }
}
