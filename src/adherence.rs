//! Adherence report over daily intake records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One scheduled dose and whether it was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    pub taken: bool,
    /// Scheduled time as entered ("8:00 AM").
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMedicationRecord {
    pub date: NaiveDate,
    pub medications: Vec<IntakeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub name: String,
    pub taken: u32,
    pub missed: u32,
    /// Rounded share of doses taken; `None` when nothing was recorded.
    pub percent: Option<u32>,
}

impl AdherenceSummary {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            taken: 0,
            missed: 0,
            percent: None,
        }
    }

    fn record(&mut self, taken: bool) {
        if taken {
            self.taken += 1;
        } else {
            self.missed += 1;
        }
        let total = self.taken + self.missed;
        self.percent = Some((f64::from(self.taken) * 100.0 / f64::from(total)).round() as u32);
    }

    /// `"83%"`, or `"N/A"` without records.
    pub fn percent_label(&self) -> String {
        match self.percent {
            Some(p) => format!("{p}%"),
            None => "N/A".to_string(),
        }
    }
}

/// Per-medicine taken/missed counts, in first-seen order.
pub fn summarize_adherence(days: &[DailyMedicationRecord]) -> Vec<AdherenceSummary> {
    let mut summaries: Vec<AdherenceSummary> = Vec::new();

    for intake in days.iter().flat_map(|d| &d.medications) {
        let idx = match summaries.iter().position(|s| s.name == intake.name) {
            Some(i) => i,
            None => {
                summaries.push(AdherenceSummary::new(&intake.name));
                summaries.len() - 1
            }
        };
        summaries[idx].record(intake.taken);
    }

    debug!(days = days.len(), medicines = summaries.len(), "Adherence summarised");
    summaries
}

/// Earliest and latest recorded dates.
pub fn date_range(days: &[DailyMedicationRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let first = days.iter().map(|d| d.date).min()?;
    let last = days.iter().map(|d| d.date).max()?;
    Some((first, last))
}
