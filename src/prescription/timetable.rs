// Dose timetable: turns an entry's schedule tokens into clock times and its
// duration string into a course length, so a reminder calendar can be built.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{MedicationEntry, ScheduleToken};

static RE_COURSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9]+)\s*(day|week|month)s?$").unwrap());
static RE_AS_NEEDED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^as\s+needed$").unwrap());

/// One of the three daily dosing slots of an `a-b-c` pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseSlot {
    Morning,
    Noon,
    Night,
}

impl DoseSlot {
    pub fn hour(self) -> u32 {
        match self {
            DoseSlot::Morning => 8,
            DoseSlot::Noon => 13,
            DoseSlot::Night => 21,
        }
    }

    pub fn time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), 0, 0).unwrap_or_default()
    }

    /// "8:00 AM" style label.
    pub fn label(self) -> String {
        self.time().format("%-I:%M %p").to_string()
    }
}

fn slots_for(token: ScheduleToken) -> &'static [DoseSlot] {
    match token {
        ScheduleToken::MorningNight => &[DoseSlot::Morning, DoseSlot::Night],
        ScheduleToken::MorningOnly | ScheduleToken::Morning => &[DoseSlot::Morning],
        ScheduleToken::NoonOnly | ScheduleToken::Afternoon => &[DoseSlot::Noon],
        ScheduleToken::NightOnly | ScheduleToken::Evening => &[DoseSlot::Night],
        ScheduleToken::ThriceDaily => &[DoseSlot::Morning, DoseSlot::Noon, DoseSlot::Night],
        ScheduleToken::BeforeMeal
        | ScheduleToken::AfterMeal
        | ScheduleToken::AsNeeded
        | ScheduleToken::Unknown => &[],
    }
}

/// Daily slots covered by the interval, in clock order, each once.
/// Meal-relative and as-needed tokens carry no fixed slot.
pub fn dose_slots(interval: &[ScheduleToken]) -> Vec<DoseSlot> {
    let mut slots: Vec<DoseSlot> = interval.iter().flat_map(|t| slots_for(*t)).copied().collect();
    slots.sort();
    slots.dedup();
    slots
}

pub fn dose_times(interval: &[ScheduleToken]) -> Vec<NaiveTime> {
    dose_slots(interval).into_iter().map(DoseSlot::time).collect()
}

/// Parsed form of an entry's `days` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "count", rename_all = "snake_case")]
pub enum CourseLength {
    Days(u32),
    Weeks(u32),
    Months(u32),
    AsNeeded,
}

impl CourseLength {
    /// Parse a value accepted by the duration validator. Anything else,
    /// including the `"Unknown"` placeholder, yields `None`.
    pub fn parse(days: &str) -> Option<Self> {
        let trimmed = days.trim();
        if RE_AS_NEEDED.is_match(trimmed) {
            return Some(CourseLength::AsNeeded);
        }
        let caps = RE_COURSE.captures(trimmed)?;
        let count: u32 = caps.get(1)?.as_str().parse().ok()?;
        match caps.get(2)?.as_str().to_lowercase().as_str() {
            "day" => Some(CourseLength::Days(count)),
            "week" => Some(CourseLength::Weeks(count)),
            "month" => Some(CourseLength::Months(count)),
            _ => None,
        }
    }

    /// Length in days, counting a week as 7 and a month as 30.
    /// `None` for open-ended courses.
    pub fn approx_days(self) -> Option<u32> {
        match self {
            CourseLength::Days(n) => Some(n),
            CourseLength::Weeks(n) => n.checked_mul(7),
            CourseLength::Months(n) => n.checked_mul(30),
            CourseLength::AsNeeded => None,
        }
    }
}

/// Reminder plan for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosePlan {
    pub name: String,
    pub slots: Vec<DoseSlot>,
    pub course: Option<CourseLength>,
    /// Slots per day times course days, when both are known.
    pub total_doses: Option<u32>,
}

pub fn plan_for(entry: &MedicationEntry) -> DosePlan {
    let slots = dose_slots(&entry.interval);
    let course = CourseLength::parse(&entry.days);
    let total_doses = match (course.and_then(CourseLength::approx_days), slots.len()) {
        (Some(days), n) if n > 0 => days.checked_mul(n as u32),
        _ => None,
    };

    DosePlan {
        name: entry.name.clone(),
        slots,
        course,
        total_doses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_tokens_decode_to_slots() {
        assert_eq!(
            dose_slots(&[ScheduleToken::MorningNight]),
            vec![DoseSlot::Morning, DoseSlot::Night]
        );
        assert_eq!(
            dose_slots(&[ScheduleToken::ThriceDaily]),
            vec![DoseSlot::Morning, DoseSlot::Noon, DoseSlot::Night]
        );
        assert_eq!(dose_slots(&[ScheduleToken::NoonOnly]), vec![DoseSlot::Noon]);
    }

    #[test]
    fn named_times_map_to_the_same_slots() {
        let slots = dose_slots(&[ScheduleToken::Evening, ScheduleToken::Morning, ScheduleToken::NightOnly]);
        assert_eq!(slots, vec![DoseSlot::Morning, DoseSlot::Night]);
    }

    #[test]
    fn meal_and_as_needed_tokens_have_no_slot() {
        assert!(dose_slots(&[
            ScheduleToken::BeforeMeal,
            ScheduleToken::AfterMeal,
            ScheduleToken::AsNeeded,
            ScheduleToken::Unknown,
        ])
        .is_empty());
    }

    #[test]
    fn slot_labels() {
        assert_eq!(DoseSlot::Morning.label(), "8:00 AM");
        assert_eq!(DoseSlot::Noon.label(), "1:00 PM");
        assert_eq!(DoseSlot::Night.label(), "9:00 PM");
        assert_eq!(
            dose_times(&[ScheduleToken::MorningOnly]),
            vec![NaiveTime::from_hms_opt(8, 0, 0).unwrap()]
        );
    }

    #[test]
    fn course_length_parsing() {
        assert_eq!(CourseLength::parse("5 days"), Some(CourseLength::Days(5)));
        assert_eq!(CourseLength::parse("1 Day"), Some(CourseLength::Days(1)));
        assert_eq!(CourseLength::parse("2weeks"), Some(CourseLength::Weeks(2)));
        assert_eq!(CourseLength::parse(" 3 months "), Some(CourseLength::Months(3)));
        assert_eq!(CourseLength::parse("as needed"), Some(CourseLength::AsNeeded));
        assert_eq!(CourseLength::parse("Unknown"), None);
        assert_eq!(CourseLength::parse("5 years"), None);
    }

    #[test]
    fn approx_days() {
        assert_eq!(CourseLength::Weeks(2).approx_days(), Some(14));
        assert_eq!(CourseLength::Months(1).approx_days(), Some(30));
        assert_eq!(CourseLength::AsNeeded.approx_days(), None);
    }

    #[test]
    fn plan_counts_total_doses() {
        let entry = MedicationEntry {
            name: "Amoxicillin".into(),
            dosage: "500mg".into(),
            interval: vec![ScheduleToken::ThriceDaily, ScheduleToken::AfterMeal],
            days: "5 days".into(),
            is_popular: true,
        };
        let plan = plan_for(&entry);
        assert_eq!(plan.slots.len(), 3);
        assert_eq!(plan.course, Some(CourseLength::Days(5)));
        assert_eq!(plan.total_doses, Some(15));
    }

    #[test]
    fn plan_without_slots_has_no_total() {
        let entry = MedicationEntry {
            name: "Salbutamol".into(),
            dosage: "2 tabs".into(),
            interval: vec![ScheduleToken::AsNeeded],
            days: "as needed".into(),
            is_popular: true,
        };
        let plan = plan_for(&entry);
        assert!(plan.slots.is_empty());
        assert_eq!(plan.total_doses, None);
    }

    #[test]
    fn course_length_serializes_tagged() {
        let json = serde_json::to_value(CourseLength::Weeks(2)).unwrap();
        assert_eq!(json["unit"], "weeks");
        assert_eq!(json["count"], 2);
    }
}
