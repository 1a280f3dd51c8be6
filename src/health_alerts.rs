//! Threshold alerts for the health readings shown next to a prescription.
//!
//! Rules are fixed: BMI outside 18.5-24.9, blood pressure above 120/80,
//! total cholesterol above 200 mg/dL. A reading that cannot be read as a
//! number raises nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BMI_HEALTHY_MIN: f64 = 18.5;
pub const BMI_HEALTHY_MAX: f64 = 24.9;
pub const SYSTOLIC_MAX: f64 = 120.0;
pub const DIASTOLIC_MAX: f64 = 80.0;
pub const CHOLESTEROL_MAX: f64 = 200.0;

static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)").unwrap());

/// Which reading an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthField {
    Bmi,
    BloodPressure,
    Cholesterol,
}

impl HealthField {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthField::Bmi => "bmi",
            HealthField::BloodPressure => "blood_pressure",
            HealthField::Cholesterol => "cholesterol",
        }
    }

    fn warning(self) -> &'static str {
        match self {
            HealthField::Bmi => "BMI outside healthy range (18.5-24.9)",
            HealthField::BloodPressure => "Blood pressure outside healthy range (120/80 or lower)",
            HealthField::Cholesterol => "High cholesterol (above 200 mg/dL)",
        }
    }
}

/// Raw readings as the user's health profile stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub bmi: Option<String>,
    /// `"systolic/diastolic"`, e.g. `"130/85"`.
    pub blood_pressure: Option<String>,
    /// Total cholesterol in mg/dL; a unit suffix is tolerated.
    pub cholesterol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAlert {
    pub field: HealthField,
    /// The reading exactly as supplied.
    pub value: String,
    pub message: String,
}

impl HealthAlert {
    fn new(field: HealthField, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
            message: field.warning().to_string(),
        }
    }
}

/// Leading decimal number of a reading (`"210 mg/dL"` → 210).
fn leading_number(raw: &str) -> Option<f64> {
    RE_LEADING_NUMBER
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn bmi_alert(raw: &str) -> Option<HealthAlert> {
    let bmi = leading_number(raw)?;
    (!(BMI_HEALTHY_MIN..=BMI_HEALTHY_MAX).contains(&bmi)).then(|| HealthAlert::new(HealthField::Bmi, raw))
}

fn blood_pressure_alert(raw: &str) -> Option<HealthAlert> {
    let mut parts = raw.split('/');
    let systolic = parts.next().and_then(leading_number);
    let diastolic = parts.next().and_then(leading_number);

    let high = systolic.is_some_and(|s| s > SYSTOLIC_MAX) || diastolic.is_some_and(|d| d > DIASTOLIC_MAX);
    high.then(|| HealthAlert::new(HealthField::BloodPressure, raw))
}

/// Only the integer part counts: `"200.5"` is not above 200.
fn cholesterol_alert(raw: &str) -> Option<HealthAlert> {
    let total = leading_number(raw)?.trunc();
    (total > CHOLESTEROL_MAX).then(|| HealthAlert::new(HealthField::Cholesterol, raw))
}

/// Alerts for every reading outside its healthy range, in BMI, blood
/// pressure, cholesterol order.
pub fn check_health(snapshot: &HealthSnapshot) -> Vec<HealthAlert> {
    let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    let alerts: Vec<HealthAlert> = [
        present(&snapshot.bmi).and_then(|v| bmi_alert(&v)),
        present(&snapshot.blood_pressure).and_then(|v| blood_pressure_alert(&v)),
        present(&snapshot.cholesterol).and_then(|v| cholesterol_alert(&v)),
    ]
    .into_iter()
    .flatten()
    .collect();

    debug!(alerts = alerts.len(), "Health readings checked");
    alerts
}

/// Banding of a predicted disease-risk percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Green.
    Low,
    /// Yellow.
    Moderate,
    /// Red.
    High,
}

impl RiskLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 50.0 {
            RiskLevel::Low
        } else if percent <= 75.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }

    /// Display colour for dashboards.
    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::Low => "#4CAF50",
            RiskLevel::Moderate => "#FFC107",
            RiskLevel::High => "#F44336",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(bmi: &str, bp: &str, chol: &str) -> HealthSnapshot {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        HealthSnapshot {
            bmi: opt(bmi),
            blood_pressure: opt(bp),
            cholesterol: opt(chol),
        }
    }

    #[test]
    fn healthy_readings_raise_nothing() {
        assert!(check_health(&snapshot("22.0", "118/76", "180")).is_empty());
        assert!(check_health(&HealthSnapshot::default()).is_empty());
    }

    #[test]
    fn bmi_range_is_inclusive() {
        assert!(check_health(&snapshot("18.5", "", "")).is_empty());
        assert!(check_health(&snapshot("24.9", "", "")).is_empty());

        let alerts = check_health(&snapshot("27.3", "", ""));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].field, HealthField::Bmi);
        assert_eq!(alerts[0].value, "27.3");
        assert!(alerts[0].message.contains("18.5-24.9"));

        assert_eq!(check_health(&snapshot("17", "", "")).len(), 1);
    }

    #[test]
    fn either_pressure_component_can_trigger() {
        assert_eq!(check_health(&snapshot("", "130/75", "")).len(), 1);
        assert_eq!(check_health(&snapshot("", "115/85", "")).len(), 1);
        assert!(check_health(&snapshot("", "120/80", "")).is_empty());
        // Systolic alone still counts.
        assert_eq!(check_health(&snapshot("", "140", "")).len(), 1);
    }

    #[test]
    fn cholesterol_with_unit_suffix() {
        let alerts = check_health(&snapshot("", "", "210 mg/dL"));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].field, HealthField::Cholesterol);
        assert!(check_health(&snapshot("", "", "200")).is_empty());
    }

    #[test]
    fn cholesterol_fraction_is_truncated() {
        assert!(check_health(&snapshot("", "", "200.5")).is_empty());
        assert!(check_health(&snapshot("", "", "200.9 mg/dL")).is_empty());
        assert_eq!(check_health(&snapshot("", "", "201.2")).len(), 1);
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        assert!(check_health(&snapshot("\u{0663}\u{0660}", "", "\u{0662}\u{0664}\u{0660}")).is_empty());
    }

    #[test]
    fn unparseable_values_are_ignored() {
        assert!(check_health(&snapshot("tall", "high/low", "n/a")).is_empty());
    }

    #[test]
    fn alerts_come_in_field_order() {
        let alerts = check_health(&snapshot("30", "150/95", "240"));
        let fields: Vec<_> = alerts.iter().map(|a| a.field.as_str()).collect();
        assert_eq!(fields, vec!["bmi", "blood_pressure", "cholesterol"]);
    }

    #[test]
    fn risk_bands() {
        assert_eq!(RiskLevel::from_percent(12.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_percent(50.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_percent(50.1), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_percent(75.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_percent(90.0), RiskLevel::High);
        assert_eq!(RiskLevel::High.color(), "#F44336");
    }
}
