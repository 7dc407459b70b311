//! Core record types for injection and symptom history
//!
//! This module defines the typed records supplied by the stores:
//! - `InjectionEvent`: A single logged medication dose
//! - `SymptomLog`: A user-reported symptom occurrence
//! - `Medication` and `InjectionSite`: Coded enums for the regimen
//!
//! Records are validated when they are constructed, so everything past the
//! ingestion boundary can assume well-formed values.

use super::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Medication code for an injection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Medication {
    /// Weekly semaglutide (Ozempic, Wegovy)
    Semaglutide,
    /// Weekly tirzepatide (Mounjaro, Zepbound)
    Tirzepatide,
    /// Weekly dulaglutide (Trulicity)
    Dulaglutide,
    /// Daily liraglutide (Victoza, Saxenda)
    Liraglutide,
    /// Twice-daily exenatide (Byetta)
    Exenatide,
}

impl Medication {
    /// Get all medication codes for iteration
    pub fn all() -> &'static [Medication] {
        &[
            Medication::Semaglutide,
            Medication::Tirzepatide,
            Medication::Dulaglutide,
            Medication::Liraglutide,
            Medication::Exenatide,
        ]
    }

    /// Dosing cadence of this medication
    pub fn cadence(&self) -> Cadence {
        match self {
            Medication::Liraglutide | Medication::Exenatide => Cadence::Daily,
            _ => Cadence::Weekly,
        }
    }

    /// Whether this medication is dosed daily
    pub fn is_daily(&self) -> bool {
        self.cadence() == Cadence::Daily
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Medication::Semaglutide => "semaglutide",
            Medication::Tirzepatide => "tirzepatide",
            Medication::Dulaglutide => "dulaglutide",
            Medication::Liraglutide => "liraglutide",
            Medication::Exenatide => "exenatide",
        }
    }
}

impl std::fmt::Display for Medication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Medication {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Medication::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == code)
            .ok_or_else(|| StoreError::Validation(format!("unknown medication code: {}", s)))
    }
}

/// How often a medication is dosed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
}

/// Body region an injection was given in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum InjectionSite {
    AbdomenLeft,
    AbdomenRight,
    ThighLeft,
    ThighRight,
    ArmLeft,
    ArmRight,
}

impl InjectionSite {
    /// Get all sites for iteration
    pub fn all() -> &'static [InjectionSite] {
        &[
            InjectionSite::AbdomenLeft,
            InjectionSite::AbdomenRight,
            InjectionSite::ThighLeft,
            InjectionSite::ThighRight,
            InjectionSite::ArmLeft,
            InjectionSite::ArmRight,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InjectionSite::AbdomenLeft => "abdomen-left",
            InjectionSite::AbdomenRight => "abdomen-right",
            InjectionSite::ThighLeft => "thigh-left",
            InjectionSite::ThighRight => "thigh-right",
            InjectionSite::ArmLeft => "arm-left",
            InjectionSite::ArmRight => "arm-right",
        }
    }

    /// Human-readable label ("left abdomen")
    pub fn label(&self) -> &'static str {
        match self {
            InjectionSite::AbdomenLeft => "left abdomen",
            InjectionSite::AbdomenRight => "right abdomen",
            InjectionSite::ThighLeft => "left thigh",
            InjectionSite::ThighRight => "right thigh",
            InjectionSite::ArmLeft => "left arm",
            InjectionSite::ArmRight => "right arm",
        }
    }
}

impl std::fmt::Display for InjectionSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InjectionSite {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase().replace(['_', ' '], "-");
        InjectionSite::all()
            .iter()
            .copied()
            .find(|site| site.as_str() == code)
            .ok_or_else(|| StoreError::Validation(format!("unknown injection site: {}", s)))
    }
}

/// A logged medication dose administration
///
/// Immutable once recorded. Stores hand these out newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InjectionEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub medication: Medication,
    /// Dose in milligrams
    pub dose: f64,
    pub site: InjectionSite,
}

impl InjectionEvent {
    /// Create a validated injection event
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        medication: Medication,
        dose: f64,
        site: InjectionSite,
    ) -> StoreResult<Self> {
        let event = Self {
            id: id.into(),
            timestamp,
            medication,
            dose,
            site,
        };
        event.validate()?;
        Ok(event)
    }

    /// Check dose and id constraints
    pub fn validate(&self) -> StoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(StoreError::Validation("injection id cannot be empty".to_string()));
        }
        if !self.dose.is_finite() || self.dose <= 0.0 {
            return Err(StoreError::Validation(format!(
                "dose must be a positive number, got {}",
                self.dose
            )));
        }
        Ok(())
    }
}

/// A user-reported symptom occurrence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    pub id: String,
    /// Normalized symptom name (lowercase, single-spaced)
    pub symptom: String,
    /// Severity from 1 (barely noticeable) to 10 (worst)
    pub severity: u8,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub meal_related: Option<bool>,
    #[serde(default)]
    pub notes: String,
}

impl SymptomLog {
    /// Create a validated symptom log with a normalized symptom name
    pub fn new(
        id: impl Into<String>,
        symptom: &str,
        severity: u8,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Self> {
        let log = Self {
            id: id.into(),
            symptom: normalize_symptom(symptom),
            severity,
            timestamp,
            meal_related: None,
            notes: String::new(),
        };
        log.validate()?;
        Ok(log)
    }

    /// Builder: mark whether the symptom followed a meal
    pub fn meal_related(mut self, related: bool) -> Self {
        self.meal_related = Some(related);
        self
    }

    /// Builder: attach free-text notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Check severity range and symptom name
    pub fn validate(&self) -> StoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(StoreError::Validation("symptom id cannot be empty".to_string()));
        }
        if self.symptom.is_empty() {
            return Err(StoreError::Validation("symptom name cannot be empty".to_string()));
        }
        if !(1..=10).contains(&self.severity) {
            return Err(StoreError::Validation(format!(
                "severity must be between 1 and 10, got {}",
                self.severity
            )));
        }
        Ok(())
    }
}

/// Normalize a free-form symptom name: trim, lowercase, collapse whitespace
pub fn normalize_symptom(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_medication_cadence() {
        assert!(Medication::Liraglutide.is_daily());
        assert!(Medication::Exenatide.is_daily());
        assert!(!Medication::Semaglutide.is_daily());
        assert_eq!(Medication::Tirzepatide.cadence(), Cadence::Weekly);
    }

    #[test]
    fn test_medication_parse() {
        assert_eq!("Semaglutide".parse::<Medication>().unwrap(), Medication::Semaglutide);
        assert!("insulin".parse::<Medication>().is_err());
    }

    #[test]
    fn test_site_parse_accepts_separators() {
        assert_eq!("thigh_left".parse::<InjectionSite>().unwrap(), InjectionSite::ThighLeft);
        assert_eq!("Arm Right".parse::<InjectionSite>().unwrap(), InjectionSite::ArmRight);
        assert!("forehead".parse::<InjectionSite>().is_err());
    }

    #[test]
    fn test_injection_rejects_bad_dose() {
        let err = InjectionEvent::new("i1", ts(), Medication::Semaglutide, 0.0, InjectionSite::ArmLeft);
        assert!(matches!(err, Err(StoreError::Validation(_))));

        let err = InjectionEvent::new("i1", ts(), Medication::Semaglutide, f64::NAN, InjectionSite::ArmLeft);
        assert!(err.is_err());
    }

    #[test]
    fn test_symptom_normalization() {
        let log = SymptomLog::new("s1", "  Early   Fullness ", 4, ts()).unwrap();
        assert_eq!(log.symptom, "early fullness");
    }

    #[test]
    fn test_symptom_severity_range() {
        assert!(SymptomLog::new("s1", "nausea", 0, ts()).is_err());
        assert!(SymptomLog::new("s1", "nausea", 11, ts()).is_err());
        assert!(SymptomLog::new("s1", "nausea", 10, ts()).is_ok());
        assert!(SymptomLog::new("s1", "   ", 5, ts()).is_err());
    }

    #[test]
    fn test_injection_serialization() {
        let event =
            InjectionEvent::new("i1", ts(), Medication::Tirzepatide, 2.5, InjectionSite::AbdomenRight)
                .unwrap();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"medication\":\"tirzepatide\""));
        assert!(json.contains("\"site\":\"abdomen-right\""));

        let restored: InjectionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, event);
    }
}
