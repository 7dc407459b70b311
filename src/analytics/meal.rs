//! Meal Context Advisor
//!
//! Answers "what should I watch for with this meal, today" from the days since
//! the last injection and the current correlation insights.

use super::correlations::CorrelationInsights;
use super::patterns::{capitalize, ConfidenceTier, Pattern, SeverityTier};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(StoreError::Validation(format!("Unknown meal type: {}", other))),
        }
    }
}

/// What a warning is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    InjectionDay,
    PeakWindow,
    Nausea,
    EarlyFullness,
    Heartburn,
    Symptom,
}

impl WarningKind {
    /// Symptom family a pattern belongs to
    pub fn for_symptom(symptom: &str) -> Self {
        if symptom.contains("nausea") {
            WarningKind::Nausea
        } else if symptom.contains("fullness") || symptom.contains("satiety") {
            WarningKind::EarlyFullness
        } else if symptom.contains("heartburn") || symptom.contains("reflux") {
            WarningKind::Heartburn
        } else {
            WarningKind::Symptom
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub severity: WarningSeverity,
    pub message: String,
}

/// Overall symptom risk for today
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Unknown => write!(f, "unknown"),
        }
    }
}

/// Meal guidance for today
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealContext {
    /// Whole days since the last injection; `None` when none is logged
    pub days_since_injection: Option<i64>,
    pub is_injection_day: bool,
    pub is_peak_symptom_window: bool,
    pub warnings: Vec<MealWarning>,
    pub tips: Vec<String>,
    pub confidence: u8,
    pub risk_level: RiskLevel,
}

/// Meal advisor constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MealAdvisorConfig {
    pub max_warnings: usize,
    pub max_tips: usize,
    /// Correlation confidence needed before a peak-window caution is raised
    pub peak_caution_min_confidence: u8,
    pub reinforcement_min_confidence: u8,
    /// Below this correlation confidence the risk level is unknown
    pub risk_min_confidence: u8,
    /// Weighted severity at which a symptom caution becomes high
    pub high_warning_severity: f64,
}

impl Default for MealAdvisorConfig {
    fn default() -> Self {
        Self {
            max_warnings: 3,
            max_tips: 2,
            peak_caution_min_confidence: 40,
            reinforcement_min_confidence: 60,
            risk_min_confidence: 30,
            high_warning_severity: 7.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MealContextAdvisor {
    config: MealAdvisorConfig,
}

impl MealContextAdvisor {
    pub fn new(config: MealAdvisorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MealAdvisorConfig {
        &self.config
    }

    pub fn advise(
        &self,
        days_since_injection: Option<i64>,
        insights: &CorrelationInsights,
        meal_type: Option<MealType>,
    ) -> MealContext {
        let is_injection_day = days_since_injection == Some(0);
        let peak = insights.peak_symptom_window.as_ref();
        let in_peak = |day: Option<i64>| match (day, peak) {
            (Some(day), Some(window)) => window.contains(day),
            _ => false,
        };
        let is_peak_symptom_window = in_peak(days_since_injection);
        let tomorrow_is_peak = in_peak(days_since_injection.map(|d| d + 1));

        let todays_patterns: Vec<&Pattern> = match days_since_injection {
            Some(day) => insights.patterns.iter().filter(|p| p.occurs_on(day)).collect(),
            None => Vec::new(),
        };

        let warnings = self.warnings(
            is_injection_day,
            is_peak_symptom_window,
            insights,
            &todays_patterns,
        );

        let mut tips = Vec::new();
        if todays_patterns.is_empty() && days_since_injection.map_or(false, |d| d > 0) {
            tips.push(
                "Today is usually a calmer day for you, so a balanced meal should sit well.".to_string(),
            );
        }
        if tomorrow_is_peak && !is_peak_symptom_window {
            tips.push(
                "Tomorrow is usually a peak symptom day; consider planning lighter meals ahead of time."
                    .to_string(),
            );
        }
        if insights.confidence_score > self.config.reinforcement_min_confidence {
            tips.push(
                "Your logs are consistent enough that these suggestions reflect your own patterns."
                    .to_string(),
            );
        }
        if is_peak_symptom_window && meal_type == Some(MealType::Breakfast) {
            tips.push(
                "A small, protein-forward breakfast is usually easier to tolerate during your peak window."
                    .to_string(),
            );
        }
        if is_injection_day && meal_type == Some(MealType::Dinner) {
            tips.push("Keep dinner light tonight since today is your injection day.".to_string());
        }
        tips.truncate(self.config.max_tips);

        let risk_level = self.risk_level(insights.confidence_score, &warnings, is_peak_symptom_window);

        tracing::debug!(
            days_since = ?days_since_injection,
            warnings = warnings.len(),
            tips = tips.len(),
            risk = %risk_level,
            "Built meal context"
        );

        MealContext {
            days_since_injection,
            is_injection_day,
            is_peak_symptom_window,
            warnings,
            tips,
            confidence: insights.confidence_score,
            risk_level,
        }
    }

    /// Daily risk from correlation confidence and today's warnings
    pub fn risk_level(
        &self,
        confidence: u8,
        warnings: &[MealWarning],
        is_peak_symptom_window: bool,
    ) -> RiskLevel {
        if confidence < self.config.risk_min_confidence {
            return RiskLevel::Unknown;
        }
        if warnings.iter().any(|w| w.severity == WarningSeverity::High) {
            return RiskLevel::High;
        }
        let medium = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Medium)
            .count();
        if medium > 1 || is_peak_symptom_window {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn warnings(
        &self,
        is_injection_day: bool,
        is_peak_symptom_window: bool,
        insights: &CorrelationInsights,
        todays_patterns: &[&Pattern],
    ) -> Vec<MealWarning> {
        let mut built = Vec::new();

        if is_injection_day {
            built.push(MealWarning {
                kind: WarningKind::InjectionDay,
                severity: WarningSeverity::Low,
                message: "It's injection day: mild nausea can start within hours, so keep portions small."
                    .to_string(),
            });
        }

        if is_peak_symptom_window && insights.confidence_score > self.config.peak_caution_min_confidence {
            built.push(match insights.top_pattern() {
                Some(top) => MealWarning {
                    kind: WarningKind::PeakWindow,
                    severity: if top.severity_tier == SeverityTier::Severe {
                        WarningSeverity::High
                    } else {
                        WarningSeverity::Medium
                    },
                    message: format!(
                        "You're in your peak symptom window; {} has tended to be {} around now.",
                        top.symptom, top.severity_tier
                    ),
                },
                None => MealWarning {
                    kind: WarningKind::PeakWindow,
                    severity: WarningSeverity::Medium,
                    message: "You're in your peak symptom window; go easy on rich or heavy foods."
                        .to_string(),
                },
            });
        }

        for pattern in todays_patterns
            .iter()
            .filter(|p| p.confidence_tier != ConfidenceTier::Low)
        {
            let kind = WarningKind::for_symptom(&pattern.symptom);
            let severity = if pattern.weighted_severity >= self.config.high_warning_severity {
                WarningSeverity::High
            } else {
                WarningSeverity::Medium
            };
            let message = match kind {
                WarningKind::Nausea => {
                    "Nausea often shows up today; choose bland foods and eat slowly.".to_string()
                }
                WarningKind::EarlyFullness => {
                    "You tend to feel full early today; start with protein and plan a smaller portion."
                        .to_string()
                }
                WarningKind::Heartburn => {
                    "Heartburn often appears today; skip spicy or acidic foods and stay upright after eating."
                        .to_string()
                }
                _ => format!(
                    "{} often appears today; keep this meal light and see how you feel.",
                    capitalize(&pattern.symptom)
                ),
            };
            built.push(MealWarning {
                kind,
                severity,
                message,
            });
        }

        // Dedupe on kind + severity, keeping the longer message
        let mut warnings: Vec<MealWarning> = Vec::with_capacity(built.len());
        for warning in built {
            match warnings
                .iter_mut()
                .find(|w| w.kind == warning.kind && w.severity == warning.severity)
            {
                Some(existing) if warning.message.len() > existing.message.len() => *existing = warning,
                Some(_) => {}
                None => warnings.push(warning),
            }
        }

        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
        warnings.truncate(self.config.max_warnings);
        warnings
    }
}
