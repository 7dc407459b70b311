//! Injection-Symptom Analytics
//!
//! Correlates medication injections with reported symptoms to produce
//! time-decayed, confidence-scored insights.
//!
//! ## Architecture
//!
//! - **AdaptiveWindowSelector**: How many days of history to analyse
//! - **SymptomWeightCalculator**: Recency, context and severity weights
//! - **PatternAnalyzer**: Recurring symptom patterns with confidence scores
//! - **CorrelationEngine**: Site, dose and peak-window correlations
//! - **InsightGenerator**: Ranked, expiring insights
//! - **MealContextAdvisor**: Meal-time warnings, tips and daily risk
//! - **AnalyticsService**: Fetches store snapshots and runs the pipeline
//!
//! ## Data Flow
//!
//! 1. The service fetches injections and symptoms concurrently
//! 2. The window selector bounds the symptom history
//! 3. Symptoms are weighted and noise is dropped
//! 4. Patterns feed both correlations and insights
//! 5. The meal advisor reads the correlations for today

mod correlations;
mod error;
mod insights;
mod meal;
mod patterns;
mod pipeline;
mod service;
mod weighting;
mod window;

pub use correlations::{
    CorrelationConfig, CorrelationEngine, CorrelationInsights, DoseCorrelation, PeakWindow,
    SiteCorrelation, SymptomCount, CONSISTENT_TRACKING_MESSAGE, CONTINUE_MONITORING_MESSAGE,
    KEEP_LOGGING_MESSAGE,
};
pub use error::{AnalysisError, AnalysisResult};
pub use insights::{Actionability, AdaptiveInsight, InsightConfig, InsightGenerator, PLACEHOLDER_INSIGHT};
pub use meal::{
    MealAdvisorConfig, MealContext, MealContextAdvisor, MealType, MealWarning, RiskLevel, WarningKind,
    WarningSeverity,
};
pub use patterns::{ConfidenceTier, Pattern, PatternAnalyzer, PatternConfig, SeverityTier};
pub use pipeline::{days_since, AnalysisReport, Analyzer, Snapshot};
pub use service::AnalyticsService;
pub use weighting::{
    relevant_injection, InjectionContext, Regimen, SymptomWeightCalculator, WeightedSymptomLog,
    WeightingConfig,
};
pub use window::{AdaptiveWindowSelector, WindowConfig, WindowDecision, WindowReason};

use serde::{Deserialize, Serialize};

/// All analytics tuning constants
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub window: WindowConfig,
    pub weighting: WeightingConfig,
    pub patterns: PatternConfig,
    pub correlations: CorrelationConfig,
    pub insights: InsightConfig,
    pub meal: MealAdvisorConfig,
}

/// Longest window any configuration may ask for
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Longest injection-to-symptom gap any configuration may ask for
pub const MAX_RELEVANCE_LOOKBACK_DAYS: i64 = 365;

/// Largest offset repetition per unit of weight
pub const MAX_RESAMPLE_FACTOR: f64 = 100.0;

impl AnalysisConfig {
    /// Reject values the analyzers cannot work with
    pub fn validate(&self) -> Result<(), String> {
        let window = &self.window;
        if window.min_days > window.max_days {
            return Err(format!(
                "window.min_days ({}) is greater than window.max_days ({})",
                window.min_days, window.max_days
            ));
        }
        if window.max_days > MAX_WINDOW_DAYS {
            return Err(format!(
                "window.max_days ({}) exceeds {}",
                window.max_days, MAX_WINDOW_DAYS
            ));
        }

        let weighting = &self.weighting;
        if !(0..=MAX_RELEVANCE_LOOKBACK_DAYS).contains(&weighting.relevance_lookback_days) {
            return Err(format!(
                "weighting.relevance_lookback_days ({}) must be between 0 and {}",
                weighting.relevance_lookback_days, MAX_RELEVANCE_LOOKBACK_DAYS
            ));
        }
        if !(weighting.recency_decay_days.is_finite() && weighting.recency_decay_days > 0.0) {
            return Err(format!(
                "weighting.recency_decay_days ({}) must be positive",
                weighting.recency_decay_days
            ));
        }
        if !(0.0..=1.0).contains(&weighting.noise_floor) {
            return Err(format!(
                "weighting.noise_floor ({}) must be between 0 and 1",
                weighting.noise_floor
            ));
        }

        let factor = self.patterns.resample_factor;
        if !(factor > 0.0 && factor <= MAX_RESAMPLE_FACTOR) {
            return Err(format!(
                "patterns.resample_factor ({}) must be above 0 and at most {}",
                factor, MAX_RESAMPLE_FACTOR
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(AnalysisConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let mut config = AnalysisConfig::default();
        config.window.min_days = 80;
        assert!(config.validate().unwrap_err().contains("min_days"));

        let mut config = AnalysisConfig::default();
        config.weighting.relevance_lookback_days = i64::MAX;
        assert!(config.validate().unwrap_err().contains("relevance_lookback_days"));

        let mut config = AnalysisConfig::default();
        config.weighting.noise_floor = f64::NAN;
        assert!(config.validate().unwrap_err().contains("noise_floor"));

        let mut config = AnalysisConfig::default();
        config.patterns.resample_factor = f64::NAN;
        assert!(config.validate().unwrap_err().contains("resample_factor"));
    }
}
