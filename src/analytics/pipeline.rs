//! Analysis pipeline
//!
//! Runs the full synchronous transform over one user's history snapshot:
//! window selection, weighting, pattern detection, correlation and insight
//! generation. Every step is a pure function of the snapshot and `now`.

use super::correlations::{CorrelationEngine, CorrelationInsights};
use super::insights::{AdaptiveInsight, InsightGenerator};
use super::meal::{MealContext, MealContextAdvisor, MealType, RiskLevel};
use super::patterns::PatternAnalyzer;
use super::weighting::{Regimen, SymptomWeightCalculator};
use super::window::{AdaptiveWindowSelector, WindowDecision};
use super::AnalysisConfig;
use crate::store::{InjectionEvent, SymptomLog};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Immutable history for one user, newest first
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub injections: Vec<InjectionEvent>,
    pub symptoms: Vec<SymptomLog>,
}

impl Snapshot {
    pub fn new(mut injections: Vec<InjectionEvent>, mut symptoms: Vec<SymptomLog>) -> Self {
        injections.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        symptoms.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self {
            injections,
            symptoms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.injections.is_empty() && self.symptoms.is_empty()
    }
}

/// Everything computed for one user in one pass
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub window: WindowDecision,
    /// Whole days since the last injection
    pub days_since_injection: Option<i64>,
    /// Full injection history, used for frequency and confidence
    pub total_injections: usize,
    pub injections_in_window: usize,
    pub symptoms_in_window: usize,
    /// Symptom logs that survived the noise floor
    pub weighted_symptoms: usize,
    pub correlations: CorrelationInsights,
    pub insights: Vec<AdaptiveInsight>,
    pub risk_level: RiskLevel,
}

/// The analytics core, configured once and reused across calls
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    selector: AdaptiveWindowSelector,
    weights: SymptomWeightCalculator,
    patterns: PatternAnalyzer,
    correlations: CorrelationEngine,
    insights: InsightGenerator,
    meal: MealContextAdvisor,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            selector: AdaptiveWindowSelector::new(config.window.clone()),
            weights: SymptomWeightCalculator::new(config.weighting.clone()),
            patterns: PatternAnalyzer::new(config.patterns.clone()),
            correlations: CorrelationEngine::new(config.correlations.clone()),
            insights: InsightGenerator::new(config.insights.clone()),
            meal: MealContextAdvisor::new(config.meal.clone()),
        }
    }

    pub fn selector(&self) -> &AdaptiveWindowSelector {
        &self.selector
    }

    /// Run the full pipeline
    pub fn analyze(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> AnalysisReport {
        let window = self.selector.decide(&snapshot.injections);
        let cutoff = now
            .checked_sub_signed(Duration::days(window.days as i64))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        // Only symptoms are windowed; counts and attribution use the full
        // injection history.
        let injections = &snapshot.injections;
        let injections_in_window = injections.iter().filter(|i| i.timestamp >= cutoff).count();
        let symptoms: Vec<SymptomLog> = snapshot
            .symptoms
            .iter()
            .filter(|s| s.timestamp >= cutoff)
            .cloned()
            .collect();

        let regimen = Regimen::current(injections);
        let weighted = self
            .weights
            .weigh(&symptoms, injections, regimen.as_ref(), now);

        let patterns = self.patterns.analyze(&weighted, injections.len());
        let insights = self
            .insights
            .generate(&patterns, weighted.len(), injections.len(), now);
        let correlations =
            self.correlations
                .correlate(injections, symptoms.len(), &weighted, patterns);

        let days_since_injection = days_since(&snapshot.injections, now);
        let risk_level = self
            .meal
            .advise(days_since_injection, &correlations, None)
            .risk_level;

        tracing::debug!(
            window_days = window.days,
            injections = injections.len(),
            injections_in_window,
            symptoms = symptoms.len(),
            weighted = weighted.len(),
            patterns = correlations.patterns.len(),
            confidence = correlations.confidence_score,
            "Analysis complete"
        );

        AnalysisReport {
            generated_at: now,
            window,
            days_since_injection,
            total_injections: injections.len(),
            injections_in_window,
            symptoms_in_window: symptoms.len(),
            weighted_symptoms: weighted.len(),
            correlations,
            insights,
            risk_level,
        }
    }

    /// Meal guidance from a finished report
    pub fn meal_context(&self, report: &AnalysisReport, meal_type: Option<MealType>) -> MealContext {
        self.meal
            .advise(report.days_since_injection, &report.correlations, meal_type)
    }
}

/// Whole days since the latest injection; an injection logged ahead of `now` counts as today
pub fn days_since(injections: &[InjectionEvent], now: DateTime<Utc>) -> Option<i64> {
    injections
        .first()
        .map(|latest| (now - latest.timestamp).num_days().max(0))
}
