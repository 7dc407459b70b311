//! Insight Generator
//!
//! Turns detected patterns into short-lived, ranked insights. Each insight
//! carries an actionability tier and an expiry that stretches with confidence
//! and shrinks when the evidence is very recent (it will be superseded soon).

use super::error::require_history;
use super::patterns::Pattern;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_INSIGHT: &str = "Continue logging to build personalized insights";

const MS_PER_DAY: f64 = 86_400_000.0;

/// Insight generation constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsightConfig {
    pub min_symptoms: usize,
    pub min_injections: usize,
    pub max_insights: usize,
    pub base_validity_days: f64,
    pub placeholder_validity_days: i64,
    /// Confidence above this is highly actionable
    pub high_actionability: u8,
    pub medium_actionability: u8,
    pub high_confidence_multiplier: f64,
    pub medium_confidence_multiplier: f64,
    pub low_confidence_multiplier: f64,
    /// Recency score above this shortens validity
    pub fresh_recency_score: f64,
    pub fresh_recency_multiplier: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_symptoms: 3,
            min_injections: 2,
            max_insights: 5,
            base_validity_days: 14.0,
            placeholder_validity_days: 7,
            high_actionability: 70,
            medium_actionability: 40,
            high_confidence_multiplier: 2.0,
            medium_confidence_multiplier: 1.5,
            low_confidence_multiplier: 1.0,
            fresh_recency_score: 80.0,
            fresh_recency_multiplier: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Actionability {
    Low,
    Medium,
    High,
}

/// A ranked, expiring insight
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveInsight {
    /// Human-readable pattern text
    pub pattern: String,
    /// Symptom the insight is about; `None` for the placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom: Option<String>,
    pub confidence: u8,
    pub recency_score: f64,
    pub relevance_score: f64,
    pub actionability: Actionability,
    pub valid_until: DateTime<Utc>,
}

impl AdaptiveInsight {
    pub fn is_placeholder(&self) -> bool {
        self.symptom.is_none()
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at < self.valid_until
    }
}

#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    config: InsightConfig,
}

impl InsightGenerator {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Ranked insights; never empty
    pub fn generate(
        &self,
        patterns: &[Pattern],
        weighted_count: usize,
        injection_count: usize,
        now: DateTime<Utc>,
    ) -> Vec<AdaptiveInsight> {
        if let Err(e) = require_history(
            injection_count,
            weighted_count,
            self.config.min_injections,
            self.config.min_symptoms,
        ) {
            tracing::debug!(error = %e, "Returning placeholder insight");
            return vec![self.placeholder(now)];
        }

        let mut insights: Vec<AdaptiveInsight> = patterns
            .iter()
            .map(|pattern| self.from_pattern(pattern, now))
            .collect();

        insights.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        insights.truncate(self.config.max_insights);

        if insights.is_empty() {
            insights.push(self.placeholder(now));
        }

        insights
    }

    pub fn placeholder(&self, now: DateTime<Utc>) -> AdaptiveInsight {
        AdaptiveInsight {
            pattern: PLACEHOLDER_INSIGHT.to_string(),
            symptom: None,
            confidence: 0,
            recency_score: 0.0,
            relevance_score: 0.0,
            actionability: Actionability::Low,
            valid_until: now + Duration::days(self.config.placeholder_validity_days),
        }
    }

    pub fn actionability(&self, confidence: u8) -> Actionability {
        if confidence > self.config.high_actionability {
            Actionability::High
        } else if confidence > self.config.medium_actionability {
            Actionability::Medium
        } else {
            Actionability::Low
        }
    }

    /// How long an insight stays valid, in days
    pub fn validity_days(&self, confidence: u8, recency_score: f64) -> f64 {
        let confidence_multiplier = match self.actionability(confidence) {
            Actionability::High => self.config.high_confidence_multiplier,
            Actionability::Medium => self.config.medium_confidence_multiplier,
            Actionability::Low => self.config.low_confidence_multiplier,
        };
        let recency_multiplier = if recency_score > self.config.fresh_recency_score {
            self.config.fresh_recency_multiplier
        } else {
            1.0
        };

        self.config.base_validity_days * confidence_multiplier * recency_multiplier
    }

    fn from_pattern(&self, pattern: &Pattern, now: DateTime<Utc>) -> AdaptiveInsight {
        let days = self.validity_days(pattern.confidence, pattern.recency_score);

        AdaptiveInsight {
            pattern: pattern.description.clone(),
            symptom: Some(pattern.symptom.clone()),
            confidence: pattern.confidence,
            recency_score: pattern.recency_score,
            relevance_score: pattern.relevance_score,
            actionability: self.actionability(pattern.confidence),
            valid_until: now + Duration::milliseconds((days * MS_PER_DAY).round() as i64),
        }
    }
}
