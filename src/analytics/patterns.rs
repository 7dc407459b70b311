//! Pattern Analyzer
//!
//! Groups weighted symptom logs by symptom and derives confidence-scored
//! timing and severity patterns.
//!
//! Confidence is the mean of three 0-100 scores:
//! - **recency**: total weight of the group (recent, relevant logs count more)
//! - **consistency**: how tightly the day offsets after injection cluster
//! - **relevance**: how comparable the logs' injection contexts are to today
//!
//! Consistency uses weighted resampling: each log's day offset is repeated
//! `ceil(weight × resample_factor)` times and the population variance of the
//! expanded list is taken, so heavier logs dominate the estimate. The modal
//! offset is taken over the same expanded list.

use super::error::{mean, weighted_mean, AnalysisError, AnalysisResult};
use super::weighting::WeightedSymptomLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pattern detection constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatternConfig {
    /// Minimum logs of one symptom before a pattern can form
    pub min_logs: usize,
    /// Offset repetitions per unit of weight
    pub resample_factor: f64,
    /// Recency score per unit of total weight
    pub recency_score_scale: f64,
    /// Consistency points lost per unit of offset variance
    pub variance_penalty: f64,
    /// Patterns at or below this confidence are discarded
    pub min_confidence: u8,
    pub high_tier_min_occurrences: usize,
    pub medium_tier_min_occurrences: usize,
    pub moderate_severity: f64,
    pub severe_severity: f64,
    pub consistent_frequency: f64,
    pub frequent_frequency: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_logs: 2,
            resample_factor: 5.0,
            recency_score_scale: 25.0,
            variance_penalty: 20.0,
            min_confidence: 25,
            high_tier_min_occurrences: 4,
            medium_tier_min_occurrences: 3,
            moderate_severity: 5.0,
            severe_severity: 7.0,
            consistent_frequency: 0.7,
            frequent_frequency: 0.4,
        }
    }
}

/// Confidence tier of a pattern, from how many logs support it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

/// Intensity label for a weighted severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Mild,
    Moderate,
    Severe,
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityTier::Mild => write!(f, "mild"),
            SeverityTier::Moderate => write!(f, "moderate"),
            SeverityTier::Severe => write!(f, "severe"),
        }
    }
}

/// A recurring symptom pattern
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub symptom: String,
    pub weighted_severity: f64,
    pub severity_tier: SeverityTier,
    /// Occurrences per injection in the window
    pub frequency: f64,
    pub occurrences: usize,
    /// Distinct day offsets after injection, ascending
    pub day_offsets: Vec<i64>,
    pub modal_offset: Option<i64>,
    pub confidence_tier: ConfidenceTier,
    /// Composite confidence, 0-100
    pub confidence: u8,
    pub recency_score: f64,
    pub consistency_score: f64,
    pub relevance_score: f64,
    pub description: String,
}

impl Pattern {
    /// Whether this pattern has shown up `offset` days after an injection
    pub fn occurs_on(&self, offset: i64) -> bool {
        self.day_offsets.contains(&offset)
    }
}

/// Derives patterns from weighted symptom logs
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    config: PatternConfig,
}

impl PatternAnalyzer {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Detect patterns, sorted by confidence (highest first)
    pub fn analyze(&self, weighted: &[WeightedSymptomLog], injection_count: usize) -> Vec<Pattern> {
        let mut groups: BTreeMap<&str, Vec<&WeightedSymptomLog>> = BTreeMap::new();
        for log in weighted {
            groups.entry(log.symptom()).or_default().push(log);
        }

        let mut patterns: Vec<Pattern> = groups
            .into_iter()
            .filter(|(_, logs)| logs.len() >= self.config.min_logs)
            .filter_map(|(symptom, logs)| match self.build_pattern(symptom, &logs, injection_count) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::debug!(symptom = %symptom, error = %e, "Skipped symptom group");
                    None
                }
            })
            .filter(|p| p.confidence > self.config.min_confidence)
            .collect();

        patterns.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| a.symptom.cmp(&b.symptom))
        });

        patterns
    }

    fn build_pattern(
        &self,
        symptom: &str,
        logs: &[&WeightedSymptomLog],
        injection_count: usize,
    ) -> AnalysisResult<Pattern> {
        let total_weight: f64 = logs.iter().map(|l| l.weight).sum();
        let weighted_severity = weighted_mean(logs.iter().map(|l| (l.severity() as f64, l.weight)))?;
        if !weighted_severity.is_finite() {
            return Err(AnalysisError::ComputationDegenerate("non-finite severity"));
        }

        let offsets = self.resampled_offsets(logs);

        let recency_score = (total_weight * self.config.recency_score_scale).min(100.0);
        let consistency_score = if offsets.len() < 2 {
            0.0
        } else {
            (100.0 - variance(&offsets) * self.config.variance_penalty).clamp(0.0, 100.0)
        };
        let relevances: Vec<f64> = logs.iter().map(|l| l.contextual_relevance).collect();
        let relevance_score = (mean(&relevances)? * 100.0).clamp(0.0, 100.0);

        let confidence = ((recency_score + consistency_score + relevance_score) / 3.0)
            .round()
            .clamp(0.0, 100.0) as u8;

        let occurrences = logs.len();
        let frequency = if injection_count > 0 {
            occurrences as f64 / injection_count as f64
        } else {
            0.0
        };

        let modal_offset = mode(&offsets);
        let mut day_offsets: Vec<i64> = logs.iter().filter_map(|l| l.day_offset()).collect();
        day_offsets.sort_unstable();
        day_offsets.dedup();

        let severity_tier = self.severity_tier(weighted_severity);
        let description = self.describe(symptom, modal_offset, severity_tier, frequency);

        Ok(Pattern {
            symptom: symptom.to_string(),
            weighted_severity,
            severity_tier,
            frequency,
            occurrences,
            day_offsets,
            modal_offset,
            confidence_tier: self.confidence_tier(occurrences),
            confidence,
            recency_score,
            consistency_score,
            relevance_score,
            description,
        })
    }

    /// Each log's day offset repeated in proportion to its weight
    fn resampled_offsets(&self, logs: &[&WeightedSymptomLog]) -> Vec<f64> {
        logs.iter()
            .filter_map(|l| {
                l.day_offset()
                    .map(|offset| (offset, (l.weight * self.config.resample_factor).ceil().max(1.0) as usize))
            })
            .flat_map(|(offset, repeats)| std::iter::repeat(offset as f64).take(repeats))
            .collect()
    }

    pub fn confidence_tier(&self, occurrences: usize) -> ConfidenceTier {
        if occurrences >= self.config.high_tier_min_occurrences {
            ConfidenceTier::High
        } else if occurrences >= self.config.medium_tier_min_occurrences {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn severity_tier(&self, severity: f64) -> SeverityTier {
        if severity >= self.config.severe_severity {
            SeverityTier::Severe
        } else if severity >= self.config.moderate_severity {
            SeverityTier::Moderate
        } else {
            SeverityTier::Mild
        }
    }

    fn frequency_adverb(&self, frequency: f64) -> &'static str {
        if frequency >= self.config.consistent_frequency {
            "consistently"
        } else if frequency >= self.config.frequent_frequency {
            "frequently"
        } else {
            "occasionally"
        }
    }

    fn describe(
        &self,
        symptom: &str,
        modal_offset: Option<i64>,
        tier: SeverityTier,
        frequency: f64,
    ) -> String {
        let timing = match modal_offset {
            Some(0) => "occurs on injection day".to_string(),
            Some(1) => "appears 1 day after injection".to_string(),
            Some(n) => format!("appears {} days after injection", n),
            None => "appears between injections".to_string(),
        };

        format!(
            "{} {} {} with {} intensity.",
            capitalize(symptom),
            self.frequency_adverb(frequency),
            timing,
            tier
        )
    }
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let avg = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / n
}

/// Most frequent value; ties go to the smallest offset
fn mode(values: &[f64]) -> Option<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &v in values {
        *counts.entry(v as i64).or_default() += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(i64, usize)>, (offset, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((offset, count)),
        })
        .map(|(offset, _)| offset)
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
