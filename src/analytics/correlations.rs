//! Correlation Engine
//!
//! Aggregates weighted symptoms by injection site and dose, locates the peak
//! symptom window after injection, and turns the findings into ordered
//! recommendations with an overall confidence score.

use super::error::{mean, require_history};
use super::patterns::{ConfidenceTier, Pattern};
use super::weighting::WeightedSymptomLog;
use crate::store::{InjectionEvent, InjectionSite};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Guidance returned when there is not enough history to analyse
pub const KEEP_LOGGING_MESSAGE: &str =
    "Keep logging your injections and symptoms for about 2-3 weeks to reveal your personal patterns.";
pub const CONSISTENT_TRACKING_MESSAGE: &str =
    "Consistent tracking unlocks insights about how your body responds to each dose.";
/// Recommendation used when no rule fires
pub const CONTINUE_MONITORING_MESSAGE: &str =
    "Continue monitoring your symptoms; more consistent logs will sharpen these insights.";

/// Correlation constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorrelationConfig {
    pub min_injections: usize,
    pub min_symptoms: usize,
    /// Confidence points per injection or symptom record
    pub data_point_score: u32,
    /// Confidence points per high-tier pattern
    pub high_pattern_score: u32,
    /// Latest start (days after injection) for a peak window to drive activity planning
    pub peak_planning_max_start: i64,
    /// Minimum logs at the modal offset for a peak window to exist
    pub peak_min_count: usize,
    pub provider_min_severity: f64,
    pub max_provider_recommendations: usize,
    /// Site rotation is flagged when a site's top symptom count exceeds this
    pub site_rotation_threshold: usize,
    pub max_dose_symptoms: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_injections: 2,
            min_symptoms: 3,
            data_point_score: 2,
            high_pattern_score: 15,
            peak_planning_max_start: 2,
            peak_min_count: 2,
            provider_min_severity: 6.0,
            max_provider_recommendations: 2,
            site_rotation_threshold: 2,
            max_dose_symptoms: 3,
        }
    }
}

/// Day offsets after injection where symptoms cluster
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeakWindow {
    /// Contiguous, ascending day offsets
    pub days: Vec<i64>,
    pub description: String,
}

impl PeakWindow {
    pub fn contains(&self, offset: i64) -> bool {
        self.days.contains(&offset)
    }

    pub fn start(&self) -> Option<i64> {
        self.days.first().copied()
    }
}

/// How often a symptom followed injections
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomCount {
    pub symptom: String,
    pub count: usize,
}

/// Symptoms that followed injections at one site
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteCorrelation {
    pub site: InjectionSite,
    /// Most frequent first
    pub symptoms: Vec<SymptomCount>,
}

impl SiteCorrelation {
    pub fn top(&self) -> Option<&SymptomCount> {
        self.symptoms.first()
    }
}

/// Symptom severity seen at one dose
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoseCorrelation {
    pub dose: f64,
    pub average_severity: f64,
    /// Up to a few distinct symptoms, most frequent first
    pub symptoms: Vec<String>,
    pub sample_size: usize,
}

/// Top-level correlation result
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationInsights {
    pub patterns: Vec<Pattern>,
    pub peak_symptom_window: Option<PeakWindow>,
    pub site_correlations: Vec<SiteCorrelation>,
    pub dose_correlations: Vec<DoseCorrelation>,
    pub recommendations: Vec<String>,
    /// Overall confidence, 0-100
    pub confidence_score: u8,
}

impl CorrelationInsights {
    /// Result for histories too small to analyse
    pub fn insufficient() -> Self {
        Self {
            patterns: Vec::new(),
            peak_symptom_window: None,
            site_correlations: Vec::new(),
            dose_correlations: Vec::new(),
            recommendations: vec![
                KEEP_LOGGING_MESSAGE.to_string(),
                CONSISTENT_TRACKING_MESSAGE.to_string(),
            ],
            confidence_score: 0,
        }
    }

    pub fn top_pattern(&self) -> Option<&Pattern> {
        self.patterns.first()
    }
}

/// Surfaces site, dose and timing correlations
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    config: CorrelationConfig,
}

impl CorrelationEngine {
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Build correlation insights from an analysed snapshot
    ///
    /// `symptom_count` is the number of raw symptom logs in the window, before
    /// noise filtering. Patterns should already be sorted by confidence.
    pub fn correlate(
        &self,
        injections: &[InjectionEvent],
        symptom_count: usize,
        weighted: &[WeightedSymptomLog],
        patterns: Vec<Pattern>,
    ) -> CorrelationInsights {
        if let Err(e) = require_history(
            injections.len(),
            symptom_count,
            self.config.min_injections,
            self.config.min_symptoms,
        ) {
            tracing::debug!(error = %e, "Returning insufficient-data correlations");
            return CorrelationInsights::insufficient();
        }

        let peak_symptom_window = self.peak_window(weighted);
        let site_correlations = self.site_correlations(weighted);
        let dose_correlations = self.dose_correlations(injections, weighted);
        let recommendations =
            self.recommendations(peak_symptom_window.as_ref(), &patterns, &site_correlations);

        let high_patterns = patterns
            .iter()
            .filter(|p| p.confidence_tier == ConfidenceTier::High)
            .count() as u32;
        let data_points = (injections.len() + symptom_count) as u32;
        let confidence_score = (data_points
            .saturating_mul(self.config.data_point_score)
            .saturating_add(high_patterns.saturating_mul(self.config.high_pattern_score)))
        .min(100) as u8;

        tracing::debug!(
            patterns = patterns.len(),
            sites = site_correlations.len(),
            doses = dose_correlations.len(),
            confidence_score,
            "Computed correlations"
        );

        CorrelationInsights {
            patterns,
            peak_symptom_window,
            site_correlations,
            dose_correlations,
            recommendations,
            confidence_score,
        }
    }

    /// Contiguous run of offsets around the modal offset holding at least half its count
    pub fn peak_window(&self, weighted: &[WeightedSymptomLog]) -> Option<PeakWindow> {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for offset in weighted.iter().filter_map(|w| w.day_offset()) {
            *counts.entry(offset).or_default() += 1;
        }

        let (modal, modal_count) = counts.iter().fold(None, |best: Option<(i64, usize)>, (&o, &c)| {
            match best {
                Some((_, best_count)) if best_count >= c => best,
                _ => Some((o, c)),
            }
        })?;

        if modal_count < self.config.peak_min_count {
            return None;
        }

        let in_window = |offset: i64| counts.get(&offset).map_or(false, |&c| c * 2 >= modal_count);

        let mut start = modal;
        while in_window(start - 1) {
            start -= 1;
        }
        let mut end = modal;
        while in_window(end + 1) {
            end += 1;
        }

        Some(PeakWindow {
            days: (start..=end).collect(),
            description: peak_description(start, end),
        })
    }

    /// Symptom tallies per injection site, sites in fixed order
    pub fn site_correlations(&self, weighted: &[WeightedSymptomLog]) -> Vec<SiteCorrelation> {
        let mut by_site: BTreeMap<InjectionSite, HashMap<&str, usize>> = BTreeMap::new();
        for w in weighted {
            if let Some(ctx) = &w.injection {
                *by_site.entry(ctx.site).or_default().entry(w.symptom()).or_default() += 1;
            }
        }

        by_site
            .into_iter()
            .map(|(site, tally)| SiteCorrelation {
                site,
                symptoms: sorted_counts(tally),
            })
            .collect()
    }

    /// Average severity and leading symptoms per distinct dose, ascending by dose
    pub fn dose_correlations(
        &self,
        injections: &[InjectionEvent],
        weighted: &[WeightedSymptomLog],
    ) -> Vec<DoseCorrelation> {
        let mut doses: Vec<f64> = injections.iter().map(|i| i.dose).collect();
        doses.sort_by(|a, b| a.total_cmp(b));
        doses.dedup();

        doses
            .into_iter()
            .filter_map(|dose| {
                let associated: Vec<&WeightedSymptomLog> = weighted
                    .iter()
                    .filter(|w| w.injection.as_ref().map_or(false, |ctx| ctx.dose == dose))
                    .collect();

                let severities: Vec<f64> = associated.iter().map(|w| w.severity() as f64).collect();
                let average_severity = mean(&severities).ok()?;

                let mut tally: HashMap<&str, usize> = HashMap::new();
                for w in &associated {
                    *tally.entry(w.symptom()).or_default() += 1;
                }

                Some(DoseCorrelation {
                    dose,
                    average_severity,
                    symptoms: sorted_counts(tally)
                        .into_iter()
                        .take(self.config.max_dose_symptoms)
                        .map(|c| c.symptom)
                        .collect(),
                    sample_size: associated.len(),
                })
            })
            .collect()
    }

    fn recommendations(
        &self,
        peak: Option<&PeakWindow>,
        patterns: &[Pattern],
        sites: &[SiteCorrelation],
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if let Some(window) = peak {
            if let (Some(start), Some(&end)) = (window.start(), window.days.last()) {
                if start <= self.config.peak_planning_max_start {
                    recommendations.push(format!(
                        "Plan lighter activities {}, when your symptoms tend to peak.",
                        day_range_phrase(start, end)
                    ));
                }
            }
        }

        for pattern in patterns
            .iter()
            .filter(|p| {
                p.confidence_tier == ConfidenceTier::High
                    && p.weighted_severity >= self.config.provider_min_severity
            })
            .take(self.config.max_provider_recommendations)
        {
            let timing = match pattern.modal_offset {
                Some(offset) => day_range_phrase(offset, offset),
                None => "between injections".to_string(),
            };
            recommendations.push(format!(
                "Discuss your recurring {} with your healthcare provider; it typically appears {}.",
                pattern.symptom, timing
            ));
        }

        let crowded_site = sites.iter().find_map(|site| {
            site.top()
                .filter(|top| top.count > self.config.site_rotation_threshold)
                .map(|top| (site.site, top))
        });
        if let Some((site, top)) = crowded_site {
            recommendations.push(format!(
                "Review your injection site rotation: {} has been logged {} times after injections in your {}.",
                top.symptom,
                top.count,
                site.label()
            ));
        }

        if recommendations.is_empty() {
            recommendations.push(CONTINUE_MONITORING_MESSAGE.to_string());
        }

        recommendations
    }
}

/// Counts sorted most frequent first, ties by name
fn sorted_counts(tally: HashMap<&str, usize>) -> Vec<SymptomCount> {
    let mut counts: Vec<SymptomCount> = tally
        .into_iter()
        .map(|(symptom, count)| SymptomCount {
            symptom: symptom.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.symptom.cmp(&b.symptom)));
    counts
}

fn peak_description(start: i64, end: i64) -> String {
    match (start, end) {
        (0, 0) => "Symptoms tend to peak on injection day".to_string(),
        (1, 1) => "Symptoms tend to peak 1 day after injection".to_string(),
        (s, e) if s == e => format!("Symptoms tend to peak {} days after injection", s),
        (s, e) => format!("Symptoms tend to peak {}-{} days after injection", s, e),
    }
}

/// "on injection day", "on day 2 after your injection", "on days 1-3 after your injection"
pub(crate) fn day_range_phrase(start: i64, end: i64) -> String {
    match (start, end) {
        (0, 0) => "on injection day".to_string(),
        (s, e) if s == e => format!("on day {} after your injection", s),
        (0, e) => format!("from injection day through day {}", e),
        (s, e) => format!("on days {}-{} after your injection", s, e),
    }
}
