//! Symptom Weight Calculator
//!
//! Scores each symptom log in [0, 1] from three factors:
//!
//! ```text
//! weight = min(1, recency × context × severity)
//!
//! recency  = exp(-age_days / decay_days)
//! context  = medication_match × max(floor, 1 - |dose_diff| / current_dose)
//!            (or a flat factor when no injection precedes the symptom)
//! severity = bonus for severe reports, penalty for mild ones
//! ```
//!
//! Logs under the noise floor are dropped before pattern analysis.

use crate::store::{InjectionEvent, InjectionSite, Medication, SymptomLog};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Weighting constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightingConfig {
    /// Exponential decay constant for recency, in days
    pub recency_decay_days: f64,
    /// Maximum gap between an injection and a symptom it can explain
    pub relevance_lookback_days: i64,
    /// Context factor when the injection used another medication
    pub medication_mismatch_factor: f64,
    /// Lower bound of the dose-similarity factor
    pub min_dose_similarity: f64,
    /// Context factor when no injection explains the symptom
    pub no_injection_factor: f64,
    pub severe_threshold: u8,
    pub moderate_threshold: u8,
    pub severe_bonus: f64,
    pub moderate_bonus: f64,
    pub mild_bonus: f64,
    /// Logs weighted below this are treated as noise
    pub noise_floor: f64,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            recency_decay_days: 21.0,
            relevance_lookback_days: 7,
            medication_mismatch_factor: 0.3,
            min_dose_similarity: 0.2,
            no_injection_factor: 0.5,
            severe_threshold: 7,
            moderate_threshold: 5,
            severe_bonus: 1.2,
            moderate_bonus: 1.0,
            mild_bonus: 0.8,
            noise_floor: 0.1,
        }
    }
}

/// The user's current medication and dose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regimen {
    pub medication: Medication,
    pub dose: f64,
}

impl Regimen {
    /// Regimen of the most recent injection (history is newest first)
    pub fn current(injections: &[InjectionEvent]) -> Option<Self> {
        injections.first().map(|latest| Self {
            medication: latest.medication,
            dose: latest.dose,
        })
    }
}

/// The injection a symptom is attributed to
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InjectionContext {
    pub injection_id: String,
    pub medication: Medication,
    pub dose: f64,
    pub site: InjectionSite,
    /// Whole days between the injection and the symptom
    pub day_offset: i64,
}

/// A symptom log with its analysis weight
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightedSymptomLog {
    pub log: SymptomLog,
    /// Combined weight in [0, 1]
    pub weight: f64,
    /// Comparability of the symptom's injection context to the current regimen, in [0, 1]
    pub contextual_relevance: f64,
    pub recency_weight: f64,
    pub injection: Option<InjectionContext>,
}

impl WeightedSymptomLog {
    pub fn symptom(&self) -> &str {
        &self.log.symptom
    }

    pub fn severity(&self) -> u8 {
        self.log.severity
    }

    pub fn day_offset(&self) -> Option<i64> {
        self.injection.as_ref().map(|ctx| ctx.day_offset)
    }
}

/// The most recent injection at or before `at`, if it is within `lookback_days`
///
/// `injections` must be newest first. Ties in distance are never resolved by
/// looking forward: a later injection cannot explain an earlier symptom.
pub fn relevant_injection(
    injections: &[InjectionEvent],
    at: DateTime<Utc>,
    lookback_days: i64,
) -> Option<&InjectionEvent> {
    injections
        .iter()
        .find(|event| event.timestamp <= at)
        .filter(|event| match Duration::try_days(lookback_days) {
            Some(lookback) => at - event.timestamp <= lookback,
            None => true,
        })
}

/// Assigns analysis weights to symptom logs
#[derive(Debug, Clone, Default)]
pub struct SymptomWeightCalculator {
    config: WeightingConfig,
}

impl SymptomWeightCalculator {
    pub fn new(config: WeightingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WeightingConfig {
        &self.config
    }

    /// Weigh every log and drop those under the noise floor
    pub fn weigh(
        &self,
        symptoms: &[SymptomLog],
        injections: &[InjectionEvent],
        regimen: Option<&Regimen>,
        now: DateTime<Utc>,
    ) -> Vec<WeightedSymptomLog> {
        let weighted: Vec<WeightedSymptomLog> = symptoms
            .iter()
            .map(|log| self.weigh_one(log, injections, regimen, now))
            .filter(|w| w.weight >= self.config.noise_floor)
            .collect();

        tracing::debug!(
            total = symptoms.len(),
            kept = weighted.len(),
            "Weighted symptom logs"
        );

        weighted
    }

    /// Weigh a single log without filtering
    pub fn weigh_one(
        &self,
        log: &SymptomLog,
        injections: &[InjectionEvent],
        regimen: Option<&Regimen>,
        now: DateTime<Utc>,
    ) -> WeightedSymptomLog {
        let age_days = ((now - log.timestamp).num_milliseconds() as f64 / MS_PER_DAY).max(0.0);
        let recency_weight = self.recency_weight(age_days);

        let relevant = relevant_injection(injections, log.timestamp, self.config.relevance_lookback_days);

        let contextual = match (relevant, regimen) {
            (Some(event), Some(current)) => self.context_factor(event, current),
            // An attributed injection with no known regimen compares to itself
            (Some(_), None) => 1.0,
            (None, _) => self.config.no_injection_factor,
        };

        let weight = (recency_weight * contextual * self.severity_bonus(log.severity)).clamp(0.0, 1.0);

        WeightedSymptomLog {
            log: log.clone(),
            weight,
            contextual_relevance: contextual.clamp(0.0, 1.0),
            recency_weight,
            injection: relevant.map(|event| InjectionContext {
                injection_id: event.id.clone(),
                medication: event.medication,
                dose: event.dose,
                site: event.site,
                day_offset: (log.timestamp - event.timestamp).num_days(),
            }),
        }
    }

    pub fn recency_weight(&self, age_days: f64) -> f64 {
        if self.config.recency_decay_days <= 0.0 {
            return 1.0;
        }
        (-age_days.max(0.0) / self.config.recency_decay_days).exp()
    }

    pub fn severity_bonus(&self, severity: u8) -> f64 {
        if severity >= self.config.severe_threshold {
            self.config.severe_bonus
        } else if severity >= self.config.moderate_threshold {
            self.config.moderate_bonus
        } else {
            self.config.mild_bonus
        }
    }

    fn context_factor(&self, event: &InjectionEvent, current: &Regimen) -> f64 {
        let medication_factor = if event.medication == current.medication {
            1.0
        } else {
            self.config.medication_mismatch_factor
        };

        let dose_similarity = if current.dose > 0.0 {
            (1.0 - (event.dose - current.dose).abs() / current.dose).max(self.config.min_dose_similarity)
        } else {
            self.config.min_dose_similarity
        };

        medication_factor * dose_similarity
    }
}
