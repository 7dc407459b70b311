//! Adaptive Window Selector
//!
//! Decides how many days of symptom history are worth analysing. A fresh dose
//! change narrows the window onto the new regimen; a new user gets a wider
//! window so there is enough to find patterns in.

use crate::store::{Cadence, InjectionEvent};
use serde::{Deserialize, Serialize};

/// Window lengths (days) for each regimen situation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Used when there is no injection history at all
    pub default_days: u32,
    /// How many recent injections are compared for dose changes
    pub dose_change_lookback: usize,
    /// Fewer injections than this counts as a new user
    pub established_min_injections: usize,
    pub daily_dose_change_days: u32,
    pub daily_new_user_days: u32,
    pub daily_stable_days: u32,
    pub weekly_dose_change_days: u32,
    pub weekly_new_user_days: u32,
    pub weekly_stable_days: u32,
    pub min_days: u32,
    pub max_days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_days: 60,
            dose_change_lookback: 4,
            established_min_injections: 4,
            daily_dose_change_days: 21,
            daily_new_user_days: 45,
            daily_stable_days: 35,
            weekly_dose_change_days: 35,
            weekly_new_user_days: 75,
            weekly_stable_days: 60,
            min_days: 14,
            max_days: 75,
        }
    }
}

/// Why a window length was chosen
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowReason {
    NoHistory,
    DoseChange,
    NewUser,
    Established,
}

/// Outcome of window selection
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowDecision {
    pub days: u32,
    pub cadence: Option<Cadence>,
    pub dose_changed: bool,
    pub reason: WindowReason,
}

/// Chooses the analysis window from injection history
#[derive(Debug, Clone, Default)]
pub struct AdaptiveWindowSelector {
    config: WindowConfig,
}

impl AdaptiveWindowSelector {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// Window length in days for the given history (newest first)
    pub fn window_days(&self, injections: &[InjectionEvent]) -> u32 {
        self.decide(injections).days
    }

    /// Full window decision for the given history (newest first)
    pub fn decide(&self, injections: &[InjectionEvent]) -> WindowDecision {
        let Some(latest) = injections.first() else {
            return WindowDecision {
                days: self.clamp(self.config.default_days),
                cadence: None,
                dose_changed: false,
                reason: WindowReason::NoHistory,
            };
        };

        let cadence = latest.medication.cadence();
        let dose_changed = self.detect_dose_change(injections);

        let (daily, weekly, reason) = if dose_changed {
            (
                self.config.daily_dose_change_days,
                self.config.weekly_dose_change_days,
                WindowReason::DoseChange,
            )
        } else if injections.len() < self.config.established_min_injections {
            (
                self.config.daily_new_user_days,
                self.config.weekly_new_user_days,
                WindowReason::NewUser,
            )
        } else {
            (
                self.config.daily_stable_days,
                self.config.weekly_stable_days,
                WindowReason::Established,
            )
        };

        let days = match cadence {
            Cadence::Daily => daily,
            Cadence::Weekly => weekly,
        };

        tracing::debug!(
            days,
            ?cadence,
            dose_changed,
            injections = injections.len(),
            "Selected analysis window"
        );

        WindowDecision {
            days: self.clamp(days),
            cadence: Some(cadence),
            dose_changed,
            reason,
        }
    }

    /// True if any of the most recent injections used a different dose than the latest
    pub fn detect_dose_change(&self, injections: &[InjectionEvent]) -> bool {
        let Some(latest) = injections.first() else {
            return false;
        };

        injections
            .iter()
            .take(self.config.dose_change_lookback)
            .any(|event| event.dose != latest.dose)
    }

    fn clamp(&self, days: u32) -> u32 {
        let (min, max) = (self.config.min_days, self.config.max_days);
        days.clamp(min.min(max), min.max(max))
    }
}
