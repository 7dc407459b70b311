//! Analytics Service
//!
//! Fetches a user's history from the stores and runs the analysis pipeline.
//! Both streams are read concurrently, each under a timeout. A failed or slow
//! fetch never surfaces to the caller: it is logged and the analysis runs on
//! an empty snapshot, which yields the insufficient-data output.

use super::error::{AnalysisError, AnalysisResult};
use super::insights::AdaptiveInsight;
use super::meal::{MealContext, MealType, RiskLevel};
use super::pipeline::{AnalysisReport, Analyzer, Snapshot};
use super::window::WindowDecision;
use super::{AnalysisConfig, CorrelationInsights};
use crate::store::{InjectionStore, StoreError, StoreResult, SymptomStore};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2_000;

/// Store-backed entry point to the analytics core
pub struct AnalyticsService {
    injections: Arc<dyn InjectionStore>,
    symptoms: Arc<dyn SymptomStore>,
    analyzer: Analyzer,
    config: AnalysisConfig,
    fetch_timeout: Duration,
}

impl AnalyticsService {
    pub fn new(
        injections: Arc<dyn InjectionStore>,
        symptoms: Arc<dyn SymptomStore>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            injections,
            symptoms,
            analyzer: Analyzer::new(&config),
            config,
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    /// Builder: per-stream fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Fetch both streams concurrently
    ///
    /// Symptoms are read over the widest possible window so the two reads are
    /// independent; the adaptive window is applied afterwards.
    pub async fn snapshot(&self, user_id: &str, now: DateTime<Utc>) -> AnalysisResult<Snapshot> {
        let since = now
            .checked_sub_signed(chrono::Duration::days(self.config.window.max_days as i64))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let (injections, symptoms) = tokio::join!(
            self.with_timeout(self.injections.get_injections(user_id)),
            self.with_timeout(self.symptoms.get_symptom_logs(user_id, since)),
        );

        Ok(Snapshot::new(injections?, symptoms?))
    }

    /// Full analysis report; degrades to the insufficient-data report on fetch failure
    pub async fn report(&self, user_id: &str, now: DateTime<Utc>) -> AnalysisReport {
        let snapshot = match self.snapshot(user_id, now).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Analysing empty snapshot");
                Snapshot::default()
            }
        };

        let report = self.analyzer.analyze(&snapshot, now);

        tracing::info!(
            user_id = %user_id,
            window_days = report.window.days,
            patterns = report.correlations.patterns.len(),
            confidence = report.correlations.confidence_score,
            "Generated analysis report"
        );

        report
    }

    pub async fn adaptive_insights(&self, user_id: &str, now: DateTime<Utc>) -> Vec<AdaptiveInsight> {
        self.report(user_id, now).await.insights
    }

    pub async fn correlation_insights(&self, user_id: &str, now: DateTime<Utc>) -> CorrelationInsights {
        self.report(user_id, now).await.correlations
    }

    pub async fn meal_context(
        &self,
        user_id: &str,
        meal_type: Option<MealType>,
        now: DateTime<Utc>,
    ) -> MealContext {
        let report = self.report(user_id, now).await;
        self.analyzer.meal_context(&report, meal_type)
    }

    pub async fn daily_risk_level(&self, user_id: &str, now: DateTime<Utc>) -> RiskLevel {
        self.report(user_id, now).await.risk_level
    }

    /// Window decision from injection history alone
    pub async fn window(&self, user_id: &str) -> WindowDecision {
        let injections = match self.with_timeout(self.injections.get_injections(user_id)).await {
            Ok(injections) => injections,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Using default window");
                Vec::new()
            }
        };
        self.analyzer.selector().decide(&injections)
    }

    pub async fn window_days(&self, user_id: &str) -> u32 {
        self.window(user_id).await.days
    }

    async fn with_timeout<T>(&self, fetch: impl Future<Output = StoreResult<T>>) -> AnalysisResult<T> {
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(records)) => Ok(records),
            Ok(Err(e)) => Err(AnalysisError::from(e)),
            Err(_) => Err(AnalysisError::from(StoreError::Timeout(
                self.fetch_timeout.as_millis() as u64,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::correlations::KEEP_LOGGING_MESSAGE;
    use crate::store::{InjectionEvent, InjectionSite, Medication, MemoryStore, SymptomLog};
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    struct FailingStore;

    #[async_trait]
    impl InjectionStore for FailingStore {
        async fn get_injections(&self, _user_id: &str) -> StoreResult<Vec<InjectionEvent>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    struct SlowStore;

    #[async_trait]
    impl SymptomStore for SlowStore {
        async fn get_symptom_logs(
            &self,
            _user_id: &str,
            _since: DateTime<Utc>,
        ) -> StoreResult<Vec<SymptomLog>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for i in 0..5i64 {
            store
                .record_injection(
                    "u1",
                    InjectionEvent::new(
                        format!("inj-{}", i),
                        now() - chrono::Duration::days(2 + 7 * i),
                        Medication::Semaglutide,
                        1.0,
                        InjectionSite::ThighLeft,
                    )
                    .unwrap(),
                )
                .await
                .unwrap();
        }
        for i in 0..4i64 {
            store
                .record_symptom(
                    "u1",
                    SymptomLog::new(
                        format!("sym-{}", i),
                        "nausea",
                        7,
                        now() - chrono::Duration::days(1 + 7 * i),
                    )
                    .unwrap(),
                )
                .await
                .unwrap();
        }
        store
    }

    fn service(store: Arc<MemoryStore>) -> AnalyticsService {
        AnalyticsService::new(store.clone(), store, AnalysisConfig::default())
    }

    #[tokio::test]
    async fn test_report_from_memory_store() {
        let svc = service(seeded_store().await);
        let report = svc.report("u1", now()).await;

        assert_eq!(report.days_since_injection, Some(2));
        let top = report.correlations.top_pattern().unwrap();
        assert_eq!(top.symptom, "nausea");
        assert!(top.confidence > 70);
    }

    #[tokio::test]
    async fn test_unknown_user_is_insufficient() {
        let svc = service(seeded_store().await);

        let correlations = svc.correlation_insights("nobody", now()).await;
        assert_eq!(correlations.confidence_score, 0);
        assert_eq!(correlations.recommendations[0], KEEP_LOGGING_MESSAGE);

        assert_eq!(svc.window_days("nobody").await, 60);
        assert_eq!(svc.daily_risk_level("nobody", now()).await, RiskLevel::Unknown);
    }

    #[tokio::test]
    async fn test_store_failure_degrades() {
        let store = seeded_store().await;
        let svc = AnalyticsService::new(Arc::new(FailingStore), store, AnalysisConfig::default());

        assert!(svc.snapshot("u1", now()).await.is_err());

        let insights = svc.adaptive_insights("u1", now()).await;
        assert_eq!(insights.len(), 1);
        assert!(insights[0].is_placeholder());
        assert_eq!(svc.window_days("u1").await, 60);
    }

    #[tokio::test]
    async fn test_fetch_timeout_degrades() {
        let store = seeded_store().await;
        let svc = AnalyticsService::new(store, Arc::new(SlowStore), AnalysisConfig::default())
            .with_fetch_timeout(Duration::from_millis(50));

        match svc.snapshot("u1", now()).await {
            Err(AnalysisError::DataUnavailable(msg)) => assert!(msg.contains("50 ms")),
            other => panic!("expected timeout, got {:?}", other.map(|s| s.injections.len())),
        }

        let correlations = svc.correlation_insights("u1", now()).await;
        assert_eq!(correlations.confidence_score, 0);
    }

    #[tokio::test]
    async fn test_meal_context() {
        let svc = service(seeded_store().await);
        let ctx = svc.meal_context("u1", Some(MealType::Lunch), now()).await;

        assert_eq!(ctx.days_since_injection, Some(2));
        assert!(!ctx.is_injection_day);
        assert!(ctx.confidence > 0);
    }
}
