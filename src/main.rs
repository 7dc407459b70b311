//! Dosewise demo
//!
//! Seeds an in-memory store with a few weeks of weekly injections and symptom
//! logs, then runs the analytics and logs what it found.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use dosewise::analytics::{AnalyticsService, MealType};
use dosewise::config::Config;
use dosewise::store::{InjectionEvent, InjectionSite, Medication, MemoryStore, StoreResult, SymptomLog};
use std::sync::Arc;

const DEMO_USER: &str = "demo-user";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    dosewise::logging::init(&config.logging, &[])
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Dosewise analytics demo v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    seed_demo_history(&store, now)
        .await
        .context("Failed to seed demo history")?;

    let service = AnalyticsService::new(store.clone(), store, config.analysis.clone())
        .with_fetch_timeout(config.store.fetch_timeout());

    let report = service.report(DEMO_USER, now).await;

    tracing::info!(
        window_days = report.window.days,
        reason = ?report.window.reason,
        injections = report.total_injections,
        injections_in_window = report.injections_in_window,
        symptoms = report.symptoms_in_window,
        "Analysis window"
    );

    for pattern in &report.correlations.patterns {
        tracing::info!(
            symptom = %pattern.symptom,
            confidence = pattern.confidence,
            tier = ?pattern.confidence_tier,
            "{}",
            pattern.description
        );
    }

    if let Some(peak) = &report.correlations.peak_symptom_window {
        tracing::info!(days = ?peak.days, "{}", peak.description);
    }

    for recommendation in &report.correlations.recommendations {
        tracing::info!("Recommendation: {}", recommendation);
    }

    for insight in &report.insights {
        tracing::info!(
            confidence = insight.confidence,
            actionability = ?insight.actionability,
            valid_until = %insight.valid_until,
            "Insight: {}",
            insight.pattern
        );
    }

    let meal = service.meal_context(DEMO_USER, Some(MealType::Dinner), now).await;
    tracing::info!(
        days_since_injection = ?meal.days_since_injection,
        risk = %meal.risk_level,
        warnings = meal.warnings.len(),
        "Meal context"
    );
    for warning in &meal.warnings {
        tracing::info!(severity = ?warning.severity, "Warning: {}", warning.message);
    }
    for tip in &meal.tips {
        tracing::info!("Tip: {}", tip);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Six weekly injections with a dose step-up three weeks ago, nausea the day
/// after most of them and a little fatigue
async fn seed_demo_history(store: &MemoryStore, now: DateTime<Utc>) -> StoreResult<()> {
    let sites = InjectionSite::all();

    for week in 0..6i64 {
        let dose = if week < 4 { 0.5 } else { 0.25 };
        let injected_at = now - Duration::days(1 + 7 * week);

        store
            .record_injection(
                DEMO_USER,
                InjectionEvent::new(
                    format!("inj-{}", week),
                    injected_at,
                    Medication::Semaglutide,
                    dose,
                    sites[week as usize % sites.len()],
                )?,
            )
            .await?;

        if week != 3 {
            store
                .record_symptom(
                    DEMO_USER,
                    SymptomLog::new(
                        format!("nausea-{}", week),
                        "nausea",
                        6 + (week % 3) as u8,
                        injected_at + Duration::hours(20),
                    )?
                    .meal_related(true),
                )
                .await?;
        }

        if week % 2 == 0 {
            store
                .record_symptom(
                    DEMO_USER,
                    SymptomLog::new(
                        format!("fatigue-{}", week),
                        "fatigue",
                        4,
                        injected_at + Duration::days(2),
                    )?
                    .notes("afternoon slump"),
                )
                .await?;
        }
    }

    store
        .record_symptom(
            DEMO_USER,
            SymptomLog::new("headache-0", "headache", 3, now - Duration::days(10))?,
        )
        .await?;

    tracing::info!(users = store.user_count().await, "Seeded demo history");
    Ok(())
}
