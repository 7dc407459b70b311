//! # Dosewise
//!
//! Injection-symptom analytics for GLP-1 style medication regimens. Correlates
//! logged injections with reported symptoms and produces time-decayed,
//! confidence-scored insights, correlation summaries and meal-time advice.
//!
//! ## Features
//!
//! - **Adaptive windowing**: Analysis window follows cadence and dose changes
//! - **Weighted evidence**: Recency decay, regimen relevance and severity bonus
//! - **Pattern detection**: Confidence-scored timing patterns per symptom
//! - **Correlations**: Injection site, dose and peak symptom window
//! - **Meal advice**: Warnings, tips and a daily risk level
//!
//! ## Modules
//!
//! - [`store`]: Typed records, store traits, in-memory store and CSV import
//! - [`analytics`]: The analysis pipeline and its async service
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Subscriber setup shared by the binaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dosewise::analytics::{AnalysisConfig, AnalyticsService};
//! use dosewise::store::{InjectionEvent, InjectionSite, Medication, MemoryStore, SymptomLog};
//! use chrono::{Duration, Utc};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let now = Utc::now();
//!
//!     store
//!         .record_injection(
//!             "me",
//!             InjectionEvent::new("i1", now - Duration::days(1), Medication::Semaglutide, 0.5, InjectionSite::AbdomenLeft)?,
//!         )
//!         .await?;
//!     store
//!         .record_symptom("me", SymptomLog::new("s1", "nausea", 5, now)?)
//!         .await?;
//!
//!     let service = AnalyticsService::new(store.clone(), store, AnalysisConfig::default());
//!     let report = service.report("me", now).await;
//!
//!     println!("Confidence: {}", report.correlations.confidence_score);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod logging;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Cadence, CsvImportResult, CsvImporter, InjectionEvent, InjectionSite, InjectionStore,
    Medication, MemoryStore, StoreError, StoreResult, SymptomLog, SymptomStore,
};

pub use analytics::{
    AdaptiveInsight, AnalysisConfig, AnalysisError, AnalysisReport, AnalyticsService, Analyzer,
    CorrelationInsights, MealContext, MealType, Pattern, RiskLevel, Snapshot,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, StoreConfig};
