//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::analytics::{AnalysisConfig, AnalyticsService};
use crate::store::MemoryStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use crate::config::ApiConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Ingestion target and analytics source
    pub store: Arc<MemoryStore>,
    /// Analytics over the store
    pub analytics: Arc<AnalyticsService>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state whose analytics read from `store`
    pub fn new(
        store: Arc<MemoryStore>,
        analysis: AnalysisConfig,
        fetch_timeout: Duration,
        config: ApiConfig,
    ) -> Self {
        let analytics = AnalyticsService::new(store.clone(), store.clone(), analysis)
            .with_fetch_timeout(fetch_timeout);

        Self {
            store,
            analytics: Arc::new(analytics),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
