//! In-memory store
//!
//! Keeps per-user injection and symptom history in memory behind a
//! `tokio::sync::RwLock`. Used by the API server and by tests; durable
//! persistence belongs to whatever system feeds the analytics.

use super::error::StoreResult;
use super::types::{InjectionEvent, SymptomLog};
use super::{InjectionStore, SymptomStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// History held for a single user
#[derive(Debug, Default, Clone)]
struct UserHistory {
    /// Newest first
    injections: Vec<InjectionEvent>,
    /// Newest first
    symptoms: Vec<SymptomLog>,
}

/// In-memory implementation of both store traits
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserHistory>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an injection, keeping the history ordered newest first
    pub async fn record_injection(&self, user_id: &str, event: InjectionEvent) -> StoreResult<()> {
        event.validate()?;

        let mut users = self.users.write().await;
        let history = users.entry(user_id.to_string()).or_default();
        let pos = history
            .injections
            .partition_point(|existing| existing.timestamp > event.timestamp);
        history.injections.insert(pos, event);

        tracing::debug!(user_id = %user_id, total = history.injections.len(), "Recorded injection");
        Ok(())
    }

    /// Record a symptom log, keeping the history ordered newest first
    pub async fn record_symptom(&self, user_id: &str, log: SymptomLog) -> StoreResult<()> {
        log.validate()?;

        let mut users = self.users.write().await;
        let history = users.entry(user_id.to_string()).or_default();
        let pos = history
            .symptoms
            .partition_point(|existing| existing.timestamp > log.timestamp);
        history.symptoms.insert(pos, log);

        tracing::debug!(user_id = %user_id, total = history.symptoms.len(), "Recorded symptom");
        Ok(())
    }

    /// Number of users with any history
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl InjectionStore for MemoryStore {
    async fn get_injections(&self, user_id: &str) -> StoreResult<Vec<InjectionEvent>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|h| h.injections.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SymptomStore for MemoryStore {
    async fn get_symptom_logs(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<SymptomLog>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|h| {
                h.symptoms
                    .iter()
                    .filter(|log| log.timestamp >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::{InjectionSite, Medication};
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_injections_kept_newest_first() {
        let store = MemoryStore::new();
        for (id, days) in [("a", 0), ("c", 14), ("b", 7)] {
            let event = InjectionEvent::new(
                id,
                base() + Duration::days(days),
                Medication::Semaglutide,
                0.5,
                InjectionSite::AbdomenLeft,
            )
            .unwrap();
            store.record_injection("u1", event).await.unwrap();
        }

        let injections = store.get_injections("u1").await.unwrap();
        let ids: Vec<&str> = injections.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_symptoms_filtered_by_since() {
        let store = MemoryStore::new();
        for days in 0..5 {
            let log = SymptomLog::new(format!("s{}", days), "nausea", 5, base() + Duration::days(days))
                .unwrap();
            store.record_symptom("u1", log).await.unwrap();
        }

        let logs = store
            .get_symptom_logs("u1", base() + Duration::days(3))
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs[0].timestamp > logs[1].timestamp);
    }

    #[tokio::test]
    async fn test_unknown_user_is_empty() {
        let store = MemoryStore::new();
        assert!(store.get_injections("nobody").await.unwrap().is_empty());
        assert!(store
            .get_symptom_logs("nobody", base())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.user_count().await, 0);
    }
}
