//! Dosewise API Server
//!
//! Run with: cargo run --bin dosewise-api
//!
//! # Configuration
//!
//! Read from the first config file found (see `dosewise-cli config path`),
//! then overridden by environment variables:
//! - `DOSEWISE_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `DOSEWISE_API_PORT`: Port to listen on (default: 8090)
//! - `DOSEWISE_FETCH_TIMEOUT_MS`: Store fetch timeout (default: 2000)
//! - `DOSEWISE_LOG_LEVEL` / `DOSEWISE_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Full filter override
//!
//! Optional seed data: `DOSEWISE_SEED_INJECTIONS` and `DOSEWISE_SEED_SYMPTOMS`
//! point at CSV files imported for `DOSEWISE_SEED_USER` (default: default-user).

use anyhow::Context;
use dosewise::api::{serve, AppState};
use dosewise::config::Config;
use dosewise::store::{CsvImporter, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    dosewise::logging::init(&config.logging, &["tower_http=debug"])
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Starting Dosewise API server v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(MemoryStore::new());
    seed_from_env(&store, &config).await?;

    let state = AppState::new(
        Arc::clone(&store),
        config.analysis.clone(),
        config.store.fetch_timeout(),
        config.api.clone(),
    );

    tracing::info!(
        host = %config.api.host,
        port = config.api.port,
        fetch_timeout_ms = config.store.fetch_timeout_ms,
        "Starting server"
    );
    serve(state, &config.api).await?;

    tracing::info!(users = store.user_count().await, "Dosewise API server stopped");
    Ok(())
}

/// Import CSV seed files named by environment variables, if any
async fn seed_from_env(store: &MemoryStore, config: &Config) -> anyhow::Result<()> {
    let user = std::env::var("DOSEWISE_SEED_USER").unwrap_or_else(|_| "default-user".to_string());
    let importer = CsvImporter::new().with_timestamp_format(&config.store.csv_timestamp_format);

    if let Ok(path) = std::env::var("DOSEWISE_SEED_INJECTIONS") {
        let path = PathBuf::from(path);
        let result = importer
            .import_injections(&path)
            .with_context(|| format!("Failed to import injections from {:?}", path))?;
        log_import_errors(&result.errors);
        let imported = result.records.len();
        for event in result.records {
            store.record_injection(&user, event).await?;
        }
        tracing::info!(user_id = %user, imported, failed = result.rows_failed, "Seeded injections");
    }

    if let Ok(path) = std::env::var("DOSEWISE_SEED_SYMPTOMS") {
        let path = PathBuf::from(path);
        let result = importer
            .import_symptoms(&path)
            .with_context(|| format!("Failed to import symptoms from {:?}", path))?;
        log_import_errors(&result.errors);
        let imported = result.records.len();
        for log in result.records {
            store.record_symptom(&user, log).await?;
        }
        tracing::info!(user_id = %user, imported, failed = result.rows_failed, "Seeded symptoms");
    }

    Ok(())
}

fn log_import_errors(errors: &[String]) {
    for error in errors {
        tracing::warn!("{}", error);
    }
}
