//! Injection and Symptom Stores
//!
//! The analytics core never owns history. It reads two ordered streams per user
//! through the store traits defined here:
//!
//! - **types**: Typed records (InjectionEvent, SymptomLog) validated on creation
//! - **memory**: In-memory store used by the API server and tests
//! - **csv_import**: CSV ingestion for offline analysis
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use dosewise::store::{InjectionStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let injections = store.get_injections("user-1").await?;
//!     println!("{} injections logged", injections.len());
//!     Ok(())
//! }
//! ```

pub mod csv_import;
pub mod error;
pub mod memory;
pub mod types;

pub use csv_import::{CsvImportResult, CsvImporter};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use types::{normalize_symptom, Cadence, InjectionEvent, InjectionSite, Medication, SymptomLog};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of a user's injection history
#[async_trait]
pub trait InjectionStore: Send + Sync {
    /// All injections for the user, newest first
    async fn get_injections(&self, user_id: &str) -> StoreResult<Vec<InjectionEvent>>;
}

/// Source of a user's symptom logs
#[async_trait]
pub trait SymptomStore: Send + Sync {
    /// Symptom logs at or after `since`, newest first
    async fn get_symptom_logs(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<SymptomLog>>;
}
