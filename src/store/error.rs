//! Store error types
//!
//! Defines all errors that can occur while fetching or ingesting records.

use thiserror::Error;

/// Errors that can occur in the store layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record failed validation at the ingestion boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A fetch did not complete in time
    #[error("Store fetch timed out after {0} ms")]
    Timeout(u64),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
