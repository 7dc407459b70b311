//! API Routes
//!
//! Route handlers organized by functionality.

pub mod correlations;
pub mod health;
pub mod ingest;
pub mod insights;
pub mod meal;

use crate::api::error::{ApiError, ApiResult};

const MAX_USER_ID_LEN: usize = 128;

/// Reject empty, oversized or oddly-charactered user ids
pub(crate) fn validate_user_id(user_id: &str) -> ApiResult<()> {
    if user_id.is_empty() {
        return Err(ApiError::Validation("User id cannot be empty".to_string()));
    }

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(ApiError::Validation(format!(
            "User id exceeds maximum length of {} characters",
            MAX_USER_ID_LEN
        )));
    }

    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ApiError::Validation(
            "User id may only contain letters, digits, '-', '_' and '.'".to_string(),
        ));
    }

    Ok(())
}
