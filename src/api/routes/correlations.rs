//! Correlation Routes
//!
//! Endpoints for injection-symptom correlations and the analysis window.
//!
//! - GET /api/v1/users/:user_id/correlations - Patterns, site/dose correlations, recommendations
//! - GET /api/v1/users/:user_id/window - Adaptive analysis window

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{AnalysisQuery, CorrelationsResponse, WindowResponse};
use crate::api::error::ApiResult;
use crate::api::routes::validate_user_id;
use crate::api::state::AppState;

/// GET /api/v1/users/:user_id/correlations
///
/// Correlation insights over the user's adaptive window. Users with too little
/// history get the insufficient-data result, not an error.
pub async fn get_correlations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<AnalysisQuery>,
) -> ApiResult<Json<CorrelationsResponse>> {
    validate_user_id(&user_id)?;

    let now = params.at.unwrap_or_else(Utc::now);
    let correlations = state.analytics.correlation_insights(&user_id, now).await;

    Ok(Json(CorrelationsResponse {
        user_id,
        generated_at: now,
        correlations,
    }))
}

/// GET /api/v1/users/:user_id/window
pub async fn get_window(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<WindowResponse>> {
    validate_user_id(&user_id)?;

    let decision = state.analytics.window(&user_id).await;

    Ok(Json(WindowResponse { user_id, decision }))
}
