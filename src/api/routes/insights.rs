//! Insight Routes
//!
//! - GET /api/v1/users/:user_id/insights - Ranked adaptive insights
//! - GET /api/v1/users/:user_id/report - Full analysis report

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::analytics::AnalysisReport;
use crate::api::dto::{AnalysisQuery, InsightsResponse};
use crate::api::error::ApiResult;
use crate::api::routes::validate_user_id;
use crate::api::state::AppState;

/// GET /api/v1/users/:user_id/insights
///
/// Always returns at least one insight; a placeholder stands in until there
/// is enough history.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<AnalysisQuery>,
) -> ApiResult<Json<InsightsResponse>> {
    validate_user_id(&user_id)?;

    let now = params.at.unwrap_or_else(Utc::now);
    let insights = state.analytics.adaptive_insights(&user_id, now).await;

    Ok(Json(InsightsResponse {
        user_id,
        generated_at: now,
        insights,
    }))
}

/// GET /api/v1/users/:user_id/report
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<AnalysisQuery>,
) -> ApiResult<Json<AnalysisReport>> {
    validate_user_id(&user_id)?;

    let now = params.at.unwrap_or_else(Utc::now);
    Ok(Json(state.analytics.report(&user_id, now).await))
}
