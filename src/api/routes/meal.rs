//! Meal Routes
//!
//! - GET /api/v1/users/:user_id/meal-context?meal_type= - Warnings and tips for a meal today
//! - GET /api/v1/users/:user_id/risk - Daily symptom risk level

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::analytics::MealType;
use crate::api::dto::{AnalysisQuery, MealContextQuery, MealContextResponse, RiskResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::validate_user_id;
use crate::api::state::AppState;

/// GET /api/v1/users/:user_id/meal-context
pub async fn get_meal_context(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<MealContextQuery>,
) -> ApiResult<Json<MealContextResponse>> {
    validate_user_id(&user_id)?;

    let meal_type = params
        .meal_type
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<MealType>())
        .transpose()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let now = params.at.unwrap_or_else(Utc::now);
    let context = state.analytics.meal_context(&user_id, meal_type, now).await;

    Ok(Json(MealContextResponse {
        user_id,
        meal_type,
        context,
    }))
}

/// GET /api/v1/users/:user_id/risk
pub async fn get_risk(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<AnalysisQuery>,
) -> ApiResult<Json<RiskResponse>> {
    validate_user_id(&user_id)?;

    let now = params.at.unwrap_or_else(Utc::now);
    let risk_level = state.analytics.daily_risk_level(&user_id, now).await;

    Ok(Json(RiskResponse {
        user_id,
        generated_at: now,
        risk_level,
    }))
}
