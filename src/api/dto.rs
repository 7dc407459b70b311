//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::analytics::{
    AdaptiveInsight, CorrelationInsights, MealContext, MealType, RiskLevel, WindowDecision,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// INGEST DTOs
// ============================================

/// Injection ingest request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionRequest {
    /// Client-supplied id; generated when absent
    #[serde(default)]
    pub id: Option<String>,
    /// Defaults to now
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Medication code, e.g. "semaglutide"
    pub medication: String,
    /// Dose in milligrams
    pub dose: f64,
    /// Site code, e.g. "abdomen-left"
    pub site: String,
}

/// Symptom ingest request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub symptom: String,
    /// 1-10
    pub severity: u8,
    #[serde(default)]
    pub meal_related: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Batch symptom ingest request
#[derive(Debug, Deserialize)]
pub struct BatchSymptomRequest {
    pub symptoms: Vec<SymptomRequest>,
}

/// Single record ingest response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    /// Status: "ok"
    pub status: String,
    pub user_id: String,
    /// Id of the stored record
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// Batch ingest response
#[derive(Debug, Serialize)]
pub struct BatchIngestResponse {
    /// Status: "ok" or "partial"
    pub status: String,
    /// Number of records accepted
    pub accepted: usize,
    /// Number of records rejected
    pub rejected: usize,
    /// Errors for rejected records
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BatchError>,
}

/// Error for a single record in batch ingest
#[derive(Debug, Serialize)]
pub struct BatchError {
    /// Index of the failed record
    pub index: usize,
    /// Error message
    pub error: String,
}

// ============================================
// ANALYSIS DTOs
// ============================================

/// Query parameters shared by analysis endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    /// Evaluate as of this instant instead of now
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

/// Query parameters for the meal context endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MealContextQuery {
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub decision: WindowDecision,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationsResponse {
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub correlations: CorrelationInsights,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub insights: Vec<AdaptiveInsight>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealContextResponse {
    pub user_id: String,
    pub meal_type: Option<MealType>,
    #[serde(flatten)]
    pub context: MealContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResponse {
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub risk_level: RiskLevel,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", "unhealthy"
    pub status: String,
    /// Store status
    pub store: String,
    /// Users with any history
    pub users: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
