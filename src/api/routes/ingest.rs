//! Ingest Routes
//!
//! Endpoints for recording injections and symptoms.
//!
//! - POST /api/v1/users/:user_id/injections - Single injection
//! - POST /api/v1/users/:user_id/symptoms - Single symptom log
//! - POST /api/v1/users/:user_id/symptoms/batch - Batch of symptom logs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::api::dto::{
    BatchError, BatchIngestResponse, BatchSymptomRequest, IngestResponse, InjectionRequest,
    SymptomRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::validate_user_id;
use crate::api::state::AppState;
use crate::store::{InjectionEvent, InjectionSite, Medication, SymptomLog};

const MAX_BATCH_SIZE: usize = 1_000;
const MAX_NOTES_LEN: usize = 2_000;

/// POST /api/v1/users/:user_id/injections
///
/// Record a single injection.
pub async fn ingest_injection(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<InjectionRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    validate_user_id(&user_id)?;

    let timestamp = validate_timestamp(req.timestamp, Utc::now())?;
    let medication: Medication = req.medication.parse()?;
    let site: InjectionSite = req.site.parse()?;
    let id = req.id.unwrap_or_else(new_id);

    let event = InjectionEvent::new(id.clone(), timestamp, medication, req.dose, site)?;
    state.store.record_injection(&user_id, event).await?;

    tracing::info!(
        user_id = %user_id,
        medication = %medication,
        dose = req.dose,
        "Recorded injection"
    );

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            status: "ok".to_string(),
            user_id,
            id,
            timestamp,
        }),
    ))
}

/// POST /api/v1/users/:user_id/symptoms
///
/// Record a single symptom log.
pub async fn ingest_symptom(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<SymptomRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    validate_user_id(&user_id)?;

    let log = build_symptom(req, Utc::now())?;
    let (id, timestamp) = (log.id.clone(), log.timestamp);
    state.store.record_symptom(&user_id, log).await?;

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            status: "ok".to_string(),
            user_id,
            id,
            timestamp,
        }),
    ))
}

/// POST /api/v1/users/:user_id/symptoms/batch
///
/// Record several symptom logs; invalid entries are reported, not fatal.
pub async fn ingest_symptom_batch(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<BatchSymptomRequest>,
) -> ApiResult<(StatusCode, Json<BatchIngestResponse>)> {
    validate_user_id(&user_id)?;

    if req.symptoms.is_empty() {
        return Err(ApiError::Validation("Empty batch".to_string()));
    }

    if req.symptoms.len() > MAX_BATCH_SIZE {
        return Err(ApiError::Validation(format!(
            "Batch size exceeds maximum of {} symptoms",
            MAX_BATCH_SIZE
        )));
    }

    let now = Utc::now();
    let mut accepted = 0;
    let mut errors = Vec::new();

    for (index, symptom_req) in req.symptoms.into_iter().enumerate() {
        let result = match build_symptom(symptom_req, now) {
            Ok(log) => state.store.record_symptom(&user_id, log).await.map_err(ApiError::from),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => accepted += 1,
            Err(e) => errors.push(BatchError {
                index,
                error: e.to_string(),
            }),
        }
    }

    tracing::info!(
        user_id = %user_id,
        accepted,
        rejected = errors.len(),
        "Processed symptom batch"
    );

    let status = if errors.is_empty() {
        StatusCode::CREATED
    } else if accepted > 0 {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::BAD_REQUEST
    };

    let status_str = if errors.is_empty() { "ok" } else { "partial" };

    Ok((
        status,
        Json(BatchIngestResponse {
            status: status_str.to_string(),
            accepted,
            rejected: errors.len(),
            errors,
        }),
    ))
}

fn build_symptom(req: SymptomRequest, now: DateTime<Utc>) -> ApiResult<SymptomLog> {
    let timestamp = validate_timestamp(req.timestamp, now)?;

    if let Some(notes) = &req.notes {
        if notes.len() > MAX_NOTES_LEN {
            return Err(ApiError::Validation(format!(
                "Notes exceed maximum length of {} characters",
                MAX_NOTES_LEN
            )));
        }
    }

    let mut log = SymptomLog::new(req.id.unwrap_or_else(new_id), &req.symptom, req.severity, timestamp)?;
    if let Some(related) = req.meal_related {
        log = log.meal_related(related);
    }
    if let Some(notes) = req.notes {
        log = log.notes(notes);
    }
    Ok(log)
}

/// Default to `now`; reject timestamps far from it
fn validate_timestamp(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ApiResult<DateTime<Utc>> {
    let Some(ts) = ts else {
        return Ok(now);
    };

    if ts < now - Duration::days(365 * 5) {
        return Err(ApiError::Validation(
            "Timestamp is more than 5 years in the past".to_string(),
        ));
    }

    if ts > now + Duration::days(1) {
        return Err(ApiError::Validation(
            "Timestamp is more than 1 day in the future".to_string(),
        ));
    }

    Ok(ts)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptom_req(symptom: &str, severity: u8) -> SymptomRequest {
        SymptomRequest {
            id: None,
            timestamp: None,
            symptom: symptom.to_string(),
            severity,
            meal_related: Some(true),
            notes: Some("after lunch".to_string()),
        }
    }

    #[test]
    fn test_build_symptom() {
        let now = Utc::now();
        let log = build_symptom(symptom_req("  Early  Fullness ", 6), now).unwrap();

        assert_eq!(log.symptom, "early fullness");
        assert_eq!(log.timestamp, now);
        assert_eq!(log.meal_related, Some(true));
        assert_eq!(log.notes, "after lunch");
        assert!(!log.id.is_empty());
    }

    #[test]
    fn test_build_symptom_rejects_severity() {
        assert!(build_symptom(symptom_req("nausea", 0), Utc::now()).is_err());
        assert!(build_symptom(symptom_req("nausea", 11), Utc::now()).is_err());
    }

    #[test]
    fn test_validate_timestamp() {
        let now = Utc::now();
        assert_eq!(validate_timestamp(None, now).unwrap(), now);
        assert!(validate_timestamp(Some(now - Duration::days(30)), now).is_ok());
        assert!(validate_timestamp(Some(now + Duration::days(2)), now).is_err());
        assert!(validate_timestamp(Some(now - Duration::days(365 * 6)), now).is_err());
    }
}
