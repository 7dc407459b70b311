//! Dosewise REST API
//!
//! HTTP API layer for Dosewise, built with Axum.
//!
//! # Endpoints
//!
//! ## Ingest
//! - `POST /api/v1/users/:user_id/injections` - Record an injection
//! - `POST /api/v1/users/:user_id/symptoms` - Record a symptom log
//! - `POST /api/v1/users/:user_id/symptoms/batch` - Record several symptom logs
//!
//! ## Analysis
//! - `GET /api/v1/users/:user_id/window` - Adaptive analysis window
//! - `GET /api/v1/users/:user_id/correlations` - Correlation insights
//! - `GET /api/v1/users/:user_id/insights` - Adaptive insights
//! - `GET /api/v1/users/:user_id/meal-context?meal_type=` - Meal warnings and tips
//! - `GET /api/v1/users/:user_id/risk` - Daily risk level
//! - `GET /api/v1/users/:user_id/report` - Full analysis report
//!
//! Analysis endpoints accept `?at=<RFC 3339>` to evaluate as of another instant.
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use dosewise::api::{serve, ApiConfig, AppState};
//! use dosewise::analytics::AnalysisConfig;
//! use dosewise::store::MemoryStore;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let state = AppState::new(
//!         Arc::new(MemoryStore::new()),
//!         AnalysisConfig::default(),
//!         Duration::from_secs(2),
//!         config.clone(),
//!     );
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    http::{HeaderValue, Uri},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        // Ingest routes
        .route("/injections", post(routes::ingest::ingest_injection))
        .route("/symptoms", post(routes::ingest::ingest_symptom))
        .route("/symptoms/batch", post(routes::ingest::ingest_symptom_batch))
        // Analysis routes
        .route("/window", get(routes::correlations::get_window))
        .route("/correlations", get(routes::correlations::get_correlations))
        .route("/insights", get(routes::insights::get_insights))
        .route("/report", get(routes::insights::get_report))
        .route("/meal-context", get(routes::meal::get_meal_context))
        .route("/risk", get(routes::meal::get_risk));

    let api_routes = Router::new().nest("/users/:user_id", user_routes);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(addr = %addr, "Dosewise API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dosewise API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalysisConfig;
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{DateTime, Duration, SecondsFormat, Utc};
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            AnalysisConfig::default(),
            std::time::Duration::from_secs(2),
            ApiConfig::default(),
        );
        build_router(state)
    }

    fn rfc3339(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(app: &Router, uri: &str, body: String) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();
        assert_eq!(get(&app, "/health/live").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app();
        assert_eq!(get(&app, "/health/ready").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app();
        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["users"], 0);
    }

    #[tokio::test]
    async fn test_ingest_injection() {
        let app = create_test_app();
        let response = post_json(
            &app,
            "/api/v1/users/u1/injections",
            r#"{"medication": "semaglutide", "dose": 0.5, "site": "abdomen-left"}"#.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["userId"], "u1");
    }

    #[tokio::test]
    async fn test_ingest_rejects_unknown_medication() {
        let app = create_test_app();
        let response = post_json(
            &app,
            "/api/v1/users/u1/injections",
            r#"{"medication": "aspirin", "dose": 1.0, "site": "arm-left"}"#.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_ingest_invalid_json() {
        let app = create_test_app();
        let response = post_json(&app, "/api/v1/users/u1/symptoms", "not json".to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ingest_rejects_severity() {
        let app = create_test_app();
        let response = post_json(
            &app,
            "/api/v1/users/u1/symptoms",
            r#"{"symptom": "nausea", "severity": 11}"#.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_symptom_batch_partial() {
        let app = create_test_app();
        let response = post_json(
            &app,
            "/api/v1/users/u1/symptoms/batch",
            r#"{"symptoms": [
                {"symptom": "nausea", "severity": 6},
                {"symptom": "", "severity": 4},
                {"symptom": "heartburn", "severity": 3, "mealRelated": true}
            ]}"#
            .to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::MULTI_STATUS);
        let json = json_body(response).await;
        assert_eq!(json["accepted"], 2);
        assert_eq!(json["rejected"], 1);
        assert_eq!(json["errors"][0]["index"], 1);
    }

    #[tokio::test]
    async fn test_new_user_analysis() {
        let app = create_test_app();

        let json = json_body(get(&app, "/api/v1/users/new-user/window").await).await;
        assert_eq!(json["days"], 60);
        assert_eq!(json["reason"], "no_history");

        let json = json_body(get(&app, "/api/v1/users/new-user/correlations").await).await;
        assert_eq!(json["confidenceScore"], 0);
        assert_eq!(json["recommendations"].as_array().unwrap().len(), 2);
        assert!(json["peakSymptomWindow"].is_null());

        let json = json_body(get(&app, "/api/v1/users/new-user/insights").await).await;
        assert_eq!(json["insights"][0]["confidence"], 0);

        let json = json_body(get(&app, "/api/v1/users/new-user/risk").await).await;
        assert_eq!(json["riskLevel"], "unknown");
    }

    #[tokio::test]
    async fn test_end_to_end_pattern() {
        let app = create_test_app();
        let now = Utc::now();

        for i in 0..5i64 {
            let body = format!(
                r#"{{"id": "inj-{}", "timestamp": "{}", "medication": "semaglutide", "dose": 1.0, "site": "thigh-left"}}"#,
                i,
                rfc3339(now - Duration::days(2 + 7 * i))
            );
            let response = post_json(&app, "/api/v1/users/u1/injections", body).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        for i in 0..4i64 {
            let body = format!(
                r#"{{"timestamp": "{}", "symptom": "Nausea", "severity": 7}}"#,
                rfc3339(now - Duration::days(1 + 7 * i))
            );
            let response = post_json(&app, "/api/v1/users/u1/symptoms", body).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let at = rfc3339(now);
        let json = json_body(get(&app, &format!("/api/v1/users/u1/correlations?at={}", at)).await).await;
        assert_eq!(json["patterns"][0]["symptom"], "nausea");
        assert_eq!(json["patterns"][0]["modalOffset"], 1);
        assert!(json["confidenceScore"].as_u64().unwrap() > 0);

        let json = json_body(get(&app, &format!("/api/v1/users/u1/insights?at={}", at)).await).await;
        assert_eq!(json["insights"][0]["symptom"], "nausea");

        let json = json_body(
            get(&app, &format!("/api/v1/users/u1/meal-context?meal_type=dinner&at={}", at)).await,
        )
        .await;
        assert_eq!(json["daysSinceInjection"], 2);
        assert_eq!(json["mealType"], "dinner");
        assert_eq!(json["isInjectionDay"], false);
    }

    #[tokio::test]
    async fn test_meal_context_rejects_meal_type() {
        let app = create_test_app();
        let response = get(&app, "/api/v1/users/u1/meal-context?meal_type=brunch").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_user_id() {
        let app = create_test_app();
        let response = get(&app, "/api/v1/users/bad%20id/window").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_test_app();
        let response = get(&app, "/api/v1/nothing-here").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }
}
