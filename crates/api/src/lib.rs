//! Symptom Checker Web Server
//!
//! Serves the diagnosis form and a JSON API in front of the expert system.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use diagnosis::{Diagnosis, DiagnosisError};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod page;
pub mod routes;

pub use crate::config::ServerConfig;

/// Server start-up errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Failed to install logging: {0}")]
    Logging(String),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state shared across handlers
pub struct AppState {
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Diagnoses completed since start, including fallbacks
    pub diagnoses_served: u64,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    /// Create new application state
    pub fn new(metrics: Option<PrometheusHandle>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            diagnoses_served: 0,
            metrics,
        }
    }

    /// Count a finished diagnosis run
    pub fn record(&mut self, result: &Result<Diagnosis, DiagnosisError>) {
        match result {
            Ok(diagnosis) => {
                self.diagnoses_served += 1;
                metrics::counter!("diagnoses_total", "outcome" => diagnosis.outcome.as_str())
                    .increment(1);
            }
            Err(_) => metrics::counter!("diagnosis_errors_total").increment(1),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub diagnoses_served: u64,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::form::index))
        .route("/diagnose", post(routes::form::submit))
        .route("/api/v1/diagnose", post(routes::diagnose::diagnose))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        diagnoses_served: state.diagnoses_served,
    })
}

/// Prometheus scrape endpoint; 404 when metrics are disabled
async fn metrics_handler(State(state): State<SharedState>) -> Response {
    match &state.read().await.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(config: &ServerConfig) -> Result<(), ApiError> {
    let level: Level = config
        .log_level
        .parse()
        .map_err(|_| ApiError::InvalidLogLevel(config.log_level.clone()))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = if config.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    installed.map_err(|e| ApiError::Logging(e.to_string()))
}

/// Install the global Prometheus recorder if enabled
pub fn init_metrics(config: &ServerConfig) -> Result<Option<PrometheusHandle>, ApiError> {
    if !config.metrics {
        return Ok(None);
    }

    PrometheusBuilder::new()
        .install_recorder()
        .map(Some)
        .map_err(|e| ApiError::Metrics(e.to_string()))
}

/// Run the server
pub async fn run_server(config: &ServerConfig, metrics: Option<PrometheusHandle>) -> Result<(), ApiError> {
    let state = Arc::new(RwLock::new(AppState::new(metrics)));
    let app = create_router(state);
    let addr = config.bind_addr();

    info!("Starting diagnosis server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use diagnosis::knowledge::{NO_RULE_FIRED, POSSIBLE_COVID, UNLIKELY_COVID};
    use diagnosis::{DiagnosisRun, SymptomReport};
    use crate::routes::diagnose::DiagnoseResponse;
    use tower::ServiceExt;

    fn app() -> (Router, SharedState) {
        let state = Arc::new(RwLock::new(AppState::default()));
        (create_router(state.clone()), state)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post_json(app: Router, body: &str) -> Response {
        app.oneshot(
            Request::post("/api/v1/diagnose")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Do you have a fever?"));
        assert!(html.contains("Do you have a cough?"));
        assert!(html.contains("Diagnose</button>"));
    }

    #[tokio::test]
    async fn test_form_submission() {
        let (app, state) = app();
        let response = app
            .oneshot(
                Request::post("/diagnose")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("fever=yes&cough=yes"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains(POSSIBLE_COVID));
        assert!(html.contains("name=\"fever\" value=\"yes\" checked"));
        assert_eq!(state.read().await.diagnoses_served, 1);
    }

    #[tokio::test]
    async fn test_form_mixed_answers() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::post("/diagnose")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("fever=no&cough=yes"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains(NO_RULE_FIRED));
    }

    #[tokio::test]
    async fn test_json_scenarios() {
        let cases = [
            (true, true, POSSIBLE_COVID, "possible"),
            (false, false, UNLIKELY_COVID, "unlikely"),
            (true, false, NO_RULE_FIRED, "no_rule_fired"),
            (false, true, NO_RULE_FIRED, "no_rule_fired"),
        ];

        for (fever, cough, text, outcome) in cases {
            let (app, _) = app();
            let body = format!("{{\"has_fever\":{},\"has_cough\":{}}}", fever, cough);
            let response = post_json(app, &body).await;
            assert_eq!(response.status(), StatusCode::OK);

            let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
            assert_eq!(json["diagnosis"], text);
            assert_eq!(json["outcome"], outcome);
        }
    }

    #[tokio::test]
    async fn test_json_fired_rules() {
        let (app, _) = app();
        let response = post_json(app, r#"{"has_fever":false,"has_cough":false}"#).await;
        let parsed: DiagnoseResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(parsed.fired_rules, vec!["covid-unlikely".to_string()]);
    }

    #[tokio::test]
    async fn test_json_rejects_non_boolean() {
        let (app, _) = app();
        let response = post_json(app, r#"{"has_fever":"maybe","has_cough":true}"#).await;
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_health_counts_diagnoses() {
        let (app, _) = app();
        post_json(app.clone(), r#"{"has_fever":true,"has_cough":true}"#).await;
        post_json(app.clone(), r#"{"has_fever":true,"has_cough":false}"#).await;

        let response = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.diagnoses_served, 2);
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_record_counts_outcomes() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mut state = AppState::default();

        metrics::with_local_recorder(&recorder, || {
            state.record(&diagnosis::evaluate(SymptomReport::new(true, true)));
            state.record(&diagnosis::evaluate(SymptomReport::new(true, false)));
            // finishing before any facts are asserted fails
            state.record(&DiagnosisRun::start().and_then(|mut run| run.finish()));
        });

        let rendered = handle.render();
        assert!(rendered.contains("diagnoses_total{outcome=\"possible\"} 1"));
        assert!(rendered.contains("diagnoses_total{outcome=\"no_rule_fired\"} 1"));
        assert!(rendered.contains("diagnosis_errors_total 1"));
        assert_eq!(state.diagnoses_served, 2);
    }

    #[tokio::test]
    async fn test_metrics_enabled() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mut state = AppState::new(Some(handle));
        metrics::with_local_recorder(&recorder, || {
            state.record(&diagnosis::evaluate(SymptomReport::new(false, false)));
        });

        let app = create_router(Arc::new(RwLock::new(state)));
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_string(response).await;
        assert!(text.contains("diagnoses_total{outcome=\"unlikely\"} 1"));
    }

    #[test]
    fn test_invalid_log_level() {
        let config = ServerConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(init_logging(&config), Err(ApiError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_metrics_can_be_disabled() {
        let config = ServerConfig {
            metrics: false,
            ..Default::default()
        };
        assert!(init_metrics(&config).unwrap().is_none());
    }
}
