//! JSON Diagnosis Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diagnosis::{evaluate, DiagnosisError, Outcome, SymptomReport};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::page::ERROR_HEADING;
use crate::SharedState;

/// Response for a successful diagnosis
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnoseResponse {
    pub diagnosis: String,
    pub outcome: Outcome,
    pub fired_rules: Vec<String>,
}

/// Response body when the rule engine fails
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

/// Engine failure rendered as a 500
pub struct DiagnoseFailure(DiagnosisError);

impl IntoResponse for DiagnoseFailure {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ERROR_HEADING.to_string(),
            detail: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Diagnose a JSON symptom report
pub async fn diagnose(
    State(state): State<SharedState>,
    Json(report): Json<SymptomReport>,
) -> Result<Json<DiagnoseResponse>, DiagnoseFailure> {
    let result = evaluate(report);
    state.write().await.record(&result);

    match result {
        Ok(diagnosis) => Ok(Json(DiagnoseResponse {
            diagnosis: diagnosis.text,
            outcome: diagnosis.outcome,
            fired_rules: diagnosis.fired_rules,
        })),
        Err(e) => {
            warn!("Diagnosis failed: {}", e);
            Err(DiagnoseFailure(e))
        }
    }
}
