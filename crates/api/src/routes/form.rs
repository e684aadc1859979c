//! HTML Form Routes

use axum::{extract::State, response::Html, Form};
use diagnosis::{evaluate, SymptomReport};
use serde::Deserialize;
use tracing::warn;

use crate::page::{self, Notice};
use crate::SharedState;

/// Submitted radio values; anything other than "yes" counts as no
#[derive(Debug, Default, Deserialize)]
pub struct DiagnoseForm {
    pub fever: Option<String>,
    pub cough: Option<String>,
}

impl DiagnoseForm {
    pub fn report(&self) -> SymptomReport {
        SymptomReport::new(is_yes(&self.fever), is_yes(&self.cough))
    }
}

fn is_yes(answer: &Option<String>) -> bool {
    answer
        .as_deref()
        .is_some_and(|a| a.trim().eq_ignore_ascii_case("yes"))
}

/// Blank form
pub async fn index() -> Html<String> {
    Html(page::render(false, false, None))
}

/// Run a diagnosis and re-render the form with the result
pub async fn submit(State(state): State<SharedState>, Form(form): Form<DiagnoseForm>) -> Html<String> {
    let report = form.report();
    let result = evaluate(report);
    state.write().await.record(&result);

    let notice = match result {
        Ok(diagnosis) => Notice::Success(diagnosis.text),
        Err(e) => {
            warn!("Diagnosis failed: {}", e);
            Notice::Failure(e.to_string())
        }
    };

    Html(page::render(report.has_fever, report.has_cough, Some(&notice)))
}
