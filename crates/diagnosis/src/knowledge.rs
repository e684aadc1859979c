//! Knowledge Base
//!
//! The two fact templates and two decision rules, built into a fresh
//! environment on every request.

use crate::DiagnosisError;
use rule_engine::Environment;
use tracing::debug;

/// Name of the template holding a rule's conclusion
pub const RESULT_TEMPLATE: &str = "result";

/// Slot of the result template that carries the diagnosis text
pub const DIAGNOSIS_SLOT: &str = "diagnosis";

/// Conclusion when both symptoms are present
pub const POSSIBLE_COVID: &str = "Possible COVID-19 infection. Please test and isolate.";

/// Conclusion when neither symptom is present
pub const UNLIKELY_COVID: &str = "Unlikely COVID-19 from these symptoms.";

/// Returned when no rule matched the answers
pub const NO_RULE_FIRED: &str = "No rule fired.";

pub const COVID_POSSIBLE_RULE: &str = "covid-possible";
pub const COVID_UNLIKELY_RULE: &str = "covid-unlikely";

/// Construct text, in build order
pub const CONSTRUCTS: [&str; 4] = [
    "(deftemplate symptom (slot name) (slot value))",
    "(deftemplate result (slot diagnosis))",
    "(defrule covid-possible \
        (symptom (name fever) (value yes)) \
        (symptom (name cough) (value yes)) \
        => \
        (assert (result (diagnosis \"Possible COVID-19 infection. Please test and isolate.\"))))",
    "(defrule covid-unlikely \
        (symptom (name fever) (value no)) \
        (symptom (name cough) (value no)) \
        => \
        (assert (result (diagnosis \"Unlikely COVID-19 from these symptoms.\"))))",
];

/// Build a new environment holding the symptom knowledge base
pub fn create_environment() -> Result<Environment, DiagnosisError> {
    let mut env = Environment::new();

    for construct in CONSTRUCTS {
        env.build(construct).map_err(DiagnosisError::Build)?;
    }

    debug!(
        "Knowledge base built: {} templates, {} rules",
        env.templates().len(),
        env.rules().len()
    );
    Ok(env)
}
