//! Diagnosis Error Types

use crate::RunStage;
use rule_engine::EngineError;
use thiserror::Error;

/// Errors surfaced by a diagnosis run
///
/// A run that matches no rule is not an error; see `Outcome::NoRuleFired`.
#[derive(Debug, Clone, Error)]
pub enum DiagnosisError {
    /// The fixed knowledge base failed to build
    #[error("Knowledge base failed to build: {0}")]
    Build(#[source] EngineError),

    /// The engine rejected a fact during evaluation
    #[error("Rule engine error: {0}")]
    Evaluation(#[source] EngineError),

    /// A run step was taken before the step it depends on
    #[error("Cannot enter {next:?} from {stage:?}")]
    OutOfOrder { stage: RunStage, next: RunStage },
}
