//! Symptom Diagnosis Expert System
//!
//! Builds a two-rule knowledge base on the rule engine and maps a pair of
//! yes/no symptom answers to a canned diagnosis. Educational only.

mod error;
pub mod knowledge;
mod runner;
mod symptom;

pub use error::DiagnosisError;
pub use knowledge::create_environment;
pub use runner::{diagnose, evaluate, Diagnosis, DiagnosisRun, Outcome, ResultFact, RunStage};
pub use symptom::{Answer, Symptom, SymptomFact, SymptomReport};
