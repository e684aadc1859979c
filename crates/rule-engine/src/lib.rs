//! Forward-Chaining Rule Engine
//!
//! Provides templates, working memory, and a match-and-fire loop driven by
//! CLIPS-style construct text (`deftemplate`, `defrule`, fact assertions).

mod construct;
mod environment;
mod fact;
mod rule;
mod syntax;
mod template;
mod value;

pub use environment::{Environment, RunReport};
pub use fact::{Fact, FactIndex};
pub use rule::{FactSpec, Pattern, Rule};
pub use template::Template;
pub use value::Value;

use thiserror::Error;

/// Errors raised while building constructs or asserting facts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed construct or fact text
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// Reference to a template that was never defined
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Slot not declared by its template
    #[error("Template {template} has no slot named {slot}")]
    UnknownSlot { template: String, slot: String },

    /// Template defined twice
    #[error("Template {0} is already defined")]
    DuplicateTemplate(String),

    /// Construct keyword this engine does not understand
    #[error("Unexpected construct: {0}")]
    UnexpectedConstruct(String),
}

impl EngineError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        EngineError::Syntax {
            offset,
            message: message.into(),
        }
    }
}
