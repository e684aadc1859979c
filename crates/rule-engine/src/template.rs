//! Fact templates

use serde::Serialize;

/// Named shape of a fact: the template name and its ordered slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    name: String,
    slots: Vec<String>,
}

impl Template {
    /// Create a template from its name and slot names
    pub fn new(name: impl Into<String>, slots: Vec<String>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot names in declaration order
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.slots.iter().any(|s| s == slot)
    }
}
