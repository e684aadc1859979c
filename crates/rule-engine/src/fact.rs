//! Working-memory facts

use crate::Value;
use serde::Serialize;
use std::fmt;

/// Position of a fact in working memory, assigned at assertion time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FactIndex(pub u64);

impl fmt::Display for FactIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f-{}", self.0)
    }
}

/// A fact asserted into working memory
///
/// Slots are stored in the order their template declares them, with unset
/// slots holding `nil`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    index: FactIndex,
    template: String,
    slots: Vec<(String, Value)>,
}

impl Fact {
    pub(crate) fn new(index: FactIndex, template: String, slots: Vec<(String, Value)>) -> Self {
        Self {
            index,
            template,
            slots,
        }
    }

    pub fn index(&self) -> FactIndex {
        self.index
    }

    /// Name of the template this fact was built from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Value of a named slot
    pub fn get(&self, slot: &str) -> Option<&Value> {
        self.slots
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, value)| value)
    }

    pub fn slots(&self) -> &[(String, Value)] {
        &self.slots
    }

    /// Same template and slot values, ignoring the index
    pub(crate) fn same_content(&self, template: &str, slots: &[(String, Value)]) -> bool {
        self.template == template && self.slots == slots
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.template)?;
        for (name, value) in &self.slots {
            write!(f, " ({} {})", name, value)?;
        }
        f.write_str(")")
    }
}
