//! Rules and their patterns

use crate::{Fact, Value};
use serde::Serialize;

/// A condition element: a template name plus literal slot constraints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub template: String,
    pub constraints: Vec<(String, Value)>,
}

impl Pattern {
    /// Whether a fact satisfies every constraint of this pattern
    pub fn matches(&self, fact: &Fact) -> bool {
        fact.template() == self.template
            && self
                .constraints
                .iter()
                .all(|(slot, expected)| fact.get(slot) == Some(expected))
    }
}

/// Fully specified fact that a rule asserts when it fires
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactSpec {
    pub template: String,
    pub slots: Vec<(String, Value)>,
}

/// A condition -> action pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub name: String,
    pub patterns: Vec<Pattern>,
    pub actions: Vec<FactSpec>,
}

impl Rule {
    /// Every ordered fact tuple (one fact per pattern) that satisfies the rule
    pub(crate) fn matches<'a>(&self, facts: &'a [Fact]) -> Vec<Vec<&'a Fact>> {
        let mut tuples = vec![Vec::new()];

        for pattern in &self.patterns {
            let candidates: Vec<&Fact> = facts.iter().filter(|f| pattern.matches(f)).collect();
            if candidates.is_empty() {
                return Vec::new();
            }

            tuples = tuples
                .into_iter()
                .flat_map(|tuple| {
                    candidates.iter().map(move |fact| {
                        let mut next = tuple.clone();
                        next.push(*fact);
                        next
                    })
                })
                .collect();
        }

        tuples
    }
}
