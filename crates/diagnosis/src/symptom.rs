//! Symptom facts

use serde::{Deserialize, Serialize};
use std::fmt;

/// The symptoms the knowledge base knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symptom {
    Fever,
    Cough,
}

impl Symptom {
    /// Symbol used in fact text
    pub fn as_str(&self) -> &'static str {
        match self {
            Symptom::Fever => "fever",
            Symptom::Cough => "cough",
        }
    }
}

/// Answer to a yes/no symptom question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
        }
    }
}

impl From<bool> for Answer {
    fn from(present: bool) -> Self {
        if present {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

/// One `symptom` fact as asserted into working memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymptomFact {
    pub name: Symptom,
    pub value: Answer,
}

impl SymptomFact {
    pub fn new(name: Symptom, present: bool) -> Self {
        Self {
            name,
            value: Answer::from(present),
        }
    }
}

impl fmt::Display for SymptomFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(symptom (name {}) (value {}))",
            self.name.as_str(),
            self.value.as_str()
        )
    }
}

/// Input for one diagnosis request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomReport {
    pub has_fever: bool,
    pub has_cough: bool,
}

impl SymptomReport {
    pub fn new(has_fever: bool, has_cough: bool) -> Self {
        Self {
            has_fever,
            has_cough,
        }
    }

    /// The two facts asserted for this report, fever first
    pub fn facts(&self) -> [SymptomFact; 2] {
        [
            SymptomFact::new(Symptom::Fever, self.has_fever),
            SymptomFact::new(Symptom::Cough, self.has_cough),
        ]
    }
}
