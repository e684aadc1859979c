//! Rule Evaluation Environment

use crate::construct::{parse_construct, parse_fact, Construct};
use crate::rule::FactSpec;
use crate::{EngineError, Fact, FactIndex, Rule, Template};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Summary of one `run` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Names of the rules fired, in firing order
    pub fired: Vec<String>,
}

impl RunReport {
    /// Number of rule firings
    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }
}

/// Templates, rules, and working memory for one evaluation context
///
/// Environments share nothing; each instance owns its own state.
#[derive(Debug, Default)]
pub struct Environment {
    templates: Vec<Template>,
    rules: Vec<Rule>,
    facts: Vec<Fact>,
    next_index: u64,
    /// Activations already fired (refraction), keyed by rule name and fact tuple
    fired: HashSet<(String, Vec<FactIndex>)>,
}

struct Activation {
    rule: usize,
    facts: Vec<FactIndex>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a `deftemplate` or `defrule` construct
    ///
    /// Redefining a rule replaces the previous definition; redefining a
    /// template is an error.
    pub fn build(&mut self, text: &str) -> Result<(), EngineError> {
        match parse_construct(text, &self.templates)? {
            Construct::Template(template) => {
                if self.template(template.name()).is_some() {
                    return Err(EngineError::DuplicateTemplate(template.name().to_string()));
                }
                debug!("Defined template {} {:?}", template.name(), template.slots());
                self.templates.push(template);
            }
            Construct::Rule(rule) => {
                debug!("Defined rule {} ({} patterns)", rule.name, rule.patterns.len());
                match self.rules.iter_mut().find(|r| r.name == rule.name) {
                    Some(existing) => {
                        // The new definition matches existing facts afresh
                        self.fired.retain(|(name, _)| name != &rule.name);
                        *existing = rule;
                    }
                    None => self.rules.push(rule),
                }
            }
        }
        Ok(())
    }

    /// Empty working memory and forget fired activations
    ///
    /// Templates and rules are kept.
    pub fn reset(&mut self) {
        self.facts.clear();
        self.fired.clear();
        self.next_index = 1;
        trace!("Environment reset");
    }

    /// Remove everything: templates, rules, and working memory
    pub fn clear(&mut self) {
        self.templates.clear();
        self.rules.clear();
        self.reset();
    }

    /// Assert a fact given as text, e.g. `(symptom (name fever) (value yes))`
    ///
    /// An identical fact already in working memory is not duplicated; its
    /// index is returned instead.
    pub fn assert_string(&mut self, text: &str) -> Result<FactIndex, EngineError> {
        let spec = parse_fact(text, &self.templates)?;
        Ok(self.assert_spec(spec))
    }

    /// Run to a fixed point
    pub fn run(&mut self) -> RunReport {
        self.run_limited(None)
    }

    /// Run until no activation remains or `limit` rules have fired
    ///
    /// Activations are taken in rule-definition order, then by fact indices.
    pub fn run_limited(&mut self, limit: Option<usize>) -> RunReport {
        let mut report = RunReport::default();

        while limit.map_or(true, |max| report.fired_count() < max) {
            let Some(activation) = self.next_activation() else {
                break;
            };

            let rule = &self.rules[activation.rule];
            let name = rule.name.clone();
            let actions = rule.actions.clone();
            debug!("FIRE {} {:?}", name, activation.facts);

            self.fired.insert((name.clone(), activation.facts));
            for spec in actions {
                self.assert_spec(spec);
            }
            report.fired.push(name);
        }

        debug!("Run finished after {} firings", report.fired_count());
        report
    }

    /// Facts in working memory, in assertion order
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Look up a fact by its index
    pub fn fact(&self, index: FactIndex) -> Option<&Fact> {
        self.facts.iter().find(|f| f.index() == index)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name() == name)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn assert_spec(&mut self, spec: FactSpec) -> FactIndex {
        if let Some(existing) = self
            .facts
            .iter()
            .find(|f| f.same_content(&spec.template, &spec.slots))
        {
            trace!("Duplicate fact {} ignored", existing);
            return existing.index();
        }

        // Index 0 is never handed out, so a fresh environment starts at f-1
        let index = FactIndex(self.next_index.max(1));
        self.next_index = index.0 + 1;

        let fact = Fact::new(index, spec.template, spec.slots);
        trace!("==> {} {}", index, fact);
        self.facts.push(fact);
        index
    }

    fn next_activation(&self) -> Option<Activation> {
        self.rules.iter().enumerate().find_map(|(position, rule)| {
            rule.matches(&self.facts)
                .into_iter()
                .map(|tuple| tuple.iter().map(|f| f.index()).collect::<Vec<_>>())
                .find(|indices| !self.fired.contains(&(rule.name.clone(), indices.clone())))
                .map(|facts| Activation {
                    rule: position,
                    facts,
                })
        })
    }
}
