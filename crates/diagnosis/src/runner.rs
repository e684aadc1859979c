//! Diagnosis Runner

use crate::knowledge::{
    self, COVID_POSSIBLE_RULE, COVID_UNLIKELY_RULE, DIAGNOSIS_SLOT, NO_RULE_FIRED,
    RESULT_TEMPLATE,
};
use crate::{DiagnosisError, SymptomReport};
use rule_engine::{Environment, Fact};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Category of a diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both symptoms present
    Possible,
    /// Neither symptom present
    Unlikely,
    /// Mixed answers; no rule matched
    NoRuleFired,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Possible => "possible",
            Outcome::Unlikely => "unlikely",
            Outcome::NoRuleFired => "no_rule_fired",
        }
    }

    /// Outcome concluded by a knowledge-base rule
    pub fn from_rule(rule: &str) -> Option<Self> {
        match rule {
            COVID_POSSIBLE_RULE => Some(Outcome::Possible),
            COVID_UNLIKELY_RULE => Some(Outcome::Unlikely),
            _ => None,
        }
    }
}

/// Progress of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Built,
    FactsAsserted,
    Evaluated,
    Read,
    Done,
}

impl RunStage {
    /// Stage that must be reached before this one can be entered
    fn previous(&self) -> Option<RunStage> {
        match self {
            RunStage::Idle => None,
            RunStage::Built => Some(RunStage::Idle),
            RunStage::FactsAsserted => Some(RunStage::Built),
            RunStage::Evaluated => Some(RunStage::FactsAsserted),
            RunStage::Read => Some(RunStage::Evaluated),
            RunStage::Done => Some(RunStage::Read),
        }
    }
}

/// Typed view of a `result` fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFact {
    pub diagnosis: String,
}

impl ResultFact {
    /// Read a result fact; `None` for facts of any other template
    pub fn from_fact(fact: &Fact) -> Option<Self> {
        if fact.template() != RESULT_TEMPLATE {
            return None;
        }
        fact.get(DIAGNOSIS_SLOT).map(|value| Self {
            diagnosis: value.as_str().to_string(),
        })
    }
}

/// Result of one diagnosis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    /// Text shown to the user
    pub text: String,
    pub outcome: Outcome,
    /// Rules fired during evaluation, in firing order
    pub fired_rules: Vec<String>,
}

impl Diagnosis {
    fn no_rule_fired(fired_rules: Vec<String>) -> Self {
        Self {
            text: NO_RULE_FIRED.to_string(),
            outcome: Outcome::NoRuleFired,
            fired_rules,
        }
    }
}

/// One pass through the knowledge base over a fresh environment
///
/// Steps must be taken in `RunStage` order; a step taken out of order is
/// rejected with `DiagnosisError::OutOfOrder` and leaves the run unchanged.
pub struct DiagnosisRun {
    env: Environment,
    stage: RunStage,
    fired: Vec<String>,
    result: Option<ResultFact>,
}

impl DiagnosisRun {
    /// Build the knowledge base and reset its working memory
    pub fn start() -> Result<Self, DiagnosisError> {
        let mut env = knowledge::create_environment()?;
        env.reset();

        let mut run = Self {
            env,
            stage: RunStage::Idle,
            fired: Vec::new(),
            result: None,
        };
        run.enter(RunStage::Built)?;
        Ok(run)
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Assert one fact per symptom
    pub fn assert_symptoms(&mut self, report: &SymptomReport) -> Result<(), DiagnosisError> {
        self.expect(RunStage::FactsAsserted)?;
        for fact in report.facts() {
            self.env
                .assert_string(&fact.to_string())
                .map_err(DiagnosisError::Evaluation)?;
        }
        self.enter(RunStage::FactsAsserted)
    }

    /// Run the engine to a fixed point
    pub fn infer(&mut self) -> Result<(), DiagnosisError> {
        self.expect(RunStage::Evaluated)?;
        self.fired = self.env.run().fired;
        self.enter(RunStage::Evaluated)
    }

    /// Scan working memory for the diagnosis
    pub fn read_result(&mut self) -> Result<Option<&ResultFact>, DiagnosisError> {
        self.expect(RunStage::Read)?;
        // First result fact in working-memory order wins
        self.result = self.env.facts().find_map(ResultFact::from_fact);
        self.enter(RunStage::Read)?;
        Ok(self.result.as_ref())
    }

    /// Hand back the diagnosis; the run cannot be continued afterwards
    pub fn finish(&mut self) -> Result<Diagnosis, DiagnosisError> {
        self.expect(RunStage::Done)?;
        let fired = std::mem::take(&mut self.fired);

        let diagnosis = match self.result.take() {
            Some(result) => Diagnosis {
                outcome: fired
                    .iter()
                    .find_map(|rule| Outcome::from_rule(rule))
                    .unwrap_or(Outcome::NoRuleFired),
                text: result.diagnosis,
                fired_rules: fired,
            },
            None => Diagnosis::no_rule_fired(fired),
        };

        self.enter(RunStage::Done)?;
        Ok(diagnosis)
    }

    fn expect(&self, next: RunStage) -> Result<(), DiagnosisError> {
        if next.previous() == Some(self.stage) {
            Ok(())
        } else {
            Err(DiagnosisError::OutOfOrder {
                stage: self.stage,
                next,
            })
        }
    }

    fn enter(&mut self, next: RunStage) -> Result<(), DiagnosisError> {
        self.expect(next)?;
        trace!("{:?} -> {:?}", self.stage, next);
        self.stage = next;
        Ok(())
    }
}

/// Run the expert system for a symptom report
///
/// Every call builds its own environment, so calls never observe each other.
pub fn evaluate(report: SymptomReport) -> Result<Diagnosis, DiagnosisError> {
    let mut run = DiagnosisRun::start()?;
    run.assert_symptoms(&report)?;
    run.infer()?;
    run.read_result()?;
    let diagnosis = run.finish()?;

    debug!(
        "Diagnosis for fever={} cough={}: {}",
        report.has_fever,
        report.has_cough,
        diagnosis.outcome.as_str()
    );
    Ok(diagnosis)
}

/// Diagnosis text for two yes/no answers
pub fn diagnose(has_fever: bool, has_cough: bool) -> Result<String, DiagnosisError> {
    evaluate(SymptomReport::new(has_fever, has_cough)).map(|d| d.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{POSSIBLE_COVID, UNLIKELY_COVID};
    use proptest::prelude::*;

    #[test]
    fn test_both_symptoms() {
        assert_eq!(diagnose(true, true).unwrap(), POSSIBLE_COVID);
    }

    #[test]
    fn test_no_symptoms() {
        assert_eq!(diagnose(false, false).unwrap(), UNLIKELY_COVID);
    }

    #[test]
    fn test_mixed_symptoms_fall_back() {
        assert_eq!(diagnose(true, false).unwrap(), NO_RULE_FIRED);
        assert_eq!(diagnose(false, true).unwrap(), NO_RULE_FIRED);
    }

    #[test]
    fn test_scenario_table() {
        let cases = [
            (true, true, Outcome::Possible, vec![COVID_POSSIBLE_RULE]),
            (false, false, Outcome::Unlikely, vec![COVID_UNLIKELY_RULE]),
            (true, false, Outcome::NoRuleFired, vec![]),
            (false, true, Outcome::NoRuleFired, vec![]),
        ];

        for (fever, cough, outcome, rules) in cases {
            let diagnosis = evaluate(SymptomReport::new(fever, cough)).unwrap();
            assert_eq!(diagnosis.outcome, outcome, "fever={} cough={}", fever, cough);
            assert_eq!(diagnosis.fired_rules, rules, "fever={} cough={}", fever, cough);
        }
    }

    #[test]
    fn test_result_fact_ignores_other_templates() {
        let mut env = knowledge::create_environment().unwrap();
        env.reset();
        let symptom = env.assert_string("(symptom (name fever) (value yes))").unwrap();
        let result = env.assert_string("(result (diagnosis \"text\"))").unwrap();

        assert_eq!(ResultFact::from_fact(env.fact(symptom).unwrap()), None);
        assert_eq!(
            ResultFact::from_fact(env.fact(result).unwrap()),
            Some(ResultFact {
                diagnosis: "text".to_string()
            })
        );
    }

    #[test]
    fn test_first_result_fact_wins() {
        let mut env = Environment::new();
        env.build("(deftemplate result (slot diagnosis))").unwrap();
        env.reset();
        env.assert_string("(result (diagnosis first))").unwrap();
        env.assert_string("(result (diagnosis second))").unwrap();

        let found = env.facts().find_map(ResultFact::from_fact).unwrap();
        assert_eq!(found.diagnosis, "first");
    }

    #[test]
    fn test_run_walks_every_stage() {
        let mut run = DiagnosisRun::start().unwrap();
        assert_eq!(run.stage(), RunStage::Built);

        run.assert_symptoms(&SymptomReport::new(false, false)).unwrap();
        assert_eq!(run.stage(), RunStage::FactsAsserted);

        run.infer().unwrap();
        assert_eq!(run.stage(), RunStage::Evaluated);

        let result = run.read_result().unwrap().cloned();
        assert_eq!(result.unwrap().diagnosis, UNLIKELY_COVID);
        assert_eq!(run.stage(), RunStage::Read);

        let diagnosis = run.finish().unwrap();
        assert_eq!(diagnosis.outcome, Outcome::Unlikely);
        assert_eq!(run.stage(), RunStage::Done);
    }

    #[test]
    fn test_out_of_order_step_rejected() {
        let mut run = DiagnosisRun::start().unwrap();
        let err = run.read_result().unwrap_err();
        assert!(matches!(
            err,
            DiagnosisError::OutOfOrder {
                stage: RunStage::Built,
                next: RunStage::Read,
            }
        ));
        assert_eq!(run.stage(), RunStage::Built);
    }

    #[test]
    fn test_finished_run_cannot_continue() {
        let mut run = DiagnosisRun::start().unwrap();
        run.assert_symptoms(&SymptomReport::new(true, true)).unwrap();
        run.infer().unwrap();
        run.read_result().unwrap();
        run.finish().unwrap();

        assert!(run.finish().is_err());
        assert!(run.assert_symptoms(&SymptomReport::new(true, true)).is_err());
        assert_eq!(run.stage(), RunStage::Done);
    }

    #[test]
    fn test_outcome_from_rule() {
        assert_eq!(Outcome::from_rule(COVID_POSSIBLE_RULE), Some(Outcome::Possible));
        assert_eq!(Outcome::from_rule(COVID_UNLIKELY_RULE), Some(Outcome::Unlikely));
        assert_eq!(Outcome::from_rule("other"), None);
    }

    proptest! {
        #[test]
        fn prop_repeated_calls_agree(fever in any::<bool>(), cough in any::<bool>()) {
            let first = evaluate(SymptomReport::new(fever, cough)).unwrap();
            let second = evaluate(SymptomReport::new(fever, cough)).unwrap();
            prop_assert_eq!(&first, &second);
        }

        #[test]
        fn prop_outcome_follows_answers(fever in any::<bool>(), cough in any::<bool>()) {
            let diagnosis = evaluate(SymptomReport::new(fever, cough)).unwrap();
            let expected = match (fever, cough) {
                (true, true) => (Outcome::Possible, POSSIBLE_COVID),
                (false, false) => (Outcome::Unlikely, UNLIKELY_COVID),
                _ => (Outcome::NoRuleFired, NO_RULE_FIRED),
            };
            prop_assert_eq!(diagnosis.outcome, expected.0);
            prop_assert_eq!(diagnosis.text.as_str(), expected.1);
        }
    }
}
