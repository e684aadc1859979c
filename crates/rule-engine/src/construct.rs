//! Construct interpretation
//!
//! Turns parsed s-expressions into templates, rules, and fact specs,
//! validating every template and slot reference against the templates
//! already defined.

use crate::rule::{FactSpec, Pattern, Rule};
use crate::syntax::{parse_one, Sexp};
use crate::{EngineError, Template, Value};

/// A top-level definition accepted by `Environment::build`
#[derive(Debug)]
pub(crate) enum Construct {
    Template(Template),
    Rule(Rule),
}

/// Parse a `deftemplate` or `defrule` construct
pub(crate) fn parse_construct(text: &str, templates: &[Template]) -> Result<Construct, EngineError> {
    let sexp = parse_one(text)?;
    let items = list_items(&sexp, "construct")?;
    let keyword = items
        .first()
        .and_then(Sexp::as_symbol)
        .ok_or_else(|| EngineError::syntax(sexp.offset(), "expected construct keyword"))?;

    match keyword {
        "deftemplate" => parse_deftemplate(&sexp, &items[1..]).map(Construct::Template),
        "defrule" => parse_defrule(&sexp, &items[1..], templates).map(Construct::Rule),
        other => Err(EngineError::UnexpectedConstruct(other.to_string())),
    }
}

/// Parse fact text such as `(symptom (name fever) (value yes))`
pub(crate) fn parse_fact(text: &str, templates: &[Template]) -> Result<FactSpec, EngineError> {
    let sexp = parse_one(text)?;
    fact_spec(&sexp, templates)
}

fn list_items<'a>(sexp: &'a Sexp, what: &str) -> Result<&'a [Sexp], EngineError> {
    sexp.as_list()
        .ok_or_else(|| EngineError::syntax(sexp.offset(), format!("expected {} list", what)))
}

fn symbol<'a>(sexp: Option<&'a Sexp>, fallback_offset: usize, what: &str) -> Result<&'a str, EngineError> {
    match sexp {
        Some(s) => s
            .as_symbol()
            .ok_or_else(|| EngineError::syntax(s.offset(), format!("expected {}", what))),
        None => Err(EngineError::syntax(fallback_offset, format!("missing {}", what))),
    }
}

/// Skip an optional documentation string following a construct name
fn skip_comment(items: &[Sexp]) -> &[Sexp] {
    match items.first() {
        Some(Sexp::Atom {
            value: Value::String(_),
            ..
        }) => &items[1..],
        _ => items,
    }
}

fn parse_deftemplate(whole: &Sexp, items: &[Sexp]) -> Result<Template, EngineError> {
    let name = symbol(items.first(), whole.offset(), "template name")?;
    let mut slots: Vec<String> = Vec::new();

    for slot in skip_comment(&items[1..]) {
        let parts = list_items(slot, "slot")?;
        match parts {
            [kind, slot_name] if kind.as_symbol() == Some("slot") => {
                let slot_name = symbol(Some(slot_name), slot.offset(), "slot name")?;
                if slots.iter().any(|s| s == slot_name) {
                    return Err(EngineError::syntax(
                        slot.offset(),
                        format!("duplicate slot {}", slot_name),
                    ));
                }
                slots.push(slot_name.to_string());
            }
            _ => {
                return Err(EngineError::syntax(
                    slot.offset(),
                    "expected (slot <name>)",
                ))
            }
        }
    }

    Ok(Template::new(name, slots))
}

fn parse_defrule(whole: &Sexp, items: &[Sexp], templates: &[Template]) -> Result<Rule, EngineError> {
    let name = symbol(items.first(), whole.offset(), "rule name")?;
    let body = skip_comment(&items[1..]);

    let arrow = body
        .iter()
        .position(|s| s.as_symbol() == Some("=>"))
        .ok_or_else(|| EngineError::syntax(whole.offset(), format!("rule {} is missing =>", name)))?;

    let patterns = body[..arrow]
        .iter()
        .map(|sexp| {
            let (template, constraints) = slotted(sexp, templates)?;
            Ok::<_, EngineError>(Pattern {
                template: template.name().to_string(),
                constraints,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut actions = Vec::new();
    for action in &body[arrow + 1..] {
        let parts = list_items(action, "action")?;
        match parts.split_first() {
            Some((head, facts)) if head.as_symbol() == Some("assert") => {
                if facts.is_empty() {
                    return Err(EngineError::syntax(action.offset(), "assert needs a fact"));
                }
                for fact in facts {
                    actions.push(fact_spec(fact, templates)?);
                }
            }
            Some((head, _)) => {
                let what = head.as_symbol().unwrap_or("non-symbol");
                return Err(EngineError::UnexpectedConstruct(format!("{} action", what)));
            }
            None => return Err(EngineError::syntax(action.offset(), "empty action")),
        }
    }

    Ok(Rule {
        name: name.to_string(),
        patterns,
        actions,
    })
}

/// Fact spec with every template slot filled, unset slots as `nil`
fn fact_spec(sexp: &Sexp, templates: &[Template]) -> Result<FactSpec, EngineError> {
    let (template, given) = slotted(sexp, templates)?;

    let slots = template
        .slots()
        .iter()
        .map(|slot| {
            let value = given
                .iter()
                .find(|(name, _)| name == slot)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(Value::nil);
            (slot.clone(), value)
        })
        .collect();

    Ok(FactSpec {
        template: template.name().to_string(),
        slots,
    })
}

/// Read `(<template> (<slot> <constant>)*)`, checking names against templates
fn slotted<'t>(
    sexp: &Sexp,
    templates: &'t [Template],
) -> Result<(&'t Template, Vec<(String, Value)>), EngineError> {
    let items = list_items(sexp, "fact")?;
    let name = symbol(items.first(), sexp.offset(), "template name")?;
    let template = templates
        .iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| EngineError::UnknownTemplate(name.to_string()))?;

    let mut values: Vec<(String, Value)> = Vec::new();
    for entry in &items[1..] {
        let (slot, value) = match list_items(entry, "slot value")? {
            [slot, Sexp::Atom { value, .. }] => (symbol(Some(slot), entry.offset(), "slot name")?, value),
            _ => {
                return Err(EngineError::syntax(
                    entry.offset(),
                    "expected (<slot> <constant>)",
                ))
            }
        };

        if !template.has_slot(slot) {
            return Err(EngineError::UnknownSlot {
                template: name.to_string(),
                slot: slot.to_string(),
            });
        }
        if values.iter().any(|(s, _)| s == slot) {
            return Err(EngineError::syntax(
                entry.offset(),
                format!("slot {} given twice", slot),
            ));
        }
        values.push((slot.to_string(), value.clone()));
    }

    Ok((template, values))
}
