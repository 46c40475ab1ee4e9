//! Label selector query parsing
//!
//! Accepts the kubectl `-l` syntax: comma separated `k=v`, `k==v`, `k!=v`,
//! `k in (a,b)`, `k notin (a,b)`, `k` and `!k` terms. Keys and values are
//! only split here; the resolver validates them.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};

use crate::{Error, Result};

/// Parse a selector query into a [`LabelSelector`]
///
/// An empty query yields an empty selector, which matches everything.
pub fn parse_selector(query: &str) -> Result<LabelSelector> {
    let mut labels = BTreeMap::new();
    let mut expressions = Vec::new();

    for term in split_terms(query)? {
        match parse_term(term)? {
            Term::Label(key, value) => {
                if let Some(existing) = labels.get(&key) {
                    if existing != &value {
                        return Err(Error::validation(format!(
                            "conflicting values for label '{key}': '{existing}' and '{value}'"
                        )));
                    }
                }
                labels.insert(key, value);
            }
            Term::Expression(req) => expressions.push(req),
        }
    }

    Ok(LabelSelector {
        match_labels: (!labels.is_empty()).then_some(labels),
        match_expressions: (!expressions.is_empty()).then_some(expressions),
    })
}

enum Term {
    Label(String, String),
    Expression(LabelSelectorRequirement),
}

/// Split on commas outside parentheses, dropping empty terms
fn split_terms(query: &str) -> Result<Vec<&str>> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in query.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::validation(format!("unbalanced ')' in '{query}'")))?;
            }
            ',' if depth == 0 => {
                terms.push(&query[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Error::validation(format!("unbalanced '(' in '{query}'")));
    }
    terms.push(&query[start..]);
    Ok(terms
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect())
}

fn parse_term(term: &str) -> Result<Term> {
    if let Some(open) = term.find('(') {
        return parse_set_term(term, open);
    }
    if let Some(key) = term.strip_prefix('!') {
        return Ok(expression(key.trim(), "DoesNotExist", Vec::new()));
    }
    if let Some((key, value)) = term.split_once("!=") {
        return Ok(expression(
            key.trim(),
            "NotIn",
            vec![value.trim().to_string()],
        ));
    }
    if let Some((key, value)) = term.split_once("==").or_else(|| term.split_once('=')) {
        return Ok(Term::Label(
            key.trim().to_string(),
            value.trim().to_string(),
        ));
    }
    if term.contains(char::is_whitespace) {
        return Err(Error::validation(format!(
            "unexpected whitespace in selector term '{term}'"
        )));
    }
    Ok(expression(term, "Exists", Vec::new()))
}

/// `key in (a,b)` or `key notin (a,b)`
fn parse_set_term(term: &str, open: usize) -> Result<Term> {
    let invalid = || Error::validation(format!("invalid set selector term '{term}'"));

    let inner = term[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
    let mut head = term[..open].split_whitespace();
    let (key, op) = match (head.next(), head.next(), head.next()) {
        (Some(key), Some(op), None) => (key, op),
        _ => return Err(invalid()),
    };
    let operator = match op {
        "in" => "In",
        "notin" => "NotIn",
        _ => return Err(invalid()),
    };
    let values = inner
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    Ok(expression(key, operator, values))
}

fn expression(key: &str, operator: &str, values: Vec<String>) -> Term {
    Term::Expression(LabelSelectorRequirement {
        key: key.to_string(),
        operator: operator.to_string(),
        values: (!values.is_empty()).then_some(values),
    })
}
