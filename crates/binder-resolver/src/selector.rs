//! Label selector conversion
//!
//! A `metav1.LabelSelector` is validated and converted into a [`Selector`]
//! before use. The selector renders to the API server's label selector
//! query syntax and can also be evaluated against a label map.

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use thiserror::Error;

const MAX_NAME_LENGTH: usize = 63;
const MAX_PREFIX_LENGTH: usize = 253;

/// A label selector that failed validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    /// Operator is not one of In, NotIn, Exists, DoesNotExist
    #[error("{key}: unsupported operator '{operator}'")]
    UnsupportedOperator {
        /// Requirement key
        key: String,
        /// Rejected operator
        operator: String,
    },
    /// In/NotIn without values, or Exists/DoesNotExist with values
    #[error("{key}: operator {operator} {expectation}")]
    InvalidValues {
        /// Requirement key
        key: String,
        /// Operator of the requirement
        operator: String,
        /// What the operator expects
        expectation: &'static str,
    },
    /// Key is not a qualified label name
    #[error("invalid label key '{key}': {reason}")]
    InvalidKey {
        /// Rejected key
        key: String,
        /// Why it is invalid
        reason: &'static str,
    },
    /// Value is not a valid label value
    #[error("invalid label value '{value}' for key '{key}'")]
    InvalidValue {
        /// Requirement key
        key: String,
        /// Rejected value
        value: String,
    },
}

/// Operator of a single requirement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// Label equals the single value
    Equals,
    /// Label is one of the values
    In,
    /// Label is absent or not one of the values
    NotIn,
    /// Label is present
    Exists,
    /// Label is absent
    DoesNotExist,
}

/// One `key op values` requirement
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: Vec<String>,
}

impl Requirement {
    fn new(key: &str, operator: Operator, values: &[String]) -> Result<Self, SelectorError> {
        validate_key(key)?;
        for value in values {
            validate_value(key, value)?;
        }
        let mut values = values.to_vec();
        values.sort();
        values.dedup();
        Ok(Self {
            key: key.to_string(),
            operator,
            values,
        })
    }

    /// Label key this requirement tests
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Operator of this requirement
    pub fn operator(&self) -> Operator {
        self.operator
    }

    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::Equals | Operator::In => {
                value.is_some_and(|v| self.values.iter().any(|candidate| candidate == v))
            }
            Operator::NotIn => value.is_none_or(|v| !self.values.contains(v)),
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, self.values[0]),
            Operator::In => write!(f, "{} in ({})", self.key, self.values.join(",")),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, self.values.join(",")),
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}

/// A validated label selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Matches no object
    Nothing,
    /// Matches objects satisfying every requirement; empty matches everything
    Matching(Vec<Requirement>),
}

impl Selector {
    /// Selector matching every object
    pub fn everything() -> Self {
        Self::Matching(Vec::new())
    }

    /// Convert an optional `LabelSelector`
    ///
    /// A missing selector matches nothing; an empty one matches everything.
    pub fn from_label_selector(selector: Option<&LabelSelector>) -> Result<Self, SelectorError> {
        let Some(selector) = selector else {
            return Ok(Self::Nothing);
        };

        let mut requirements = Vec::new();
        for (key, value) in selector.match_labels.iter().flatten() {
            requirements.push(Requirement::new(
                key,
                Operator::Equals,
                std::slice::from_ref(value),
            )?);
        }

        for expr in selector.match_expressions.iter().flatten() {
            let values = expr.values.as_deref().unwrap_or_default();
            let (operator, needs_values) = match expr.operator.as_str() {
                "In" => (Operator::In, true),
                "NotIn" => (Operator::NotIn, true),
                "Exists" => (Operator::Exists, false),
                "DoesNotExist" => (Operator::DoesNotExist, false),
                other => {
                    return Err(SelectorError::UnsupportedOperator {
                        key: expr.key.clone(),
                        operator: other.to_string(),
                    })
                }
            };
            if needs_values && values.is_empty() {
                return Err(SelectorError::InvalidValues {
                    key: expr.key.clone(),
                    operator: expr.operator.clone(),
                    expectation: "requires at least one value",
                });
            }
            if !needs_values && !values.is_empty() {
                return Err(SelectorError::InvalidValues {
                    key: expr.key.clone(),
                    operator: expr.operator.clone(),
                    expectation: "must not have values",
                });
            }
            requirements.push(Requirement::new(&expr.key, operator, values)?);
        }

        requirements.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(Self::Matching(requirements))
    }

    /// True when this selector can never match
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// True when this selector matches every object
    pub fn is_everything(&self) -> bool {
        matches!(self, Self::Matching(r) if r.is_empty())
    }

    /// Evaluate the selector against a label map
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Nothing => false,
            Self::Matching(requirements) => requirements.iter().all(|r| r.matches(labels)),
        }
    }
}

/// Renders the label selector query; `Nothing` and `Everything` render empty
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => Ok(()),
            Self::Matching(requirements) => {
                for (i, r) in requirements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{r}")?;
                }
                Ok(())
            }
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LENGTH
        && name.chars().all(is_name_char)
        && name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric())
}

fn is_dns_subdomain(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix.len() <= MAX_PREFIX_LENGTH
        && prefix.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
                && !label.starts_with('-')
                && !label.ends_with('-')
        })
}

fn validate_key(key: &str) -> Result<(), SelectorError> {
    let invalid = |reason| SelectorError::InvalidKey {
        key: key.to_string(),
        reason,
    };
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if !is_dns_subdomain(prefix) {
                return Err(invalid("prefix must be a DNS subdomain"));
            }
            name
        }
        None => key,
    };
    if !is_qualified_name(name) {
        return Err(invalid(
            "name must be 63 characters or less, alphanumeric at both ends, with '-', '_' or '.' between",
        ));
    }
    Ok(())
}

fn validate_value(key: &str, value: &str) -> Result<(), SelectorError> {
    if value.is_empty() || is_qualified_name(value) {
        Ok(())
    } else {
        Err(SelectorError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelectorRequirement;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn expr(key: &str, operator: &str, values: &[&str]) -> LabelSelectorRequirement {
        LabelSelectorRequirement {
            key: key.to_string(),
            operator: operator.to_string(),
            values: (!values.is_empty()).then(|| values.iter().map(|v| v.to_string()).collect()),
        }
    }

    fn selector(
        match_labels: &[(&str, &str)],
        match_expressions: Vec<LabelSelectorRequirement>,
    ) -> LabelSelector {
        LabelSelector {
            match_labels: (!match_labels.is_empty()).then(|| labels(match_labels)),
            match_expressions: (!match_expressions.is_empty()).then_some(match_expressions),
        }
    }

    #[test]
    fn missing_selector_matches_nothing() {
        let s = Selector::from_label_selector(None).unwrap();
        assert!(s.is_nothing());
        assert!(!s.matches(&labels(&[])));
        assert!(!s.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn empty_selector_matches_everything() {
        let s = Selector::from_label_selector(Some(&LabelSelector::default())).unwrap();
        assert!(s.is_everything());
        assert!(s.matches(&labels(&[])));
        assert_eq!(s.to_string(), "");
    }

    #[test]
    fn match_labels_and_expressions_combine() {
        let ls = selector(
            &[("app", "web")],
            vec![
                expr("tier", "In", &["frontend", "edge"]),
                expr("canary", "DoesNotExist", &[]),
            ],
        );
        let s = Selector::from_label_selector(Some(&ls)).unwrap();

        assert!(s.matches(&labels(&[("app", "web"), ("tier", "edge")])));
        assert!(!s.matches(&labels(&[("app", "web"), ("tier", "backend")])));
        assert!(!s.matches(&labels(&[("app", "web"), ("tier", "edge"), ("canary", "1")])));
        assert!(!s.matches(&labels(&[("tier", "edge")])));
    }

    #[test]
    fn renders_sorted_query_syntax() {
        let ls = selector(
            &[("app", "web")],
            vec![
                expr("zone", "NotIn", &["b", "a"]),
                expr("env", "Exists", &[]),
                expr("canary", "DoesNotExist", &[]),
                expr("tier", "In", &["frontend"]),
            ],
        );
        let s = Selector::from_label_selector(Some(&ls)).unwrap();
        assert_eq!(
            s.to_string(),
            "app=web,!canary,env,tier in (frontend),zone notin (a,b)"
        );
    }

    #[test]
    fn not_in_matches_absent_label() {
        let ls = selector(&[], vec![expr("env", "NotIn", &["prod"])]);
        let s = Selector::from_label_selector(Some(&ls)).unwrap();
        assert!(s.matches(&labels(&[])));
        assert!(s.matches(&labels(&[("env", "dev")])));
        assert!(!s.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn rejects_unknown_operator() {
        let ls = selector(&[], vec![expr("app", "Gt", &["1"])]);
        assert_eq!(
            Selector::from_label_selector(Some(&ls)).unwrap_err(),
            SelectorError::UnsupportedOperator {
                key: "app".to_string(),
                operator: "Gt".to_string(),
            }
        );
    }

    #[test]
    fn rejects_value_count_mismatch() {
        let in_without_values = selector(&[], vec![expr("app", "In", &[])]);
        assert!(matches!(
            Selector::from_label_selector(Some(&in_without_values)),
            Err(SelectorError::InvalidValues { .. })
        ));

        let exists_with_values = selector(&[], vec![expr("app", "Exists", &["web"])]);
        assert!(matches!(
            Selector::from_label_selector(Some(&exists_with_values)),
            Err(SelectorError::InvalidValues { .. })
        ));
    }

    #[test]
    fn validates_keys_and_values() {
        let too_long = "x".repeat(64);
        for key in ["", "-app", "app-", "Bad_Prefix/app", "a/b/c", too_long.as_str()] {
            let ls = selector(&[(key, "v")], vec![]);
            assert!(
                matches!(
                    Selector::from_label_selector(Some(&ls)),
                    Err(SelectorError::InvalidKey { .. })
                ),
                "key {key:?} should be rejected"
            );
        }

        let ls = selector(&[("app.kubernetes.io/name", "web_1.a")], vec![]);
        assert!(Selector::from_label_selector(Some(&ls)).is_ok());

        let ls = selector(&[("app", "has space")], vec![]);
        assert!(matches!(
            Selector::from_label_selector(Some(&ls)),
            Err(SelectorError::InvalidValue { .. })
        ));
    }

    #[test]
    fn empty_label_value_is_allowed() {
        let ls = selector(&[("app", "")], vec![]);
        let s = Selector::from_label_selector(Some(&ls)).unwrap();
        assert!(s.matches(&labels(&[("app", "")])));
        assert!(!s.matches(&labels(&[("app", "web")])));
    }
}
