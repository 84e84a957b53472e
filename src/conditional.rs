//! Conditional gates controlling whether a component renders
//!
//! A conditional is a recursive boolean tree: one named comparison plus a
//! group of child conditionals joined by a combinator. Values arrive one
//! variable at a time through [`Conditional::set_value`], which evaluates
//! every matching node; [`Conditional::validate`] then folds the tree into a
//! single render/skip decision. A node with an empty name is a wildcard that
//! always passes.
//!
//! String operators: `equals`, `contains`, `startswith`, `endswith` and
//! their case-insensitive `ci_` variants. Numeric operators: `==`, `<`, `>`,
//! `<=`, `>=`. Group combinators: `and`, `or`, `nand`, `nor`, `xor`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::property::PropValue;

/// Errors raised while evaluating a conditional tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConditionalError {
    /// A string operator received a non-string value.
    #[error("invalid value for string operator: got {actual}")]
    StringValueExpected { actual: &'static str },

    /// A numeric operator received a non-numeric value.
    #[error("invalid value for numeric operator: got {actual}")]
    NumberValueExpected { actual: &'static str },

    /// A numeric node's comparison literal did not parse as a float.
    #[error("failed to convert conditional value to float: {value}")]
    BadNumericLiteral { value: String },

    /// The node's operator is not a known comparison.
    #[error("invalid conditional operator {operator}")]
    UnknownOperator { operator: String },

    /// The group combinator is not a known combinator.
    #[error("invalid group operator {operator}")]
    UnknownGroupOperator { operator: String },

    /// A reachable named node was never given a value before validation.
    #[error("attempted to validate conditional {name} {operator} {value} without setting {name}")]
    NotSet {
        name: String,
        operator: String,
        value: String,
    },
}

/// A group of child conditionals joined by a combinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionGroup {
    /// Combinator applied across this node and its children.
    #[serde(rename = "groupOperator")]
    pub operator: String,
    /// Ordered child conditionals.
    pub conditionals: Vec<Conditional>,
}

impl ConditionGroup {
    pub fn new(operator: &str, conditionals: Vec<Conditional>) -> Self {
        Self {
            operator: operator.to_string(),
            conditionals,
        }
    }
}

/// One node of a conditional tree.
///
/// The structural fields are immutable after load; the two runtime flags
/// follow copy-on-write, so every mutation returns a new tree and leaves the
/// caller's value untouched on error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditional {
    /// Variable name this node compares; empty means wildcard (always true).
    pub name: String,
    /// Negate the comparison result.
    #[serde(rename = "boolNot")]
    pub negate: bool,
    /// Comparison operator.
    pub operator: String,
    /// Comparison literal from the template.
    pub value: String,
    /// Child conditionals.
    pub group: ConditionGroup,

    #[serde(skip)]
    value_set: bool,
    #[serde(skip)]
    validated: bool,
}

impl Conditional {
    /// A wildcard conditional that always renders.
    pub fn wildcard() -> Self {
        Self::default()
    }

    /// A leaf comparison node.
    pub fn new(name: &str, operator: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
            ..Self::default()
        }
    }

    /// The same node with negation enabled.
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// The same node with an attached child group.
    pub fn with_group(mut self, group: ConditionGroup) -> Self {
        self.group = group;
        self
    }

    /// Whether this node has been valued at least once.
    pub fn is_value_set(&self) -> bool {
        self.value_set
    }

    /// Feed one named value through the tree, evaluating every matching
    /// node bottom-up. Returns the updated tree; on error the caller's tree
    /// is unchanged.
    pub fn set_value(&self, name: &str, value: &PropValue) -> Result<Conditional, ConditionalError> {
        let mut next = self.clone();
        for member in next.group.conditionals.iter_mut() {
            *member = member.set_value(name, value)?;
        }
        if next.name.is_empty() && !next.value_set {
            next.validated = true;
            next.value_set = true;
            return Ok(next);
        }
        if next.name == name {
            let result = match next.operator.as_str() {
                "equals" | "contains" | "startswith" | "endswith" | "ci_equals" | "ci_contains"
                | "ci_startswith" | "ci_endswith" => compare_strings(&next.operator, &next.value, value)?,
                "==" | "<" | ">" | "<=" | ">=" => {
                    compare_numbers(&next.operator, &next.value, value)?
                }
                other => {
                    return Err(ConditionalError::UnknownOperator {
                        operator: other.to_string(),
                    })
                }
            };
            next.validated = if next.negate { !result } else { result };
            next.value_set = true;
        }
        Ok(next)
    }

    /// Fold the tree into a render decision. Erroring if any reachable
    /// named node was never valued, or a combinator is unknown.
    pub fn validate(&self) -> Result<bool, ConditionalError> {
        if !self.value_set && !self.name.is_empty() {
            return Err(ConditionalError::NotSet {
                name: self.name.clone(),
                operator: self.operator.clone(),
                value: self.value.clone(),
            });
        }
        let members = &self.group.conditionals;
        if members.is_empty() {
            return Ok(self.validated);
        }
        match self.group.operator.as_str() {
            // Exactly one of this node and its children may be true.
            "xor" => {
                let mut true_count = usize::from(self.validated);
                for member in members {
                    if member.validate()? {
                        true_count += 1;
                    }
                }
                Ok(true_count == 1)
            }
            "and" | "nand" => {
                let mut result = self.validated;
                for member in members {
                    result = result && member.validate()?;
                }
                Ok(if self.group.operator == "nand" {
                    !result
                } else {
                    result
                })
            }
            "or" | "nor" => {
                let mut result = self.validated;
                for member in members {
                    result = result || member.validate()?;
                }
                Ok(if self.group.operator == "nor" {
                    !result
                } else {
                    result
                })
            }
            other => Err(ConditionalError::UnknownGroupOperator {
                operator: other.to_string(),
            }),
        }
    }

    /// Every non-empty variable name referenced anywhere in the tree.
    pub fn named_properties(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut BTreeSet<String>) {
        if !self.name.is_empty() {
            names.insert(self.name.clone());
        }
        for member in &self.group.conditionals {
            member.collect_names(names);
        }
    }
}

fn compare_strings(
    operator: &str,
    literal: &str,
    value: &PropValue,
) -> Result<bool, ConditionalError> {
    let PropValue::String(actual) = value else {
        return Err(ConditionalError::StringValueExpected {
            actual: value.type_name(),
        });
    };
    let case_insensitive = operator.starts_with("ci_");
    let (probe, subject) = if case_insensitive {
        (literal.to_lowercase(), actual.to_lowercase())
    } else {
        (literal.to_string(), actual.clone())
    };
    let base = operator.strip_prefix("ci_").unwrap_or(operator);
    let result = match base {
        "equals" => subject == probe,
        "contains" => subject.contains(&probe),
        // starts_with/ends_with are false, not an error, when the probe is
        // longer than the subject.
        "startswith" => subject.starts_with(&probe),
        "endswith" => subject.ends_with(&probe),
        other => {
            return Err(ConditionalError::UnknownOperator {
                operator: other.to_string(),
            })
        }
    };
    Ok(result)
}

fn compare_numbers(
    operator: &str,
    literal: &str,
    value: &PropValue,
) -> Result<bool, ConditionalError> {
    let actual = match value {
        PropValue::Float(value) => *value,
        PropValue::Int(value) => *value as f64,
        PropValue::Uint8(value) => f64::from(*value),
        other => {
            return Err(ConditionalError::NumberValueExpected {
                actual: other.type_name(),
            })
        }
    };
    let expected: f64 = literal
        .parse()
        .map_err(|_| ConditionalError::BadNumericLiteral {
            value: literal.to_string(),
        })?;
    let result = match operator {
        "==" => actual == expected,
        "<" => actual < expected,
        ">" => actual > expected,
        "<=" => actual <= expected,
        ">=" => actual >= expected,
        other => {
            return Err(ConditionalError::UnknownOperator {
                operator: other.to_string(),
            })
        }
    };
    Ok(result)
}
