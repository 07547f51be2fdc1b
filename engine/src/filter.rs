//! Filter evaluation.
//!
//! A filter is one field-scoped predicate. The active set holds at most one
//! filter per field and is ANDed; an empty set matches every task.

use crate::value::parse_number;
use crate::{FieldName, FieldType, Schema, Task, Value};
use serde::{Deserialize, Serialize};

/// Field whose `equals` filter compares raw strings, whatever its declared type.
pub const RESERVED_BOOLEAN_FIELD: &str = "isUrgent";

/// Comparison a filter applies.
///
/// Operators that are not recognized are kept as [`Operator::Unknown`] and
/// always pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Contains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Unknown(String),
}

impl Operator {
    /// Wire name of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Contains => "contains",
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
            Operator::Unknown(name) => name,
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            Operator::Contains => "Contains",
            Operator::Equals => "Equals",
            Operator::NotEquals => "Is not",
            Operator::StartsWith => "Starts with",
            Operator::EndsWith => "Ends with",
            Operator::GreaterThan => "Greater than",
            Operator::LessThan => "Less than",
            Operator::GreaterEqual => "Greater or equal",
            Operator::LessEqual => "Less or equal",
            Operator::Unknown(name) => name,
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s {
            "contains" => Operator::Contains,
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            "greater_equal" => Operator::GreaterEqual,
            "less_equal" => Operator::LessEqual,
            other => Operator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::from(s.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-scoped predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Field the predicate reads
    pub field: FieldName,
    /// Comparison to apply
    pub operator: Operator,
    /// Right-hand side, always a string
    pub value: String,
}

impl Filter {
    /// Create a filter.
    pub fn new(
        field: impl Into<FieldName>,
        operator: impl Into<Operator>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Whether `task` passes this filter.
    ///
    /// Missing attributes fail the string tests and compare as NaN in the
    /// numeric ones; nothing here panics or errors.
    pub fn matches(&self, task: &Task, schema: &Schema) -> bool {
        let actual = task.get(&self.field);
        match &self.operator {
            Operator::Contains => string_test(actual, &self.value, |a, b| a.contains(b)),
            Operator::Equals => {
                if self.compares_raw(schema) {
                    actual.is_some_and(|v| v.to_string() == self.value)
                } else {
                    string_test(actual, &self.value, |a, b| a == b)
                }
            }
            // Absent is never equal, so it is always "not equal".
            Operator::NotEquals => {
                actual.is_none() || string_test(actual, &self.value, |a, b| a != b)
            }
            Operator::StartsWith => string_test(actual, &self.value, |a, b| a.starts_with(b)),
            Operator::EndsWith => string_test(actual, &self.value, |a, b| a.ends_with(b)),
            Operator::GreaterThan => numeric_test(actual, &self.value, |a, b| a > b),
            Operator::LessThan => numeric_test(actual, &self.value, |a, b| a < b),
            Operator::GreaterEqual => numeric_test(actual, &self.value, |a, b| a >= b),
            Operator::LessEqual => numeric_test(actual, &self.value, |a, b| a <= b),
            Operator::Unknown(_) => true,
        }
    }

    fn compares_raw(&self, schema: &Schema) -> bool {
        self.field == RESERVED_BOOLEAN_FIELD
            || schema.field_type(&self.field) == Some(FieldType::Checkbox)
    }
}

fn string_test(actual: Option<&Value>, expected: &str, test: impl Fn(&str, &str) -> bool) -> bool {
    match actual {
        Some(v) => test(&v.to_string().to_lowercase(), &expected.to_lowercase()),
        None => false,
    }
}

fn numeric_test(actual: Option<&Value>, expected: &str, test: impl Fn(f64, f64) -> bool) -> bool {
    let a = actual.map_or(f64::NAN, Value::to_number);
    let b = parse_number(expected);
    // Every comparison against NaN is false.
    test(a, b)
}

/// The active filters, at most one per field, in the order they were set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list, keeping the last filter given for each field.
    pub fn from_filters(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut set = Self::new();
        for filter in filters {
            set.upsert(filter);
        }
        set
    }

    /// Set the filter for its field, replacing any existing one.
    pub fn upsert(&mut self, filter: Filter) {
        self.remove(&filter.field);
        self.filters.push(filter);
    }

    /// Remove the filter on `field`. Returns whether one existed.
    pub fn remove(&mut self, field: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.field != field);
        self.filters.len() != before
    }

    /// Remove every filter.
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// The filter on `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.field == field)
    }

    /// Active filters in order.
    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Number of active filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filter is active.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether `task` passes every filter.
    pub fn matches(&self, task: &Task, schema: &Schema) -> bool {
        evaluate(task, self.filters.iter(), schema)
    }
}

/// Whether `task` passes every filter in `filters`.
pub fn evaluate<'a>(
    task: &Task,
    filters: impl IntoIterator<Item = &'a Filter>,
    schema: &Schema,
) -> bool {
    filters.into_iter().all(|f| f.matches(task, schema))
}
