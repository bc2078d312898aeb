//! Sample record filtering

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SampleRecord;
use crate::domain::DomainError;

/// A single condition applied to one field
#[derive(Debug, Clone)]
pub enum Condition {
    Equals(Value),
    Range { min: Option<f64>, max: Option<f64> },
    Contains(String),
    Matches(Regex),
    In(Vec<Value>),
    Not(Value),
    Gt(f64),
    Lt(f64),
    Gte(f64),
    Lte(f64),
}

impl Condition {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Equals(expected) => values_equal(value, expected),
            Self::Range { min, max } => as_number(value).is_some_and(|v| {
                min.is_none_or(|min| v >= min) && max.is_none_or(|max| v <= max)
            }),
            Self::Contains(needle) => display(value).to_lowercase().contains(needle),
            Self::Matches(regex) => regex.is_match(&display(value)),
            Self::In(options) => options.iter().any(|o| values_equal(value, o)),
            Self::Not(other) => !values_equal(value, other),
            Self::Gt(bound) => as_number(value).is_some_and(|v| v > *bound),
            Self::Lt(bound) => as_number(value).is_some_and(|v| v < *bound),
            Self::Gte(bound) => as_number(value).is_some_and(|v| v >= *bound),
            Self::Lte(bound) => as_number(value).is_some_and(|v| v <= *bound),
        }
    }
}

/// Conjunction of per-field conditions
#[derive(Debug, Clone, Default)]
pub struct SampleFilter {
    fields: Vec<(String, Vec<Condition>)>,
}

impl SampleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, field: impl Into<String>, condition: Condition) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, conditions)) => conditions.push(condition),
            None => self.fields.push((field, vec![condition])),
        }
        self
    }

    /// Parses the JSON filter object
    ///
    /// A scalar means equality. An object may combine `min`, `max`,
    /// `contains`, `regex`, `in`, `not`, `gt`, `lt`, `gte` and `lte`.
    pub fn from_json(filters: &serde_json::Map<String, Value>) -> Result<Self, DomainError> {
        let mut filter = Self::new();

        for (field, rule) in filters {
            match rule {
                Value::Object(ops) => {
                    if ops.is_empty() {
                        return Err(DomainError::validation(format!(
                            "Filter for '{}' has no operators",
                            field
                        )));
                    }

                    let (min, max) = (ops.get("min"), ops.get("max"));
                    if min.is_some() || max.is_some() {
                        filter = filter.with_condition(
                            field.clone(),
                            Condition::Range {
                                min: min.map(|v| number_operand(field, "min", v)).transpose()?,
                                max: max.map(|v| number_operand(field, "max", v)).transpose()?,
                            },
                        );
                    }

                    for (op, operand) in ops {
                        let condition = match op.as_str() {
                            "min" | "max" => continue,
                            "contains" => Condition::Contains(display(operand).to_lowercase()),
                            "regex" => Condition::Matches(compile_regex(field, operand)?),
                            "in" => match operand {
                                Value::Array(options) => Condition::In(options.clone()),
                                _ => {
                                    return Err(DomainError::validation(format!(
                                        "Operator 'in' on '{}' expects an array",
                                        field
                                    )));
                                }
                            },
                            "not" => Condition::Not(operand.clone()),
                            "gt" => Condition::Gt(number_operand(field, op, operand)?),
                            "lt" => Condition::Lt(number_operand(field, op, operand)?),
                            "gte" => Condition::Gte(number_operand(field, op, operand)?),
                            "lte" => Condition::Lte(number_operand(field, op, operand)?),
                            other => {
                                return Err(DomainError::validation(format!(
                                    "Unknown filter operator '{}' on '{}'",
                                    other, field
                                )));
                            }
                        };
                        filter = filter.with_condition(field.clone(), condition);
                    }
                }
                Value::Array(_) | Value::Null => {
                    return Err(DomainError::validation(format!(
                        "Filter for '{}' must be a scalar or an object",
                        field
                    )));
                }
                scalar => {
                    filter = filter.with_condition(field.clone(), Condition::Equals(scalar.clone()));
                }
            }
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every condition must hold; a missing or null field never matches
    pub fn matches(&self, sample: &SampleRecord) -> bool {
        self.fields.iter().all(|(field, conditions)| {
            match sample.get(field) {
                None | Some(Value::Null) => false,
                Some(value) => conditions.iter().all(|c| c.matches(value)),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Paging and ordering for a filter request
#[derive(Debug, Clone)]
pub struct SampleQuery {
    pub filter: SampleFilter,
    pub limit: usize,
    pub offset: usize,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

impl SampleQuery {
    pub fn new(filter: SampleFilter, limit: usize) -> Self {
        Self {
            filter,
            limit,
            offset: 0,
            sort_by: None,
            sort_order: SortOrder::Asc,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }
}

/// Filtered page of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePage {
    pub samples: Vec<SampleRecord>,
    pub total_samples: usize,
    pub filtered_count: usize,
    pub has_more: bool,
}

/// Applies the filter, optional sort and paging to a dataset's samples
pub fn apply(samples: Vec<SampleRecord>, query: &SampleQuery) -> SamplePage {
    let total_samples = samples.len();

    let mut filtered: Vec<SampleRecord> = samples
        .into_iter()
        .filter(|s| query.filter.matches(s))
        .collect();

    if let Some(field) = query.sort_by.as_deref() {
        filtered.sort_by(|a, b| {
            let ordering = compare_values(a.get(field), b.get(field));
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let filtered_count = filtered.len();
    let samples: Vec<SampleRecord> = filtered
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .collect();
    let has_more = query.offset + samples.len() < filtered_count;

    SamplePage {
        samples,
        total_samples,
        filtered_count,
        has_more,
    }
}

fn number_operand(field: &str, op: &str, operand: &Value) -> Result<f64, DomainError> {
    as_number(operand).ok_or_else(|| {
        DomainError::validation(format!(
            "Operator '{}' on '{}' expects a number",
            op, field
        ))
    })
}

fn compile_regex(field: &str, operand: &Value) -> Result<Regex, DomainError> {
    let pattern = operand.as_str().ok_or_else(|| {
        DomainError::validation(format!("Operator 'regex' on '{}' expects a string", field))
    })?;

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| DomainError::validation(format!("Invalid regex for '{}': {}", field, e)))
}

/// Numeric view of a value; numeric strings count
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
