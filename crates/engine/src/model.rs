use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::MatchError;

// ---------------------------------------------------------------------------
// Values + records
// ---------------------------------------------------------------------------

/// A flat scalar held by a record field.
///
/// `PartialEq` is strict equality: same variant and same payload, no coercion
/// between variants, and `NaN` never equals itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

// Integral numbers go out as JSON integers so `{"id": 1}` survives a round trip.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// One row: field name -> value, in insertion order.
pub type Record = IndexMap<String, Value>;

/// An ordered list of records.
pub type Collection = Vec<Record>;

/// Build a record from `(field, value)` pairs.
pub fn record<K, V, I>(fields: I) -> Record
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

// ---------------------------------------------------------------------------
// Logical operator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl FromStr for LogicalOperator {
    type Err = MatchError;

    /// Case-insensitive: "and", "AND", "Or", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(MatchError::InvalidArgument(format!(
                "logical operator must be \"and\" or \"or\", got {s:?}"
            ))),
        }
    }
}

impl std::fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Char range `[start, end)` compared on both sides of a substring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubstringRange {
    pub start: usize,
    pub end: usize,
}

/// A single field comparison. Without `substring` the rule is exact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchRule {
    pub field: String,
    #[serde(default)]
    pub substring: Option<SubstringRange>,
}

impl MatchRule {
    pub fn exact(field: impl Into<String>) -> Self {
        Self { field: field.into(), substring: None }
    }

    pub fn substring(field: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            field: field.into(),
            substring: Some(SubstringRange { start, end }),
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if let Some(range) = self.substring {
            if range.start > range.end {
                return Err(MatchError::InvalidArgument(format!(
                    "rule '{}': substring start {} is past end {}",
                    self.field, range.start, range.end
                )));
            }
        }
        Ok(())
    }
}

/// Exact rules over the same field name on both sides.
pub fn exact_rules<S: AsRef<str>>(fields: &[S]) -> Vec<MatchRule> {
    fields.iter().map(|f| MatchRule::exact(f.as_ref())).collect()
}

/// Copy `right[source]` into `result[target]` when merging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeField {
    pub source: String,
    pub target: String,
}

impl MergeField {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

/// Literal field/value pair used by the key/value filters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyValue {
    pub field: String,
    pub value: Value,
}

impl KeyValue {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), value: value.into() }
    }
}

/// Field rename applied by `reshape::rename_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

impl Rename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into() }
    }
}
