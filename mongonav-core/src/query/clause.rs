//! Filter clause definitions
//!
//! Defines the MongoDB-style filter document produced by the compiler.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Number, Value as JsonValue};

/// Literal value in an equality clause
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Scalar {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Scalar::String(s) => JsonValue::String(s.clone()),
            Scalar::Number(n) => number_to_json(*n),
            Scalar::Bool(b) => JsonValue::Bool(*b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Gt,
    Lt,
}

impl ComparisonOp {
    pub fn key(self) -> &'static str {
        match self {
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Lt => "$lt",
        }
    }
}

/// A single field's condition
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// field: value
    Literal(Scalar),

    /// field: { $regex, $options? }
    Regex {
        pattern: String,
        case_insensitive: bool,
    },

    /// field: { $gt | $lt: value }
    Comparison { op: ComparisonOp, value: f64 },

    /// field: { $exists: true }
    Exists,
}

impl Clause {
    pub fn literal(value: impl Into<Scalar>) -> Self {
        Self::Literal(value.into())
    }

    pub fn regex(pattern: impl Into<String>, case_insensitive: bool) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            case_insensitive,
        }
    }

    pub fn gt(value: f64) -> Self {
        Self::Comparison {
            op: ComparisonOp::Gt,
            value,
        }
    }

    pub fn lt(value: f64) -> Self {
        Self::Comparison {
            op: ComparisonOp::Lt,
            value,
        }
    }

    /// Render the clause as the JSON value placed under the field key
    pub fn to_json(&self) -> JsonValue {
        match self {
            Clause::Literal(scalar) => scalar.to_json(),
            Clause::Regex {
                pattern,
                case_insensitive,
            } => {
                let mut obj = serde_json::Map::new();
                obj.insert("$regex".to_string(), JsonValue::String(pattern.clone()));
                if *case_insensitive {
                    obj.insert("$options".to_string(), JsonValue::String("i".to_string()));
                }
                JsonValue::Object(obj)
            }
            Clause::Comparison { op, value } => {
                let mut obj = serde_json::Map::new();
                obj.insert(op.key().to_string(), number_to_json(*value));
                JsonValue::Object(obj)
            }
            Clause::Exists => serde_json::json!({ "$exists": true }),
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Integral values that fit in i64 are emitted as JSON integers
fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return JsonValue::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Ordered mapping from field name to clause
///
/// Inserting an existing field replaces its clause in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterDocument {
    entries: Vec<(String, Clause)>,
}

impl FilterDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a clause, returning the clause it replaced
    pub fn insert(&mut self, field: impl Into<String>, clause: Clause) -> Option<Clause> {
        let field = field.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => Some(std::mem::replace(existing, clause)),
            None => {
                self.entries.push((field, clause));
                None
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Clause> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Clause)> {
        self.entries.iter().map(|(f, c)| (f.as_str(), c))
    }

    /// Field names in insertion order
    pub fn fields(&self) -> Vec<&str> {
        self.entries.iter().map(|(f, _)| f.as_str()).collect()
    }

    pub fn to_value(&self) -> JsonValue {
        let mut obj = serde_json::Map::new();
        for (field, clause) in &self.entries {
            obj.insert(field.clone(), clause.to_json());
        }
        JsonValue::Object(obj)
    }
}

impl Serialize for FilterDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, clause) in &self.entries {
            map.serialize_entry(field, clause)?;
        }
        map.end()
    }
}
