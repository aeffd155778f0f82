//! Condition rows as entered in the query editor
//!
//! A row is a field name, a declared type, an operator and the raw text the
//! user typed. Coercion of the text happens later, in the compiler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a condition field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
    Object,
}

impl FieldType {
    /// All field types in editor order
    pub const ALL: [FieldType; 5] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Date,
        FieldType::Boolean,
        FieldType::Object,
    ];

    /// Operators the editor offers for this type, first one is the default
    pub fn operators(self) -> &'static [Operator] {
        match self {
            FieldType::String => &[
                Operator::Equals,
                Operator::Contains,
                Operator::StartsWith,
                Operator::EndsWith,
                Operator::Regex,
            ],
            FieldType::Number => &[Operator::Equals, Operator::Greater, Operator::Less],
            FieldType::Date => &[Operator::Equals],
            FieldType::Boolean => &[Operator::Equals],
            FieldType::Object => &[Operator::Exists, Operator::Equals],
        }
    }

    /// Check whether an operator is offered for this type
    pub fn supports(self, operator: Operator) -> bool {
        self.operators().contains(&operator)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ConditionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "object" => Ok(FieldType::Object),
            other => Err(ConditionParseError::UnknownType(other.to_string())),
        }
    }
}

/// Condition operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    #[default]
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    Greater,
    Less,
    Exists,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Regex => "regex",
            Operator::Greater => "greater",
            Operator::Less => "less",
            Operator::Exists => "exists",
        }
    }

    /// Operators whose clause does not depend on the entered value
    pub fn is_value_independent(self) -> bool {
        matches!(self, Operator::Exists)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ConditionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the camelCase names and the common symbolic shorthands
        match s.trim() {
            "equals" | "eq" | "=" => Ok(Operator::Equals),
            "contains" => Ok(Operator::Contains),
            "startsWith" | "startswith" => Ok(Operator::StartsWith),
            "endsWith" | "endswith" => Ok(Operator::EndsWith),
            "regex" => Ok(Operator::Regex),
            "greater" | "gt" | ">" => Ok(Operator::Greater),
            "less" | "lt" | "<" => Ok(Operator::Less),
            "exists" => Ok(Operator::Exists),
            other => Err(ConditionParseError::UnknownOperator(other.to_string())),
        }
    }
}

/// One row of the condition editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionRow {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub operator: Operator,
    pub value: String,
}

impl ConditionRow {
    pub fn new(
        field: impl Into<String>,
        field_type: FieldType,
        operator: Operator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            field_type,
            operator,
            value: value.into(),
        }
    }

    /// Whether the editor would offer this operator for the declared type
    pub fn is_supported(&self) -> bool {
        self.field_type.supports(self.operator)
    }
}

impl FromStr for ConditionRow {
    type Err = ConditionParseError;

    /// Parse `field:type:operator:value`; the value may itself contain `:`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let field = parts.next().unwrap_or_default();
        let (field_type, operator) = match (parts.next(), parts.next()) {
            (Some(t), Some(o)) => (t.parse::<FieldType>()?, o.parse::<Operator>()?),
            _ => return Err(ConditionParseError::Malformed(s.to_string())),
        };
        let value = parts.next().unwrap_or_default();

        Ok(Self::new(field, field_type, operator, value))
    }
}

/// Errors raised when reading condition rows from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionParseError {
    #[error("Unknown field type: {0}")]
    UnknownType(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Expected field:type:operator[:value], got '{0}'")]
    Malformed(String),
}
