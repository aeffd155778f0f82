//! Condition compiler
//!
//! Turns editor rows into a filter document. Compilation never fails:
//! incomplete rows are skipped and unparseable numbers degrade per operator.

use super::clause::{Clause, FilterDocument, Scalar};
use super::condition::{ConditionRow, FieldType, Operator};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Compiler options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Skip `exists` rows whose value is empty, like any other row
    pub require_value_for_exists: bool,
}

impl CompileOptions {
    pub fn require_value_for_exists(mut self, required: bool) -> Self {
        self.require_value_for_exists = required;
        self
    }
}

/// Compiles condition rows into filter documents
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCompiler {
    options: CompileOptions,
}

impl FilterCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Compile rows in order; a later row on the same field replaces the earlier clause
    pub fn compile(&self, rows: &[ConditionRow]) -> FilterDocument {
        let mut doc = FilterDocument::new();

        for row in rows {
            if self.should_skip(row) {
                trace!(field = %row.field, operator = %row.operator, "skipping incomplete row");
                continue;
            }

            match Self::clause_for(row) {
                Some(clause) => {
                    doc.insert(row.field.clone(), clause);
                }
                None => {
                    trace!(field = %row.field, value = %row.value, "dropping row with unparseable number");
                }
            }
        }

        doc
    }

    /// Whether `row` produces a clause; false for skipped rows and unparseable comparisons
    pub fn contributes(&self, row: &ConditionRow) -> bool {
        !self.should_skip(row) && Self::clause_for(row).is_some()
    }

    fn should_skip(&self, row: &ConditionRow) -> bool {
        if row.field.trim().is_empty() {
            return true;
        }
        if !row.value.is_empty() {
            return false;
        }
        !(row.operator.is_value_independent() && !self.options.require_value_for_exists)
    }

    fn clause_for(row: &ConditionRow) -> Option<Clause> {
        let value = row.value.as_str();
        let clause = match row.operator {
            Operator::Equals => Clause::Literal(coerce_literal(row.field_type, value)),
            Operator::Contains => Clause::regex(value, true),
            Operator::StartsWith => Clause::regex(format!("^{}", value), true),
            Operator::EndsWith => Clause::regex(format!("{}$", value), true),
            Operator::Regex => Clause::regex(value, false),
            Operator::Greater => Clause::gt(parse_number(value)?),
            Operator::Less => Clause::lt(parse_number(value)?),
            Operator::Exists => Clause::Exists,
        };
        Some(clause)
    }
}

/// Compile with the given options
pub fn compile(rows: &[ConditionRow], options: CompileOptions) -> FilterDocument {
    FilterCompiler::new(options).compile(rows)
}

/// Equality coercion: numbers fall back to the raw string, booleans only match true/false
fn coerce_literal(field_type: FieldType, value: &str) -> Scalar {
    match field_type {
        FieldType::Number => match parse_number(value) {
            Some(n) => Scalar::Number(n),
            None => Scalar::String(value.to_string()),
        },
        FieldType::Boolean => match value.to_lowercase().as_str() {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => Scalar::String(value.to_string()),
        },
        FieldType::String | FieldType::Date | FieldType::Object => {
            Scalar::String(value.to_string())
        }
    }
}

/// Parse a finite number, ignoring surrounding whitespace
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
