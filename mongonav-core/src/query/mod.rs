//! Query building for the navigator
//!
//! Condition rows from the editor are compiled into MongoDB-style filter documents

pub mod clause;
pub mod compiler;
pub mod condition;

pub use clause::{Clause, ComparisonOp, FilterDocument, Scalar};
pub use compiler::{compile, parse_number, CompileOptions, FilterCompiler};
pub use condition::{ConditionParseError, ConditionRow, FieldType, Operator};
