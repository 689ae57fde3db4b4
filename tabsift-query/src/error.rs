//! Error types for filter validation and evaluation.

use thiserror::Error;

/// Errors surfaced to the user for a rejected or failed filter.
///
/// Every variant renders as a human-readable message identifying the first
/// problem encountered, echoing the offending literal where there is one.
/// Errors are values returned to the host application; they never
/// interrupt sorting, viewing or exporting, and a rejected filter leaves
/// the previous visibility state untouched.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Field name does not match any declared column key.
    #[error("Invalid field name: {0}")]
    InvalidField(String),

    /// Regex operand failed to compile.
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),

    /// IP literal could not be parsed.
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    /// Date literal malformed or outside the sane absolute-time bound.
    #[error("Invalid date: {0} (expected YYYY-MM-DD between 1999 and 2038)")]
    InvalidDate(String),

    /// Operator not applicable to the field's declared type.
    #[error("Operator {op} cannot be applied to field {field}")]
    InvalidOperator { op: &'static str, field: String },

    /// Malformed token sequence (missing operand, leftover operands, ...).
    #[error("Syntax error in filter: {0}")]
    Syntax(String),

    /// Evaluation-time stack mismatch; should not survive validation.
    #[error("Evaluation error: {0}")]
    Internal(String),
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
