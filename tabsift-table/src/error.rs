//! Error types for table and schema construction.

use thiserror::Error;

/// Errors from table and schema construction.
///
/// Note that cell normalization never errors: malformed cell values are
/// absorbed into a best-effort bad-value representation so the table stays
/// renderable. Only structural problems (duplicate column keys, non-object
/// rows, row count overflow) are reported here.
#[derive(Debug, Error)]
pub enum TableError {
    /// Schema or structural error (duplicate column key, row shape, etc.)
    #[error("Schema error: {0}")]
    Schema(String),

    /// More rows than the order/visibility encoding can address.
    #[error("Too many rows: {0} (limit {max})", max = crate::order::MAX_ROWS)]
    TooManyRows(usize),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
