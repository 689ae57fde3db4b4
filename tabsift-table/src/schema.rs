//! Column schema types.
//!
//! A table declares its columns once; the schema is immutable at runtime.
//! The set of column keys is the universe of valid filter field names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// Declared type of a column, driving normalization and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Free-form text, compared case-insensitively.
    Str,
    /// Integer scalar.
    Int,
    /// Integer range (`"80-443"`); a single integer is `min == max`.
    IntRange,
    /// IPv4 address with optional mask (`"10.1.2.3/24"`).
    Ip,
    /// Date or timestamp, ordered by epoch milliseconds.
    Date,
    /// Dotted/suffixed version string, ordered by a fixed-width hash.
    Version,
}

impl ColumnType {
    /// Whether cells of this type carry a min/max bound pair instead of a
    /// single scalar ordering key.
    pub fn is_ranged(self) -> bool {
        matches!(self, ColumnType::IntRange | ColumnType::Ip)
    }
}

/// One column declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Unique column key; also the filter field name (case-sensitive).
    pub key: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Display text for bad values in this column, overriding the
    /// table-level fallback.
    #[serde(default, rename = "displayFallback")]
    pub display_fallback: Option<String>,
    /// chrono format string for rendering epoch-valued `date` cells.
    #[serde(default, rename = "dateFormat")]
    pub date_format: Option<String>,
}

impl ColumnSchema {
    /// Create a column with no fallback and no date format.
    pub fn new(key: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            column_type,
            display_fallback: None,
            date_format: None,
        }
    }
}

/// Full table schema: ordered columns plus table-level defaults.
#[derive(Debug, Clone)]
pub struct TableSchema {
    columns: Vec<ColumnSchema>,
    /// Table-level bad-value display fallback.
    display_fallback: Option<String>,
    index: HashMap<String, usize>,
}

impl TableSchema {
    /// Build a schema from column declarations.
    ///
    /// Fails on duplicate column keys.
    pub fn new(columns: Vec<ColumnSchema>, display_fallback: Option<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if index.insert(col.key.clone(), i).is_some() {
                return Err(TableError::Schema(format!(
                    "duplicate column key: {}",
                    col.key
                )));
            }
        }
        Ok(Self {
            columns,
            display_fallback,
            index,
        })
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Look up a column by key (case-sensitive).
    pub fn column(&self, key: &str) -> Option<&ColumnSchema> {
        self.index.get(key).map(|&i| &self.columns[i])
    }

    /// Table-level bad-value display fallback.
    pub fn display_fallback(&self) -> Option<&str> {
        self.display_fallback.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_rejected() {
        let cols = vec![
            ColumnSchema::new("src", ColumnType::Ip),
            ColumnSchema::new("src", ColumnType::Str),
        ];
        assert!(TableSchema::new(cols, None).is_err());
    }

    #[test]
    fn test_column_lookup_case_sensitive() {
        let schema =
            TableSchema::new(vec![ColumnSchema::new("proto", ColumnType::Str)], None).unwrap();
        assert!(schema.column("proto").is_some());
        assert!(schema.column("Proto").is_none());
    }

    #[test]
    fn test_column_type_deserializes_lowercase() {
        let col: ColumnSchema =
            serde_json::from_str(r#"{"key": "port", "type": "intrange"}"#).unwrap();
        assert_eq!(col.column_type, ColumnType::IntRange);
        assert!(col.column_type.is_ranged());
    }
}
