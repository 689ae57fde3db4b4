//! Row and table containers.
//!
//! Rows arrive as JSON objects keyed by column key; every cell is
//! normalized exactly once at load time, so the filter and sort layers
//! only ever see canonical comparable representations.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::Value;

use crate::cell::{class_set, Cell};
use crate::error::{Result, TableError};
use crate::normalize::normalize;
use crate::order::{OrderVec, MAX_ROWS};
use crate::schema::TableSchema;

/// Reserved raw-row key carrying row-level presentation tags.
const ROW_CLASS_KEY: &str = "cssClass";

/// One table row: cells keyed by column key plus row-level tags.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: HashMap<String, Cell>,
    /// Row-level presentation tag set.
    pub css_classes: BTreeSet<String>,
}

impl Row {
    /// Cell for a column, if the raw row carried that key at all.
    pub fn cell(&self, key: &str) -> Option<&Cell> {
        self.cells.get(key)
    }
}

/// A loaded table: immutable schema plus normalized rows.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Arc<TableSchema>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from raw row objects, normalizing every cell.
    ///
    /// Raw rows must be JSON objects; keys not declared in the schema are
    /// ignored, and declared keys absent from a row leave that cell
    /// structurally absent. Fails if the row count exceeds what the
    /// order/visibility encoding can address.
    pub fn new(schema: Arc<TableSchema>, raw_rows: Vec<Value>) -> Result<Self> {
        if raw_rows.len() > MAX_ROWS {
            return Err(TableError::TooManyRows(raw_rows.len()));
        }
        let mut rows = Vec::with_capacity(raw_rows.len());
        for (i, raw) in raw_rows.into_iter().enumerate() {
            let Value::Object(mut map) = raw else {
                return Err(TableError::Schema(format!("row {} is not an object", i)));
            };
            let css_classes = class_set(map.remove(ROW_CLASS_KEY));
            let mut cells = HashMap::with_capacity(schema.columns().len());
            for column in schema.columns() {
                let Some(raw_cell) = map.remove(&column.key) else {
                    continue;
                };
                let mut cell = Cell::from_raw(raw_cell);
                normalize(&mut cell, column, schema.display_fallback());
                cells.insert(column.key.clone(), cell);
            }
            rows.push(Row { cells, css_classes });
        }
        tracing::debug!(rows = rows.len(), "table loaded");
        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fresh identity order over this table's rows, all visible.
    pub fn order(&self) -> OrderVec {
        OrderVec::identity(self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, ColumnType};
    use serde_json::json;

    fn schema() -> Arc<TableSchema> {
        Arc::new(
            TableSchema::new(
                vec![
                    ColumnSchema::new("src", ColumnType::Ip),
                    ColumnSchema::new("proto", ColumnType::Str),
                ],
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_rows_normalized_at_load() {
        let table = Table::new(
            schema(),
            vec![json!({"src": "10.1.2.3", "proto": "tcp"})],
        )
        .unwrap();
        let cell = table.rows()[0].cell("proto").unwrap();
        assert_eq!(cell.match_key.as_deref(), Some("TCP"));
    }

    #[test]
    fn test_missing_column_is_absent() {
        let table = Table::new(schema(), vec![json!({"proto": "udp"})]).unwrap();
        assert!(table.rows()[0].cell("src").is_none());
    }

    #[test]
    fn test_row_level_classes() {
        let table = Table::new(
            schema(),
            vec![json!({"proto": "tcp", "cssClass": ["alert", "new"]})],
        )
        .unwrap();
        assert!(table.rows()[0].css_classes.contains("alert"));
    }

    #[test]
    fn test_non_object_row_rejected() {
        assert!(Table::new(schema(), vec![json!("nope")]).is_err());
    }
}
