//! Filter engine: compile-and-apply entry point.
//!
//! A [`FilterEngine`] is constructed explicitly for one schema and owns
//! the schema-derived tokenizer word list, so host applications with
//! several tables each get an independent engine and nothing is process
//! global.

use std::sync::Arc;

use tabsift_table::{OrderVec, Table, TableSchema};

use crate::error::Result;
use crate::eval;
use crate::rpn::{to_rpn, RpnToken};
use crate::token::{tokenize, word_tokens, SYMBOL_TOKENS};
use crate::validate::validate;

/// Compiled, validated filter, ready to apply to any table sharing the
/// engine's schema.
#[derive(Debug)]
pub struct CompiledFilter {
    rpn: Vec<RpnToken>,
}

/// Filter engine for one table schema.
#[derive(Debug)]
pub struct FilterEngine {
    schema: Arc<TableSchema>,
    words: Vec<String>,
}

impl FilterEngine {
    /// Build an engine for a schema, deriving the tokenizer word list
    /// from its column keys.
    pub fn new(schema: Arc<TableSchema>) -> Self {
        let words = word_tokens(&schema);
        Self { schema, words }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Split a filter string into raw tokens. Never fails; bad input is
    /// reported by [`compile`](Self::compile).
    pub fn tokenize(&self, input: &str) -> Vec<String> {
        tokenize(input, &self.words, &SYMBOL_TOKENS)
    }

    /// Tokenize, parse, and validate a filter string.
    pub fn compile(&self, input: &str) -> Result<CompiledFilter> {
        let tokens = self.tokenize(input);
        let mut rpn = to_rpn(&tokens);
        validate(&mut rpn, &self.schema)?;
        tracing::debug!(filter = input, ops = rpn.len(), "filter compiled");
        Ok(CompiledFilter { rpn })
    }

    /// Compile and apply a filter string to a table's order array.
    ///
    /// A blank filter clears every hidden flag. Rejected or failed
    /// filters return the error and leave visibility untouched.
    pub fn apply(&self, input: &str, table: &Table, order: &mut OrderVec) -> Result<()> {
        if input.trim().is_empty() {
            order.show_all();
            return Ok(());
        }
        let filter = self.compile(input)?;
        eval::apply(table, order, &filter.rpn)?;
        tracing::debug!(
            filter = input,
            visible = order.visible_rows().count(),
            "filter applied"
        );
        Ok(())
    }
}

impl CompiledFilter {
    /// The validated instruction sequence.
    pub fn rpn(&self) -> &[RpnToken] {
        &self.rpn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabsift_table::{ColumnSchema, ColumnType};

    fn engine_and_table() -> (FilterEngine, Table) {
        let schema = Arc::new(
            TableSchema::new(
                vec![
                    ColumnSchema::new("src", ColumnType::Ip),
                    ColumnSchema::new("proto", ColumnType::Str),
                ],
                None,
            )
            .unwrap(),
        );
        let table = Table::new(
            Arc::clone(&schema),
            vec![
                json!({"src": "10.0.0.1", "proto": "tcp"}),
                json!({"src": "10.0.0.2", "proto": "udp"}),
            ],
        )
        .unwrap();
        (FilterEngine::new(schema), table)
    }

    #[test]
    fn test_apply_hides_non_matching_rows() {
        let (engine, table) = engine_and_table();
        let mut order = table.order();
        engine.apply("proto = tcp", &table, &mut order).unwrap();
        assert_eq!(order.visible_rows().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_blank_filter_shows_all() {
        let (engine, table) = engine_and_table();
        let mut order = table.order();
        engine.apply("proto = tcp", &table, &mut order).unwrap();
        engine.apply("   ", &table, &mut order).unwrap();
        assert_eq!(order.visible_rows().count(), 2);
    }

    #[test]
    fn test_rejected_filter_leaves_visibility() {
        let (engine, table) = engine_and_table();
        let mut order = table.order();
        engine.apply("proto = tcp", &table, &mut order).unwrap();
        assert!(engine.apply("nope = 1", &table, &mut order).is_err());
        assert_eq!(order.visible_rows().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_compiled_filter_reusable() {
        let (engine, table) = engine_and_table();
        let filter = engine.compile("proto = udp").unwrap();
        let mut order = table.order();
        crate::eval::apply(&table, &mut order, filter.rpn()).unwrap();
        assert_eq!(order.visible_rows().collect::<Vec<_>>(), vec![1]);
    }
}
