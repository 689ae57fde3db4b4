//! Boolean filter query engine over typed table columns.
//!
//! Compiles user-typed filter strings (`src @= 10.0.0.0/8 AND proto = tcp`)
//! into validated RPN instruction sequences and applies them to the hidden
//! flags of a table's shared order array.
//!
//! # Design
//!
//! - **Three stages**: a lenient tokenizer that never fails, a
//!   shunting-yard parser producing RPN, and a strict validator that both
//!   rejects malformed filters and pre-converts literal operands, so the
//!   per-row evaluator does no parsing at all.
//! - **Type-aware operators**: `=`/`!=`/`~`/`!~` compare upper-cased match
//!   text; `<`/`>` compare canonical ordering keys by the left field's
//!   declared type; `@=` is subnet containment on `ip` fields only.
//! - **All-or-nothing**: a rejected or failed filter leaves row visibility
//!   exactly as it was.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use tabsift_table::{ColumnSchema, ColumnType, Table, TableSchema};
//! use tabsift_query::FilterEngine;
//!
//! let schema = Arc::new(TableSchema::new(
//!     vec![
//!         ColumnSchema::new("src", ColumnType::Ip),
//!         ColumnSchema::new("proto", ColumnType::Str),
//!     ],
//!     None,
//! )?);
//! let table = Table::new(Arc::clone(&schema), vec![
//!     json!({"src": "10.0.0.0/8", "proto": "tcp"}),
//!     json!({"src": "192.168.0.1", "proto": "udp"}),
//! ])?;
//!
//! let engine = FilterEngine::new(schema);
//! let mut order = table.order();
//! engine.apply("src @= 10.1.2.3 AND proto = tcp", &table, &mut order)?;
//! assert_eq!(order.visible_rows().collect::<Vec<_>>(), vec![0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engine;
pub mod error;
pub mod eval;
pub mod rpn;
pub mod token;
pub mod validate;

pub use engine::{CompiledFilter, FilterEngine};
pub use error::{FilterError, Result};
pub use rpn::{to_rpn, Operator, RpnToken};
pub use token::{tokenize, word_tokens, SYMBOL_TOKENS};
pub use validate::validate;
