//! Typed tabular data model for tabsift.
//!
//! This crate owns everything about the data itself: the declared column
//! schema, per-cell normalization into canonical comparable
//! representations, the shared row order/visibility array, and the stable
//! sort comparator. The filter query engine lives in `tabsift-query` and
//! only reads the representations produced here.
//!
//! # Design
//!
//! - **Normalize once**: every cell is normalized at load time; derived
//!   fields supplied by upstream data preparation are authoritative.
//! - **Total normalization**: malformed data becomes a tagged bad-value
//!   representation, never an error.
//! - **Composable order state**: one entry per row carries both the sort
//!   position and the hidden-by-filter flag, so filtering and sorting
//!   compose without losing each other's effect.

pub mod cell;
pub mod error;
pub mod net;
pub mod normalize;
pub mod order;
pub mod schema;
pub mod sort;
pub mod table;
pub mod value;
pub mod version;

pub use cell::{Cell, CompareKey, BAD_VALUE_CLASS};
pub use error::{Result, TableError};
pub use order::{OrderEntry, OrderVec, HIDDEN_FLAG, MAX_ROWS, ROW_INDEX_MASK};
pub use schema::{ColumnSchema, ColumnType, TableSchema};
pub use sort::sort_rows;
pub use table::{Row, Table};
pub use value::SortKey;
pub use version::version_hash;
