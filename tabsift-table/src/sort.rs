//! Stable row ordering over the shared order array.
//!
//! Sorting reorders entries of the [`OrderVec`](crate::order::OrderVec)
//! without touching their hidden flags, so a sort after a filter (or the
//! other way round) keeps both effects.
//!
//! Ranged columns sort by their "most relevant" bound per direction:
//! `cmpMin` ascending (smallest lower bound first), `cmpMax` descending
//! (largest upper bound first). This asymmetry is intentional.

use std::cmp::Ordering;

use crate::order::OrderVec;
use crate::table::Table;
use crate::value::SortKey;

/// Stable sort of the order array by one column's ordering keys.
///
/// Rows lacking the column (or an unknown column key altogether) order
/// before keyed rows ascending, after them descending. Equal keys keep
/// their current relative order.
pub fn sort_rows(table: &Table, order: &mut OrderVec, column_key: &str, ascending: bool) {
    tracing::debug!(column = column_key, ascending, "sorting rows");
    order.entries_mut().sort_by(|a, b| {
        let ka = row_key(table, a.row, column_key, ascending);
        let kb = row_key(table, b.row, column_key, ascending);
        let ord = match (ka, kb) {
            (Some(a), Some(b)) => a.cmp_key(b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

fn row_key<'a>(table: &'a Table, row: u32, column_key: &str, ascending: bool) -> Option<&'a SortKey> {
    let key = table
        .rows()
        .get(row as usize)?
        .cell(column_key)?
        .key
        .as_ref()?;
    Some(if ascending { key.lower() } else { key.upper() })
}
