//! Canonical ordering keys.
//!
//! Every normalized cell carries one or two [`SortKey`]s: a single scalar
//! key for `str`/`int`/`date`/`version` columns, or a min/max bound pair for
//! `intrange`/`ip` columns. Keys are either numeric or textual; cells of one
//! column always share a kind, so the cross-kind ordering (numbers before
//! text) only decides the order between well-formed and degenerate data.

use std::cmp::Ordering;

/// A single canonical ordering key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Numeric key. `-Infinity` is the bad-value floor for numeric columns.
    Num(f64),
    /// Textual key (already upper-cased or hashed by the normalizer).
    Text(String),
}

impl SortKey {
    /// Bad-value floor for numeric columns.
    pub fn neg_inf() -> Self {
        SortKey::Num(f64::NEG_INFINITY)
    }

    /// Total order over keys.
    ///
    /// Numeric keys use `total_cmp`, so `-Infinity` floors and NaN cannot
    /// poison a sort. Numbers order before text.
    pub fn cmp_key(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Num(a), SortKey::Num(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Num(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Num(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_key(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_order() {
        assert_eq!(
            SortKey::Num(80.0).cmp_key(&SortKey::Num(443.0)),
            Ordering::Less
        );
        assert_eq!(
            SortKey::neg_inf().cmp_key(&SortKey::Num(f64::MIN)),
            Ordering::Less
        );
    }

    #[test]
    fn test_text_order() {
        assert_eq!(
            SortKey::Text("ABC".into()).cmp_key(&SortKey::Text("ABD".into())),
            Ordering::Less
        );
    }

    #[test]
    fn test_cross_kind_order() {
        assert_eq!(
            SortKey::Num(9.0).cmp_key(&SortKey::Text("1".into())),
            Ordering::Less
        );
    }
}
