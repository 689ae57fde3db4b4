//! Cell model: a raw value plus its canonical comparable representations.
//!
//! Raw cell values are heterogeneously typed JSON; normalization derives
//! the representations the filter and sort layers compare against:
//!
//! - `html`: display text, always present after normalization
//! - `match_key`: upper-cased, markup-stripped text for `=`/`!=`/`~`/`!~`
//! - `key`: scalar ordering key, or a min/max bound pair for ranged types
//! - `mask`: applied network mask, `ip` cells only
//!
//! Scalar key vs bound pair is a [`CompareKey`] variant, so a cell can
//! never carry both shapes at once.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::value::SortKey;

/// Presentation class tagging cells whose raw value could not be honestly
/// interpreted as the column's declared type.
pub const BAD_VALUE_CLASS: &str = "bad-value";

/// Ordering representation of one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareKey {
    /// Single ordering key (`str`, `int`, `date`, `version`).
    Scalar(SortKey),
    /// Bound pair (`intrange`, `ip`).
    Range { min: SortKey, max: SortKey },
}

impl CompareKey {
    /// Bound used by ascending sorts and `>` comparisons.
    pub fn lower(&self) -> &SortKey {
        match self {
            CompareKey::Scalar(k) => k,
            CompareKey::Range { min, .. } => min,
        }
    }

    /// Bound used by descending sorts and `<` comparisons.
    pub fn upper(&self) -> &SortKey {
        match self {
            CompareKey::Scalar(k) => k,
            CompareKey::Range { max, .. } => max,
        }
    }

    /// Whether this is a min/max bound pair.
    pub fn is_range(&self) -> bool {
        matches!(self, CompareKey::Range { .. })
    }
}

/// One table cell.
///
/// Derived fields are `None` until [`normalize`](crate::normalize::normalize)
/// runs; after normalization `html` is always present and `match_key` is
/// present for every cell that exists at all (structurally absent values
/// simply have no `Cell`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Raw value as received from upstream data preparation.
    pub value: Value,
    /// Display text.
    pub html: Option<String>,
    /// Upper-cased, markup-stripped comparison text.
    pub match_key: Option<String>,
    /// Ordering key(s) appropriate to the column type.
    pub key: Option<CompareKey>,
    /// Applied network mask, `ip` cells only.
    pub mask: Option<u32>,
    /// Per-cell bad-value display override supplied by upstream data.
    pub display_fallback: Option<String>,
    /// Presentation tags; includes [`BAD_VALUE_CLASS`] for bad values.
    pub css_classes: BTreeSet<String>,
}

impl Cell {
    /// Build a cell from a raw JSON value.
    ///
    /// A plain scalar becomes the cell's `value`. An object carrying a
    /// `"value"` key is the detailed upstream form: any correctly-typed
    /// derived fields it supplies (`html`, `match`, `cmp`, `cmpMin`,
    /// `cmpMax`, `mask`, `cssClass`, `displayFallback`) are kept as
    /// authoritative and will not be re-derived by normalization.
    pub fn from_raw(raw: Value) -> Self {
        let Value::Object(mut map) = raw else {
            return Cell {
                value: raw,
                ..Default::default()
            };
        };
        if !map.contains_key("value") {
            return Cell {
                value: Value::Object(map),
                ..Default::default()
            };
        }

        let value = map.remove("value").unwrap_or(Value::Null);
        let html = take_string(&mut map, "html");
        let match_key = take_string(&mut map, "match");
        let cmp = map.remove("cmp").as_ref().and_then(value_key);
        let cmp_min = map.remove("cmpMin").as_ref().and_then(value_key);
        let cmp_max = map.remove("cmpMax").as_ref().and_then(value_key);
        let key = match (cmp_min, cmp_max) {
            (Some(min), Some(max)) => Some(CompareKey::Range { min, max }),
            _ => cmp.map(CompareKey::Scalar),
        };
        let mask = match map.remove("mask") {
            Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            _ => None,
        };
        let css_classes = class_set(map.remove("cssClass"));
        let display_fallback = take_string(&mut map, "displayFallback");

        Cell {
            value,
            html,
            match_key,
            key,
            mask,
            display_fallback,
            css_classes,
        }
    }

    /// Display text; empty until normalized.
    pub fn display(&self) -> &str {
        self.html.as_deref().unwrap_or("")
    }

    /// Whether the cell is tagged as a bad value.
    pub fn is_bad(&self) -> bool {
        self.css_classes.contains(BAD_VALUE_CLASS)
    }
}

/// Interpret a JSON value as an ordering key: numbers and strings only.
fn value_key(v: &Value) -> Option<SortKey> {
    match v {
        Value::Number(n) => n.as_f64().map(SortKey::Num),
        Value::String(s) => Some(SortKey::Text(s.clone())),
        _ => None,
    }
}

fn take_string(map: &mut serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Parse a presentation tag set: a single string or an array of strings.
pub(crate) fn class_set(raw: Option<Value>) -> BTreeSet<String> {
    match raw {
        Some(Value::String(s)) => std::iter::once(s).collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    }
}
