//! Per-type cell value normalization.
//!
//! This module is the authoritative coercion logic turning a raw,
//! heterogeneously-typed cell value into its canonical comparable
//! representations (display text, match key, ordering key, range bounds,
//! network mask) based on the column's declared type.
//!
//! # Design
//!
//! - **Total**: normalization never fails. A value that cannot be honestly
//!   interpreted as its declared type gets a best-effort bad-value
//!   representation (floor ordering key, fallback display text, the
//!   `bad-value` presentation class) and stays filterable and renderable.
//! - **Override precedence**: derived fields already supplied by upstream
//!   data preparation, when correctly shaped for the column type, are kept
//!   as-is and never re-derived. Wrong-shaped keys (a scalar key on a
//!   ranged column, or vice versa) are actively removed and re-derived.
//! - **Idempotent**: normalizing an already-normalized cell changes
//!   nothing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::cell::{Cell, CompareKey, BAD_VALUE_CLASS};
use crate::net::parse_cidr;
use crate::schema::{ColumnSchema, ColumnType};
use crate::value::SortKey;
use crate::version::version_hash;

/// Render format for epoch-valued `date` cells without a column format.
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Epoch numbers below this magnitude are seconds, not milliseconds.
const EPOCH_MS_THRESHOLD: f64 = 1e12;

/// Normalize one cell in place for its column.
///
/// `table_fallback` is the table-level bad-value display text, consulted
/// after the per-cell and per-column fallbacks.
pub fn normalize(cell: &mut Cell, column: &ColumnSchema, table_fallback: Option<&str>) {
    let ct = column.column_type;

    // Keys of the wrong shape for this column type are removed, never
    // left stale.
    if let Some(key) = &cell.key {
        if !key_matches(key, ct) {
            cell.key = None;
        }
    }
    if ct != ColumnType::Ip {
        cell.mask = None;
    }

    let mut bad = false;
    if cell.key.is_none() {
        let (key, mask, is_bad) = derive_key(&cell.value, ct);
        cell.key = Some(key);
        if mask.is_some() {
            // An upstream-supplied mask stays authoritative.
            cell.mask = cell.mask.or(mask);
        }
        bad = is_bad;
    }
    if ct == ColumnType::Ip && cell.mask.is_none() {
        cell.mask = match &cell.value {
            Value::String(s) => parse_cidr(s).map(|(_, _, m)| m),
            _ => None,
        }
        .or(Some(0));
    }

    if cell.html.is_none() {
        let text = if bad {
            cell.display_fallback
                .clone()
                .or_else(|| column.display_fallback.clone())
                .or_else(|| table_fallback.map(str::to_owned))
                .unwrap_or_else(|| json_type_name(&cell.value).to_owned())
        } else {
            display_text(&cell.value, column)
        };
        cell.html = Some(text);
    }

    if cell.match_key.is_none() {
        let html = cell.html.as_deref().unwrap_or("");
        cell.match_key = Some(strip_markup(html).to_uppercase());
    }

    if bad {
        cell.css_classes.insert(BAD_VALUE_CLASS.to_string());
    }
}

/// Derive the ordering key (plus mask for `ip`) from the raw value.
///
/// Returns `(key, mask, bad)`; `bad` means the floor key was substituted
/// because the value could not be interpreted as the declared type.
fn derive_key(value: &Value, ct: ColumnType) -> (CompareKey, Option<u32>, bool) {
    match ct {
        ColumnType::Str => match value {
            Value::String(s) => (scalar_text(s.to_uppercase()), None, false),
            Value::Number(n) => (scalar_text(n.to_string()), None, false),
            Value::Bool(b) => (scalar_text(b.to_string().to_uppercase()), None, false),
            _ => (scalar_text(String::new()), None, true),
        },
        ColumnType::Int => {
            let parsed = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => leading_int(s).map(|i| i as f64),
                _ => None,
            };
            match parsed {
                Some(f) => (scalar_num(f), None, false),
                None => (scalar_num(f64::NEG_INFINITY), None, true),
            }
        }
        ColumnType::IntRange => {
            let bounds = match value {
                Value::Number(n) => n.as_f64().map(|f| (f.trunc(), f.trunc())),
                Value::String(s) => parse_int_range(s).map(|(a, b)| (a as f64, b as f64)),
                _ => None,
            };
            match bounds {
                Some((min, max)) => (range_num(min, max), None, false),
                None => (
                    range_num(f64::NEG_INFINITY, f64::NEG_INFINITY),
                    None,
                    true,
                ),
            }
        }
        ColumnType::Ip => {
            let parsed = match value {
                Value::String(s) => parse_cidr(s),
                _ => None,
            };
            match parsed {
                Some((net, bcast, mask)) => {
                    (range_num(net as f64, bcast as f64), Some(mask), false)
                }
                None => (range_num(0.0, 0.0), Some(0), true),
            }
        }
        ColumnType::Date => match date_epoch_ms(value) {
            Some(ms) => (scalar_num(ms as f64), None, false),
            None => (scalar_num(0.0), None, true),
        },
        ColumnType::Version => match value {
            Value::String(s) => (scalar_text(version_hash(s)), None, false),
            Value::Number(n) if n.as_f64().is_some_and(|f| f > 0.0) => {
                (scalar_text(version_hash(&n.to_string())), None, false)
            }
            _ => (scalar_text(String::new()), None, true),
        },
    }
}

fn scalar_text(s: String) -> CompareKey {
    CompareKey::Scalar(SortKey::Text(s))
}

fn scalar_num(f: f64) -> CompareKey {
    CompareKey::Scalar(SortKey::Num(f))
}

fn range_num(min: f64, max: f64) -> CompareKey {
    CompareKey::Range {
        min: SortKey::Num(min),
        max: SortKey::Num(max),
    }
}

/// Whether an existing key has the right shape and kind for the column.
fn key_matches(key: &CompareKey, ct: ColumnType) -> bool {
    matches!(
        (key, ct),
        (
            CompareKey::Scalar(SortKey::Text(_)),
            ColumnType::Str | ColumnType::Version
        ) | (
            CompareKey::Scalar(SortKey::Num(_)),
            ColumnType::Int | ColumnType::Date
        ) | (
            CompareKey::Range {
                min: SortKey::Num(_),
                max: SortKey::Num(_)
            },
            ColumnType::IntRange | ColumnType::Ip
        )
    )
}

/// Display text for a well-typed value.
fn display_text(value: &Value, column: &ColumnSchema) -> String {
    match (column.column_type, value) {
        (ColumnType::Date, Value::Number(_)) => {
            let ms = date_epoch_ms(value).unwrap_or(0);
            format_epoch(ms, column.date_format.as_deref())
        }
        (_, Value::String(s)) => s.clone(),
        (_, Value::Number(n)) => n.to_string(),
        (_, Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn format_epoch(ms: i64, fmt: Option<&str>) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.format(fmt.unwrap_or(DEFAULT_DATE_FORMAT)).to_string(),
        None => ms.to_string(),
    }
}

/// JSON runtime type name, the last-resort bad-value display text.
pub fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Remove `<...>` markup spans from display text.
pub fn strip_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Best-effort integer parse: optional sign plus leading digits, trailing
/// junk ignored.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i = 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    s[..i].parse::<i64>().ok()
}

/// Parse `<int>[non-digit]+<int>` or a single `<int>` (then `min == max`).
fn parse_int_range(s: &str) -> Option<(i64, i64)> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return None;
    }
    let min: i64 = s[..i].parse().ok()?;
    if i == bytes.len() {
        return Some((min, min));
    }
    let sep_start = i;
    while i < bytes.len() && !bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == sep_start || i == bytes.len() {
        return None;
    }
    let max_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i != bytes.len() {
        return None;
    }
    let max: i64 = s[max_start..].parse().ok()?;
    Some((min, max))
}

/// Epoch milliseconds from a date-like value.
///
/// Numbers are epoch seconds or milliseconds, disambiguated by magnitude.
pub fn date_epoch_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            let f = n.as_f64()?;
            if !f.is_finite() {
                return None;
            }
            if f.abs() < EPOCH_MS_THRESHOLD {
                Some((f * 1000.0) as i64)
            } else {
                Some(f as i64)
            }
        }
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

/// Parse a date string to epoch milliseconds.
///
/// A plain `YYYY-MM-DD` pins to noon UTC so timezone rendering cannot
/// shift the day.
pub fn parse_date_str(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(12, 0, 0)?.and_utc().timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    None
}
