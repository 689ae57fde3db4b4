//! Dry-run validation and operand pre-conversion.
//!
//! Walks the RPN sequence once, without touching row data, simulating
//! stack evaluation: field names must exist, operators must be applicable
//! to the field's declared type, and literal operands must convert to the
//! type's comparison representation. Literals are rewritten in place into
//! their converted form (upper-cased text, ordering key, compiled regex,
//! IP integer), so the row evaluator never parses anything.
//!
//! Any failure aborts with a descriptive error; no partial result is ever
//! evaluated.

use chrono::NaiveDate;
use regex::RegexBuilder;

use tabsift_table::net::ip2long;
use tabsift_table::normalize::leading_int;
use tabsift_table::{ColumnSchema, ColumnType, SortKey, TableSchema};

use crate::error::{FilterError, Result};
use crate::rpn::{Operator, RpnToken};

/// Epoch ms of 1999-01-01T00:00:00Z, the lower sane bound for date literals.
const MIN_DATE_MS: i64 = 915_148_800_000;
/// Epoch ms of 2038-01-19T00:00:00Z, the upper sane bound for date literals.
const MAX_DATE_MS: i64 = 2_147_472_000_000;

/// Simulated stack slot: an unconsumed operand (by RPN index) or the
/// result of an already-checked operator.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Operand(usize),
    Result,
}

/// Validate the RPN sequence against the schema, rewriting literal
/// operands in place.
pub fn validate(rpn: &mut [RpnToken], schema: &TableSchema) -> Result<()> {
    let mut stack: Vec<Slot> = Vec::new();

    for i in 0..rpn.len() {
        match rpn[i] {
            RpnToken::Op(Operator::Not) => {
                pop(&mut stack, "!")?;
                stack.push(Slot::Result);
            }
            RpnToken::Op(op @ (Operator::And | Operator::Or)) => {
                pop(&mut stack, op.symbol())?;
                pop(&mut stack, op.symbol())?;
                stack.push(Slot::Result);
            }
            RpnToken::Op(op) => {
                let right = pop(&mut stack, op.symbol())?;
                let left = pop(&mut stack, op.symbol())?;
                let (Slot::Operand(li), Slot::Operand(ri)) = (left, right) else {
                    return Err(FilterError::Syntax(format!(
                        "operator {} needs a field and a literal",
                        op.symbol()
                    )));
                };

                let field = match &rpn[li] {
                    RpnToken::Literal(s) => s.clone(),
                    _ => {
                        return Err(FilterError::Syntax(format!(
                            "operator {} applied to a non-field operand",
                            op.symbol()
                        )))
                    }
                };
                let column = schema
                    .column(&field)
                    .ok_or_else(|| FilterError::InvalidField(field.clone()))?;

                let literal = match &rpn[ri] {
                    RpnToken::Literal(s) => unquote(s).to_string(),
                    _ => {
                        return Err(FilterError::Syntax(format!(
                            "operator {} applied to an already-consumed operand",
                            op.symbol()
                        )))
                    }
                };

                rpn[ri] = convert_literal(op, &literal, column)?;
                rpn[li] = RpnToken::Field(field);
                stack.push(Slot::Result);
            }
            _ => stack.push(Slot::Operand(i)),
        }
    }

    if stack.len() != 1 {
        return Err(FilterError::Syntax(format!(
            "expected a single result, found {} values",
            stack.len()
        )));
    }
    Ok(())
}

fn pop(stack: &mut Vec<Slot>, op: &str) -> Result<Slot> {
    stack
        .pop()
        .ok_or_else(|| FilterError::Syntax(format!("missing operand for {}", op)))
}

/// Strip surrounding double quotes from a quoted literal.
fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Convert a literal operand into the comparison-ready form for one
/// operator applied to one column.
fn convert_literal(op: Operator, literal: &str, column: &ColumnSchema) -> Result<RpnToken> {
    match op {
        Operator::Eq | Operator::Ne => Ok(RpnToken::Text(literal.to_uppercase())),

        Operator::Match | Operator::NotMatch => RegexBuilder::new(literal)
            .case_insensitive(true)
            .build()
            .map(RpnToken::Pattern)
            .map_err(|_| FilterError::InvalidRegex(literal.to_string())),

        Operator::Lt | Operator::Gt => match column.column_type {
            ColumnType::Ip => ip2long(literal)
                .map(|v| RpnToken::Key(SortKey::Num(v as f64)))
                .ok_or_else(|| FilterError::InvalidAddress(literal.to_string())),
            ColumnType::Date => filter_date_ms(literal)
                .map(|ms| RpnToken::Key(SortKey::Num(ms as f64)))
                .ok_or_else(|| FilterError::InvalidDate(literal.to_string())),
            ColumnType::Int | ColumnType::IntRange => Ok(RpnToken::Key(SortKey::Num(
                leading_int(literal).unwrap_or(0) as f64,
            ))),
            ColumnType::Version => Ok(RpnToken::Key(SortKey::Text(
                tabsift_table::version_hash(literal),
            ))),
            ColumnType::Str => Ok(RpnToken::Key(SortKey::Text(literal.to_uppercase()))),
        },

        Operator::InSubnet => {
            if column.column_type != ColumnType::Ip {
                return Err(FilterError::InvalidOperator {
                    op: "@=",
                    field: column.key.clone(),
                });
            }
            ip2long(literal)
                .map(RpnToken::Addr)
                .ok_or_else(|| FilterError::InvalidAddress(literal.to_string()))
        }

        Operator::And | Operator::Or | Operator::Not => Err(FilterError::Internal(format!(
            "{} is not a comparison operator",
            op.symbol()
        ))),
    }
}

/// Parse a strict `YYYY-MM-DD` date literal to noon-UTC epoch ms, within
/// the sane absolute-time bound.
fn filter_date_ms(literal: &str) -> Option<i64> {
    if !is_plain_date(literal) {
        return None;
    }
    let ms = NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(12, 0, 0)?
        .and_utc()
        .timestamp_millis();
    (MIN_DATE_MS..=MAX_DATE_MS).contains(&ms).then_some(ms)
}

fn is_plain_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, &c)| match i {
            4 | 7 => c == b'-',
            _ => c.is_ascii_digit(),
        })
}
