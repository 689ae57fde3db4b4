//! Per-row RPN evaluation and batch visibility application.
//!
//! Replays a validated RPN sequence once per row on a small value stack.
//! The validator has already resolved fields and pre-converted literals,
//! so evaluation is pure comparison: no parsing, no allocation beyond the
//! stack itself.
//!
//! `AND`/`OR` always evaluate both branches. Hidden flags for the whole
//! batch are collected first and committed only after every row evaluated
//! cleanly, so an evaluation failure leaves visibility untouched.

use std::cmp::Ordering;

use tabsift_table::{Cell, OrderVec, Row, Table};

use crate::error::{FilterError, Result};
use crate::rpn::{Operator, RpnToken};

/// One evaluation stack slot: an unconsumed operand, or a boolean result.
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Operand(&'a RpnToken),
    Truth(bool),
}

/// Apply a validated RPN filter to every entry of the order array.
///
/// Each entry's hidden flag is set to whether its row fails the filter.
/// On error no entry is modified.
pub fn apply(table: &Table, order: &mut OrderVec, rpn: &[RpnToken]) -> Result<()> {
    let mut hidden = Vec::with_capacity(order.len());
    for entry in order.entries() {
        let row = table
            .rows()
            .get(entry.row as usize)
            .ok_or_else(|| FilterError::Internal(format!("row {} out of range", entry.row)))?;
        hidden.push(!row_matches(row, rpn)?);
    }
    for (entry, hide) in order.entries_mut().iter_mut().zip(hidden) {
        entry.hidden = hide;
    }
    Ok(())
}

/// Evaluate the RPN sequence against one row.
pub fn row_matches(row: &Row, rpn: &[RpnToken]) -> Result<bool> {
    let mut stack: Vec<Slot> = Vec::new();

    for tok in rpn {
        match tok {
            RpnToken::Op(Operator::Not) => {
                let truth = pop_truth(&mut stack, "!")?;
                stack.push(Slot::Truth(!truth));
            }
            RpnToken::Op(op @ (Operator::And | Operator::Or)) => {
                // Both branches are already on the stack; no short-circuit.
                let right = pop_truth(&mut stack, op.symbol())?;
                let left = pop_truth(&mut stack, op.symbol())?;
                stack.push(Slot::Truth(match op {
                    Operator::And => left && right,
                    _ => left || right,
                }));
            }
            RpnToken::Op(op) => {
                let operand = match stack.pop() {
                    Some(Slot::Operand(t)) => t,
                    _ => return Err(stack_mismatch(op.symbol())),
                };
                let field = match stack.pop() {
                    Some(Slot::Operand(RpnToken::Field(f))) => f,
                    _ => return Err(stack_mismatch(op.symbol())),
                };
                let truth = compare(*op, row.cell(field), operand)?;
                stack.push(Slot::Truth(truth));
            }
            operand => stack.push(Slot::Operand(operand)),
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(slot), true) => Ok(truthy(slot)),
        _ => Err(FilterError::Internal(
            "evaluation left an unbalanced stack".to_string(),
        )),
    }
}

fn stack_mismatch(op: &str) -> FilterError {
    FilterError::Internal(format!("stack mismatch at operator {}", op))
}

fn pop_truth(stack: &mut Vec<Slot>, op: &str) -> Result<bool> {
    stack.pop().map(truthy).ok_or_else(|| stack_mismatch(op))
}

/// Truthiness of a slot: results are themselves; a bare operand is truthy
/// when non-empty / non-zero.
fn truthy(slot: Slot) -> bool {
    match slot {
        Slot::Truth(b) => b,
        Slot::Operand(RpnToken::Literal(s)) | Slot::Operand(RpnToken::Text(s)) => !s.is_empty(),
        Slot::Operand(RpnToken::Key(k)) => match k {
            tabsift_table::SortKey::Num(n) => *n != 0.0,
            tabsift_table::SortKey::Text(t) => !t.is_empty(),
        },
        Slot::Operand(RpnToken::Addr(a)) => *a != 0,
        Slot::Operand(_) => true,
    }
}

/// One comparison of a row cell against a pre-converted operand.
fn compare(op: Operator, cell: Option<&Cell>, operand: &RpnToken) -> Result<bool> {
    match (op, operand) {
        (Operator::Eq, RpnToken::Text(t)) => Ok(match_key(cell) == t),
        (Operator::Ne, RpnToken::Text(t)) => Ok(match_key(cell) != t),
        (Operator::Match, RpnToken::Pattern(re)) => Ok(re.is_match(match_key(cell))),
        (Operator::NotMatch, RpnToken::Pattern(re)) => Ok(!re.is_match(match_key(cell))),
        // A ranged cell is below the bound when its whole range is.
        (Operator::Lt, RpnToken::Key(bound)) => Ok(cell
            .and_then(|c| c.key.as_ref())
            .is_some_and(|key| key.upper().cmp_key(bound) == Ordering::Less)),
        (Operator::Gt, RpnToken::Key(bound)) => Ok(cell
            .and_then(|c| c.key.as_ref())
            .is_some_and(|key| key.lower().cmp_key(bound) == Ordering::Greater)),
        (Operator::InSubnet, RpnToken::Addr(addr)) => Ok(in_subnet(cell, *addr)),
        _ => Err(stack_mismatch(op.symbol())),
    }
}

fn match_key(cell: Option<&Cell>) -> &str {
    cell.and_then(|c| c.match_key.as_deref()).unwrap_or("")
}

/// `@=`: the queried address, masked by the cell's network mask, equals
/// the cell's network address.
fn in_subnet(cell: Option<&Cell>, addr: u32) -> bool {
    let Some(cell) = cell else {
        return false;
    };
    let Some(key) = &cell.key else {
        return false;
    };
    let tabsift_table::SortKey::Num(network) = key.lower() else {
        return false;
    };
    let mask = cell.mask.unwrap_or(u32::MAX);
    *network == (addr & mask) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use tabsift_table::{ColumnSchema, ColumnType, TableSchema};

    use crate::rpn::to_rpn;
    use crate::token::{tokenize, word_tokens, SYMBOL_TOKENS};
    use crate::validate::validate;

    fn table() -> Table {
        let schema = Arc::new(
            TableSchema::new(
                vec![
                    ColumnSchema::new("src", ColumnType::Ip),
                    ColumnSchema::new("proto", ColumnType::Str),
                    ColumnSchema::new("port", ColumnType::IntRange),
                ],
                None,
            )
            .unwrap(),
        );
        Table::new(
            schema,
            vec![
                json!({"src": "10.1.2.3", "proto": "tcp", "port": 80}),
                json!({"src": "10.1.0.0/16", "proto": "udp", "port": "1000-1024"}),
                json!({"src": "192.168.0.9", "proto": "tcp", "port": 443}),
            ],
        )
        .unwrap()
    }

    fn compiled(table: &Table, input: &str) -> Vec<RpnToken> {
        let words = word_tokens(table.schema());
        let tokens = tokenize(input, &words, &SYMBOL_TOKENS);
        let mut rpn = to_rpn(&tokens);
        validate(&mut rpn, table.schema()).unwrap();
        rpn
    }

    fn visible(table: &Table, input: &str) -> Vec<u32> {
        let rpn = compiled(table, input);
        let mut order = table.order();
        apply(table, &mut order, &rpn).unwrap();
        order.visible_rows().collect()
    }

    #[test]
    fn test_eq_case_insensitive() {
        assert_eq!(visible(&table(), "proto = TCP"), vec![0, 2]);
        assert_eq!(visible(&table(), "proto = tcp"), vec![0, 2]);
    }

    #[test]
    fn test_ne() {
        assert_eq!(visible(&table(), "proto != tcp"), vec![1]);
    }

    #[test]
    fn test_regex_match() {
        assert_eq!(visible(&table(), "src ~ ^10\\."), vec![0, 1]);
        assert_eq!(visible(&table(), "src !~ ^10\\."), vec![2]);
    }

    #[test]
    fn test_ordering_on_range_cells() {
        // port < 500: row 1's range reaches 1024, so only scalars qualify.
        assert_eq!(visible(&table(), "port < 500"), vec![0, 2]);
        // port > 100: row 1's range starts at 1000.
        assert_eq!(visible(&table(), "port > 100"), vec![1, 2]);
    }

    #[test]
    fn test_in_subnet() {
        // The /16 cell contains the queried host; host cells match only
        // their own address.
        assert_eq!(visible(&table(), "src @= 10.1.200.7"), vec![1]);
        assert_eq!(visible(&table(), "src @= 10.1.2.3"), vec![0, 1]);
        assert_eq!(visible(&table(), "src @= 192.168.0.9"), vec![2]);
    }

    #[test]
    fn test_and_or_precedence() {
        assert_eq!(
            visible(&table(), "proto = udp OR proto = tcp AND port > 100"),
            vec![1, 2]
        );
    }

    #[test]
    fn test_negated_group() {
        assert_eq!(visible(&table(), "!(proto = tcp)"), vec![1]);
        assert_eq!(
            visible(&table(), "NOT(proto = tcp OR port > 500)"),
            Vec::<u32>::new()
        );
    }

    #[test]
    fn test_missing_cell_compares_empty() {
        let schema = Arc::new(
            TableSchema::new(
                vec![
                    ColumnSchema::new("a", ColumnType::Str),
                    ColumnSchema::new("b", ColumnType::Str),
                ],
                None,
            )
            .unwrap(),
        );
        let table = Table::new(schema, vec![json!({"a": "x"})]).unwrap();
        assert_eq!(visible(&table, "b != x"), vec![0]);
        assert_eq!(visible(&table, "b = x"), Vec::<u32>::new());
    }

    #[test]
    fn test_failed_batch_leaves_visibility_untouched() {
        let table = table();
        let mut order = table.order();
        order.set_hidden(2, true);
        // Hand-built broken sequence, as if validation had been skipped.
        let rpn = vec![RpnToken::Op(Operator::Eq)];
        assert!(apply(&table, &mut order, &rpn).is_err());
        assert_eq!(order.visible_rows().collect::<Vec<_>>(), vec![0, 1]);
    }
}
