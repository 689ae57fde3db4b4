//! Operators, RPN instructions, and the shunting-yard conversion.
//!
//! The parser turns the raw token sequence into a Reverse-Polish-Notation
//! instruction sequence. Operands start out as raw [`RpnToken::Literal`]s;
//! the validator resolves left operands into [`RpnToken::Field`]s and
//! rewrites right operands into their comparison-ready form in place. The
//! sequence is built fresh per filter submission and discarded after
//! evaluation.

use regex::Regex;

use tabsift_table::SortKey;

/// Filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` / `==`: case-insensitive exact match.
    Eq,
    /// `!=`: case-insensitive exact non-match.
    Ne,
    /// `~`: case-insensitive regex match.
    Match,
    /// `!~`: case-insensitive regex non-match.
    NotMatch,
    /// `<`: type-aware ordering.
    Lt,
    /// `>`: type-aware ordering.
    Gt,
    /// `@=`: IP-in-subnet containment, `ip` fields only.
    InSubnet,
    /// `AND`, binding tighter than `OR`.
    And,
    /// `OR`.
    Or,
    /// Unary negation of a parenthesized group.
    Not,
}

impl Operator {
    /// Canonical symbol, for error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Match => "~",
            Operator::NotMatch => "!~",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::InSubnet => "@=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "!",
        }
    }

    /// Map a raw token to an operator, if it is one.
    ///
    /// Word operators match case-insensitively.
    pub fn from_token(tok: &str) -> Option<Operator> {
        match tok {
            "=" | "==" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            "~" => Some(Operator::Match),
            "!~" => Some(Operator::NotMatch),
            "<" => Some(Operator::Lt),
            ">" => Some(Operator::Gt),
            "@=" => Some(Operator::InSubnet),
            _ if tok.eq_ignore_ascii_case("AND") => Some(Operator::And),
            _ if tok.eq_ignore_ascii_case("OR") => Some(Operator::Or),
            _ => None,
        }
    }

    /// Precedence tier: comparisons above `AND` above `OR`.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Not => 4,
            Operator::And => 2,
            Operator::Or => 1,
            _ => 3,
        }
    }

    /// Whether this is a binary comparison (not a boolean connective).
    pub fn is_comparison(self) -> bool {
        !matches!(self, Operator::And | Operator::Or | Operator::Not)
    }
}

/// One RPN instruction: an operand or an operator.
///
/// Operand variants beyond `Literal` are produced by the validator's
/// in-place pre-conversion.
#[derive(Debug, Clone)]
pub enum RpnToken {
    /// Resolved field name (a declared column key).
    Field(String),
    /// Raw literal, not yet validated (quotes still attached if quoted).
    Literal(String),
    /// Upper-cased text operand for `=`/`==`/`!=`.
    Text(String),
    /// Ordering-key operand for `<`/`>`.
    Key(SortKey),
    /// Compiled case-insensitive pattern for `~`/`!~`.
    Pattern(Regex),
    /// IP literal as a 32-bit integer for `@=`.
    Addr(u32),
    /// Operator.
    Op(Operator),
}

#[derive(Debug, Clone, Copy)]
enum StackOp {
    Op(Operator),
    /// `(` — plain group marker.
    Open,
    /// `!(` or `NOT(` — negated group marker.
    OpenNegated,
}

/// Convert a token sequence into RPN via shunting-yard.
///
/// All three opening forms push a marker onto the operator stack; a `)`
/// pops operators to the output until its marker, and appends a unary `!`
/// when that marker was negated. Unbalanced input is passed through
/// leniently; the validator reports it as a syntax error.
pub fn to_rpn(tokens: &[String]) -> Vec<RpnToken> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<StackOp> = Vec::new();

    for tok in tokens {
        if tok == "(" {
            stack.push(StackOp::Open);
        } else if tok.eq_ignore_ascii_case("!(") || tok.eq_ignore_ascii_case("NOT(") {
            stack.push(StackOp::OpenNegated);
        } else if tok == ")" {
            while let Some(top) = stack.pop() {
                match top {
                    StackOp::Op(op) => output.push(RpnToken::Op(op)),
                    StackOp::Open => break,
                    StackOp::OpenNegated => {
                        output.push(RpnToken::Op(Operator::Not));
                        break;
                    }
                }
            }
        } else if let Some(op) = Operator::from_token(tok) {
            while let Some(StackOp::Op(top)) = stack.last().copied() {
                if top.precedence() < op.precedence() {
                    break;
                }
                stack.pop();
                output.push(RpnToken::Op(top));
            }
            stack.push(StackOp::Op(op));
        } else {
            output.push(RpnToken::Literal(tok.clone()));
        }
    }

    while let Some(top) = stack.pop() {
        if let StackOp::Op(op) = top {
            output.push(RpnToken::Op(op));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn shape(rpn: &[RpnToken]) -> Vec<String> {
        rpn.iter()
            .map(|t| match t {
                RpnToken::Literal(s) => s.clone(),
                RpnToken::Op(op) => op.symbol().to_string(),
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // a = 1 OR b = 2 AND c = 3  →  a 1 = b 2 = c 3 = AND OR
        let rpn = to_rpn(&toks(&[
            "a", "=", "1", "OR", "b", "=", "2", "AND", "c", "=", "3",
        ]));
        assert_eq!(
            shape(&rpn),
            vec!["a", "1", "=", "b", "2", "=", "c", "3", "=", "AND", "OR"]
        );
    }

    #[test]
    fn test_parens_override_precedence() {
        // (a = 1 OR b = 2) AND c = 3
        let rpn = to_rpn(&toks(&[
            "(", "a", "=", "1", "OR", "b", "=", "2", ")", "AND", "c", "=", "3",
        ]));
        assert_eq!(
            shape(&rpn),
            vec!["a", "1", "=", "b", "2", "=", "OR", "c", "3", "=", "AND"]
        );
    }

    #[test]
    fn test_negated_group_appends_not() {
        let rpn = to_rpn(&toks(&["!(", "a", "=", "1", ")"]));
        assert_eq!(shape(&rpn), vec!["a", "1", "=", "!"]);
        let rpn = to_rpn(&toks(&["NOT(", "a", "=", "1", ")"]));
        assert_eq!(shape(&rpn), vec!["a", "1", "=", "!"]);
    }

    #[test]
    fn test_left_associative_same_tier() {
        // a = 1 AND b = 2 AND c = 3 → ... AND AND, left first
        let rpn = to_rpn(&toks(&[
            "a", "=", "1", "AND", "b", "=", "2", "AND", "c", "=", "3",
        ]));
        assert_eq!(
            shape(&rpn),
            vec!["a", "1", "=", "b", "2", "=", "AND", "c", "3", "=", "AND"]
        );
    }

    #[test]
    fn test_unbalanced_is_lenient() {
        // Missing close paren: operators still drain; validator decides.
        let rpn = to_rpn(&toks(&["(", "a", "=", "1"]));
        assert_eq!(shape(&rpn), vec!["a", "1", "="]);
    }
}
