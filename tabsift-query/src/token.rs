//! Filter string tokenization.
//!
//! Splits a raw filter string into an ordered sequence of raw token
//! strings, given the known word tokens (column keys plus `AND`/`OR`) and
//! the fixed symbol tokens. Both lists are pre-sorted by descending length
//! so longer tokens win over their textual prefixes (`!=` before `!`,
//! `==` before `=`).
//!
//! At each scan position, in priority order:
//!
//! 1. a double-quoted literal (kept with its quotes), or a symbol token
//! 2. a word-boundary-delimited word token (`AND`/`OR` case-insensitive,
//!    field names case-sensitive)
//! 3. an unquoted literal, up to the next whitespace or parenthesis
//!
//! Tokenizing never fails: unresolvable input degenerates into catch-all
//! literal tokens and the validator reports the problem.

use once_cell::sync::Lazy;

use tabsift_table::TableSchema;

/// Fixed symbol tokens, longest first.
///
/// `NOT(` and `!(` open a negated group; the rest are comparison
/// operators and parentheses.
pub static SYMBOL_TOKENS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut toks = vec![
        "NOT(", "!(", "@=", "==", "!=", "!~", "=", "~", "<", ">", "(", ")",
    ];
    toks.sort_by(|a, b| b.len().cmp(&a.len()));
    toks
});

/// Word tokens for a schema: every column key plus `AND`/`OR`,
/// longest first.
pub fn word_tokens(schema: &TableSchema) -> Vec<String> {
    let mut words: Vec<String> = schema.columns().iter().map(|c| c.key.clone()).collect();
    words.push("AND".to_string());
    words.push("OR".to_string());
    words.sort_by(|a, b| b.len().cmp(&a.len()));
    words
}

/// Tokenize a filter string.
pub fn tokenize(input: &str, words: &[String], symbols: &[&str]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        if rest.starts_with('"') {
            match rest[1..].find('"') {
                Some(end) => {
                    tokens.push(rest[..end + 2].to_string());
                    rest = &rest[end + 2..];
                }
                None => {
                    // Unterminated quote: the remainder is one literal.
                    tokens.push(rest.to_string());
                    rest = "";
                }
            }
        } else if let Some(sym) = symbols.iter().find(|s| starts_with_ci(rest, s)) {
            tokens.push(rest[..sym.len()].to_string());
            rest = &rest[sym.len()..];
        } else if let Some(word) = words.iter().find(|w| word_match(rest, w)) {
            tokens.push(rest[..word.len()].to_string());
            rest = &rest[word.len()..];
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                .unwrap_or(rest.len());
            tokens.push(rest[..end].to_string());
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }

    tokens
}

/// ASCII-case-insensitive prefix check, safe on any UTF-8 input.
fn starts_with_ci(rest: &str, token: &str) -> bool {
    rest.len() >= token.len()
        && rest.is_char_boundary(token.len())
        && rest[..token.len()].eq_ignore_ascii_case(token)
}

/// Word token match: the token, followed by a word boundary.
///
/// `AND`/`OR` match case-insensitively; everything else (field names) is
/// exact.
fn word_match(rest: &str, word: &str) -> bool {
    if rest.len() < word.len() || !rest.is_char_boundary(word.len()) {
        return false;
    }
    let head = &rest[..word.len()];
    let matched = if word == "AND" || word == "OR" {
        head.eq_ignore_ascii_case(word)
    } else {
        head == word
    };
    matched
        && rest[word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric() && c != '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsift_table::{ColumnSchema, ColumnType};

    fn words() -> Vec<String> {
        let schema = TableSchema::new(
            vec![
                ColumnSchema::new("src", ColumnType::Ip),
                ColumnSchema::new("proto", ColumnType::Str),
                ColumnSchema::new("order", ColumnType::Int),
            ],
            None,
        )
        .unwrap();
        word_tokens(&schema)
    }

    fn tok(input: &str) -> Vec<String> {
        tokenize(input, &words(), &SYMBOL_TOKENS)
    }

    #[test]
    fn test_whitespace_optional_around_symbols() {
        assert_eq!(tok("proto=tcp"), tok("proto = tcp"));
        assert_eq!(tok("proto=tcp"), vec!["proto", "=", "tcp"]);
    }

    #[test]
    fn test_greedy_symbol_match() {
        assert_eq!(tok("src!=x"), vec!["src", "!=", "x"]);
        assert_eq!(tok("src==x"), vec!["src", "==", "x"]);
        assert_eq!(tok("src!~x"), vec!["src", "!~", "x"]);
    }

    #[test]
    fn test_quoted_literal_keeps_quotes() {
        assert_eq!(
            tok(r#"proto = "a b ()""#),
            vec!["proto", "=", r#""a b ()""#]
        );
    }

    #[test]
    fn test_word_operators_case_insensitive() {
        assert_eq!(
            tok("proto=a and src=b"),
            vec!["proto", "=", "a", "and", "src", "=", "b"]
        );
        assert_eq!(tok("proto=a OR src=b")[3], "OR");
    }

    #[test]
    fn test_field_names_case_sensitive() {
        // "PROTO" is not a known word, so it degenerates into a literal.
        assert_eq!(tok("PROTO = tcp")[0], "PROTO");
    }

    #[test]
    fn test_negated_group_forms() {
        assert_eq!(tok("!(proto=a)")[0], "!(");
        assert_eq!(tok("NOT(proto=a)")[0], "NOT(");
        assert_eq!(tok("not(proto=a)")[0], "not(");
    }

    #[test]
    fn test_longer_field_wins_over_word_operator_prefix() {
        // "order" contains "or"; descending-length sort must pick the field.
        assert_eq!(tok("order = 1")[0], "order");
    }

    #[test]
    fn test_unquoted_literal_stops_at_paren() {
        assert_eq!(tok("(proto=tcp)"), vec!["(", "proto", "=", "tcp", ")"]);
    }

    #[test]
    fn test_catch_all_literal() {
        assert_eq!(tok("foo=1"), vec!["foo=1"]);
        assert_eq!(tok("foo = 1"), vec!["foo", "=", "1"]);
    }
}
