//! Script tokenizer.
//!
//! Pull-based lexer for the script language found in `<script>` bodies,
//! interpolations, and attribute values. Reads from the shared [`Cursor`]
//! and caches at most one token, so a parser hand-off can [`clear`] the
//! cache and let the other lexer pick up from the cursor position.
//!
//! Malformed input (a number that does not convert, an unknown operator
//! character) becomes an [`ScriptTokenKind::Invalid`] token rather than an
//! error; the parser decides whether the token matters.
//!
//! [`clear`]: ScriptLexer::clear

use crate::cursor::{Cursor, Span};
use crate::markup::is_tag_char;
use crate::operator::Op;

/// A token produced by the script lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptToken {
    pub kind: ScriptTokenKind,
    pub span: Span,
}

/// Script token classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptTokenKind {
    Identifier(String),
    Str(String),
    Number(f64),
    Op(Op),
    Invalid { raw: String, reason: String },
    Eof,
}

impl ScriptToken {
    /// The operator carried by this token, if any. Used all over the
    /// parsers, so it gets a shortcut.
    pub fn op(&self) -> Option<Op> {
        match self.kind {
            ScriptTokenKind::Op(op) => Some(op),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScriptToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ScriptTokenKind::Identifier(name) => write!(f, "{name}"),
            ScriptTokenKind::Str(value) => write!(f, "\"{value}\""),
            ScriptTokenKind::Number(value) => write!(f, "{value}"),
            ScriptTokenKind::Op(op) => match op.symbol() {
                Some(symbol) => write!(f, "{symbol}"),
                None => write!(f, "{}", op.name()),
            },
            ScriptTokenKind::Invalid { raw, .. } => write!(f, "{raw}"),
            ScriptTokenKind::Eof => write!(f, "<EOF>"),
        }
    }
}

/// Script lexer: stateless apart from the one-token cache.
#[derive(Default)]
pub struct ScriptLexer {
    cur: Option<ScriptToken>,
}

impl ScriptLexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current token, scanning one if the cache is empty.
    pub fn current(&mut self, cursor: &mut Cursor) -> &ScriptToken {
        if self.cur.is_none() {
            self.cur = Some(self.scan(cursor));
        }
        self.cur.as_ref().expect("token just cached")
    }

    /// Scan the next token, replacing the cache.
    pub fn advance(&mut self, cursor: &mut Cursor) -> &ScriptToken {
        self.cur = Some(self.scan(cursor));
        self.cur.as_ref().expect("token just cached")
    }

    /// Drop the cached token so the next access re-lexes from wherever the
    /// cursor stands. Called at every parser hand-off.
    pub fn clear(&mut self) {
        self.cur = None;
    }

    fn scan(&mut self, cursor: &mut Cursor) -> ScriptToken {
        loop {
            let c = cursor.current();
            if cursor.is_at_end() {
                return ScriptToken {
                    kind: ScriptTokenKind::Eof,
                    span: cursor.span_from(cursor.position()),
                };
            }
            match c {
                ' ' | '\t' | '\n' | '\r' => {
                    cursor.advance();
                }
                'a'..='z' | 'A'..='Z' | '_' | '$' => return scan_identifier(cursor),
                '0'..='9' => return scan_number(cursor),
                '"' | '\'' => return scan_string(cursor),
                '/' if cursor.peek(1) == '*' => skip_block_comment(cursor),
                '/' if cursor.peek(1) == '/' => skip_line_comment(cursor),
                _ => return scan_operator(cursor),
            }
        }
    }
}

fn scan_identifier(cursor: &mut Cursor) -> ScriptToken {
    let start = cursor.position();
    let mut name = String::new();
    name.push(cursor.current());
    cursor.advance();
    while matches!(cursor.current(), 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$') {
        name.push(cursor.current());
        cursor.advance();
    }
    ScriptToken {
        kind: ScriptTokenKind::Identifier(name),
        span: cursor.span_from(start),
    }
}

fn scan_number(cursor: &mut Cursor) -> ScriptToken {
    let start = cursor.position();
    let mut text = String::new();
    while cursor.current().is_ascii_digit() {
        text.push(cursor.current());
        cursor.advance();
    }
    if cursor.current() == '.' && cursor.peek(1).is_ascii_digit() {
        text.push('.');
        cursor.advance();
        while cursor.current().is_ascii_digit() {
            text.push(cursor.current());
            cursor.advance();
        }
    }
    if matches!(cursor.current(), 'e' | 'E') {
        text.push(cursor.current());
        cursor.advance();
        if matches!(cursor.current(), '+' | '-') {
            text.push(cursor.current());
            cursor.advance();
        }
        while cursor.current().is_ascii_digit() {
            text.push(cursor.current());
            cursor.advance();
        }
    }
    let span = cursor.span_from(start);
    match text.parse::<f64>() {
        Ok(value) => ScriptToken {
            kind: ScriptTokenKind::Number(value),
            span,
        },
        Err(_) => ScriptToken {
            kind: ScriptTokenKind::Invalid {
                raw: text,
                reason: "this is not a valid number".into(),
            },
            span,
        },
    }
}

/// No escape processing: characters pass through until the matching quote.
fn scan_string(cursor: &mut Cursor) -> ScriptToken {
    let start = cursor.position();
    let quote = cursor.current();
    cursor.advance();
    let mut content = String::new();
    while !cursor.is_at_end() && cursor.current() != quote {
        content.push(cursor.current());
        cursor.advance();
    }
    if !cursor.is_at_end() {
        cursor.advance(); // closing quote
    }
    ScriptToken {
        kind: ScriptTokenKind::Str(content),
        span: cursor.span_from(start),
    }
}

fn skip_block_comment(cursor: &mut Cursor) {
    cursor.advance();
    cursor.advance();
    while !cursor.is_at_end() {
        if cursor.current() == '*' && cursor.peek(1) == '/' {
            cursor.advance();
            cursor.advance();
            break;
        }
        cursor.advance();
    }
}

fn skip_line_comment(cursor: &mut Cursor) {
    cursor.advance();
    cursor.advance();
    while !cursor.is_at_end() && !matches!(cursor.current(), '\r' | '\n') {
        cursor.advance();
    }
}

/// Greedy longest-prefix match against the operator table: grow the
/// candidate one character at a time while a longer symbol still matches.
fn scan_operator(cursor: &mut Cursor) -> ScriptToken {
    let start = cursor.position();
    let mut candidate = String::new();
    candidate.push(cursor.current());
    cursor.advance();

    let Some(mut op) = Op::lookup_any(&candidate) else {
        return ScriptToken {
            kind: ScriptTokenKind::Invalid {
                raw: candidate,
                reason: "invalid operator".into(),
            },
            span: cursor.span_from(start),
        };
    };

    loop {
        candidate.push(cursor.current());
        match Op::lookup_any(&candidate) {
            Some(longer) => {
                op = longer;
                cursor.advance();
            }
            None => break,
        }
    }

    // `<` followed by exactly `/script` and a non-tag character is the
    // closing script tag, not a comparison: consume through the `>` and
    // hand the parser the synthetic end-of-script operator.
    if op == Op::Lt && is_end_script_tag(cursor) {
        while !cursor.is_at_end() && cursor.current() != '>' {
            cursor.advance();
        }
        if !cursor.is_at_end() {
            cursor.advance();
        }
        return ScriptToken {
            kind: ScriptTokenKind::Op(Op::EndScriptTag),
            span: cursor.span_from(start),
        };
    }

    ScriptToken {
        kind: ScriptTokenKind::Op(op),
        span: cursor.span_from(start),
    }
}

fn is_end_script_tag(cursor: &Cursor) -> bool {
    const CLOSE: &str = "/script";
    for (offset, expected) in CLOSE.chars().enumerate() {
        if cursor.peek(offset) != expected {
            return false;
        }
    }
    !is_tag_char(cursor.peek(CLOSE.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<ScriptTokenKind> {
        let mut cursor = Cursor::new(source);
        let mut lexer = ScriptLexer::new();
        let mut kinds = Vec::new();
        loop {
            let token = lexer.advance(&mut cursor).clone();
            let eof = token.kind == ScriptTokenKind::Eof;
            kinds.push(token.kind);
            if eof {
                break;
            }
        }
        kinds
    }

    fn single(source: &str) -> ScriptTokenKind {
        tokenize(source).into_iter().next().expect("at least EOF")
    }

    // =========================================================================
    // Identifiers and literals
    // =========================================================================

    #[test]
    fn test_identifiers() {
        assert_eq!(
            tokenize("hello world"),
            vec![
                ScriptTokenKind::Identifier("hello".into()),
                ScriptTokenKind::Identifier("world".into()),
                ScriptTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifier_chars() {
        assert_eq!(single("_a$1"), ScriptTokenKind::Identifier("_a$1".into()));
    }

    #[test]
    fn test_number() {
        assert_eq!(single("12.34"), ScriptTokenKind::Number(12.34));
    }

    #[test]
    fn test_integer() {
        assert_eq!(single("42"), ScriptTokenKind::Number(42.0));
    }

    #[test]
    fn test_number_exponent() {
        assert_eq!(single("1e3"), ScriptTokenKind::Number(1000.0));
        assert_eq!(single("2.5e-2"), ScriptTokenKind::Number(0.025));
        assert_eq!(single("1E+2"), ScriptTokenKind::Number(100.0));
    }

    #[test]
    fn test_number_invalid_exponent() {
        match single("1e") {
            ScriptTokenKind::Invalid { raw, .. } => assert_eq!(raw, "1e"),
            other => panic!("expected invalid token, got {other:?}"),
        }
    }

    #[test]
    fn test_number_dot_without_digits() {
        // `1.` is number then dot, not a fraction
        assert_eq!(
            tokenize("1.toString"),
            vec![
                ScriptTokenKind::Number(1.0),
                ScriptTokenKind::Op(Op::Dot),
                ScriptTokenKind::Identifier("toString".into()),
                ScriptTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_double_quotes() {
        assert_eq!(single("\"abcde\""), ScriptTokenKind::Str("abcde".into()));
    }

    #[test]
    fn test_string_single_quotes() {
        assert_eq!(single("'hi'"), ScriptTokenKind::Str("hi".into()));
    }

    #[test]
    fn test_string_passes_backslash_through() {
        assert_eq!(single(r#""a\nb""#), ScriptTokenKind::Str("a\\nb".into()));
    }

    #[test]
    fn test_string_unterminated_returns_content() {
        assert_eq!(single("\"abc"), ScriptTokenKind::Str("abc".into()));
    }

    // =========================================================================
    // Operators
    // =========================================================================

    #[test]
    fn test_plus_minus() {
        assert_eq!(
            tokenize(" + - "),
            vec![
                ScriptTokenKind::Op(Op::Plus),
                ScriptTokenKind::Op(Op::Sub),
                ScriptTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_greedy_longest_match() {
        assert_eq!(single("==="), ScriptTokenKind::Op(Op::EqEqEq));
        assert_eq!(single(">>>="), ScriptTokenKind::Op(Op::UshrAssign));
        assert_eq!(single("**="), ScriptTokenKind::Op(Op::ExpAssign));
        assert_eq!(single("?."), ScriptTokenKind::Op(Op::OptionalChain));
        assert_eq!(single("&&="), ScriptTokenKind::Op(Op::LogicalAndAssign));
    }

    #[test]
    fn test_ambiguous_symbols_lex_as_primary() {
        assert_eq!(single("++"), ScriptTokenKind::Op(Op::PostfixInc));
        assert_eq!(single("+"), ScriptTokenKind::Op(Op::Plus));
    }

    #[test]
    fn test_prefix_only_operators() {
        assert_eq!(
            tokenize("!x"),
            vec![
                ScriptTokenKind::Op(Op::LogicalNot),
                ScriptTokenKind::Identifier("x".into()),
                ScriptTokenKind::Eof,
            ]
        );
        assert_eq!(single("~"), ScriptTokenKind::Op(Op::BitwiseNot));
        assert_eq!(single("!="), ScriptTokenKind::Op(Op::NotEq));
    }

    #[test]
    fn test_invalid_operator() {
        match single("@") {
            ScriptTokenKind::Invalid { raw, reason } => {
                assert_eq!(raw, "@");
                assert!(reason.contains("operator"));
            }
            other => panic!("expected invalid token, got {other:?}"),
        }
    }

    #[test]
    fn test_method_call_sequence() {
        assert_eq!(
            tokenize("\"abcde\".substring(2,4)"),
            vec![
                ScriptTokenKind::Str("abcde".into()),
                ScriptTokenKind::Op(Op::Dot),
                ScriptTokenKind::Identifier("substring".into()),
                ScriptTokenKind::Op(Op::OpenParen),
                ScriptTokenKind::Number(2.0),
                ScriptTokenKind::Op(Op::Comma),
                ScriptTokenKind::Number(4.0),
                ScriptTokenKind::Op(Op::CloseParen),
                ScriptTokenKind::Eof,
            ]
        );
    }

    // =========================================================================
    // Comments
    // =========================================================================

    #[test]
    fn test_block_comment_skipped() {
        assert_eq!(
            tokenize("/* some text */ 1"),
            vec![ScriptTokenKind::Number(1.0), ScriptTokenKind::Eof]
        );
    }

    #[test]
    fn test_line_comment_skipped() {
        assert_eq!(
            tokenize("1 // trailing"),
            vec![ScriptTokenKind::Number(1.0), ScriptTokenKind::Eof]
        );
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        assert_eq!(
            tokenize("// a\n2"),
            vec![ScriptTokenKind::Number(2.0), ScriptTokenKind::Eof]
        );
    }

    // =========================================================================
    // End-of-script detection
    // =========================================================================

    #[test]
    fn test_end_script_tag() {
        assert_eq!(
            tokenize("a</script>"),
            vec![
                ScriptTokenKind::Identifier("a".into()),
                ScriptTokenKind::Op(Op::EndScriptTag),
                ScriptTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_end_script_tag_with_spaces() {
        let mut cursor = Cursor::new("</script  >x");
        let mut lexer = ScriptLexer::new();
        assert_eq!(
            lexer.advance(&mut cursor).kind,
            ScriptTokenKind::Op(Op::EndScriptTag)
        );
        // everything through `>` is consumed
        assert_eq!(cursor.current(), 'x');
    }

    #[test]
    fn test_longer_tag_name_is_comparison() {
        assert_eq!(
            tokenize("a</scripted"),
            vec![
                ScriptTokenKind::Identifier("a".into()),
                ScriptTokenKind::Op(Op::Lt),
                ScriptTokenKind::Op(Op::Div),
                ScriptTokenKind::Identifier("scripted".into()),
                ScriptTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_plain_less_than() {
        assert_eq!(
            tokenize("a<b"),
            vec![
                ScriptTokenKind::Identifier("a".into()),
                ScriptTokenKind::Op(Op::Lt),
                ScriptTokenKind::Identifier("b".into()),
                ScriptTokenKind::Eof,
            ]
        );
    }

    // =========================================================================
    // Cache discipline and spans
    // =========================================================================

    #[test]
    fn test_clear_relexes_from_cursor() {
        let mut cursor = Cursor::new("a b");
        let mut lexer = ScriptLexer::new();
        assert_eq!(
            lexer.current(&mut cursor).kind,
            ScriptTokenKind::Identifier("a".into())
        );
        // current() is idempotent while cached
        assert_eq!(
            lexer.current(&mut cursor).kind,
            ScriptTokenKind::Identifier("a".into())
        );
        lexer.clear();
        assert_eq!(
            lexer.current(&mut cursor).kind,
            ScriptTokenKind::Identifier("b".into())
        );
    }

    #[test]
    fn test_spans_increase() {
        let mut cursor = Cursor::new("aa + bb");
        let mut lexer = ScriptLexer::new();
        let first = lexer.advance(&mut cursor).clone();
        let second = lexer.advance(&mut cursor).clone();
        let third = lexer.advance(&mut cursor).clone();
        assert_eq!(first.span.start.offset, 0);
        assert_eq!(first.span.len, 2);
        assert!(second.span.start.offset > first.span.start.offset);
        assert!(third.span.start.offset > second.span.start.offset);
        assert_eq!(third.span.start.column, 6);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(tokenize(""), vec![ScriptTokenKind::Eof]);
    }
}
