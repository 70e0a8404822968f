//! Markup tokenizer.
//!
//! Pull-based lexer for the tag-structured side of a template. One state
//! bit — `in_tag` — decides whether the lexer is scanning raw text (until
//! `{`, `<`, or end of input) or the inside of a tag (names, `=`, `>`,
//! `/>`). Comments and closing tags are consumed eagerly as single tokens.

use crate::cursor::{Cursor, Span, EOF_CHAR};

/// Tag names that never take children.
pub const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Check if a tag name (already lowercased) is always self-closing.
pub fn is_self_closing_tag(tag: &str) -> bool {
    SELF_CLOSING_TAGS.contains(&tag)
}

pub fn is_tag_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-'
}

pub fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// A token produced by the markup lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupToken {
    pub kind: MarkupTokenKind,
    pub span: Span,
}

/// Markup token classification.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupTokenKind {
    /// Raw text outside tags.
    Text(String),
    /// A whitespace run inside a tag.
    Spaces(String),
    /// `{` starting an interpolated expression.
    StartExpr,
    /// `<name`, flips the lexer into tag scanning.
    StartTag(String),
    /// An attribute name inside a tag.
    Identifier(String),
    /// `=` between an attribute name and its value.
    Equal,
    /// `>` or `/>` ending the open tag; `empty` marks the self-closing form.
    TagContent { empty: bool },
    /// `</name>` including any trailing whitespace before the `>`.
    ClosingTag(String),
    /// `<!-- ... -->`, fully consumed.
    Comment(String),
    Eof,
}

impl std::fmt::Display for MarkupToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            MarkupTokenKind::Text(text) => write!(f, "{text}"),
            MarkupTokenKind::Spaces(spaces) => write!(f, "{spaces}"),
            MarkupTokenKind::StartExpr => write!(f, "{{"),
            MarkupTokenKind::StartTag(name) => write!(f, "<{name}"),
            MarkupTokenKind::Identifier(name) => write!(f, "{name}"),
            MarkupTokenKind::Equal => write!(f, "="),
            MarkupTokenKind::TagContent { empty: true } => write!(f, "/>"),
            MarkupTokenKind::TagContent { empty: false } => write!(f, ">"),
            MarkupTokenKind::ClosingTag(name) => write!(f, "</{name}>"),
            MarkupTokenKind::Comment(content) => write!(f, "<!--{content}-->"),
            MarkupTokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// Markup lexer: `in_tag` plus the one-token cache.
#[derive(Default)]
pub struct MarkupLexer {
    in_tag: bool,
    cur: Option<MarkupToken>,
}

impl MarkupLexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current token, scanning one if the cache is empty.
    pub fn current(&mut self, cursor: &mut Cursor) -> &MarkupToken {
        if self.cur.is_none() {
            let token = self.scan(cursor);
            self.cur = Some(token);
        }
        self.cur.as_ref().expect("token just cached")
    }

    /// Scan the next token, replacing the cache.
    pub fn advance(&mut self, cursor: &mut Cursor) -> &MarkupToken {
        let token = self.scan(cursor);
        self.cur = Some(token);
        self.cur.as_ref().expect("token just cached")
    }

    /// Drop the cached token so the next access re-lexes from wherever the
    /// cursor stands.
    pub fn clear(&mut self) {
        self.cur = None;
    }

    /// Full reset for a hand-off that re-enters markup at text level
    /// (markup literals inside expressions).
    pub fn reset(&mut self) {
        self.cur = None;
        self.in_tag = false;
    }

    fn scan(&mut self, cursor: &mut Cursor) -> MarkupToken {
        if self.in_tag {
            self.scan_in_tag(cursor)
        } else {
            self.scan_text(cursor)
        }
    }

    fn scan_in_tag(&mut self, cursor: &mut Cursor) -> MarkupToken {
        let start = cursor.position();
        match cursor.current() {
            EOF_CHAR if cursor.is_at_end() => MarkupToken {
                kind: MarkupTokenKind::Eof,
                span: cursor.span_from(start),
            },
            ' ' | '\t' | '\n' | '\r' => {
                let spaces = get_spaces(cursor);
                MarkupToken {
                    kind: MarkupTokenKind::Spaces(spaces),
                    span: cursor.span_from(start),
                }
            }
            '/' if cursor.peek(1) == '>' => {
                cursor.advance();
                cursor.advance();
                self.in_tag = false;
                MarkupToken {
                    kind: MarkupTokenKind::TagContent { empty: true },
                    span: cursor.span_from(start),
                }
            }
            '>' => {
                cursor.advance();
                self.in_tag = false;
                MarkupToken {
                    kind: MarkupTokenKind::TagContent { empty: false },
                    span: cursor.span_from(start),
                }
            }
            '=' => {
                cursor.advance();
                MarkupToken {
                    kind: MarkupTokenKind::Equal,
                    span: cursor.span_from(start),
                }
            }
            _ => {
                let name = get_identifier(cursor);
                if !name.is_empty() {
                    MarkupToken {
                        kind: MarkupTokenKind::Identifier(name),
                        span: cursor.span_from(start),
                    }
                } else {
                    // Unexpected in-tag content: return it as text and let
                    // the parser reject it.
                    let mut content = String::new();
                    while !matches!(cursor.current(), ' ' | '>') && !cursor.is_at_end() {
                        content.push(cursor.current());
                        cursor.advance();
                    }
                    MarkupToken {
                        kind: MarkupTokenKind::Text(content),
                        span: cursor.span_from(start),
                    }
                }
            }
        }
    }

    fn scan_text(&mut self, cursor: &mut Cursor) -> MarkupToken {
        let start = cursor.position();
        let mut text = String::new();
        while !cursor.is_at_end() {
            match cursor.current() {
                '{' => {
                    if !text.is_empty() {
                        return MarkupToken {
                            kind: MarkupTokenKind::Text(text),
                            span: cursor.span_from(start),
                        };
                    }
                    cursor.advance();
                    return MarkupToken {
                        kind: MarkupTokenKind::StartExpr,
                        span: cursor.span_from(start),
                    };
                }
                '<' => {
                    let next = cursor.peek(1);
                    if is_tag_start_char(next) || next == '/' || next == '!' {
                        if !text.is_empty() {
                            return MarkupToken {
                                kind: MarkupTokenKind::Text(text),
                                span: cursor.span_from(start),
                            };
                        }
                        return self.scan_element_or_comment(cursor);
                    }
                    // A lone `<` stays text.
                    text.push('<');
                    cursor.advance();
                }
                c => {
                    text.push(c);
                    cursor.advance();
                }
            }
        }
        if !text.is_empty() {
            MarkupToken {
                kind: MarkupTokenKind::Text(text),
                span: cursor.span_from(start),
            }
        } else {
            MarkupToken {
                kind: MarkupTokenKind::Eof,
                span: cursor.span_from(start),
            }
        }
    }

    fn scan_element_or_comment(&mut self, cursor: &mut Cursor) -> MarkupToken {
        let start = cursor.position();
        cursor.advance(); // consume `<`
        let mut closing = false;
        if cursor.current() == '/' {
            closing = true;
            cursor.advance();
        }
        let tag_name;
        if cursor.current() == '!' {
            cursor.advance();
            if cursor.current() == '-' {
                return scan_comment(cursor, start);
            }
            tag_name = format!("!{}", get_identifier(cursor));
        } else {
            tag_name = get_identifier(cursor);
        }
        if closing {
            get_spaces(cursor);
            if cursor.current() == '>' {
                cursor.advance();
            }
            MarkupToken {
                kind: MarkupTokenKind::ClosingTag(tag_name),
                span: cursor.span_from(start),
            }
        } else {
            self.in_tag = true;
            MarkupToken {
                kind: MarkupTokenKind::StartTag(tag_name),
                span: cursor.span_from(start),
            }
        }
    }
}

fn get_spaces(cursor: &mut Cursor) -> String {
    let mut spaces = String::new();
    while matches!(cursor.current(), ' ' | '\t' | '\n' | '\r') {
        spaces.push(cursor.current());
        cursor.advance();
    }
    spaces
}

fn get_identifier(cursor: &mut Cursor) -> String {
    let mut name = String::new();
    while is_tag_char(cursor.current()) {
        name.push(cursor.current());
        cursor.advance();
    }
    name
}

/// Scan `<!-- ... -->`; the cursor stands at the first `-`.
fn scan_comment(cursor: &mut Cursor, start: crate::cursor::FilePos) -> MarkupToken {
    if cursor.current() == '-' {
        cursor.advance();
    }
    if cursor.current() == '-' {
        cursor.advance();
    }
    let mut content = String::new();
    while !cursor.is_at_end() {
        if cursor.current() == '-' && cursor.peek(1) == '-' && cursor.peek(2) == '>' {
            cursor.advance();
            cursor.advance();
            cursor.advance();
            break;
        }
        content.push(cursor.current());
        cursor.advance();
    }
    MarkupToken {
        kind: MarkupTokenKind::Comment(content),
        span: cursor.span_from(start),
    }
}
