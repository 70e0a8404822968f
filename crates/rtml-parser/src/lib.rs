//! RTML Parsers
//!
//! Three cooperating recursive-descent parsers over the shared character
//! cursor: the markup parser (tags, attributes, children), the expression
//! parser (precedence climbing over script tokens), and the statement
//! parser (declarations and control flow). Control transfers between them
//! are ordinary nested calls bracketed by explicit cursor save/rewind and
//! lexer-cache clears, all owned by one [`CompileContext`] per source unit.

pub mod ast;
pub mod context;
pub mod expr_parser;
pub mod markup_parser;
pub mod statement_parser;

pub use ast::{Attribute, CondDirective, Element, Expression, LoopDirective, MarkupNode, Statement};
pub use context::CompileContext;
pub use expr_parser::ExprParser;
pub use markup_parser::MarkupParser;
pub use statement_parser::StatementParser;

use rtml_lexer::Span;

/// Parser error with position information.
///
/// The first error anywhere in the recursive-descent walk aborts the whole
/// compile; no partial output is salvaged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            line: span.line(),
            column: span.column(),
        }
    }

    /// An "unexpected token" error: the offending token text plus what the
    /// grammar expected at this position.
    pub fn unexpected(token: impl std::fmt::Display, span: Span, expectation: &str) -> Self {
        Self::new(format!("unexpected token '{token}' {expectation}"), span)
    }
}
