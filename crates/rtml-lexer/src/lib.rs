//! RTML Lexers
//!
//! Character-level cursor plus the two pull-based tokenizers used by the
//! RTML compiler: the markup lexer (tags, text, interpolation markers) and
//! the script lexer (identifiers, literals, operators). Both tokenizers
//! read from one shared [`Cursor`], so the parsers can hand control back
//! and forth over the same source text by saving and rewinding positions.
//!
//! # Example
//!
//! ```
//! use rtml_lexer::{Cursor, ScriptLexer, ScriptTokenKind};
//!
//! let mut cursor = Cursor::new("count + 1");
//! let mut lexer = ScriptLexer::new();
//! let token = lexer.advance(&mut cursor);
//! assert!(matches!(token.kind, ScriptTokenKind::Identifier(_)));
//! ```

pub mod cursor;
pub mod markup;
pub mod operator;
pub mod script;

pub use cursor::{Cursor, FilePos, Span};
pub use markup::{is_self_closing_tag, MarkupLexer, MarkupToken, MarkupTokenKind};
pub use operator::{format_number, ConstValue, Fixity, Op, PRIORITY_MAX, PRIORITY_ZERO};
pub use script::{ScriptLexer, ScriptToken, ScriptTokenKind};
