//! RTML Code Generator
//!
//! Compiles a parsed template into its final textual form: rendered markup
//! with the accumulated reactive-binding script appended as a trailing
//! `<script>` block. Also exposes script-only entry points for compiling a
//! single expression or statement block, used by the CLI's diagnostic
//! commands and the test suite.
//!
//! ```text
//! source → parse_all() → markup_to_html() → DualBuilder::finish()
//! ```

pub mod builder;
pub mod html;
pub mod js;

pub use builder::{MarkupBuilder, ScriptBuilder};
pub use html::{markup_to_html, DualBuilder};
pub use js::{expr_to_js, statement_to_js};

use rtml_parser::{CompileContext, ExprParser, MarkupParser, ParseError, StatementParser};

/// Compile one source unit to markup plus its companion script block.
///
/// Deterministic: the same input always produces byte-identical output.
pub fn compile(file: &str, source: &str) -> Result<String, ParseError> {
    let mut ctx = CompileContext::new(file, source);
    let ast = MarkupParser::new(&mut ctx).parse_all()?;
    let mut out = DualBuilder::new();
    markup_to_html(&ast, &mut out);
    Ok(out.finish())
}

/// Compile a single expression to its script form.
pub fn expr_to_script(source: &str, reactive: bool) -> Result<String, ParseError> {
    let mut ctx = CompileContext::new("<expr>", source);
    let expr = ExprParser::new(&mut ctx).parse_full_expr()?;
    let mut out = ScriptBuilder::new();
    expr_to_js(&expr, &mut out, reactive);
    Ok(out.finish())
}

/// Compile a statement block to its script form.
pub fn script_to_script(source: &str, reactive: bool) -> Result<String, ParseError> {
    let mut ctx = CompileContext::new("<script>", source);
    let block = StatementParser::new(&mut ctx).parse_script()?;
    let mut out = ScriptBuilder::new();
    statement_to_js(&block, &mut out, reactive);
    Ok(out.finish())
}
