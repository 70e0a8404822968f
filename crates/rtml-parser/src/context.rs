//! Per-compile state shared by the three parsers.

use rtml_lexer::{Cursor, MarkupLexer, MarkupToken, ScriptLexer, ScriptToken};

/// Owns the cursor, both lexers, and the monotonic id counter for dynamic
/// markup regions. Created once per source unit and discarded after the
/// compile; nothing here is process-wide, so concurrent compiles in a
/// multi-threaded host cannot interfere.
pub struct CompileContext {
    pub file: String,
    pub cursor: Cursor,
    pub markup: MarkupLexer,
    pub script: ScriptLexer,
    elt_id: usize,
}

impl CompileContext {
    pub fn new(file: &str, source: &str) -> Self {
        Self {
            file: file.to_string(),
            cursor: Cursor::new(source),
            markup: MarkupLexer::new(),
            script: ScriptLexer::new(),
            elt_id: 0,
        }
    }

    /// Next placeholder id, starting at 1. Ids are never reused within a
    /// compile, even when the node that claimed one is discarded.
    pub fn next_elt_id(&mut self) -> usize {
        self.elt_id += 1;
        self.elt_id
    }

    pub fn reset_elt_ids(&mut self) {
        self.elt_id = 0;
    }

    // --- Script token access ---

    pub fn script_current(&mut self) -> ScriptToken {
        self.script.current(&mut self.cursor).clone()
    }

    pub fn script_advance(&mut self) -> ScriptToken {
        self.script.advance(&mut self.cursor).clone()
    }

    pub fn script_clear(&mut self) {
        self.script.clear();
    }

    // --- Markup token access ---

    pub fn markup_current(&mut self) -> MarkupToken {
        self.markup.current(&mut self.cursor).clone()
    }

    pub fn markup_advance(&mut self) -> MarkupToken {
        self.markup.advance(&mut self.cursor).clone()
    }

    pub fn markup_clear(&mut self) {
        self.markup.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut ctx = CompileContext::new("/test", "");
        assert_eq!(ctx.next_elt_id(), 1);
        assert_eq!(ctx.next_elt_id(), 2);
        assert_eq!(ctx.next_elt_id(), 3);
        ctx.reset_elt_ids();
        assert_eq!(ctx.next_elt_id(), 1);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut a = CompileContext::new("/a", "");
        let mut b = CompileContext::new("/b", "");
        a.next_elt_id();
        a.next_elt_id();
        assert_eq!(b.next_elt_id(), 1);
    }
}
