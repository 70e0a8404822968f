//! Indentation- and line-width-aware output builders.
//!
//! Both builders buffer the fragments of the current line and flush them
//! with the indentation that was in effect when the line started. The
//! script builder indents by 2 spaces, the markup builder by 4. Contract
//! violations (multi-line `append`, mismatched tag lifecycle) are caller
//! bugs and panic.

/// Shared line-buffering core.
struct LineBuilder {
    out: String,
    pending: Vec<String>,
    indent_width: usize,
    indent: usize,
    starting_indent: usize,
}

impl LineBuilder {
    fn new(indent_width: usize) -> Self {
        Self {
            out: String::new(),
            pending: Vec::new(),
            indent_width,
            indent: 0,
            starting_indent: 0,
        }
    }

    fn push(&mut self, s: impl Into<String>) {
        if self.pending.is_empty() {
            self.starting_indent = self.indent;
        }
        self.pending.push(s.into());
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.out
                .push_str(&" ".repeat(self.starting_indent * self.indent_width));
            for s in self.pending.drain(..) {
                self.out.push_str(&s);
            }
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn unindent(&mut self) {
        if self.indent > 0 {
            self.indent -= 1;
        }
    }

    /// Remove the most recently appended fragment when it matches. Used for
    /// speculative emission, e.g. dropping a trailing separator.
    fn rewind(&mut self, s: &str) {
        if self.pending.last().is_some_and(|last| last == s) {
            self.pending.pop();
        } else if self.out.ends_with(s) {
            self.out.truncate(self.out.len() - s.len());
        }
    }

    /// Force a break when the buffered line already runs past 100 columns.
    fn break_long_line(&mut self) {
        let width = self.indent_width * self.starting_indent
            + self.pending.iter().map(String::len).sum::<usize>();
        if width > 100 {
            self.push("\n");
            self.flush();
        }
    }

    fn pending_is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

/// Builder for generated script output (2-space indent).
pub struct ScriptBuilder {
    inner: LineBuilder,
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            inner: LineBuilder::new(2),
        }
    }

    /// Append a single-line fragment. Multi-line text is a caller error.
    pub fn append(&mut self, s: &str) {
        assert!(
            !s.contains('\n'),
            "ScriptBuilder::append does not allow multiple lines"
        );
        self.inner.push(s);
    }

    /// Append a fragment that may span lines (reconstructed source text).
    pub fn append_raw(&mut self, s: &str) {
        self.inner.push(s);
    }

    pub fn append_line(&mut self, s: &str) {
        self.inner.push(s);
        self.inner.push("\n");
        self.inner.flush();
    }

    /// Terminate the buffered line, if any.
    pub fn finish_line(&mut self) {
        if !self.inner.pending_is_empty() {
            self.inner.push("\n");
            self.inner.flush();
        }
    }

    pub fn indent(&mut self) {
        self.inner.indent();
    }

    pub fn unindent(&mut self) {
        self.inner.unindent();
    }

    pub fn break_long_line(&mut self) {
        self.inner.break_long_line();
    }

    pub fn rewind(&mut self, s: &str) {
        self.inner.rewind(s);
    }

    pub fn finish(self) -> String {
        self.inner.finish()
    }

    /// Finish, asserting the output stayed on one line. Attribute values go
    /// through this.
    pub fn into_single_line(self) -> String {
        let result = self.inner.finish();
        assert!(
            !result.contains('\n'),
            "into_single_line does not allow multiple lines"
        );
        result
    }
}

/// Builder for markup output (4-space indent) with a tag lifecycle:
/// `start_tag` → attributes → `enter_tag`/`self_close` → `close_tag`.
pub struct MarkupBuilder {
    inner: LineBuilder,
    open_elements: Vec<String>,
    started_tag: Option<String>,
}

impl Default for MarkupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupBuilder {
    pub fn new() -> Self {
        Self {
            inner: LineBuilder::new(4),
            open_elements: Vec::new(),
            started_tag: None,
        }
    }

    /// Append structural text. Angle brackets only come from the tag
    /// lifecycle methods; anything else is a caller error.
    pub fn append(&mut self, s: &str) {
        assert!(
            !s.contains('<') && !s.contains('>'),
            "MarkupBuilder::append does not allow angle brackets"
        );
        self.inner.push(s);
    }

    /// Append free-form content (text nodes, inlined script bodies).
    pub fn append_raw(&mut self, s: &str) {
        self.inner.push(s);
    }

    pub fn start_tag(&mut self, tag_name: &str) {
        assert!(
            self.started_tag.is_none(),
            "cannot start <{tag_name}> while another tag is still open"
        );
        self.inner.push(format!("<{tag_name}"));
        self.started_tag = Some(tag_name.to_string());
    }

    pub fn enter_tag(&mut self) {
        let tag = self
            .started_tag
            .take()
            .unwrap_or_else(|| panic!("cannot enter a tag when none is started"));
        self.inner.push(">");
        self.open_elements.push(tag);
    }

    pub fn close_tag(&mut self, tag_name: &str) {
        assert!(
            self.started_tag.is_none(),
            "cannot close {tag_name} while a tag is still being started"
        );
        let last = self.open_elements.pop();
        assert!(
            last.as_deref() == Some(tag_name),
            "cannot close {tag_name}: the innermost open element is {last:?}"
        );
        self.inner.push(format!("</{tag_name}>"));
    }

    /// `/>` for normal tags, a bare `>` for doctype declarations.
    pub fn self_close(&mut self, doctype: bool) {
        assert!(
            self.started_tag.take().is_some(),
            "cannot self-close a tag when none is started"
        );
        self.inner.push(if doctype { ">" } else { "/>" });
    }

    pub fn indent(&mut self) {
        self.inner.indent();
    }

    pub fn unindent(&mut self) {
        self.inner.unindent();
    }

    pub fn rewind(&mut self, s: &str) {
        self.inner.rewind(s);
    }

    pub fn finish(self) -> String {
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // ScriptBuilder
    // =========================================================================

    #[test]
    fn test_append_and_finish() {
        let mut b = ScriptBuilder::new();
        b.append("a");
        b.append("b");
        assert_eq!(b.finish(), "ab");
    }

    #[test]
    fn test_append_line_applies_indent() {
        let mut b = ScriptBuilder::new();
        b.append_line("function f() {");
        b.indent();
        b.append_line("return 1;");
        b.unindent();
        b.append_line("}");
        assert_eq!(b.finish(), "function f() {\n  return 1;\n}\n");
    }

    #[test]
    fn test_indent_captured_at_line_start() {
        let mut b = ScriptBuilder::new();
        b.indent();
        b.append("x");
        // unindenting mid-line does not move the line
        b.unindent();
        b.append_line(";");
        assert_eq!(b.finish(), "  x;\n");
    }

    #[test]
    #[should_panic(expected = "does not allow multiple lines")]
    fn test_append_rejects_newlines() {
        let mut b = ScriptBuilder::new();
        b.append("a\nb");
    }

    #[test]
    fn test_rewind_pending_fragment() {
        let mut b = ScriptBuilder::new();
        b.append("a");
        b.append(",");
        b.rewind(",");
        assert_eq!(b.finish(), "a");
    }

    #[test]
    fn test_rewind_flushed_output() {
        let mut b = ScriptBuilder::new();
        b.append_line("a,");
        b.rewind(",\n");
        assert_eq!(b.finish(), "a");
    }

    #[test]
    fn test_rewind_ignores_mismatch() {
        let mut b = ScriptBuilder::new();
        b.append("a");
        b.rewind(",");
        assert_eq!(b.finish(), "a");
    }

    #[test]
    fn test_break_long_line_below_limit() {
        let mut b = ScriptBuilder::new();
        b.append("short");
        b.break_long_line();
        assert_eq!(b.finish(), "short");
    }

    #[test]
    fn test_break_long_line_above_limit() {
        let mut b = ScriptBuilder::new();
        let long = "x".repeat(120);
        b.append(&long);
        b.break_long_line();
        b.append("tail");
        let result = b.finish();
        assert_eq!(result, format!("{long}\ntail"));
    }

    #[test]
    fn test_finish_line_is_noop_when_empty() {
        let mut b = ScriptBuilder::new();
        b.finish_line();
        assert_eq!(b.finish(), "");
    }

    #[test]
    fn test_into_single_line() {
        let mut b = ScriptBuilder::new();
        b.append("a+b");
        assert_eq!(b.into_single_line(), "a+b");
    }

    #[test]
    #[should_panic(expected = "into_single_line")]
    fn test_into_single_line_rejects_multiline() {
        let mut b = ScriptBuilder::new();
        b.append_line("a");
        b.append("b");
        b.into_single_line();
    }

    // =========================================================================
    // MarkupBuilder
    // =========================================================================

    #[test]
    fn test_tag_lifecycle() {
        let mut b = MarkupBuilder::new();
        b.start_tag("p");
        b.enter_tag();
        b.append_raw("hello");
        b.close_tag("p");
        assert_eq!(b.finish(), "<p>hello</p>");
    }

    #[test]
    fn test_self_close() {
        let mut b = MarkupBuilder::new();
        b.start_tag("img");
        b.append(" src=\"x\"");
        b.self_close(false);
        assert_eq!(b.finish(), "<img src=\"x\"/>");
    }

    #[test]
    fn test_doctype_self_close() {
        let mut b = MarkupBuilder::new();
        b.start_tag("!DOCTYPE");
        b.append(" html");
        b.self_close(true);
        assert_eq!(b.finish(), "<!DOCTYPE html>");
    }

    #[test]
    fn test_nested_tags() {
        let mut b = MarkupBuilder::new();
        b.start_tag("div");
        b.enter_tag();
        b.start_tag("span");
        b.enter_tag();
        b.append_raw("x");
        b.close_tag("span");
        b.close_tag("div");
        assert_eq!(b.finish(), "<div><span>x</span></div>");
    }

    #[test]
    #[should_panic(expected = "innermost open element")]
    fn test_close_tag_mismatch_panics() {
        let mut b = MarkupBuilder::new();
        b.start_tag("div");
        b.enter_tag();
        b.close_tag("span");
    }

    #[test]
    #[should_panic(expected = "does not allow angle brackets")]
    fn test_append_rejects_angle_brackets() {
        let mut b = MarkupBuilder::new();
        b.append("<evil>");
    }

    #[test]
    #[should_panic(expected = "while another tag is still open")]
    fn test_double_start_panics() {
        let mut b = MarkupBuilder::new();
        b.start_tag("a");
        b.start_tag("b");
    }
}
