//! Markup emission.
//!
//! Walks the markup tree into a [`DualBuilder`]: static markup goes to the
//! markup stream, reactive bindings to the script stream. Dynamic regions
//! (interpolations, directive-carrying elements) leave a stable-id
//! placeholder in the markup and a mount call in the script; the combined
//! writer stitches the script stream back in as a trailing `<script>`
//! block, before the closing `</html>` when the document has one.

use crate::builder::{MarkupBuilder, ScriptBuilder};
use crate::js::{const_to_js, expr_to_js, json_string, statement_to_js};
use rtml_parser::ast::{
    Attribute, CondDirective, Element, LoopDirective, MarkupNode, Statement, TagClassification,
};

/// The two output streams of one compile.
pub struct DualBuilder {
    pub markup: MarkupBuilder,
    pub script: ScriptBuilder,
}

impl Default for DualBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DualBuilder {
    pub fn new() -> Self {
        Self {
            markup: MarkupBuilder::new(),
            script: ScriptBuilder::new(),
        }
    }

    /// Combine the streams: markup first, then the accumulated script as a
    /// trailing `<script>` block, re-injected before `</html>` if present.
    pub fn finish(self) -> String {
        let html = self.markup.finish();
        let js = self.script.finish();
        let js = js.trim();
        if js.is_empty() {
            return html;
        }
        let insert = format!("\n<script>\n{js}\n</script>\n");
        match html.rfind("</html>") {
            Some(index) => format!("{}{}{}", &html[..index], insert, &html[index..]),
            None => format!("{html}{insert}"),
        }
    }
}

pub fn markup_to_html(node: &MarkupNode, out: &mut DualBuilder) {
    match node {
        MarkupNode::Fragment(children) => {
            for child in children {
                markup_to_html(child, out);
            }
        }
        MarkupNode::Text(content) => out.markup.append_raw(content),
        MarkupNode::InterpolatedExpr { expr, id } => {
            render_placeholder(&mut out.markup, *id);
            out.script.append(&format!("rtml.mount(rtElt{id},"));
            expr_to_js(expr, &mut out.script, true);
            out.script.append_line(");");
        }
        MarkupNode::Element(el) => element_to_html(el, out),
        MarkupNode::ScriptElement { attributes, body } => {
            out.markup.start_tag("script");
            for attr in attributes {
                out.markup.append(" ");
                attribute_to_html(attr, &mut out.markup);
            }
            out.markup.enter_tag();
            if !block_is_empty(body) {
                let mut js = ScriptBuilder::new();
                statement_to_js(body, &mut js, true);
                out.markup.append_raw(&format!("\n{}", js.finish()));
            }
            out.markup.close_tag("script");
        }
        MarkupNode::Invalid { message, token } => {
            out.markup.append_raw(&format!("Invalid: {message} {token}"));
        }
    }
}

fn block_is_empty(body: &Statement) -> bool {
    matches!(body, Statement::Block { statements, .. } if statements.is_empty())
}

/// `<span id="rtElt{id}">…</span>` left where a dynamic region will mount.
fn render_placeholder(out: &mut MarkupBuilder, id: usize) {
    out.start_tag("span");
    out.append(&format!(" id=\"rtElt{id}\""));
    out.enter_tag();
    out.append("…");
    out.close_tag("span");
}

fn element_to_html(el: &Element, out: &mut DualBuilder) {
    // A directive turns the element into a placeholder plus a generated
    // render function; the element itself never appears inline.
    if let Some(id) = el.id {
        if el.cond.is_some() || el.loop_dir.is_some() {
            render_placeholder(&mut out.markup, id);
            emit_directive_mount(el, id, &mut out.script);
            emit_render_fn(el, id, &mut out.script);
            return;
        }
    }

    out.markup.start_tag(&el.tag);
    for attr in &el.attributes {
        out.markup.append(" ");
        attribute_to_html(attr, &mut out.markup);
    }

    let has_children = el.children.as_ref().is_some_and(|c| !c.is_empty());
    match el.classification {
        TagClassification::Doctype => {
            // `<!DOCTYPE html>`: enter without ever closing.
            out.markup.enter_tag();
            if let Some(children) = &el.children {
                for child in children {
                    markup_to_html(child, out);
                }
            }
        }
        TagClassification::NeverSelfClosing => {
            out.markup.enter_tag();
            if let Some(children) = &el.children {
                for child in children {
                    markup_to_html(child, out);
                }
            }
            out.markup.close_tag(&el.tag);
        }
        _ if has_children => {
            out.markup.enter_tag();
            if let Some(children) = &el.children {
                for child in children {
                    markup_to_html(child, out);
                }
            }
            out.markup.close_tag(&el.tag);
        }
        _ => out.markup.self_close(false),
    }
}

fn attribute_to_html(attr: &Attribute, out: &mut MarkupBuilder) {
    out.append(&attr.name);
    let Some(value) = &attr.value else { return };
    out.append("=");
    if let Some(constant) = value.const_value() {
        out.append_raw(&const_to_js(&constant));
    } else {
        // Non-constant values carry their reactive expression inline.
        out.append_raw("\"");
        let mut js = ScriptBuilder::new();
        expr_to_js(value, &mut js, true);
        out.append_raw(&js.into_single_line());
        out.append_raw("\"");
    }
}

fn emit_directive_mount(el: &Element, id: usize, out: &mut ScriptBuilder) {
    match &el.cond {
        Some(CondDirective::If(cond)) => mount_call(out, "mountIf", Some(cond), id),
        Some(CondDirective::ElseIf(cond)) => mount_call(out, "mountElseIf", Some(cond), id),
        Some(CondDirective::Else) => mount_call(out, "mountElse", None, id),
        None => {}
    }
    match &el.loop_dir {
        Some(LoopDirective::ForEach { iterator, .. }) => {
            mount_call(out, "mountEach", Some(iterator), id);
        }
        Some(LoopDirective::While(cond)) => mount_call(out, "mountWhile", Some(cond), id),
        None => {}
    }
}

fn mount_call(
    out: &mut ScriptBuilder,
    name: &str,
    expr: Option<&rtml_parser::ast::Expression>,
    id: usize,
) {
    out.append(&format!("rtml.{name}("));
    out.indent();
    if let Some(expr) = expr {
        expr_to_js(expr, out, true);
        out.append(",");
        out.break_long_line();
    }
    out.append_line(&format!("renderElt{id},rtElt{id});"));
    out.unindent();
}

/// `function renderElt{id}(it) { return <element reactive form>; }`
fn emit_render_fn(el: &Element, id: usize, out: &mut ScriptBuilder) {
    out.append_line(&format!("function renderElt{id}(it) {{"));
    out.indent();
    out.append("return ");
    element_to_js(el, out, true);
    out.append_line(";");
    out.unindent();
    out.append_line("}");
}

/// Reactive element constructor form: `rtml.elt("tag",{attrs},children...)`.
pub fn markup_to_js(node: &MarkupNode, out: &mut ScriptBuilder, reactive: bool) {
    match node {
        MarkupNode::Fragment(children) => {
            for (index, child) in children.iter().enumerate() {
                if index > 0 {
                    out.append(",");
                }
                markup_to_js(child, out, reactive);
            }
        }
        MarkupNode::Element(el) => element_to_js(el, out, reactive),
        MarkupNode::ScriptElement { .. } => out.append("null"),
        MarkupNode::InterpolatedExpr { expr, .. } => expr_to_js(expr, out, reactive),
        MarkupNode::Text(content) => out.append(&json_string(content)),
        MarkupNode::Invalid { message, .. } => out.append(&json_string(message)),
    }
}

fn element_to_js(el: &Element, out: &mut ScriptBuilder, reactive: bool) {
    out.append(&format!("rtml.elt({}", json_string(&el.tag)));
    if el.attributes.is_empty() {
        out.append(",null");
    } else {
        out.append(",{");
        for (index, attr) in el.attributes.iter().enumerate() {
            if index > 0 {
                out.append(",");
            }
            match &attr.value {
                None => out.append(&attr.name),
                Some(value) => {
                    out.append(&format!("{}: ", attr.name));
                    expr_to_js(value, out, reactive);
                }
            }
        }
        out.append("}");
    }
    if let Some(children) = &el.children {
        for child in children {
            out.append(",");
            markup_to_js(child, out, reactive);
        }
    }
    out.append(")");
}

/// Plain-mode rendering of a markup literal: reconstructed source text.
pub fn markup_to_source(node: &MarkupNode, out: &mut ScriptBuilder) {
    match node {
        MarkupNode::Fragment(children) => {
            for child in children {
                markup_to_source(child, out);
            }
        }
        MarkupNode::Element(el) => {
            out.append(&format!("<{}", el.tag));
            for attr in &el.attributes {
                out.append(" ");
                out.append(&attr.name);
                if let Some(value) = &attr.value {
                    out.append("=");
                    if let Some(constant) = value.const_value() {
                        out.append(&const_to_js(&constant));
                    } else {
                        out.append("{");
                        expr_to_js(value, out, false);
                        out.append("}");
                    }
                }
            }
            match &el.children {
                None => out.append("/>"),
                Some(children) => {
                    out.append(">");
                    for child in children {
                        markup_to_source(child, out);
                    }
                    out.append(&format!("</{}>", el.tag));
                }
            }
        }
        MarkupNode::ScriptElement { attributes, body } => {
            out.append("<script");
            for attr in attributes {
                out.append(" ");
                out.append(&attr.name);
                if let Some(value) = &attr.value {
                    out.append("=");
                    if let Some(constant) = value.const_value() {
                        out.append(&const_to_js(&constant));
                    }
                }
            }
            out.append(">");
            statement_to_js(body, out, false);
            out.append("</script>");
        }
        MarkupNode::InterpolatedExpr { expr, .. } => {
            out.append("{");
            expr_to_js(expr, out, false);
            out.append("}");
        }
        MarkupNode::Text(content) => out.append_raw(content),
        MarkupNode::Invalid { message, token } => {
            out.append_raw(&format!("Invalid: {message} {token}"));
        }
    }
}
