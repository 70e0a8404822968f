//! Markup parser: tags, attributes, children, directives.
//!
//! Attribute values and interpolations are handed to the expression parser,
//! `<script>` bodies to the statement parser. Each hand-off is bracketed by
//! an explicit cursor capture/rewind plus a lexer-cache clear, so the
//! resumed parser starts from exactly the right offset.
//!
//! Close-tag matching is best-effort: only the nearest open element is
//! checked, case-insensitively. On a mismatch the element closes implicitly
//! and the stray closing tag is dropped at the fragment root.

use crate::ast::{
    Attribute, CondDirective, Element, Expression, LoopDirective, MarkupNode, TagClassification,
};
use crate::context::CompileContext;
use crate::expr_parser::ExprParser;
use crate::statement_parser::StatementParser;
use crate::ParseError;
use rtml_lexer::{is_self_closing_tag, MarkupTokenKind, Op};

pub struct MarkupParser<'a> {
    ctx: &'a mut CompileContext,
}

impl<'a> MarkupParser<'a> {
    pub fn new(ctx: &'a mut CompileContext) -> Self {
        Self { ctx }
    }

    /// Parse a whole source unit into one fragment. The id counter resets
    /// here so placeholder ids are stable per compile.
    pub fn parse_all(&mut self) -> Result<MarkupNode, ParseError> {
        self.ctx.reset_elt_ids();
        let mut children = Vec::new();
        loop {
            children.extend(self.parse_fragments()?);
            let token = self.ctx.markup_current();
            match token.kind {
                // A closing tag with no open element: drop it and go on.
                MarkupTokenKind::ClosingTag(_) => self.ctx.markup_clear(),
                _ => break,
            }
        }
        Ok(MarkupNode::Fragment(children))
    }

    /// Parse exactly one element. Entry point for markup literals inside
    /// expressions.
    pub fn parse_one(&mut self) -> Result<MarkupNode, ParseError> {
        let token = self.ctx.markup_current();
        match token.kind {
            MarkupTokenKind::StartTag(name) => self.parse_element_or_script(name),
            _ => Ok(MarkupNode::Invalid {
                message: "expecting a markup element".into(),
                token: token.to_string(),
            }),
        }
    }

    fn parse_fragments(&mut self) -> Result<Vec<MarkupNode>, ParseError> {
        let mut children = Vec::new();
        loop {
            let token = self.ctx.markup_current();
            match token.kind {
                MarkupTokenKind::Eof | MarkupTokenKind::ClosingTag(_) => break,
                MarkupTokenKind::StartTag(name) => {
                    children.push(self.parse_element_or_script(name)?);
                }
                MarkupTokenKind::StartExpr => {
                    // Claim the id before the expression parse so nested
                    // dynamic regions number in document order.
                    let id = self.ctx.next_elt_id();
                    let expr = ExprParser::new(self.ctx).parse_html_expr()?;
                    children.push(MarkupNode::InterpolatedExpr { expr, id });
                    self.ctx.markup_advance();
                }
                _ => {
                    children.push(MarkupNode::Text(token.to_string()));
                    self.ctx.markup_clear();
                }
            }
        }
        Ok(children)
    }

    fn parse_element_or_script(&mut self, tag_name: String) -> Result<MarkupNode, ParseError> {
        let lname = tag_name.to_ascii_lowercase();
        self.ctx.markup_advance(); // step past the start tag
        let raw_attributes = self.parse_attributes()?;

        let token = self.ctx.markup_current();
        let MarkupTokenKind::TagContent { empty } = token.kind else {
            return Err(ParseError::unexpected(
                &token,
                token.span,
                &format!("in tag {tag_name}, expecting </{tag_name}> or />"),
            ));
        };
        self.ctx.markup_clear();

        let is_empty = empty || is_self_closing_tag(&lname);
        if !is_empty && lname == "script" {
            let body = self.parse_script_body()?;
            return Ok(MarkupNode::ScriptElement {
                attributes: raw_attributes,
                body,
            });
        }

        let (attributes, id, cond, loop_dir) = self.intercept_directives(raw_attributes)?;

        let children = if is_empty {
            None
        } else {
            let kids = self.parse_fragments()?;
            let close = self.ctx.markup_current();
            if let MarkupTokenKind::ClosingTag(close_name) = &close.kind {
                if close_name.to_ascii_lowercase() == lname {
                    self.ctx.markup_clear();
                }
                // Mismatch: leave the token for the enclosing level; this
                // element closes implicitly.
            }
            Some(kids)
        };

        Ok(MarkupNode::Element(Element {
            classification: TagClassification::of(&lname),
            tag: tag_name,
            attributes,
            children,
            id,
            cond,
            loop_dir,
        }))
    }

    fn parse_attributes(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();
        loop {
            let token = self.ctx.markup_current();
            match token.kind {
                MarkupTokenKind::Eof | MarkupTokenKind::TagContent { .. } => break,
                MarkupTokenKind::Identifier(name) => {
                    let next = self.ctx.markup_advance();
                    let value = if next.kind == MarkupTokenKind::Equal {
                        Some(self.parse_attribute_value()?)
                    } else {
                        None
                    };
                    attributes.push(Attribute { name, value });
                }
                MarkupTokenKind::Spaces(_) => {
                    self.ctx.markup_advance();
                }
                _ => {
                    return Err(ParseError::unexpected(&token, token.span, "in attributes"));
                }
            }
        }
        Ok(attributes)
    }

    /// An attribute value is script territory: either `{expr}` bounded by
    /// the `}` priority or a bare expression bounded below `/`, so the `/`
    /// of a self-closing `/>` is not swallowed. Afterwards the cursor is
    /// rewound to the expression parser's current (unconsumed) token and
    /// the markup lexer takes over again.
    fn parse_attribute_value(&mut self) -> Result<Expression, ParseError> {
        self.ctx.cursor.skip_spaces_and_newlines();
        let (expect_close, priority) = if self.ctx.cursor.current() == '{' {
            self.ctx.cursor.advance();
            (true, Op::CloseCurly.priority())
        } else {
            (false, Op::Div.priority())
        };

        let value = ExprParser::new(self.ctx).parse_attribute_expr(priority)?;

        let resume_at = self.ctx.script_current().span.start;
        self.ctx.cursor.rewind(resume_at);
        self.ctx.script_clear();

        if expect_close {
            if self.ctx.cursor.current() == '}' {
                self.ctx.cursor.advance();
            } else {
                let span = self.ctx.cursor.span_from(self.ctx.cursor.position());
                return Err(ParseError::new("expecting the character '}'", span));
            }
        }
        self.ctx.markup_advance();
        Ok(value)
    }

    fn parse_script_body(&mut self) -> Result<crate::ast::Statement, ParseError> {
        StatementParser::new(self.ctx).parse_script()
    }

    /// Pull the template directives out of the attribute list. An element
    /// that carries one becomes a dynamic region and claims an id.
    fn intercept_directives(
        &mut self,
        raw: Vec<Attribute>,
    ) -> Result<
        (
            Vec<Attribute>,
            Option<usize>,
            Option<CondDirective>,
            Option<LoopDirective>,
        ),
        ParseError,
    > {
        let mut attributes = Vec::new();
        let mut cond = None;
        let mut loop_dir = None;
        for attr in raw {
            match attr.name.as_str() {
                "if" => cond = Some(CondDirective::If(self.directive_value(attr)?)),
                "elseif" | "else-if" => {
                    cond = Some(CondDirective::ElseIf(self.directive_value(attr)?));
                }
                "else" => cond = Some(CondDirective::Else),
                "foreach" => {
                    loop_dir = Some(LoopDirective::ForEach {
                        var_name: "it".into(),
                        iterator: self.directive_value(attr)?,
                    });
                }
                "while" => loop_dir = Some(LoopDirective::While(self.directive_value(attr)?)),
                _ => attributes.push(attr),
            }
        }
        let id = if cond.is_some() || loop_dir.is_some() {
            Some(self.ctx.next_elt_id())
        } else {
            None
        };
        Ok((attributes, id, cond, loop_dir))
    }

    fn directive_value(&mut self, attr: Attribute) -> Result<Expression, ParseError> {
        attr.value.ok_or_else(|| {
            let span = self.ctx.cursor.span_from(self.ctx.cursor.position());
            ParseError::new(
                format!("the '{}' directive requires a value", attr.name),
                span,
            )
        })
    }
}
