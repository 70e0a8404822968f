//! Expression parser: precedence climbing over script tokens.
//!
//! `parse_expr(min_priority)` absorbs operators with a priority strictly
//! greater than the bound, which makes equal-priority binary chains
//! left-associative; the right-associative forms (ternary false branch,
//! lambda body) recurse with the *outer* bound instead of their own
//! operator's priority.
//!
//! A leading `<` switches to the markup parser for one element and resumes
//! the script lexer from wherever the markup parser left the cursor.

use crate::ast::Expression;
use crate::context::CompileContext;
use crate::markup_parser::MarkupParser;
use crate::ParseError;
use rtml_lexer::{Fixity, Op, ScriptToken, ScriptTokenKind, PRIORITY_ZERO};

pub struct ExprParser<'a> {
    ctx: &'a mut CompileContext,
}

impl<'a> ExprParser<'a> {
    pub fn new(ctx: &'a mut CompileContext) -> Self {
        Self { ctx }
    }

    /// Parse an attribute value. The script lexer cache is stale at this
    /// point (the markup lexer was active), so it re-lexes from the cursor.
    pub fn parse_attribute_expr(&mut self, priority: u8) -> Result<Expression, ParseError> {
        self.ctx.script_clear();
        self.parse_expr(priority)
    }

    /// Parse an interpolated expression, bounded so the closing `}` stops
    /// the climb.
    pub fn parse_html_expr(&mut self) -> Result<Expression, ParseError> {
        self.ctx.script_clear();
        self.parse_expr(Op::CloseCurly.priority())
    }

    /// Parse a full expression at the lowest bound.
    pub fn parse_full_expr(&mut self) -> Result<Expression, ParseError> {
        self.parse_expr(PRIORITY_ZERO)
    }

    pub fn parse_expr(&mut self, min_priority: u8) -> Result<Expression, ParseError> {
        let mut result = self.parse_left()?;
        loop {
            let token = self.ctx.script_current();
            let Some(token_op) = token.op() else { break };
            if token_op.priority() <= min_priority {
                break;
            }
            // `(` after a value is a call, not grouping.
            let op = if token_op == Op::OpenParen {
                Op::FunctionCall
            } else {
                token_op
            };
            match op.fixity() {
                Fixity::Func => result = self.parse_function_call(result)?,
                Fixity::Postfix => {
                    self.ctx.script_advance();
                    result = Expression::Unary {
                        op,
                        operand: Box::new(result),
                    };
                }
                Fixity::Binary => {
                    self.ctx.script_advance();
                    let right = self.parse_expr(op.priority())?;
                    result = Expression::Binary {
                        left: Box::new(result),
                        op,
                        right: Box::new(right),
                    };
                }
                Fixity::Nary => result = self.parse_nary(result, op)?,
                Fixity::Lambda => result = self.parse_lambda(result, min_priority, &token)?,
                Fixity::Ternary => result = self.parse_ternary(result, min_priority)?,
                _ => break,
            }
        }
        Ok(result)
    }

    /// Collect a flat run of one n-ary operator: `a, b, c` becomes a single
    /// node rather than nested pairs.
    fn parse_nary(&mut self, left: Expression, op: Op) -> Result<Expression, ParseError> {
        let mut args = vec![left];
        while self.ctx.script_current().op() == Some(op) {
            self.ctx.script_advance();
            args.push(self.parse_expr(op.priority())?);
        }
        Ok(Expression::Nary { op, args })
    }

    fn parse_ternary(
        &mut self,
        cond: Expression,
        min_priority: u8,
    ) -> Result<Expression, ParseError> {
        self.ctx.script_advance(); // consume `?`
        let then_value = self.parse_expr(Op::ColonAssign.priority())?;
        let token = self.ctx.script_current();
        if token.op() == Some(Op::ColonAssign) {
            self.ctx.script_advance();
        } else {
            return Err(ParseError::unexpected(
                &token,
                token.span,
                "in ? : expression, the character ':' is expected",
            ));
        }
        let else_value = self.parse_expr(min_priority)?;
        Ok(Expression::Ternary {
            cond: Box::new(cond),
            then_value: Box::new(then_value),
            else_value: Box::new(else_value),
        })
    }

    fn parse_lambda(
        &mut self,
        left: Expression,
        min_priority: u8,
        token: &ScriptToken,
    ) -> Result<Expression, ParseError> {
        let param_of = |expr: &Expression| -> Result<String, ParseError> {
            match expr {
                Expression::Identifier(name) => Ok(name.clone()),
                _ => Err(ParseError::new(
                    "lambda parameters must be identifiers",
                    token.span,
                )),
            }
        };
        let params = match &left {
            Expression::Nary { op: Op::Comma, args } => {
                args.iter().map(param_of).collect::<Result<Vec<_>, _>>()?
            }
            other => vec![param_of(other)?],
        };
        self.ctx.script_advance(); // consume `=>`
        let body = self.parse_expr(min_priority)?;
        Ok(Expression::Lambda {
            params,
            body: Box::new(body),
        })
    }

    fn parse_function_call(&mut self, callee: Expression) -> Result<Expression, ParseError> {
        self.ctx.script_advance(); // consume `(`
        let mut args = Vec::new();
        let mut first = true;
        loop {
            let token = self.ctx.script_current();
            if token.kind == ScriptTokenKind::Eof {
                return Err(ParseError::unexpected(
                    &token,
                    token.span,
                    "expecting a comma or a closing parenthesis",
                ));
            }
            if token.op() == Some(Op::CloseParen) {
                self.ctx.script_advance();
                return Ok(Expression::Call {
                    callee: Box::new(callee),
                    args,
                });
            }
            if first {
                first = false;
            } else if token.op() == Some(Op::Comma) {
                self.ctx.script_advance();
            } else {
                return Err(ParseError::unexpected(
                    &token,
                    token.span,
                    "expecting a comma or a closing parenthesis",
                ));
            }
            args.push(self.parse_expr(Op::Comma.priority())?);
        }
    }

    fn parse_array(&mut self) -> Result<Expression, ParseError> {
        self.ctx.script_advance(); // consume `[`
        let mut entries = Vec::new();
        let mut first = true;
        loop {
            let token = self.ctx.script_current();
            if token.kind == ScriptTokenKind::Eof {
                return Err(ParseError::unexpected(&token, token.span, "in array"));
            }
            if token.op() == Some(Op::CloseBracket) {
                self.ctx.script_advance();
                return Ok(Expression::Array(entries));
            }
            if first {
                first = false;
            } else if token.op() == Some(Op::Comma) {
                self.ctx.script_advance();
            } else {
                return Err(ParseError::unexpected(
                    &token,
                    token.span,
                    "in array, expecting a comma or closing the array with ']'",
                ));
            }
            entries.push(self.parse_expr(Op::OpenBracket.priority())?);
        }
    }

    /// One primary/prefix form.
    fn parse_left(&mut self) -> Result<Expression, ParseError> {
        let token = self.ctx.script_current();
        match token.kind {
            ScriptTokenKind::Identifier(name) => {
                self.ctx.script_clear();
                Ok(Expression::Identifier(name))
            }
            ScriptTokenKind::Str(value) => {
                self.ctx.script_clear();
                Ok(Expression::Str(value))
            }
            ScriptTokenKind::Number(value) => {
                self.ctx.script_clear();
                Ok(Expression::Number(value))
            }
            ScriptTokenKind::Op(token_op) => {
                // In leading position the shared symbols mean their prefix
                // forms.
                let op = match token_op {
                    Op::PostfixInc => Op::PrefixInc,
                    Op::PostfixDec => Op::PrefixDec,
                    Op::Plus => Op::UnaryPlus,
                    Op::Sub => Op::UnaryMinus,
                    other => other,
                };
                if op.fixity() == Fixity::Prefix {
                    self.ctx.script_clear();
                    let operand = self.parse_left()?;
                    return Ok(Expression::Unary {
                        op,
                        operand: Box::new(operand),
                    });
                }
                match op {
                    // A markup literal: rewind to the `<` and hand the
                    // cursor to the markup parser for one element.
                    Op::Lt => {
                        self.ctx.cursor.rewind(token.span.start);
                        self.ctx.markup.reset();
                        let node = MarkupParser::new(self.ctx).parse_one()?;
                        self.ctx.script_clear();
                        Ok(Expression::Markup(Box::new(node)))
                    }
                    Op::OpenParen => {
                        self.ctx.script_advance();
                        let inner = self.parse_expr(PRIORITY_ZERO)?;
                        let close = self.ctx.script_current();
                        if close.op() == Some(Op::CloseParen) {
                            self.ctx.script_advance();
                        } else {
                            return Err(ParseError::unexpected(
                                &close,
                                close.span,
                                "expecting a closing parenthesis",
                            ));
                        }
                        Ok(inner)
                    }
                    Op::OpenBracket => self.parse_array(),
                    Op::OpenCurly => Err(ParseError::new(
                        "object literals are not supported in expressions",
                        token.span,
                    )),
                    _ => Err(ParseError::unexpected(
                        &token,
                        token.span,
                        "at the start of an expression",
                    )),
                }
            }
            ScriptTokenKind::Invalid { ref reason, .. } => {
                Err(ParseError::new(reason.clone(), token.span))
            }
            ScriptTokenKind::Eof => Err(ParseError::new(
                "unexpected end of input, expecting an expression",
                token.span,
            )),
        }
    }
}
