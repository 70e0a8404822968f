//! Statement parser: declarations and control flow over script tokens.
//!
//! Dispatches on a leading identifier's text; anything unrecognized falls
//! through to an expression statement. Blocks terminate on `}` or the
//! synthetic end-of-script-tag operator, so a `<script>` body can be parsed
//! without markup-level context. A single statement is accepted wherever a
//! block may appear, and trailing semicolons are consumed silently.

use crate::ast::{DeclKind, Expression, Statement};
use crate::context::CompileContext;
use crate::expr_parser::ExprParser;
use crate::ParseError;
use rtml_lexer::{Op, ScriptTokenKind};

pub struct StatementParser<'a> {
    ctx: &'a mut CompileContext,
}

impl<'a> StatementParser<'a> {
    pub fn new(ctx: &'a mut CompileContext) -> Self {
        Self { ctx }
    }

    /// Parse a script body up to `}`, `</script...>`, or end of input.
    /// Clears the script lexer first: the markup lexer was active before
    /// the hand-off.
    pub fn parse_script(&mut self) -> Result<Statement, ParseError> {
        self.ctx.script_clear();
        self.parse_block(true)
    }

    fn parse_block(&mut self, is_root: bool) -> Result<Statement, ParseError> {
        let mut statements = Vec::new();
        loop {
            let token = self.ctx.script_current();
            if token.kind == ScriptTokenKind::Eof {
                break;
            }
            if matches!(token.op(), Some(Op::CloseCurly) | Some(Op::EndScriptTag)) {
                break;
            }
            statements.push(self.parse_single()?);
        }
        Ok(Statement::Block {
            statements,
            is_root,
        })
    }

    fn skip_semi(&mut self) {
        if self.ctx.script_current().op() == Some(Op::SemiColon) {
            self.ctx.script_advance();
        }
    }

    fn parse_single(&mut self) -> Result<Statement, ParseError> {
        let token = self.ctx.script_current();
        let statement = match &token.kind {
            ScriptTokenKind::Identifier(name) => self.parse_identifier_line(name.clone())?,
            _ if token.op() == Some(Op::SemiColon) => {
                self.ctx.script_advance();
                Statement::Block {
                    statements: Vec::new(),
                    is_root: false,
                }
            }
            _ => self.parse_expr_line()?,
        };
        self.skip_semi();
        Ok(statement)
    }

    fn parse_identifier_line(&mut self, name: String) -> Result<Statement, ParseError> {
        match name.as_str() {
            "const" => {
                self.ctx.script_advance();
                self.parse_declaration(DeclKind::Const)
            }
            "let" => {
                self.ctx.script_advance();
                self.parse_declaration(DeclKind::Let)
            }
            "var" => {
                self.ctx.script_advance();
                self.parse_declaration(DeclKind::Var)
            }
            "for" => self.parse_for(),
            "function" => self.parse_function(),
            "if" => self.parse_if(),
            "return" => self.parse_return(),
            "while" => self.parse_while(),
            "class" => self.parse_class(),
            "switch" | "try" => {
                let token = self.ctx.script_current();
                Err(ParseError::new(
                    format!("'{name}' statements are not supported"),
                    token.span,
                ))
            }
            _ => self.parse_expr_line(),
        }
    }

    /// An expression statement; when the expression's top is an
    /// assignment-class operator application it becomes an assignment
    /// statement instead.
    fn parse_expr_line(&mut self) -> Result<Statement, ParseError> {
        let expr = self.parse_bounded_expr()?;
        Ok(match expr {
            Expression::Binary { left, op, right } if op.is_assign() => Statement::Assign {
                target: *left,
                op,
                value: Some(*right),
            },
            Expression::Unary { op, operand } if op.is_assign() => Statement::Assign {
                target: *operand,
                op,
                value: None,
            },
            other => Statement::Expression(other),
        })
    }

    /// Expressions inside statements stop below the statement separators.
    fn parse_bounded_expr(&mut self) -> Result<Expression, ParseError> {
        ExprParser::new(self.ctx).parse_expr(Op::SemiColon.priority())
    }

    fn parse_declaration(&mut self, kind: DeclKind) -> Result<Statement, ParseError> {
        let token = self.ctx.script_current();
        let ScriptTokenKind::Identifier(name) = token.kind else {
            return Err(ParseError::unexpected(
                &token,
                token.span,
                "in a variable declaration, a variable name is expected",
            ));
        };
        self.ctx.script_advance();
        let init = if self.ctx.script_current().op() == Some(Op::Assign) {
            self.ctx.script_advance();
            Some(self.parse_bounded_expr()?)
        } else {
            None
        };
        Ok(Statement::VariableDeclaration { kind, name, init })
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        self.ctx.script_advance();
        self.expect_op(Op::OpenParen)?;
        let init = self.parse_single()?;
        let cond = self.parse_bounded_expr()?;
        self.expect_op(Op::SemiColon)?;
        let step = self.parse_single()?;
        self.expect_op(Op::CloseParen)?;
        let body = self.parse_single_or_block()?;
        Ok(Statement::For {
            init: Box::new(init),
            cond,
            step: Box::new(step),
            body: Box::new(body),
        })
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        self.ctx.script_advance();
        self.expect_op(Op::OpenParen)?;
        let cond = self.parse_bounded_expr()?;
        self.expect_op(Op::CloseParen)?;
        let then_branch = self.parse_single_or_block()?;
        let mut else_branch = None;
        let token = self.ctx.script_current();
        if matches!(&token.kind, ScriptTokenKind::Identifier(name) if name == "else") {
            self.ctx.script_advance();
            else_branch = Some(Box::new(self.parse_single_or_block()?));
        }
        Ok(Statement::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, ParseError> {
        self.ctx.script_advance();
        self.expect_op(Op::OpenParen)?;
        let cond = self.parse_bounded_expr()?;
        self.expect_op(Op::CloseParen)?;
        let body = self.parse_single_or_block()?;
        Ok(Statement::While {
            cond,
            body: Box::new(body),
        })
    }

    fn parse_function(&mut self) -> Result<Statement, ParseError> {
        self.ctx.script_advance();
        let name = self.expect_identifier("in a function declaration")?;
        let params = self.parse_params()?;
        let body = self.parse_single_or_block()?;
        Ok(Statement::Function {
            owner_class: None,
            name,
            params,
            body: Box::new(body),
        })
    }

    fn parse_return(&mut self) -> Result<Statement, ParseError> {
        self.ctx.script_advance();
        let token = self.ctx.script_current();
        let ends_statement = token.kind == ScriptTokenKind::Eof
            || matches!(
                token.op(),
                Some(Op::SemiColon) | Some(Op::CloseCurly) | Some(Op::EndScriptTag)
            );
        if ends_statement {
            return Ok(Statement::Return(None));
        }
        Ok(Statement::Return(Some(self.parse_bounded_expr()?)))
    }

    fn parse_class(&mut self) -> Result<Statement, ParseError> {
        self.ctx.script_advance();
        let name = self.expect_identifier("a class name is expected after the class keyword")?;
        let mut base = None;
        let token = self.ctx.script_current();
        if matches!(&token.kind, ScriptTokenKind::Identifier(word) if word == "extends") {
            self.ctx.script_advance();
            base = Some(self.parse_bounded_expr()?);
        }
        self.expect_op(Op::OpenCurly)?;
        let mut members = Vec::new();
        loop {
            let token = self.ctx.script_current();
            match &token.kind {
                ScriptTokenKind::Identifier(method_name) => {
                    let method_name = method_name.clone();
                    self.ctx.script_advance();
                    let params = if self.ctx.script_current().op() == Some(Op::OpenParen) {
                        self.parse_params()?
                    } else {
                        Vec::new()
                    };
                    let body = self.parse_single_or_block()?;
                    members.push(Statement::Function {
                        owner_class: Some(name.clone()),
                        name: method_name,
                        params,
                        body: Box::new(body),
                    });
                }
                _ if token.op() == Some(Op::CloseCurly) => break,
                _ => {
                    return Err(ParseError::unexpected(
                        &token,
                        token.span,
                        &format!("in class {name}"),
                    ));
                }
            }
        }
        self.expect_op(Op::CloseCurly)?;
        Ok(Statement::Class {
            name,
            base,
            members,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect_op(Op::OpenParen)?;
        let mut params = Vec::new();
        loop {
            let token = self.ctx.script_current();
            match &token.kind {
                ScriptTokenKind::Identifier(name) => {
                    params.push(name.clone());
                    self.ctx.script_advance();
                    if self.ctx.script_current().op() == Some(Op::Comma) {
                        self.ctx.script_advance();
                    }
                }
                ScriptTokenKind::Eof => {
                    return Err(ParseError::unexpected(
                        &token,
                        token.span,
                        "in a function parameter list",
                    ));
                }
                _ => {
                    if token.op() == Some(Op::CloseParen) {
                        self.ctx.script_advance();
                        return Ok(params);
                    }
                    return Err(ParseError::unexpected(
                        &token,
                        token.span,
                        "in a function parameter list",
                    ));
                }
            }
        }
    }

    fn parse_single_or_block(&mut self) -> Result<Statement, ParseError> {
        if self.ctx.script_current().op() == Some(Op::OpenCurly) {
            self.ctx.script_advance();
            let block = self.parse_block(false)?;
            if self.ctx.script_current().op() == Some(Op::CloseCurly) {
                self.ctx.script_advance();
            }
            Ok(block)
        } else {
            self.parse_single()
        }
    }

    fn expect_op(&mut self, op: Op) -> Result<(), ParseError> {
        let token = self.ctx.script_current();
        if token.op() == Some(op) {
            self.ctx.script_advance();
            Ok(())
        } else {
            let symbol = op.symbol().unwrap_or(op.name());
            Err(ParseError::unexpected(
                &token,
                token.span,
                &format!("but '{symbol}' was expected"),
            ))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, ParseError> {
        let token = self.ctx.script_current();
        match token.kind {
            ScriptTokenKind::Identifier(name) => {
                self.ctx.script_advance();
                Ok(name)
            }
            _ => Err(ParseError::unexpected(&token, token.span, context)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Statement {
        let mut ctx = CompileContext::new("/test", source);
        StatementParser::new(&mut ctx).parse_script().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let mut ctx = CompileContext::new("/test", source);
        StatementParser::new(&mut ctx).parse_script().unwrap_err()
    }

    fn single(source: &str) -> Statement {
        match parse(source) {
            Statement::Block { mut statements, is_root: true } => {
                assert_eq!(statements.len(), 1, "expected one statement");
                statements.remove(0)
            }
            other => panic!("expected root block, got {other:?}"),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    #[test]
    fn test_declarations() {
        for (source, kind) in [
            ("const a;", DeclKind::Const),
            ("let a;", DeclKind::Let),
            ("var a;", DeclKind::Var),
        ] {
            match single(source) {
                Statement::VariableDeclaration { kind: k, name, init } => {
                    assert_eq!(k, kind);
                    assert_eq!(name, "a");
                    assert!(init.is_none());
                }
                other => panic!("expected declaration, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_declaration_with_init() {
        match single("let a = 5;") {
            Statement::VariableDeclaration { init, .. } => {
                assert_eq!(init, Some(Expression::Number(5.0)));
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_two_declarations() {
        match parse("let a=1; let b=2;") {
            Statement::Block { statements, .. } => assert_eq!(statements.len(), 2),
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_without_name() {
        let err = parse_err("let 5;");
        assert!(err.message.contains("variable name"));
    }

    // =========================================================================
    // Expression and assignment statements
    // =========================================================================

    #[test]
    fn test_call_statement() {
        match single("console.log(1)") {
            Statement::Expression(expr) => {
                assert!(matches!(expr, Expression::Binary { op: Op::Dot, .. }));
            }
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_assignment_statement() {
        match single("a = 5") {
            Statement::Assign { target, op, value } => {
                assert_eq!(target, Expression::Identifier("a".into()));
                assert_eq!(op, Op::Assign);
                assert_eq!(value, Some(Expression::Number(5.0)));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_increment_statement() {
        match single("c++") {
            Statement::Assign { target, op, value } => {
                assert_eq!(target, Expression::Identifier("c".into()));
                assert_eq!(op, Op::PostfixInc);
                assert!(value.is_none());
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_compound_assignment() {
        match single("x += 2") {
            Statement::Assign { op, .. } => assert_eq!(op, Op::PlusAssign),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_comma_statement() {
        match single("1,2,3") {
            Statement::Expression(Expression::Nary { op: Op::Comma, args }) => {
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected comma expression, got {other:?}"),
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    #[test]
    fn test_if_without_else() {
        match single("if (1) console.log(\"hi\")") {
            Statement::If { else_branch, .. } => assert!(else_branch.is_none()),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_if_else() {
        match single("if (1) 1; else 2;") {
            Statement::If { else_branch, .. } => assert!(else_branch.is_some()),
            other => panic!("expected if/else, got {other:?}"),
        }
    }

    #[test]
    fn test_while_empty_block() {
        match single("while (1) {}") {
            Statement::While { body, .. } => match *body {
                Statement::Block { statements, is_root } => {
                    assert!(statements.is_empty());
                    assert!(!is_root);
                }
                other => panic!("expected block body, got {other:?}"),
            },
            other => panic!("expected while, got {other:?}"),
        }
    }

    #[test]
    fn test_for_three_clauses() {
        match single("for(i=0;i<10;i++) {}") {
            Statement::For { init, cond, step, .. } => {
                assert!(matches!(*init, Statement::Assign { op: Op::Assign, .. }));
                assert!(matches!(cond, Expression::Binary { op: Op::Lt, .. }));
                assert!(matches!(*step, Statement::Assign { op: Op::PostfixInc, .. }));
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_paren_in_if() {
        let err = parse_err("if 1) {}");
        assert!(err.message.contains("'('"));
    }

    // =========================================================================
    // Functions and classes
    // =========================================================================

    #[test]
    fn test_function_declaration() {
        match single("function double(a,b) { return a + b; }") {
            Statement::Function {
                owner_class,
                name,
                params,
                body,
            } => {
                assert!(owner_class.is_none());
                assert_eq!(name, "double");
                assert_eq!(params, vec!["a", "b"]);
                match *body {
                    Statement::Block { statements, .. } => {
                        assert!(matches!(statements[0], Statement::Return(Some(_))));
                    }
                    other => panic!("expected block body, got {other:?}"),
                }
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_return() {
        match single("return;") {
            Statement::Return(value) => assert!(value.is_none()),
            other => panic!("expected return, got {other:?}"),
        }
    }

    #[test]
    fn test_class_with_method() {
        let source = "class App extends Mu.Component { render() { return 1 } }";
        match single(source) {
            Statement::Class { name, base, members } => {
                assert_eq!(name, "App");
                assert!(matches!(base, Some(Expression::Binary { op: Op::Dot, .. })));
                assert_eq!(members.len(), 1);
                match &members[0] {
                    Statement::Function { owner_class, name, .. } => {
                        assert_eq!(owner_class.as_deref(), Some("App"));
                        assert_eq!(name, "render");
                    }
                    other => panic!("expected method, got {other:?}"),
                }
            }
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn test_switch_is_unsupported() {
        let err = parse_err("switch (x) {}");
        assert!(err.message.contains("not supported"));
    }

    // =========================================================================
    // Block terminators
    // =========================================================================

    #[test]
    fn test_root_block_stops_at_end_script_tag() {
        let mut ctx = CompileContext::new("/test", "let a=1;</script> trailing");
        let block = StatementParser::new(&mut ctx).parse_script().unwrap();
        match block {
            Statement::Block { statements, .. } => assert_eq!(statements.len(), 1),
            other => panic!("expected block, got {other:?}"),
        }
        assert_eq!(ctx.script_current().op(), Some(Op::EndScriptTag));
    }

    #[test]
    fn test_lone_semicolons() {
        match parse(";;") {
            Statement::Block { statements, .. } => {
                // each `;` parses as an empty inner block
                assert!(statements
                    .iter()
                    .all(|s| matches!(s, Statement::Block { statements, .. } if statements.is_empty())));
            }
            other => panic!("expected block, got {other:?}"),
        }
    }
}
