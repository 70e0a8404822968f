//! Script emission: plain and reactive forms from one AST.
//!
//! Plain mode prints infix/prefix syntax, parenthesizing a child only when
//! its priority is lower than the parent's. Reactive mode prints every
//! non-constant operator application as a named runtime call
//! (`rtml.plus(a,b)`), so the runtime can re-evaluate when operands change.
//! Constant subexpressions always print as their folded literal, in either
//! mode.

use crate::builder::ScriptBuilder;
use crate::html::{markup_to_js, markup_to_source};
use rtml_parser::ast::{Expression, Statement};
use rtml_lexer::{format_number, ConstValue, Fixity, Op};

/// JSON-style string literal with the usual escapes.
pub fn json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if (c as u32) < 0x20 => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

/// Literal form of a folded constant.
pub fn const_to_js(value: &ConstValue) -> String {
    match value {
        ConstValue::Number(n) => format_number(*n),
        ConstValue::Str(s) => json_string(s),
        ConstValue::Bool(b) => b.to_string(),
        ConstValue::Null => "null".into(),
    }
}

pub fn expr_to_js(expr: &Expression, out: &mut ScriptBuilder, reactive: bool) {
    // Folded subtrees print as literals regardless of mode.
    if let Some(value) = expr.const_value() {
        out.append(&const_to_js(&value));
        return;
    }
    match expr {
        Expression::Number(n) => out.append(&format_number(*n)),
        Expression::Str(s) => out.append(&json_string(s)),
        Expression::Identifier(name) => out.append(name),
        Expression::Unary { op, operand } => {
            // Unary applications keep their syntax in both modes.
            let symbol = op.symbol().unwrap_or_default();
            if op.fixity() == Fixity::Prefix {
                out.append(symbol);
                expr_to_js(operand, out, reactive);
            } else {
                expr_to_js(operand, out, reactive);
                out.append(symbol);
            }
        }
        Expression::Binary { left, op, right } => {
            if reactive {
                out.append(&format!("rtml.{}(", op.name()));
                expr_to_js(left, out, true);
                out.append(",");
                expr_to_js(right, out, true);
                out.append(")");
            } else {
                child_to_js(left, op.priority(), out);
                out.append(op.symbol().unwrap_or_default());
                child_to_js(right, op.priority(), out);
            }
        }
        Expression::Ternary {
            cond,
            then_value,
            else_value,
        } => {
            if reactive {
                out.append(&format!("rtml.{}(", Op::TernaryCond.name()));
                expr_to_js(cond, out, true);
                out.append(",");
                expr_to_js(then_value, out, true);
                out.append(",");
                expr_to_js(else_value, out, true);
                out.append(")");
            } else {
                let priority = Op::TernaryCond.priority();
                child_to_js(cond, priority, out);
                out.append("?");
                child_to_js(then_value, priority, out);
                out.append(":");
                child_to_js(else_value, priority, out);
            }
        }
        Expression::Nary { op, args } => {
            if reactive {
                out.append(&format!("rtml.{}(", op.name()));
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        out.append(",");
                    }
                    expr_to_js(arg, out, true);
                }
                out.append(")");
            } else {
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        out.append(op.symbol().unwrap_or_default());
                    }
                    child_to_js(arg, op.priority(), out);
                }
            }
        }
        Expression::Lambda { params, body } => {
            out.append(&format!("({}) => ", params.join(",")));
            expr_to_js(body, out, reactive);
        }
        Expression::Call { callee, args } => {
            expr_to_js(callee, out, reactive);
            out.append("(");
            for (index, arg) in args.iter().enumerate() {
                if index > 0 {
                    out.append(",");
                }
                expr_to_js(arg, out, reactive);
            }
            out.append(")");
        }
        Expression::Array(entries) => {
            if reactive {
                out.append("rtml.array(");
                for (index, entry) in entries.iter().enumerate() {
                    if index > 0 {
                        out.append(",");
                    }
                    expr_to_js(entry, out, true);
                }
                out.append(")");
            } else {
                out.append("[");
                for (index, entry) in entries.iter().enumerate() {
                    if index > 0 {
                        out.append(",");
                    }
                    expr_to_js(entry, out, false);
                }
                out.append("]");
            }
        }
        Expression::Markup(node) => {
            if reactive {
                markup_to_js(node, out, true);
            } else {
                markup_to_source(node, out);
            }
        }
    }
}

/// Plain-mode child: parenthesized only when it binds looser than the
/// parent.
fn child_to_js(child: &Expression, parent_priority: u8, out: &mut ScriptBuilder) {
    if child.priority() < parent_priority {
        out.append("(");
        expr_to_js(child, out, false);
        out.append(")");
    } else {
        expr_to_js(child, out, false);
    }
}

/// Statements that take a terminating `;` from their surrounding context.
fn needs_semicolon(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::VariableDeclaration { .. }
            | Statement::Assign { .. }
            | Statement::Expression(_)
            | Statement::Return(_)
    )
}

pub fn statement_to_js(statement: &Statement, out: &mut ScriptBuilder, reactive: bool) {
    match statement {
        Statement::VariableDeclaration { kind, name, init } => {
            let prefix = kind.keyword();
            match init {
                None => out.append(&format!("{prefix} {name}")),
                Some(value) => {
                    out.append(&format!("{prefix} {name}="));
                    if reactive {
                        // Reactive declarations live in the runtime's
                        // value container.
                        out.append("new Var(");
                        expr_to_js(value, out, true);
                        out.append(")");
                    } else {
                        expr_to_js(value, out, false);
                    }
                }
            }
        }
        Statement::Assign { target, op, value } => {
            if reactive {
                out.append(&format!("rtml.{}(", op.name()));
                expr_to_js(target, out, true);
                if let Some(value) = value {
                    out.append(",");
                    expr_to_js(value, out, true);
                }
                out.append(")");
            } else {
                let symbol = op.symbol().unwrap_or_default();
                match op.fixity() {
                    Fixity::Prefix => {
                        out.append(symbol);
                        expr_to_js(target, out, false);
                    }
                    Fixity::Postfix => {
                        expr_to_js(target, out, false);
                        out.append(symbol);
                    }
                    _ => {
                        expr_to_js(target, out, false);
                        out.append(symbol);
                        if let Some(value) = value {
                            expr_to_js(value, out, false);
                        }
                    }
                }
            }
        }
        Statement::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.append("if (");
            expr_to_js(cond, out, reactive);
            out.append(") ");
            statement_to_js(then_branch, out, reactive);
            if let Some(else_branch) = else_branch {
                if !matches!(**then_branch, Statement::Block { .. }) {
                    out.append(";");
                }
                out.append(" else ");
                statement_to_js(else_branch, out, reactive);
            }
        }
        Statement::For {
            init,
            cond,
            step,
            body,
        } => {
            out.append("for (");
            statement_to_js(init, out, reactive);
            out.append("; ");
            expr_to_js(cond, out, reactive);
            out.append("; ");
            statement_to_js(step, out, reactive);
            out.append(") ");
            statement_to_js(body, out, reactive);
        }
        Statement::While { cond, body } => {
            out.append("while (");
            expr_to_js(cond, out, reactive);
            out.append(") ");
            statement_to_js(body, out, reactive);
        }
        Statement::Function {
            owner_class,
            name,
            params,
            body,
        } => {
            let params = params.join(",");
            if owner_class.is_some() {
                out.append_line(&format!("{name}({params}) {{"));
            } else {
                out.append_line(&format!("function {name}({params}) {{"));
            }
            out.indent();
            emit_body_lines(body, out, reactive);
            out.unindent();
            out.append_line("}");
        }
        Statement::Class {
            name,
            base,
            members,
        } => {
            out.append(&format!("class {name}"));
            if let Some(base) = base {
                out.append(" extends ");
                expr_to_js(base, out, reactive);
            }
            out.append_line(" {");
            out.indent();
            for member in members {
                statement_to_js(member, out, reactive);
            }
            out.unindent();
            out.append_line("}");
        }
        Statement::Block {
            statements,
            is_root,
        } => {
            if *is_root {
                emit_body_lines(statement, out, reactive);
            } else {
                match statements.len() {
                    0 => out.append("{}"),
                    1 => {
                        statement_to_js(&statements[0], out, reactive);
                        if needs_semicolon(&statements[0]) {
                            out.append(";");
                        }
                    }
                    _ => {
                        out.append("{");
                        for statement in statements {
                            statement_to_js(statement, out, reactive);
                            if needs_semicolon(statement) {
                                out.append(";");
                            }
                        }
                        out.append("}");
                    }
                }
            }
        }
        Statement::Expression(expr) => expr_to_js(expr, out, reactive),
        Statement::Return(value) => {
            out.append("return");
            if let Some(value) = value {
                out.append(" ");
                expr_to_js(value, out, reactive);
            }
        }
        Statement::Invalid { message, token } => {
            out.append(&format!("** ERROR: {message} {token}"));
        }
    }
}

/// One statement per line, semicolon-terminated where the statement form
/// needs it. Used for root blocks and function bodies.
pub fn emit_body_lines(body: &Statement, out: &mut ScriptBuilder, reactive: bool) {
    match body {
        Statement::Block { statements, .. } => {
            for statement in statements {
                emit_statement_line(statement, out, reactive);
            }
        }
        single => emit_statement_line(single, out, reactive),
    }
}

fn emit_statement_line(statement: &Statement, out: &mut ScriptBuilder, reactive: bool) {
    statement_to_js(statement, out, reactive);
    if needs_semicolon(statement) {
        out.append(";");
    }
    out.finish_line();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtml_parser::{CompileContext, ExprParser, StatementParser};

    fn expr_js(source: &str, reactive: bool) -> String {
        let mut ctx = CompileContext::new("/test", source);
        let expr = ExprParser::new(&mut ctx).parse_full_expr().unwrap();
        let mut out = ScriptBuilder::new();
        expr_to_js(&expr, &mut out, reactive);
        out.finish()
    }

    fn script_js(source: &str, reactive: bool) -> String {
        let mut ctx = CompileContext::new("/test", source);
        let block = StatementParser::new(&mut ctx).parse_script().unwrap();
        let mut out = ScriptBuilder::new();
        statement_to_js(&block, &mut out, reactive);
        out.finish()
    }

    // =========================================================================
    // json_string / const_to_js
    // =========================================================================

    #[test]
    fn test_json_string_escapes() {
        assert_eq!(json_string("plain"), "\"plain\"");
        assert_eq!(json_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(json_string("a\\b"), "\"a\\\\b\"");
        assert_eq!(json_string("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn test_const_to_js() {
        assert_eq!(const_to_js(&ConstValue::Number(7.0)), "7");
        assert_eq!(const_to_js(&ConstValue::Str("x".into())), "\"x\"");
        assert_eq!(const_to_js(&ConstValue::Bool(true)), "true");
        assert_eq!(const_to_js(&ConstValue::Null), "null");
    }

    // =========================================================================
    // Expressions, both modes
    // =========================================================================

    #[test]
    fn test_constant_folds_in_both_modes() {
        assert_eq!(expr_js("1+2*3", false), "7");
        assert_eq!(expr_js("1+2*3", true), "7");
    }

    #[test]
    fn test_simple_reactive_call() {
        assert_eq!(expr_js("a*2", false), "a*2");
        assert_eq!(expr_js("a*2", true), "rtml.mul(a,2)");
    }

    #[test]
    fn test_precedence_needs_no_parens() {
        assert_eq!(expr_js("a+b*c", false), "a+b*c");
        assert_eq!(expr_js("a+b*c", true), "rtml.plus(a,rtml.mul(b,c))");
    }

    #[test]
    fn test_parenthesis_minimality() {
        assert_eq!(expr_js("a*(b+c)", false), "a*(b+c)");
        assert_eq!(expr_js("a*(b+c)", true), "rtml.mul(a,rtml.plus(b,c))");
    }

    #[test]
    fn test_equal_priority_chain_has_no_parens() {
        assert_eq!(expr_js("a-b+c", false), "a-b+c");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(expr_js("\"Hello\"", false), "\"Hello\"");
        assert_eq!(expr_js("\"Hello\"", true), "\"Hello\"");
    }

    #[test]
    fn test_string_concat_folds() {
        assert_eq!(expr_js("(\"a\" + \".com\")", false), "\"a.com\"");
    }

    #[test]
    fn test_function_call() {
        assert_eq!(expr_js("substring(2,4)", false), "substring(2,4)");
        assert_eq!(expr_js("substring(2,4)", true), "substring(2,4)");
    }

    #[test]
    fn test_method_call() {
        assert_eq!(
            expr_js("\"abcdef\".substring(2,4)", false),
            "\"abcdef\".substring(2,4)"
        );
        assert_eq!(
            expr_js("\"abcdef\".substring(2,4)", true),
            "rtml.dot(\"abcdef\",substring(2,4))"
        );
    }

    #[test]
    fn test_unary_keeps_syntax() {
        assert_eq!(expr_js("-x", false), "-x");
        assert_eq!(expr_js("-x", true), "-x");
        assert_eq!(expr_js("i++", true), "i++");
    }

    #[test]
    fn test_ternary_modes() {
        assert_eq!(expr_js("a ? 1 : 0", false), "a?1:0");
        assert_eq!(expr_js("a ? 1 : 0", true), "rtml.ternary_cond(a,1,0)");
    }

    #[test]
    fn test_constant_ternary_folds() {
        assert_eq!(expr_js("1 ? 1 : 0", true), "1");
    }

    #[test]
    fn test_array_modes() {
        assert_eq!(expr_js("[a,2]", false), "[a,2]");
        assert_eq!(expr_js("[a,2]", true), "rtml.array(a,2)");
    }

    #[test]
    fn test_lambda() {
        assert_eq!(expr_js("(a,b,c) => a+b+c", false), "(a,b,c) => a+b+c");
    }

    #[test]
    fn test_markup_literal_modes() {
        assert_eq!(expr_js("<p>hello</p>", false), "<p>hello</p>");
        assert_eq!(expr_js("<p>hello</p>", true), "rtml.elt(\"p\",null,\"hello\")");
    }

    #[test]
    fn test_self_closing_markup_literal() {
        assert_eq!(expr_js("render(<App/>, target)", false), "render(<App/>,target)");
    }

    // =========================================================================
    // Statements
    // =========================================================================

    #[test]
    fn test_declarations() {
        assert_eq!(script_js("const a;", false), "const a;\n");
        assert_eq!(script_js("let a;", false), "let a;\n");
        assert_eq!(script_js("var a;", false), "var a;\n");
    }

    #[test]
    fn test_declaration_with_value() {
        assert_eq!(script_js("let a=5;", false), "let a=5;\n");
        assert_eq!(script_js("const x=\"a\";", false), "const x=\"a\";\n");
    }

    #[test]
    fn test_reactive_declaration_wraps_in_var() {
        assert_eq!(script_js("let a=1", true), "let a=new Var(1);\n");
        assert_eq!(
            script_js("let user = \"Pascal\";", true),
            "let user=new Var(\"Pascal\");\n"
        );
    }

    #[test]
    fn test_two_declarations() {
        assert_eq!(script_js("let a=1; let b=2;", false), "let a=1;\nlet b=2;\n");
    }

    #[test]
    fn test_console_log() {
        assert_eq!(script_js("console.log(1)", false), "console.log(1);\n");
        assert_eq!(
            script_js("console.log(\"Hi\")", false),
            "console.log(\"Hi\");\n"
        );
    }

    #[test]
    fn test_if_statement() {
        assert_eq!(
            script_js("if (1) console.log(\"hi\")", false),
            "if (1) console.log(\"hi\")\n"
        );
    }

    #[test]
    fn test_if_else() {
        assert_eq!(script_js("if (1) 1; else 2;", false), "if (1) 1; else 2\n");
    }

    #[test]
    fn test_while_empty_block() {
        assert_eq!(script_js("while (1) {}", false), "while (1) {}\n");
    }

    #[test]
    fn test_increment_statement() {
        assert_eq!(script_js("c++", false), "c++;\n");
        assert_eq!(script_js("c++", true), "rtml.postfix_inc(c);\n");
    }

    #[test]
    fn test_for_statement() {
        assert_eq!(
            script_js("for(i=0;i<10;i++) {}", false),
            "for (i=0; i<10; i++) {}\n"
        );
    }

    #[test]
    fn test_function_declaration() {
        assert_eq!(
            script_js("function double(a,b) { return a + b; }", false),
            "function double(a,b) {\n  return a+b;\n}\n"
        );
    }

    #[test]
    fn test_comma_statement_folds() {
        assert_eq!(script_js("1,2,3", false), "3;\n");
        assert_eq!(script_js("(1,2,3)", false), "3;\n");
    }

    #[test]
    fn test_reactive_assignment() {
        assert_eq!(
            script_js("user = \"Pascal\"", true),
            "rtml.assign(user,\"Pascal\");\n"
        );
        assert_eq!(
            script_js("count=count+1", true),
            "rtml.assign(count,rtml.plus(count,1));\n"
        );
    }

    #[test]
    fn test_ternary_statement() {
        assert_eq!(script_js("a ? 1 : 0", true), "rtml.ternary_cond(a,1,0);\n");
        assert_eq!(script_js("1 ? 1 : 0", false), "1;\n");
    }

    #[test]
    fn test_lambda_declaration() {
        assert_eq!(
            script_js("let l = (a,b,c) => a+b+c", false),
            "let l=(a,b,c) => a+b+c;\n"
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(script_js("/* some text here */ 1 // more", false), "1;\n");
    }

    #[test]
    fn test_class_with_markup_render() {
        let source = "class App extends Mu.Component {\n    render() {\n        return <h1>Hello world!</h1>\n    }\n}";
        let expected = "class App extends Mu.Component {\n  render() {\n    return <h1>Hello world!</h1>;\n  }\n}\n";
        assert_eq!(script_js(source, false), expected);
    }

    #[test]
    fn test_bare_return() {
        assert_eq!(script_js("return;", false), "return;\n");
    }
}
