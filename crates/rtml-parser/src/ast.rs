//! Abstract syntax tree: expressions, statements, and markup nodes.
//!
//! Three closed variant sets produced by the parsers and consumed exactly
//! once by the emitter. Constant folding lives on [`Expression`]:
//! [`Expression::const_value`] folds a subtree through the operator table's
//! registered evaluators and returns `None` wherever folding is not
//! possible, so callers never observe a half-folded value.

use rtml_lexer::{is_self_closing_tag, ConstValue, Op, PRIORITY_MAX};

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Numeric literal: `42`, `3.14`
    Number(f64),

    /// String literal: `"hello"`, `'world'`
    Str(String),

    /// Identifier: `count`, `isActive`
    Identifier(String),

    /// Prefix or postfix operator application: `-x`, `i++`
    Unary { op: Op, operand: Box<Expression> },

    /// Binary operator application: `a + b`
    Binary {
        left: Box<Expression>,
        op: Op,
        right: Box<Expression>,
    },

    /// `cond ? a : b`
    Ternary {
        cond: Box<Expression>,
        then_value: Box<Expression>,
        else_value: Box<Expression>,
    },

    /// A flattened run of one n-ary operator (comma sequences).
    Nary { op: Op, args: Vec<Expression> },

    /// `(a, b) => body`
    Lambda {
        params: Vec<String>,
        body: Box<Expression>,
    },

    /// `callee(args...)`
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },

    /// `[a, b, c]`
    Array(Vec<Expression>),

    /// An inline markup literal: `<p>hello</p>` used as a value.
    Markup(Box<MarkupNode>),
}

impl Expression {
    /// Priority of the node's own operator; atoms report the maximum so
    /// they never get parenthesized.
    pub fn priority(&self) -> u8 {
        match self {
            Expression::Number(_)
            | Expression::Str(_)
            | Expression::Identifier(_)
            | Expression::Call { .. }
            | Expression::Markup(_) => PRIORITY_MAX,
            Expression::Unary { op, .. } => op.priority(),
            Expression::Binary { op, .. } => op.priority(),
            Expression::Ternary { .. } => Op::TernaryCond.priority(),
            Expression::Nary { op, .. } => op.priority(),
            Expression::Lambda { .. } => Op::Lambda.priority(),
            Expression::Array(_) => Op::OpenBracket.priority(),
        }
    }

    /// True when the subtree folds to a compile-time constant.
    pub fn is_const(&self) -> bool {
        self.const_value().is_some()
    }

    /// Fold the subtree to a constant, or `None` when any operand is not
    /// constant or the operator has no registered evaluator.
    pub fn const_value(&self) -> Option<ConstValue> {
        match self {
            Expression::Number(n) => Some(ConstValue::Number(*n)),
            Expression::Str(s) => Some(ConstValue::Str(s.clone())),
            Expression::Identifier(_) => None,
            Expression::Unary { op, operand } => {
                let value = operand.const_value()?;
                op.fold_unary(&value)
            }
            Expression::Binary { left, op, right } => {
                let l = left.const_value()?;
                let r = right.const_value()?;
                op.fold_binary(&l, &r)
            }
            Expression::Ternary {
                cond,
                then_value,
                else_value,
            } => {
                let c = cond.const_value()?;
                if c.is_truthy() {
                    then_value.const_value()
                } else {
                    else_value.const_value()
                }
            }
            Expression::Nary { op, args } => {
                let values: Option<Vec<ConstValue>> =
                    args.iter().map(|a| a.const_value()).collect();
                op.fold_nary(&values?)
            }
            Expression::Lambda { .. } => None,
            Expression::Call { .. } => None,
            Expression::Array(_) => None,
            Expression::Markup(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// Declaration keyword of a variable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Let,
    Var,
    /// Bare assignment-style declaration with no keyword.
    None,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Const => "const",
            DeclKind::Let => "let",
            DeclKind::Var => "var",
            DeclKind::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VariableDeclaration {
        kind: DeclKind,
        name: String,
        init: Option<Expression>,
    },

    /// `x = v`, `x += v`, `i++` (no value).
    Assign {
        target: Expression,
        op: Op,
        value: Option<Expression>,
    },

    If {
        cond: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },

    /// Classic three-clause `for (init; cond; step) body`.
    For {
        init: Box<Statement>,
        cond: Expression,
        step: Box<Statement>,
        body: Box<Statement>,
    },

    While {
        cond: Expression,
        body: Box<Statement>,
    },

    /// Free function, or a method when `owner_class` is set.
    Function {
        owner_class: Option<String>,
        name: String,
        params: Vec<String>,
        body: Box<Statement>,
    },

    Class {
        name: String,
        base: Option<Expression>,
        members: Vec<Statement>,
    },

    Block {
        statements: Vec<Statement>,
        is_root: bool,
    },

    Expression(Expression),

    Return(Option<Expression>),

    Invalid {
        message: String,
        token: String,
    },
}

// ---------------------------------------------------------------------------
// Markup nodes
// ---------------------------------------------------------------------------

/// How a tag closes, derived once from the tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClassification {
    /// `<!DOCTYPE ...>`: renders `>` and never closes.
    Doctype,
    /// Void elements (`img`, `br`, ...): always `/>`.
    AlwaysSelfClosing,
    /// `script` and `title`: always get an explicit closing tag.
    NeverSelfClosing,
    Normal,
}

impl TagClassification {
    /// Classify a lowercased tag name.
    pub fn of(lname: &str) -> Self {
        if is_self_closing_tag(lname) {
            TagClassification::AlwaysSelfClosing
        } else if lname.starts_with('!') {
            TagClassification::Doctype
        } else if lname == "script" || lname == "title" {
            TagClassification::NeverSelfClosing
        } else {
            TagClassification::Normal
        }
    }
}

/// One `name` or `name=value` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<Expression>,
}

/// Conditional directive intercepted from `if`/`elseif`/`else` attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum CondDirective {
    If(Expression),
    ElseIf(Expression),
    Else,
}

/// Loop directive intercepted from `foreach`/`while` attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopDirective {
    ForEach {
        var_name: String,
        iterator: Expression,
    },
    While(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    /// `None` when the tag self-closed before any content.
    pub children: Option<Vec<MarkupNode>>,
    pub classification: TagClassification,
    /// Placeholder id, assigned at construction when a directive makes the
    /// element a dynamic region.
    pub id: Option<usize>,
    pub cond: Option<CondDirective>,
    pub loop_dir: Option<LoopDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Fragment(Vec<MarkupNode>),

    Element(Element),

    /// `<script>` with its body parsed as a statement block.
    ScriptElement {
        attributes: Vec<Attribute>,
        body: Statement,
    },

    /// `{expr}` with its placeholder id.
    InterpolatedExpr { expr: Expression, id: usize },

    Text(String),

    Invalid {
        message: String,
        token: String,
    },
}
