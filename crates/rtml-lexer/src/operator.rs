//! Static operator table for the script language.
//!
//! One row per operator: symbol text (synthetic operators such as
//! function-call have none), the name used for reactive runtime calls,
//! fixity, priority, optional pure constant-fold functions, and the
//! is-assignment flag. Priorities follow the JavaScript operator
//! precedence table; the grouping tokens sit at the extremes.
//!
//! Two lookup maps are built once at startup: the primary symbol map used
//! by the script lexer's greedy matcher, and a prefix-only map for the
//! symbols that exist both as binary/postfix and prefix operators
//! (`+`, `-`, `++`, `--`).

use std::collections::HashMap;
use std::sync::OnceLock;

/// Lowest priority. `)` sits here so it never binds.
pub const PRIORITY_ZERO: u8 = 0;
/// Priority reported by atoms (literals, identifiers).
pub const PRIORITY_MAX: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Postfix,
    Binary,
    Ternary,
    Nary,
    Lambda,
    Func,
    Other,
}

/// A compile-time constant value produced by folding.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
}

impl ConstValue {
    /// JavaScript-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConstValue::Null => false,
            ConstValue::Bool(b) => *b,
            ConstValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ConstValue::Str(s) => !s.is_empty(),
        }
    }

    /// The string form used when `+` concatenates mixed operands.
    pub fn to_display_string(&self) -> String {
        match self {
            ConstValue::Number(n) => format_number(*n),
            ConstValue::Str(s) => s.clone(),
            ConstValue::Bool(b) => b.to_string(),
            ConstValue::Null => "null".into(),
        }
    }
}

/// Format a number, removing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 9e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub type UnaryFold = fn(&ConstValue) -> ConstValue;
pub type BinaryFold = fn(&ConstValue, &ConstValue) -> ConstValue;
pub type NaryFold = fn(&[ConstValue]) -> ConstValue;

/// Metadata for one operator-table row.
pub struct OpInfo {
    pub op: Op,
    pub symbol: Option<&'static str>,
    pub name: &'static str,
    pub fixity: Fixity,
    pub priority: u8,
    pub unary_fold: Option<UnaryFold>,
    pub binary_fold: Option<BinaryFold>,
    pub nary_fold: Option<NaryFold>,
    pub assign: bool,
}

/// The closed operator set. Discriminants index [`TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    OpenParen,
    CloseParen,
    Dot,
    OpenBracket,
    CloseBracket,
    OptionalChain,
    FunctionCall,
    NewWithArgs,
    NewNoArgs,
    PostfixInc,
    PostfixDec,
    PrefixInc,
    PrefixDec,
    LogicalNot,
    BitwiseNot,
    UnaryPlus,
    UnaryMinus,
    Typeof,
    Void,
    Delete,
    Exp,
    Mul,
    Div,
    Modulo,
    Sub,
    Plus,
    Shl,
    Shr,
    Ushr,
    In,
    Instanceof,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    NullCoalescing,
    TernaryCond,
    Assign,
    ColonAssign,
    PlusAssign,
    MinusAssign,
    MulAssign,
    ExpAssign,
    DivAssign,
    ModuloAssign,
    ShlAssign,
    ShrAssign,
    UshrAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
    LogicalAndAssign,
    LogicalOrAssign,
    Lambda,
    Yield,
    YieldStar,
    Spread,
    Comma,
    SemiColon,
    OpenCurly,
    CloseCurly,
    EndScriptTag,
}

const BASE: OpInfo = OpInfo {
    op: Op::OpenParen,
    symbol: None,
    name: "",
    fixity: Fixity::Other,
    priority: 0,
    unary_fold: None,
    binary_fold: None,
    nary_fold: None,
    assign: false,
};

#[rustfmt::skip]
pub static TABLE: &[OpInfo] = &[
    OpInfo { op: Op::OpenParen,        symbol: Some("("),          name: "open_parenthesis",  fixity: Fixity::Other,   priority: 18, ..BASE }, // (100 + 50) * 3
    OpInfo { op: Op::CloseParen,       symbol: Some(")"),          name: "close_parenthesis", fixity: Fixity::Other,   priority: 0,  ..BASE },
    OpInfo { op: Op::Dot,              symbol: Some("."),          name: "dot",               fixity: Fixity::Binary,  priority: 17, ..BASE }, // person.name
    OpInfo { op: Op::OpenBracket,      symbol: Some("["),          name: "open_bracket",      fixity: Fixity::Other,   priority: 17, ..BASE }, // person["name"]
    OpInfo { op: Op::CloseBracket,     symbol: Some("]"),          name: "close_bracket",     fixity: Fixity::Other,   priority: 17, ..BASE },
    OpInfo { op: Op::OptionalChain,    symbol: Some("?."),         name: "optional_chain",    fixity: Fixity::Other,   priority: 17, ..BASE }, // x ?. y
    OpInfo { op: Op::FunctionCall,     symbol: None,               name: "function_call",     fixity: Fixity::Func,    priority: 17, ..BASE }, // f()
    OpInfo { op: Op::NewWithArgs,      symbol: Some("new"),        name: "new_with_args",     fixity: Fixity::Other,   priority: 17, ..BASE },
    OpInfo { op: Op::NewNoArgs,        symbol: None,               name: "new_no_args",       fixity: Fixity::Other,   priority: 16, ..BASE },
    OpInfo { op: Op::PostfixInc,       symbol: Some("++"),         name: "postfix_inc",       fixity: Fixity::Postfix, priority: 15, assign: true, ..BASE }, // i++
    OpInfo { op: Op::PostfixDec,       symbol: Some("--"),         name: "postfix_dec",       fixity: Fixity::Postfix, priority: 15, assign: true, ..BASE }, // i--
    OpInfo { op: Op::PrefixInc,        symbol: Some("++"),         name: "prefix_inc",        fixity: Fixity::Prefix,  priority: 14, assign: true, ..BASE }, // ++i
    OpInfo { op: Op::PrefixDec,        symbol: Some("--"),         name: "prefix_dec",        fixity: Fixity::Prefix,  priority: 14, assign: true, ..BASE }, // --i
    OpInfo { op: Op::LogicalNot,       symbol: Some("!"),          name: "not",               fixity: Fixity::Prefix,  priority: 14, unary_fold: Some(fold::not), ..BASE },
    OpInfo { op: Op::BitwiseNot,       symbol: Some("~"),          name: "bitwise_not",       fixity: Fixity::Prefix,  priority: 14, ..BASE },
    OpInfo { op: Op::UnaryPlus,        symbol: Some("+"),          name: "unary_plus",        fixity: Fixity::Prefix,  priority: 14, unary_fold: Some(fold::unary_plus), ..BASE },
    OpInfo { op: Op::UnaryMinus,       symbol: Some("-"),          name: "unary_minus",       fixity: Fixity::Prefix,  priority: 14, unary_fold: Some(fold::unary_minus), ..BASE },
    OpInfo { op: Op::Typeof,           symbol: Some("typeof"),     name: "typeof",            fixity: Fixity::Other,   priority: 14, ..BASE },
    OpInfo { op: Op::Void,             symbol: Some("void"),       name: "void",              fixity: Fixity::Other,   priority: 14, ..BASE },
    OpInfo { op: Op::Delete,           symbol: Some("delete"),     name: "delete",            fixity: Fixity::Other,   priority: 14, ..BASE },
    OpInfo { op: Op::Exp,              symbol: Some("**"),         name: "exp",               fixity: Fixity::Binary,  priority: 13, binary_fold: Some(fold::exp), ..BASE }, // 10 ** 2
    OpInfo { op: Op::Mul,              symbol: Some("*"),          name: "mul",               fixity: Fixity::Binary,  priority: 12, binary_fold: Some(fold::mul), ..BASE },
    OpInfo { op: Op::Div,              symbol: Some("/"),          name: "div",               fixity: Fixity::Binary,  priority: 12, binary_fold: Some(fold::div), ..BASE },
    OpInfo { op: Op::Modulo,           symbol: Some("%"),          name: "modulo",            fixity: Fixity::Binary,  priority: 12, binary_fold: Some(fold::modulo), ..BASE },
    OpInfo { op: Op::Sub,              symbol: Some("-"),          name: "sub",               fixity: Fixity::Binary,  priority: 11, binary_fold: Some(fold::sub), ..BASE },
    OpInfo { op: Op::Plus,             symbol: Some("+"),          name: "plus",              fixity: Fixity::Binary,  priority: 11, binary_fold: Some(fold::plus_or_concat), ..BASE },
    OpInfo { op: Op::Shl,              symbol: Some("<<"),         name: "shl",               fixity: Fixity::Binary,  priority: 10, binary_fold: Some(fold::shl), ..BASE },
    OpInfo { op: Op::Shr,              symbol: Some(">>"),         name: "shr",               fixity: Fixity::Binary,  priority: 10, binary_fold: Some(fold::shr), ..BASE },
    OpInfo { op: Op::Ushr,             symbol: Some(">>>"),        name: "ushr",              fixity: Fixity::Binary,  priority: 10, binary_fold: Some(fold::ushr), ..BASE },
    OpInfo { op: Op::In,               symbol: Some("in"),         name: "is_in",             fixity: Fixity::Binary,  priority: 9,  ..BASE }, // "PI" in Math
    OpInfo { op: Op::Instanceof,       symbol: Some("instanceof"), name: "instance_of",       fixity: Fixity::Binary,  priority: 9,  ..BASE },
    OpInfo { op: Op::Lt,               symbol: Some("<"),          name: "lt",                fixity: Fixity::Binary,  priority: 9,  ..BASE },
    OpInfo { op: Op::Le,               symbol: Some("<="),         name: "le",                fixity: Fixity::Binary,  priority: 9,  ..BASE },
    OpInfo { op: Op::Gt,               symbol: Some(">"),          name: "gt",                fixity: Fixity::Binary,  priority: 9,  ..BASE },
    OpInfo { op: Op::Ge,               symbol: Some(">="),         name: "ge",                fixity: Fixity::Binary,  priority: 9,  ..BASE },
    OpInfo { op: Op::EqEq,             symbol: Some("=="),         name: "eq",                fixity: Fixity::Binary,  priority: 8,  ..BASE },
    OpInfo { op: Op::EqEqEq,           symbol: Some("==="),        name: "strict_eq",         fixity: Fixity::Binary,  priority: 8,  ..BASE },
    OpInfo { op: Op::NotEq,            symbol: Some("!="),         name: "ne",                fixity: Fixity::Binary,  priority: 8,  ..BASE },
    OpInfo { op: Op::NotEqEq,          symbol: Some("!=="),        name: "strict_ne",         fixity: Fixity::Binary,  priority: 8,  ..BASE },
    OpInfo { op: Op::BitwiseAnd,       symbol: Some("&"),          name: "bit_and",           fixity: Fixity::Binary,  priority: 7,  ..BASE },
    OpInfo { op: Op::BitwiseXor,       symbol: Some("^"),          name: "bit_xor",           fixity: Fixity::Binary,  priority: 6,  ..BASE },
    OpInfo { op: Op::BitwiseOr,        symbol: Some("|"),          name: "bit_or",            fixity: Fixity::Binary,  priority: 5,  ..BASE },
    OpInfo { op: Op::LogicalAnd,       symbol: Some("&&"),         name: "and",               fixity: Fixity::Binary,  priority: 4,  ..BASE },
    OpInfo { op: Op::LogicalOr,        symbol: Some("||"),         name: "or",                fixity: Fixity::Binary,  priority: 3,  ..BASE },
    OpInfo { op: Op::NullCoalescing,   symbol: Some("??"),         name: "null_coalescing",   fixity: Fixity::Binary,  priority: 3,  ..BASE }, // x ?? y
    OpInfo { op: Op::TernaryCond,      symbol: Some("?"),          name: "ternary_cond",      fixity: Fixity::Ternary, priority: 2,  ..BASE }, // c ? "yes" : "no"
    OpInfo { op: Op::Assign,           symbol: Some("="),          name: "assign",            fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::ColonAssign,      symbol: Some(":"),          name: "colon_assign",      fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE }, // x: 5
    OpInfo { op: Op::PlusAssign,       symbol: Some("+="),         name: "plus_assign",       fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::MinusAssign,      symbol: Some("-="),         name: "minus_assign",      fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::MulAssign,        symbol: Some("*="),         name: "mul_assign",        fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::ExpAssign,        symbol: Some("**="),        name: "exp_assign",        fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::DivAssign,        symbol: Some("/="),         name: "div_assign",        fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::ModuloAssign,     symbol: Some("%="),         name: "modulo_assign",     fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::ShlAssign,        symbol: Some("<<="),        name: "shl_assign",        fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::ShrAssign,        symbol: Some(">>="),        name: "shr_assign",        fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::UshrAssign,       symbol: Some(">>>="),       name: "ushr_assign",       fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::BitwiseAndAssign, symbol: Some("&="),         name: "bit_and_assign",    fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::BitwiseOrAssign,  symbol: Some("|="),         name: "bit_or_assign",     fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::BitwiseXorAssign, symbol: Some("^="),         name: "bit_xor_assign",    fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::LogicalAndAssign, symbol: Some("&&="),        name: "and_assign",        fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::LogicalOrAssign,  symbol: Some("||="),        name: "or_assign",         fixity: Fixity::Binary,  priority: 2,  assign: true, ..BASE },
    OpInfo { op: Op::Lambda,           symbol: Some("=>"),         name: "lambda",            fixity: Fixity::Lambda,  priority: 2,  ..BASE }, // x => y
    OpInfo { op: Op::Yield,            symbol: Some("yield"),      name: "yield",             fixity: Fixity::Other,   priority: 2,  ..BASE },
    OpInfo { op: Op::YieldStar,        symbol: Some("yield*"),     name: "yield_star",        fixity: Fixity::Other,   priority: 2,  ..BASE },
    OpInfo { op: Op::Spread,           symbol: Some("..."),        name: "spread",            fixity: Fixity::Other,   priority: 2,  ..BASE },
    OpInfo { op: Op::Comma,            symbol: Some(","),          name: "comma",             fixity: Fixity::Nary,    priority: 2,  nary_fold: Some(fold::comma_last), ..BASE }, // see (*1)
    OpInfo { op: Op::SemiColon,        symbol: Some(";"),          name: "semi_colon",        fixity: Fixity::Other,   priority: 1,  ..BASE },
    OpInfo { op: Op::OpenCurly,        symbol: Some("{"),          name: "open_curly",        fixity: Fixity::Other,   priority: 1,  ..BASE },
    OpInfo { op: Op::CloseCurly,       symbol: Some("}"),          name: "close_curly",       fixity: Fixity::Other,   priority: 1,  ..BASE },
    OpInfo { op: Op::EndScriptTag,     symbol: None,               name: "end_script_tag",    fixity: Fixity::Other,   priority: 1,  ..BASE }, // </script>
];
// (*1) The comma sits above the semicolon: in
// `for(let i=0;i<2;i++) log("a"),log("b");log("c")` the loop runs the first
// two calls but not the third, so `,` binds tighter than `;`.

impl Op {
    pub fn info(self) -> &'static OpInfo {
        &TABLE[self as usize]
    }

    pub fn symbol(self) -> Option<&'static str> {
        self.info().symbol
    }

    /// Name bound to this entry, used for reactive runtime calls.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn fixity(self) -> Fixity {
        self.info().fixity
    }

    pub fn priority(self) -> u8 {
        self.info().priority
    }

    pub fn is_assign(self) -> bool {
        self.info().assign
    }

    pub fn fold_unary(self, value: &ConstValue) -> Option<ConstValue> {
        self.info().unary_fold.map(|f| f(value))
    }

    pub fn fold_binary(self, left: &ConstValue, right: &ConstValue) -> Option<ConstValue> {
        self.info().binary_fold.map(|f| f(left, right))
    }

    pub fn fold_nary(self, args: &[ConstValue]) -> Option<ConstValue> {
        self.info().nary_fold.map(|f| f(args))
    }

    /// Look up a symbol in the primary map (everything except prefix-only
    /// operators).
    pub fn lookup(symbol: &str) -> Option<Op> {
        primary_map().get(symbol).copied()
    }

    /// Look up a symbol among the prefix operators.
    pub fn lookup_prefix(symbol: &str) -> Option<Op> {
        prefix_map().get(symbol).copied()
    }

    /// Look up a symbol in either map, preferring the primary one. This is
    /// what the script lexer's greedy matcher uses; prefix rewrites of the
    /// ambiguous symbols happen in the expression parser.
    pub fn lookup_any(symbol: &str) -> Option<Op> {
        Op::lookup(symbol).or_else(|| Op::lookup_prefix(symbol))
    }
}

fn primary_map() -> &'static HashMap<&'static str, Op> {
    static MAP: OnceLock<HashMap<&'static str, Op>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for info in TABLE {
            if info.fixity == Fixity::Prefix {
                continue;
            }
            if let Some(symbol) = info.symbol {
                let prev = map.insert(symbol, info.op);
                assert!(prev.is_none(), "operator symbol {symbol} declared twice");
            }
        }
        map
    })
}

fn prefix_map() -> &'static HashMap<&'static str, Op> {
    static MAP: OnceLock<HashMap<&'static str, Op>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for info in TABLE {
            if info.fixity != Fixity::Prefix {
                continue;
            }
            if let Some(symbol) = info.symbol {
                let prev = map.insert(symbol, info.op);
                assert!(prev.is_none(), "prefix operator symbol {symbol} declared twice");
            }
        }
        map
    })
}

mod fold {
    use super::ConstValue;

    fn numbers(a: &ConstValue, b: &ConstValue) -> Option<(f64, f64)> {
        match (a, b) {
            (ConstValue::Number(x), ConstValue::Number(y)) => Some((*x, *y)),
            _ => None,
        }
    }

    pub fn plus_or_concat(a: &ConstValue, b: &ConstValue) -> ConstValue {
        match numbers(a, b) {
            Some((x, y)) => ConstValue::Number(x + y),
            None => ConstValue::Str(a.to_display_string() + &b.to_display_string()),
        }
    }

    pub fn exp(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(numbers(a, b).map_or(f64::NAN, |(x, y)| x.powf(y)))
    }

    pub fn mul(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(numbers(a, b).map_or(f64::NAN, |(x, y)| x * y))
    }

    pub fn div(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(numbers(a, b).map_or(f64::NAN, |(x, y)| x / y))
    }

    pub fn modulo(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(numbers(a, b).map_or(f64::NAN, |(x, y)| x % y))
    }

    pub fn sub(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(numbers(a, b).map_or(f64::NAN, |(x, y)| x - y))
    }

    pub fn shl(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(
            numbers(a, b).map_or(f64::NAN, |(x, y)| ((x as i32) << ((y as i32) & 31)) as f64),
        )
    }

    pub fn shr(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(
            numbers(a, b).map_or(f64::NAN, |(x, y)| ((x as i32) >> ((y as i32) & 31)) as f64),
        )
    }

    pub fn ushr(a: &ConstValue, b: &ConstValue) -> ConstValue {
        ConstValue::Number(numbers(a, b).map_or(f64::NAN, |(x, y)| {
            ((x as i32 as u32) >> ((y as i32) & 31)) as f64
        }))
    }

    pub fn comma_last(args: &[ConstValue]) -> ConstValue {
        args.last().cloned().unwrap_or(ConstValue::Null)
    }

    pub fn not(value: &ConstValue) -> ConstValue {
        ConstValue::Bool(!value.is_truthy())
    }

    pub fn unary_plus(value: &ConstValue) -> ConstValue {
        match value {
            ConstValue::Number(n) => ConstValue::Number(*n),
            _ => ConstValue::Number(f64::NAN),
        }
    }

    pub fn unary_minus(value: &ConstValue) -> ConstValue {
        match value {
            ConstValue::Number(n) => ConstValue::Number(-n),
            _ => ConstValue::Number(f64::NAN),
        }
    }
}
