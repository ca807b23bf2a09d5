use crate::ast::{BinaryOp, LogicalOp, UnaryOp};
use crate::value::Value;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// The AST is the contract between the parser (bundled or caller-supplied)
/// and the compiler. Any parser that produces these nodes can drive the
/// compiler; the bundled one covers the JS-style sub-language.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bare variable reference
    ///
    /// The literal name `undefined` is a sentinel the compiler turns into an
    /// existence check; every other name is a field path.
    ///
    /// # Example
    /// ```text
    /// userId
    /// ```
    Identifier(String),

    /// Field or index access, dot or bracket form
    ///
    /// Chains resolve to dot-joined field paths: `a["b"][1]` → `a.b.1`.
    ///
    /// # Examples
    /// ```text
    /// a.b
    /// a["b"]
    /// a[1]
    /// ```
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
    },

    /// Literal constant: number, string, boolean, null, or regex
    ///
    /// # Examples
    /// ```text
    /// 42
    /// "ciao"
    /// /^c.*$/i
    /// ```
    Literal(Value),

    /// Array literal
    ///
    /// Elements are expected to be literals themselves; the compiler extracts
    /// their raw values and rejects anything else.
    ///
    /// # Example
    /// ```text
    /// [2, 3, 4]
    /// ```
    Array(Vec<Expr>),

    /// Unary operation
    ///
    /// # Example
    /// ```text
    /// !(b < 3)
    /// ```
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary comparison
    ///
    /// # Examples
    /// ```text
    /// a == 3
    /// b in [2, 3, 4]
    /// ```
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Boolean combinator
    ///
    /// # Example
    /// ```text
    /// a > 3 && a < 45
    /// ```
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Human-readable node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "identifier",
            Expr::Member { .. } => "member access",
            Expr::Literal(_) => "literal",
            Expr::Array(_) => "array",
            Expr::Unary { .. } => "unary expression",
            Expr::Binary { .. } => "binary expression",
            Expr::Logical { .. } => "logical expression",
        }
    }
}
