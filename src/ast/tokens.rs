use crate::value::Pattern;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 100000
    /// ```
    Integer(i64),

    /// String literal enclosed in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// "ciao"
    /// 'hei'
    /// ```
    String(String),

    /// Boolean values
    Boolean(bool),

    /// Null value
    Null,

    /// Regular-expression literal
    ///
    /// A `/` outside a value position always starts one of these; the
    /// sub-language has no division operator.
    ///
    /// # Examples
    /// ```text
    /// /^c.*$/i
    /// /ho{2}la/
    /// ```
    Regex(Pattern),

    // Identifiers and keywords
    /// Field name or variable identifier
    ///
    /// Starts with a letter, `_` or `$`, followed by letters, digits, `_`
    /// or `$`. Note that `undefined` lexes as a plain identifier; its
    /// sentinel meaning belongs to the compiler.
    ///
    /// # Examples
    /// ```text
    /// userId
    /// birth_day
    /// ```
    Identifier(String),

    /// Membership operator keyword (`in`)
    In,

    // Comparison
    /// Loose equality (`==`)
    EqEq,

    /// Strict equality (`===`)
    EqEqEq,

    /// Loose inequality (`!=`)
    NotEq,

    /// Strict inequality (`!==`)
    NotEqEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Shift and arithmetic
    /// Shift left (`<<`)
    Shl,

    /// Shift right (`>>`)
    Shr,

    /// Addition
    Plus,

    /// Subtraction or unary minus
    Minus,

    /// Multiplication
    Star,

    /// Modulo
    Percent,

    // Logical
    /// Logical AND (`&&`)
    AndAnd,

    /// Logical OR (`||`)
    OrOr,

    /// Logical negation (`!`)
    Bang,

    // Delimiters
    /// Left parenthesis for grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket for computed member access and array literals
    LBracket,

    /// Right bracket
    RBracket,

    /// Dot for member access
    Dot,

    /// Comma for separating array elements
    Comma,

    /// End of file
    Eof,
}
