use crate::{
    ast::{BinaryOp, Expr, LogicalOp, Token, UnaryOp},
    lexer::{LexError, Lexer},
    value::Value,
};
use std::mem;

/// Errors produced while parsing a token stream into an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Tokenization failed
    Lex(LexError),

    /// A specific token was required and something else showed up
    UnexpectedToken { expected: Token, found: Token },

    /// `.` must be followed by an identifier
    ExpectedProperty(Token),

    /// Token with no meaning at the start of an expression
    Unexpected(Token),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(err) => write!(f, "Lex error: {}", err),
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "Expected {:?}, got {:?}", expected, found)
            }
            ParseError::ExpectedProperty(found) => {
                write!(f, "Expected identifier after '.', got {:?}", found)
            }
            ParseError::Unexpected(token) => {
                write!(f, "Unexpected token in expression: {:?}", token)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}

/// The seam between expression sources and the compiler: anything that can
/// turn source text into an [`Expr`] tree.
///
/// The bundled [`DefaultParser`] covers the JS-style sub-language; a caller
/// with its own front end implements this trait and hands the compiler
/// whatever trees it likes, as long as the node kinds line up.
pub trait ExpressionParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Expr, ParseError>;
}

/// The bundled relaxed single-expression parser.
///
/// Parses exactly one expression and requires end of input behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl ExpressionParser for DefaultParser {
    fn parse(&self, source: &str) -> Result<Expr, ParseError> {
        let lexer = Lexer::new(source);
        let mut parser = Parser::new(lexer)?;
        parser.parse()
    }
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if mem::discriminant(&self.current_token) != mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                expected,
                found: self.current_token.clone(),
            });
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    /// Parse primary expressions (atoms): literals, identifiers, array
    /// literals, parenthesized groups.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Float(n) => {
                self.advance()?;
                Ok(Expr::Literal(Value::Float(n)))
            }
            Token::Integer(n) => {
                self.advance()?;
                Ok(Expr::Literal(Value::Integer(n)))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::Literal(Value::String(s)))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Literal(Value::Boolean(b)))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Literal(Value::Null))
            }
            Token::Regex(pattern) => {
                self.advance()?;
                Ok(Expr::Literal(Value::Pattern(pattern)))
            }

            // References
            Token::Identifier(name) => {
                self.advance()?;
                Ok(Expr::Identifier(name))
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            // Array literals
            Token::LBracket => {
                self.advance()?;
                self.parse_array_literal()
            }

            token => Err(ParseError::Unexpected(token)),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        while !self.check(&Token::RBracket) {
            elements.push(self.parse_expression()?);

            if !self.check(&Token::RBracket) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBracket)?;
        Ok(Expr::Array(elements))
    }

    /// Parse member-access chains: `a.b`, `a["b"]`, `a[1]`, and mixes.
    fn parse_access(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::LBracket) {
                self.advance()?; // consume '['
                let property = self.parse_expression()?;
                self.expect(Token::RBracket)?;

                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(property),
                };
            } else if self.check(&Token::Dot) {
                self.advance()?; // consume '.'

                // After dot, we expect an identifier
                let name = match &self.current_token {
                    Token::Identifier(n) => n.clone(),
                    _ => return Err(ParseError::ExpectedProperty(self.current_token.clone())),
                };
                self.advance()?;

                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(Expr::Identifier(name)),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.current_token {
            Token::Bang => Some(UnaryOp::Not),
            Token::Minus => Some(UnaryOp::Minus),
            _ => None,
        };

        if let Some(op) = op {
            self.advance()?;
            let operand = self.parse_unary()?; // right-associative
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_access()
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Star => BinaryOp::Multiply,
                Token::Percent => BinaryOp::Modulo,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match &self.current_token {
                Token::Shl => BinaryOp::ShiftLeft,
                Token::Shr => BinaryOp::ShiftRight,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_additive()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_shift()?;

        loop {
            let op = match &self.current_token {
                Token::Lt => BinaryOp::LessThan,
                Token::LtEq => BinaryOp::LessEqual,
                Token::Gt => BinaryOp::GreaterThan,
                Token::GtEq => BinaryOp::GreaterEqual,
                Token::In => BinaryOp::In,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_shift()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match &self.current_token {
                Token::EqEq => BinaryOp::Equal,
                Token::EqEqEq => BinaryOp::StrictEqual,
                Token::NotEq => BinaryOp::NotEqual,
                Token::NotEqEq => BinaryOp::StrictNotEqual,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_relational()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.check(&Token::AndAnd) {
            self.advance()?;
            let right = self.parse_equality()?;

            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::OrOr) {
            self.advance()?;
            let right = self.parse_and()?;

            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    /// Parse a single complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}
