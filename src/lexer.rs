use crate::ast::Token;
use crate::value::Pattern;

/// Errors produced while tokenizing expression source.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// Character with no meaning in the expression grammar
    UnexpectedChar(char, usize),

    /// A half-typed two-character operator (`=`, `&`, `|`)
    BareOperator {
        found: char,
        hint: &'static str,
        position: usize,
    },

    /// Backslash escape the string grammar does not know
    InvalidEscape(char, usize),

    /// String literal ran into end of input
    UnterminatedString(usize),

    /// Regex literal ran into end of input
    UnterminatedRegex(usize),

    /// Flag letter outside `imsugy` after a regex literal
    InvalidRegexFlag(char, usize),

    /// Numeric literal that does not fit the target type
    InvalidNumber(String, usize),
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedChar(ch, pos) => {
                write!(f, "Unexpected character '{}' at position {}", ch, pos)
            }
            LexError::BareOperator {
                found,
                hint,
                position,
            } => write!(
                f,
                "Unexpected '{}' at position {} (did you mean '{}'?)",
                found, position, hint
            ),
            LexError::InvalidEscape(ch, pos) => {
                write!(f, "Invalid escape sequence: \\{} at position {}", ch, pos)
            }
            LexError::UnterminatedString(pos) => write!(
                f,
                "Unterminated string starting at position {}: missing closing quote",
                pos
            ),
            LexError::UnterminatedRegex(pos) => write!(
                f,
                "Unterminated regular expression starting at position {}",
                pos
            ),
            LexError::InvalidRegexFlag(ch, pos) => write!(
                f,
                "Unknown regular expression flag '{}' at position {}",
                ch, pos
            ),
            LexError::InvalidNumber(text, pos) => {
                write!(f, "Invalid number literal '{}' at position {}", text, pos)
            }
        }
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some(ch) => return Err(LexError::InvalidEscape(ch, self.position)),
                        None => return Err(LexError::UnterminatedString(start)),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString(start))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_float {
            number
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| LexError::InvalidNumber(number.clone(), start))
        } else {
            number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| LexError::InvalidNumber(number.clone(), start))
        }
    }

    /// Read a `/pattern/flags` literal. The opening slash has not been
    /// consumed yet. Escaped characters are kept verbatim in the source so
    /// the stored pattern matches what was written.
    fn read_regex(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // consume opening slash

        let mut source = String::new();
        loop {
            match self.current_char() {
                None => return Err(LexError::UnterminatedRegex(start)),
                Some('/') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    source.push('\\');
                    self.advance();
                    match self.current_char() {
                        Some(ch) => {
                            source.push(ch);
                            self.advance();
                        }
                        None => return Err(LexError::UnterminatedRegex(start)),
                    }
                }
                Some(ch) => {
                    source.push(ch);
                    self.advance();
                }
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphabetic() {
                if !"imsugy".contains(ch) {
                    return Err(LexError::InvalidRegexFlag(ch, self.position));
                }
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(Token::Regex(Pattern::new(source, flags)))
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('(') => {
                self.advance();
                Ok(Token::LParen)
            }
            Some(')') => {
                self.advance();
                Ok(Token::RParen)
            }
            Some('[') => {
                self.advance();
                Ok(Token::LBracket)
            }
            Some(']') => {
                self.advance();
                Ok(Token::RBracket)
            }
            Some('.') => {
                self.advance();
                Ok(Token::Dot)
            }
            Some(',') => {
                self.advance();
                Ok(Token::Comma)
            }
            Some('+') => {
                self.advance();
                Ok(Token::Plus)
            }
            Some('-') => {
                self.advance();
                Ok(Token::Minus)
            }
            Some('*') => {
                self.advance();
                Ok(Token::Star)
            }
            Some('%') => {
                self.advance();
                Ok(Token::Percent)
            }
            Some('/') => self.read_regex(),
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    if self.peek_char(2) == Some('=') {
                        self.advance();
                        self.advance();
                        self.advance();
                        Ok(Token::EqEqEq)
                    } else {
                        self.advance();
                        self.advance();
                        Ok(Token::EqEq)
                    }
                } else {
                    Err(LexError::BareOperator {
                        found: '=',
                        hint: "==",
                        position: self.position,
                    })
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    if self.peek_char(2) == Some('=') {
                        self.advance();
                        self.advance();
                        self.advance();
                        Ok(Token::NotEqEq)
                    } else {
                        self.advance();
                        self.advance();
                        Ok(Token::NotEq)
                    }
                } else {
                    self.advance();
                    Ok(Token::Bang)
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::GtEq)
                } else if self.peek_char(1) == Some('>') {
                    self.advance();
                    self.advance();
                    Ok(Token::Shr)
                } else {
                    self.advance();
                    Ok(Token::Gt)
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::LtEq)
                } else if self.peek_char(1) == Some('<') {
                    self.advance();
                    self.advance();
                    Ok(Token::Shl)
                } else {
                    self.advance();
                    Ok(Token::Lt)
                }
            }
            Some('&') => {
                if self.peek_char(1) == Some('&') {
                    self.advance();
                    self.advance();
                    Ok(Token::AndAnd)
                } else {
                    Err(LexError::BareOperator {
                        found: '&',
                        hint: "&&",
                        position: self.position,
                    })
                }
            }
            Some('|') => {
                if self.peek_char(1) == Some('|') {
                    self.advance();
                    self.advance();
                    Ok(Token::OrOr)
                } else {
                    Err(LexError::BareOperator {
                        found: '|',
                        hint: "||",
                        position: self.position,
                    })
                }
            }
            Some('"') => Ok(Token::String(self.read_string('"')?)),
            Some('\'') => Ok(Token::String(self.read_string('\'')?)),
            Some(ch) if ch.is_alphabetic() || ch == '_' || ch == '$' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "in" => Ok(Token::In),
                    "true" => Ok(Token::Boolean(true)),
                    "false" => Ok(Token::Boolean(false)),
                    "null" => Ok(Token::Null),
                    _ => Ok(Token::Identifier(ident)),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => Err(LexError::UnexpectedChar(ch, self.position)),
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("in true false null");
    assert_eq!(lexer.next_token().unwrap(), Token::In);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_comparison_operators() {
    let mut lexer = Lexer::new("== === != !== < <= > >=");
    assert_eq!(lexer.next_token().unwrap(), Token::EqEq);
    assert_eq!(lexer.next_token().unwrap(), Token::EqEqEq);
    assert_eq!(lexer.next_token().unwrap(), Token::NotEq);
    assert_eq!(lexer.next_token().unwrap(), Token::NotEqEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Lt);
    assert_eq!(lexer.next_token().unwrap(), Token::LtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Gt);
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_regex_literal() {
    let mut lexer = Lexer::new("/^c.*$/i");
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Regex(Pattern::new("^c.*$", "i"))
    );
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_bare_equals_is_invalid() {
    let mut lexer = Lexer::new("a = 3");
    lexer.next_token().unwrap(); // a
    let result = lexer.next_token();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unexpected '='"));
}
