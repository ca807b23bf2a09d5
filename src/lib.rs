pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{BinaryOp, Expr, LogicalOp, Token, UnaryOp};
pub use compiler::{CompileError, Compiler, CompilerBuilder, Converters, Error};
pub use lexer::{LexError, Lexer};
pub use output::{document_to_json, to_json, to_json_pretty, value_to_json};
pub use parser::{DefaultParser, ExpressionParser, ParseError, Parser};
pub use value::{Document, Pattern, Value};
