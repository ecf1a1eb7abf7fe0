//! Pseudocode language interpreter

pub mod lexer;
pub mod parser;
pub mod interpreter;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{dump_program, Expr, Parser, Stmt};
pub use interpreter::{Interpreter, OutputSink, Value};
