pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod format;
pub mod interpreter;
pub mod json;
pub mod lexer;
pub mod token;
pub mod value;

pub use ast::{Expr, ExprKind, Program, Stmt};
pub use interpreter::{Interpreter, InterpreterOptions, parse, run_source};
pub use token::{Token, TokenKind};
pub use value::Value;
