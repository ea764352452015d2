pub mod builtins;
pub mod classes;
pub mod control_flow;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod parser;
pub mod prototype;
pub mod value_utils;

pub use control_flow::ControlFlow;
pub use environment::Environment;
pub use error::{Error, RuntimeError, SyntaxError};
pub use evaluator::Interpreter;
pub use host::{Host, OutputEntry, OutputKind};
pub use parser::{ParseResult, TokenParser};

use crate::ast::Program;
use crate::lexer::tokenize;
use crate::value::Value;

/// Tunables for a single interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Body executions a single `while` loop may perform before it fails.
    pub max_while_iterations: usize,
    /// Nested function and procedure calls allowed at once.
    pub max_call_depth: usize,
    /// Seeds `random`; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_while_iterations: 200,
            max_call_depth: 1000,
            seed: None,
        }
    }
}

pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    let tokens = tokenize(source)?;
    TokenParser::new(tokens).parse_program()
}

/// Runs `source` in a fresh interpreter with buffered output, no input and an
/// empty in-memory file store. Returns the program's value and everything it
/// printed.
pub fn run_source(source: &str) -> Result<(Value, Vec<OutputEntry>), Error> {
    let (host, output) = Host::buffered();
    let mut interpreter = Interpreter::new(host, InterpreterOptions::default());
    let program = parse(source)?;
    let value = interpreter.run(&program)?;
    Ok((value, output.entries()))
}
