#![allow(dead_code)]

use pseudo::interpreter::host::{BufferedOutput, MemoryFileStore, ScriptedInput};
use pseudo::interpreter::{Error, Host, Interpreter, InterpreterOptions, RuntimeError};
use pseudo::{Value, run_source};

/// Runs `source` and returns what it printed, one entry per line.
pub fn run(source: &str) -> Vec<String> {
    match run_source(source) {
        Ok((_, entries)) => entries.into_iter().map(|entry| entry.text).collect(),
        Err(error) => panic!("program failed: {}\n--- source ---\n{}", error, source),
    }
}

/// Runs `source` and returns the value of its last statement.
pub fn eval(source: &str) -> Value {
    match run_source(source) {
        Ok((value, _)) => value,
        Err(error) => panic!("program failed: {}\n--- source ---\n{}", error, source),
    }
}

pub fn run_err(source: &str) -> Error {
    match run_source(source) {
        Ok((value, _)) => panic!("expected an error, program produced {:?}", value),
        Err(error) => error,
    }
}

pub fn runtime_err(source: &str) -> RuntimeError {
    match run_err(source) {
        Error::Runtime(error) => error,
        Error::Syntax(error) => panic!("expected a runtime error, got syntax error: {}", error),
    }
}

/// Interpreter wired to scripted input and an in-memory file store.
pub struct Session {
    pub interpreter: Interpreter,
    pub output: BufferedOutput,
    pub files: MemoryFileStore,
}

impl Session {
    pub fn new(answers: &[&str], files: MemoryFileStore) -> Self {
        Self::with_options(answers, files, InterpreterOptions::default())
    }

    pub fn with_options(answers: &[&str], files: MemoryFileStore, options: InterpreterOptions) -> Self {
        let output = BufferedOutput::new();
        let host = Host::new(output.clone(), ScriptedInput::new(answers.iter().copied()), files.clone());
        Self {
            interpreter: Interpreter::new(host, options),
            output,
            files,
        }
    }

    pub fn run(&mut self, source: &str) -> Result<Value, Error> {
        self.interpreter.execute(source)
    }

    pub fn lines(&self) -> Vec<String> {
        self.output.lines()
    }
}
