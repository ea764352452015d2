//! Console built-ins.

use super::super::environment::Environment;
use super::super::error::RuntimeError;
use super::super::host::Host;
use super::require_args;
use crate::format::{display_value, raw_value};
use crate::value::Value;

/// Stringifies every argument, joins them with spaces and emits one line.
pub fn print(args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    let line: Vec<String> = args.iter().map(display_value).collect();
    host.log(line.join(" "));
    Ok(Value::Null)
}

/// Like `print`, but strings keep their quotes.
pub fn print_raw(args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    let line: Vec<String> = args.iter().map(raw_value).collect();
    host.log(line.join(" "));
    Ok(Value::Null)
}

pub fn input(args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    if args.len() > 1 {
        require_args!(args, 1, "input");
    }
    let prompt = match args.first() {
        None => String::new(),
        Some(Value::String(prompt)) => prompt.to_string(),
        Some(other) => {
            return Err(RuntimeError::type_error(format!(
                "input prompt must be a string, found {}",
                other.type_name()
            )));
        }
    };
    host.input
        .request(&prompt)
        .map(Value::string)
        .map_err(|e| RuntimeError::invalid_operation(format!("failed to read input: {}", e)))
}
