//! Casts between the scalar types, and `len`.

use super::super::environment::Environment;
use super::super::error::RuntimeError;
use super::super::host::Host;
use super::require_args;
use crate::format::format_float;
use crate::value::Value;

fn cast_error(from: &Value, to: &str) -> RuntimeError {
    RuntimeError::type_error(format!("type {} cannot be cast to type {}", from.type_name(), to))
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Floats are floored; numeric strings are parsed and floored.
pub fn to_int(args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "int");
    match &args[0] {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Float(f) => float_to_integer(*f),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::String(s) => {
            if let Ok(n) = s.trim().parse::<i64>() {
                return Ok(Value::Integer(n));
            }
            let parsed = parse_number(s).ok_or_else(|| {
                RuntimeError::type_error(format!("string \"{}\" cannot be cast to an integer", s))
            })?;
            float_to_integer(parsed)
        }
        other => Err(cast_error(other, "integer")),
    }
}

fn float_to_integer(value: f64) -> Result<Value, RuntimeError> {
    let floored = value.floor();
    if !floored.is_finite() || floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return Err(RuntimeError::invalid_operation(format!(
            "{} is out of range for an integer",
            format_float(value)
        )));
    }
    Ok(Value::Integer(floored as i64))
}

pub fn to_float(args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "float");
    match &args[0] {
        Value::Integer(n) => Ok(Value::Float(*n as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Boolean(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => parse_number(s)
            .map(Value::Float)
            .ok_or_else(|| RuntimeError::type_error(format!("string \"{}\" cannot be cast to a float", s))),
        other => Err(cast_error(other, "float")),
    }
}

pub fn to_str(args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "str");
    match &args[0] {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Integer(n) => Ok(Value::string(n.to_string())),
        Value::Float(f) => Ok(Value::string(format_float(*f))),
        Value::Boolean(b) => Ok(Value::string(b.to_string())),
        Value::Null => Ok(Value::string("null")),
        other => Err(cast_error(other, "string")),
    }
}

/// Arrays only; strings use the `.length` member.
pub fn len(args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "len");
    match &args[0] {
        Value::Array(items) => Ok(Value::Integer(items.borrow().len() as i64)),
        other => Err(RuntimeError::type_error(format!(
            "len only works on arrays, found {}; for strings use the .length member",
            other.type_name()
        ))),
    }
}
