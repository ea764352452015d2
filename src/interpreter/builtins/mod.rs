//! Built-in functions and the native members behind the prototype table.
//!
//! Functions are organized into categories:
//! - **IO**: `print`, `printRaw`, `input`
//! - **Type**: casts between integers, floats, strings and booleans, plus `len`
//! - **String**: `upper`, `lower` and the `length`/`substring` string members
//! - **Files**: `openRead`, `openWrite`, `newFile` and the reader/writer members
//! - **Math**: `random`
//!
//! Every native shares one calling convention: arguments, the calling scope
//! and the host. Errors carry no location; the evaluator adds the call site.

pub mod files;
pub mod io;
pub mod math;
pub mod string;
pub mod types;

use super::environment::Environment;
use crate::value::{NativeFn, NativeFunction, Value};

macro_rules! require_args {
    ($args:expr, $n:expr, $name:expr) => {
        if $args.len() != $n {
            return Err(RuntimeError::arity($name, $n, $args.len()));
        }
    };
}

macro_rules! with_string {
    ($value:expr, $name:expr, $body:expr) => {
        match $value {
            Value::String(s) => $body(s),
            other => Err(RuntimeError::type_error(format!(
                "{} requires a string, found {}",
                $name,
                other.type_name()
            ))),
        }
    };
}

pub(crate) use require_args;
pub(crate) use with_string;

const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("print", io::print),
    ("printRaw", io::print_raw),
    ("input", io::input),
    ("int", types::to_int),
    ("float", types::to_float),
    ("str", types::to_str),
    ("len", types::len),
    ("upper", string::upper),
    ("lower", string::lower),
    ("openRead", files::open_read),
    ("openWrite", files::open_write),
    ("newFile", files::new_file),
    ("random", math::random),
];

/// Seeds a global scope with the boolean constants and every native function.
pub fn register(globals: &Environment) {
    globals.set_local("true", Value::Boolean(true));
    globals.set_local("false", Value::Boolean(false));
    for &(name, call) in FUNCTIONS {
        globals.set_local(name, Value::NativeFunction(NativeFunction { name, call }));
    }
}
