//! Built-in members per value type: `text.length`, `file.readLine()`, ...

use super::builtins::{files, string};
use super::error::RuntimeError;
use crate::value::{NativeGetter, NativeGetterFn, NativeMethod, NativeMethodFn, Value};

#[derive(Clone, Copy)]
enum Entry {
    Getter(NativeGetterFn),
    Method(NativeMethodFn),
}

const STRING: &[(&str, Entry)] = &[
    ("length", Entry::Getter(string::length)),
    ("substring", Entry::Method(string::substring)),
];

const FILE_READER: &[(&str, Entry)] = &[
    ("readLine", Entry::Method(files::read_line)),
    ("endOfFile", Entry::Method(files::end_of_file)),
    ("close", Entry::Method(files::close_reader)),
];

const FILE_WRITER: &[(&str, Entry)] = &[
    ("writeLine", Entry::Method(files::write_line)),
    ("close", Entry::Method(files::close_writer)),
];

fn table(value: &Value) -> &'static [(&'static str, Entry)] {
    match value {
        Value::String(_) => STRING,
        Value::FileReader(_) => FILE_READER,
        Value::FileWriter(_) => FILE_WRITER,
        _ => &[],
    }
}

/// Looks up `name` in the prototype of `value`'s type. Getters come back as
/// `native-getter` values and methods as unbound `native-method` values.
pub fn lookup(value: &Value, name: &str) -> Option<Value> {
    table(value).iter().find(|(member, _)| *member == name).map(|&(name, entry)| match entry {
        Entry::Getter(call) => Value::NativeGetter(NativeGetter { name, call }),
        Entry::Method(call) => Value::NativeMethod(NativeMethod { name, call }),
    })
}

/// Resolves `value.name`: getters are run against `value`, methods are
/// returned for the caller to invoke with `value` as receiver.
pub fn member(value: &Value, name: &str) -> Result<Value, RuntimeError> {
    match lookup(value, name) {
        Some(Value::NativeGetter(getter)) => (getter.call)(value),
        Some(method) => Ok(method),
        None => Err(RuntimeError::invalid_operation(format!(
            "{} has no member `{}`",
            value.type_name(),
            name
        ))),
    }
}
