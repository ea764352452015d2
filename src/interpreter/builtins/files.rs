//! Line-oriented file access through the host's file store.

use std::cell::RefCell;
use std::rc::Rc;

use super::super::environment::Environment;
use super::super::error::RuntimeError;
use super::super::host::Host;
use super::{require_args, with_string};
use crate::value::{FileReader, FileWriter, Value};

fn file_not_found(path: &str) -> RuntimeError {
    RuntimeError::invalid_operation(format!("file \"{}\" does not exist", path))
}

pub fn open_read(args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "openRead");
    with_string!(&args[0], "openRead", |path: &Rc<str>| {
        let contents = host.files.read(path).ok_or_else(|| file_not_found(path))?;
        Ok(Value::FileReader(Rc::new(RefCell::new(FileReader::new(path.to_string(), &contents)))))
    })
}

/// Opens an existing file for appending: the writer starts with its current lines.
pub fn open_write(args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "openWrite");
    with_string!(&args[0], "openWrite", |path: &Rc<str>| {
        let contents = host.files.read(path).ok_or_else(|| file_not_found(path))?;
        let existing = FileReader::new(path.to_string(), &contents);
        Ok(Value::FileWriter(Rc::new(RefCell::new(FileWriter {
            path: path.to_string(),
            lines: existing.lines,
            closed: false,
        }))))
    })
}

/// Creates an empty file, truncating any existing one.
pub fn new_file(args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "newFile");
    with_string!(&args[0], "newFile", |path: &Rc<str>| {
        host.files.write(path, "").map_err(RuntimeError::invalid_operation)?;
        Ok(Value::Null)
    })
}

fn with_reader<T>(receiver: &Value, body: impl FnOnce(&mut FileReader) -> Result<T, RuntimeError>) -> Result<T, RuntimeError> {
    match receiver {
        Value::FileReader(reader) => body(&mut reader.borrow_mut()),
        other => Err(RuntimeError::type_error(format!("expected a file-reader, found {}", other.type_name()))),
    }
}

fn with_writer<T>(receiver: &Value, body: impl FnOnce(&mut FileWriter) -> Result<T, RuntimeError>) -> Result<T, RuntimeError> {
    match receiver {
        Value::FileWriter(writer) => body(&mut writer.borrow_mut()),
        other => Err(RuntimeError::type_error(format!("expected a file-writer, found {}", other.type_name()))),
    }
}

pub fn read_line(receiver: &Value, args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 0, "readLine");
    with_reader(receiver, |reader| {
        if reader.closed {
            return Err(RuntimeError::invalid_operation("cannot read from file after it has been closed"));
        }
        let line = reader
            .lines
            .get(reader.current_line)
            .cloned()
            .ok_or_else(|| RuntimeError::invalid_operation("cannot read past the end of the file"))?;
        reader.current_line += 1;
        Ok(Value::string(line))
    })
}

pub fn end_of_file(receiver: &Value, args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 0, "endOfFile");
    with_reader(receiver, |reader| {
        if reader.closed {
            return Err(RuntimeError::invalid_operation("cannot read from file after it has been closed"));
        }
        Ok(Value::Boolean(reader.current_line >= reader.lines.len()))
    })
}

pub fn close_reader(receiver: &Value, args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 0, "close");
    with_reader(receiver, |reader| {
        if reader.closed {
            return Err(RuntimeError::invalid_operation("cannot close a closed file"));
        }
        reader.closed = true;
        Ok(Value::Null)
    })
}

pub fn write_line(receiver: &Value, args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "writeLine");
    with_writer(receiver, |writer| {
        if writer.closed {
            return Err(RuntimeError::invalid_operation("cannot write lines to a file after it has been closed"));
        }
        match &args[0] {
            Value::String(line) => {
                writer.lines.push(line.to_string());
                Ok(args[0].clone())
            }
            other => Err(RuntimeError::type_error(format!(
                "only strings can be written to a file, found {}",
                other.type_name()
            ))),
        }
    })
}

/// Flushes every line back to the store, joined with newlines.
pub fn close_writer(receiver: &Value, args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 0, "close");
    with_writer(receiver, |writer| {
        if writer.closed {
            return Err(RuntimeError::invalid_operation("cannot close a closed file"));
        }
        host.files
            .write(&writer.path, &writer.lines.join("\n"))
            .map_err(RuntimeError::invalid_operation)?;
        writer.closed = true;
        Ok(Value::Null)
    })
}
