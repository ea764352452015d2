//! String built-ins and string members.

use std::rc::Rc;

use super::super::environment::Environment;
use super::super::error::RuntimeError;
use super::super::host::Host;
use super::{require_args, with_string};
use crate::value::Value;

pub fn upper(args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "upper");
    with_string!(&args[0], "upper", |s: &Rc<str>| Ok(Value::string(s.to_uppercase())))
}

pub fn lower(args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "lower");
    with_string!(&args[0], "lower", |s: &Rc<str>| Ok(Value::string(s.to_lowercase())))
}

/// `text.length`, in characters
pub fn length(receiver: &Value) -> Result<Value, RuntimeError> {
    with_string!(receiver, "length", |s: &Rc<str>| Ok(Value::Integer(s.chars().count() as i64)))
}

/// `text.substring(start, length)`
pub fn substring(receiver: &Value, args: &[Value], _scope: &Environment, _host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "substring");
    let (start, count) = match (&args[0], &args[1]) {
        (Value::Integer(start), Value::Integer(count)) => (*start, *count),
        _ => {
            return Err(RuntimeError::type_error(
                "only integers can be used in the substring method",
            ));
        }
    };
    with_string!(receiver, "substring", |s: &Rc<str>| {
        let total = s.chars().count();
        let end = start.checked_add(count).unwrap_or(i64::MAX);
        if start < 0 || start as usize > total {
            return Err(RuntimeError::index_out_of_bounds(start, total));
        }
        if count < 0 || end as usize > total {
            return Err(RuntimeError::index_out_of_bounds(end, total));
        }
        let text: String = s.chars().skip(start as usize).take(count as usize).collect();
        Ok(Value::string(text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        let (mut host, _) = Host::buffered();
        let scope = Environment::new();
        assert_eq!(upper(&[Value::string("abc")], &scope, &mut host).unwrap(), Value::string("ABC"));
        assert_eq!(lower(&[Value::string("ABC")], &scope, &mut host).unwrap(), Value::string("abc"));
        assert!(upper(&[Value::Integer(1)], &scope, &mut host).is_err());
    }

    #[test]
    fn test_substring_bounds() {
        let (mut host, _) = Host::buffered();
        let scope = Environment::new();
        let text = Value::string("Hello");
        let sub = substring(&text, &[Value::Integer(1), Value::Integer(3)], &scope, &mut host).unwrap();
        assert_eq!(sub, Value::string("ell"));
        assert!(substring(&text, &[Value::Integer(3), Value::Integer(5)], &scope, &mut host).is_err());
        assert!(substring(&text, &[Value::Integer(-1), Value::Integer(1)], &scope, &mut host).is_err());
        assert!(substring(&text, &[Value::Float(1.0), Value::Integer(1)], &scope, &mut host).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        assert_eq!(length(&Value::string("héllo")).unwrap(), Value::Integer(5));
    }
}
