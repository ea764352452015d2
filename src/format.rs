use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

/// Arrays currently being rendered, innermost last. An array that contains
/// itself renders the repeat as `[...]`.
type Ancestors = Vec<*const RefCell<Vec<Value>>>;

/// Floats always show a fractional part so they stay distinguishable from integers.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Text produced by `print` and `str`: strings appear bare.
pub fn display_value(value: &Value) -> String {
    render(value, false, &mut Vec::new())
}

/// Text produced by `printRaw`: values look the way they would be written in a program.
pub fn raw_value(value: &Value) -> String {
    render(value, true, &mut Vec::new())
}

fn render(value: &Value, quoted: bool, ancestors: &mut Ancestors) -> String {
    match value {
        Value::String(s) if quoted => format!("\"{}\"", s),
        Value::String(s) => s.to_string(),
        Value::Array(items) => {
            let id = Rc::as_ptr(items);
            if ancestors.contains(&id) {
                return "[...]".to_string();
            }
            ancestors.push(id);
            let parts: Vec<String> = items.borrow().iter().map(|item| render(item, quoted, ancestors)).collect();
            ancestors.pop();
            format!("[{}]", parts.join(", "))
        }
        _ => scalar_text(value),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Boolean(b) => b.to_string(),
        Value::Range(start, end) => format!("{} to {}", start, end),
        Value::Function(routine) => format!("<function {}>", routine.decl.name),
        Value::Procedure(routine) => format!("<procedure {}>", routine.decl.name),
        Value::Class(class) => format!("<class {}>", class.name()),
        Value::Instance(instance) => format!("<{} instance>", instance.class.name()),
        Value::NativeFunction(native) => format!("<native-function {}>", native.name),
        Value::NativeMethod(native) => format!("<native-method {}>", native.name),
        Value::NativeGetter(native) => format!("<native-getter {}>", native.name),
        Value::FileReader(_) | Value::FileWriter(_) => format!("Type<{}>", value.type_name()),
        Value::String(_) | Value::Array(_) => display_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(-3.0), "-3.0");
        assert_eq!(format_float(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_display_and_raw_differ_on_strings() {
        let value = Value::array(vec![Value::string("a"), Value::Integer(1), Value::Float(2.0), Value::Null]);
        assert_eq!(display_value(&value), "[a, 1, 2.0, null]");
        assert_eq!(raw_value(&value), "[\"a\", 1, 2.0, null]");
    }

    #[test]
    fn test_nested_arrays() {
        let inner = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
        let outer = Value::array(vec![inner.clone(), inner]);
        assert_eq!(display_value(&outer), "[[1, 2], [1, 2]]");
    }

    #[test]
    fn test_self_containing_array() {
        let value = Value::array(vec![Value::Integer(1), Value::Null]);
        if let Value::Array(items) = &value {
            items.borrow_mut()[1] = value.clone();
        }
        assert_eq!(display_value(&value), "[1, [...]]");
        assert_eq!(raw_value(&value), "[1, [...]]");
    }
}
