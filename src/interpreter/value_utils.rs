use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use super::error::RuntimeError;
use crate::ast::{BinaryOp, UnaryOp};
use crate::value::Value;

/// Language-level `==`. Values of different types are never equal, except that
/// integers and floats compare numerically. Arrays compare element by element;
/// objects, routines and classes compare by identity.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    equal_tracked(a, b, &mut Vec::new())
}

/// Array pairs already under comparison count as equal, so arrays that
/// contain themselves compare without recursing forever.
fn equal_tracked(a: &Value, b: &Value, seen: &mut Vec<(*const RefCell<Vec<Value>>, *const RefCell<Vec<Value>>)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => (*a as f64) == *b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Range(a1, a2), Value::Range(b1, b2)) => a1 == b1 && a2 == b2,
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            let pair = (Rc::as_ptr(arr_a), Rc::as_ptr(arr_b));
            if Rc::ptr_eq(arr_a, arr_b) || seen.contains(&pair) {
                return true;
            }
            seen.push(pair);
            let arr_a_ref = arr_a.borrow();
            let arr_b_ref = arr_b.borrow();
            arr_a_ref.len() == arr_b_ref.len()
                && arr_a_ref
                    .iter()
                    .zip(arr_b_ref.iter())
                    .all(|(va, vb)| equal_tracked(va, vb, seen))
        }
        _ => a == b,
    }
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "operator `{}` is not supported between {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn overflow(op: BinaryOp) -> RuntimeError {
    RuntimeError::invalid_operation(format!("integer overflow in `{}`", op.symbol()))
}

pub fn binary_operation(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Eq => Ok(Value::Boolean(values_equal(left, right))),
        BinaryOp::NotEq => Ok(Value::Boolean(!values_equal(left, right))),
        BinaryOp::Greater | BinaryOp::Less | BinaryOp::GreaterEq | BinaryOp::LessEq => {
            let ordering = compare(op, left, right)?;
            let result = match op {
                BinaryOp::Greater => ordering == Some(Ordering::Greater),
                BinaryOp::Less => ordering == Some(Ordering::Less),
                BinaryOp::GreaterEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                _ => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            };
            Ok(Value::Boolean(result))
        }
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if op == BinaryOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(unsupported(op, left, right)),
        },
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod | BinaryOp::Pow => {
            match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, *a, *b),
                (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
                    Ok(Value::string(format!("{}{}", a, b)))
                }
                _ => match (left.as_f64(), right.as_f64()) {
                    (Some(a), Some(b)) => float_arithmetic(op, a, b),
                    _ => Err(unsupported(op, left, right)),
                },
            }
        }
    }
}

/// Ordering for `> < >= <=`: only numbers with numbers and strings with strings.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Option<Ordering>, RuntimeError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(RuntimeError::type_error(format!(
                "cannot compare {} with {} using `{}`",
                left.type_name(),
                right.type_name(),
                op.symbol()
            ))),
        },
    }
}

fn integer_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => return float_arithmetic(op, a as f64, b as f64),
        BinaryOp::IntDiv | BinaryOp::Mod if b == 0 => return Err(RuntimeError::division_by_zero()),
        // checked_div truncates toward zero
        BinaryOp::IntDiv => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
        BinaryOp::Pow if b < 0 => {
            // Integral powers such as `1 ^ -1` stay integers.
            let power = (a as f64).powf(b as f64);
            if power.fract() == 0.0 && power.abs() < i64::MAX as f64 {
                return Ok(Value::Integer(power as i64));
            }
            return Ok(Value::Float(power));
        }
        BinaryOp::Pow => u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)),
        _ => None,
    };
    result.map(Value::Integer).ok_or_else(|| overflow(op))
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(RuntimeError::division_by_zero());
        }
        BinaryOp::Div => a / b,
        BinaryOp::IntDiv => (a / b).trunc(),
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        _ => return Err(RuntimeError::invalid_operation(format!("`{}` is not arithmetic", op.symbol()))),
    };
    Ok(Value::Float(result))
}

pub fn unary_operation(op: UnaryOp, value: &Value) -> Result<Value, RuntimeError> {
    match (op, value) {
        (UnaryOp::Not, _) => Ok(Value::Boolean(!value.is_truthy())),
        (UnaryOp::Plus, Value::Integer(_) | Value::Float(_)) => Ok(value.clone()),
        (UnaryOp::Neg, Value::Integer(n)) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::invalid_operation("integer overflow in unary `-`")),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        _ => Err(RuntimeError::type_error(format!(
            "unary `{}` requires a number, found {}",
            op.symbol(),
            value.type_name()
        ))),
    }
}
