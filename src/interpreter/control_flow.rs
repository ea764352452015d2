use crate::value::Value;

/// Outcome of executing a statement. A `return` unwinds as `Return`; the value
/// itself is parked on the enclosing function scope.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    Value(Value),
    Return,
}
