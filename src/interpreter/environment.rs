use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::error::RuntimeError;
use crate::value::Value;

struct Frame {
    variables: IndexMap<Rc<str>, Value>,
    parent: Option<Environment>,
    is_function_boundary: bool,
    terminated: bool,
    return_value: Option<Value>,
}

/// One scope in the chain. Cloning is cheap and yields another handle to the
/// same scope; functions keep their defining scope alive this way.
#[derive(Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

impl Environment {
    /// A root scope with no parent.
    pub fn new() -> Self {
        Self::with_frame(None, false)
    }

    /// A block scope for `if`, loop and switch bodies.
    pub fn child(&self) -> Self {
        Self::with_frame(Some(self.clone()), false)
    }

    /// A scope that stops a `return` from bubbling any further.
    pub fn function_scope(&self) -> Self {
        Self::with_frame(Some(self.clone()), true)
    }

    fn with_frame(parent: Option<Environment>, is_function_boundary: bool) -> Self {
        Self {
            frame: Rc::new(RefCell::new(Frame {
                variables: IndexMap::new(),
                parent,
                is_function_boundary,
                terminated: false,
                return_value: None,
            })),
        }
    }

    pub fn parent(&self) -> Option<Environment> {
        self.frame.borrow().parent.clone()
    }

    /// Binds `name` in this scope. Shadowing an outer binding is fine;
    /// declaring the same name twice in one scope is not.
    pub fn declare(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let mut frame = self.frame.borrow_mut();
        if frame.variables.contains_key(name) {
            return Err(RuntimeError::redeclaration(name));
        }
        frame.variables.insert(Rc::from(name), value);
        Ok(())
    }

    /// Overwrites or creates `name` in this scope only.
    pub fn set_local(&self, name: &str, value: Value) {
        self.frame.borrow_mut().variables.insert(Rc::from(name), value);
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.frame.borrow().variables.contains_key(name)
    }

    /// Assigns to the nearest scope that owns `name`, or declares it here.
    pub fn assign(&self, name: &str, value: Value) {
        let owner = self.resolve(name).unwrap_or_else(|| self.clone());
        owner.set_local(name, value);
    }

    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        let mut scope = Some(self.clone());
        while let Some(current) = scope {
            if let Some(value) = current.frame.borrow().variables.get(name) {
                return Ok(value.clone());
            }
            scope = current.parent();
        }
        Err(RuntimeError::undefined_variable(name))
    }

    /// The nearest scope, starting with this one, that owns `name`.
    pub fn resolve(&self, name: &str) -> Option<Environment> {
        let mut scope = Some(self.clone());
        while let Some(current) = scope {
            if current.has_local(name) {
                return Some(current);
            }
            scope = current.parent();
        }
        None
    }

    /// Replaces element `index` of the array bound to `name` in place, so every
    /// alias of that array sees the change.
    pub fn assign_indexed(&self, name: &str, index: i64, value: Value) -> Result<(), RuntimeError> {
        match self.lookup(name)? {
            Value::Array(items) => store_element(&items, index, value),
            other => Err(RuntimeError::type_error(format!(
                "cannot index into {} of type {}",
                name,
                other.type_name()
            ))),
        }
    }

    /// Marks scopes as terminated up to the nearest function boundary and
    /// records `value` there. Fails when no function encloses this scope.
    pub fn signal_return(&self, value: Value) -> Result<(), RuntimeError> {
        let mut unwound: Vec<Environment> = Vec::new();
        let mut scope = Some(self.clone());
        while let Some(current) = scope {
            let is_boundary = current.frame.borrow().is_function_boundary;
            if is_boundary {
                for block in &unwound {
                    block.terminate();
                }
                let mut frame = current.frame.borrow_mut();
                frame.terminated = true;
                frame.return_value = Some(value);
                return Ok(());
            }
            scope = current.parent();
            unwound.push(current);
        }
        Err(RuntimeError::return_outside_function())
    }

    fn terminate(&self) {
        self.frame.borrow_mut().terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.frame.borrow().terminated
    }

    pub fn take_return_value(&self) -> Option<Value> {
        self.frame.borrow_mut().return_value.take()
    }

    /// Names bound directly in this scope, in declaration order.
    pub fn local_names(&self) -> Vec<Rc<str>> {
        self.frame.borrow().variables.keys().cloned().collect()
    }
}

/// Overwrites one slot of a shared array.
pub fn store_element(items: &RefCell<Vec<Value>>, index: i64, value: Value) -> Result<(), RuntimeError> {
    let mut items = items.borrow_mut();
    let length = items.len();
    let slot = usize::try_from(index)
        .ok()
        .and_then(|i| items.get_mut(i))
        .ok_or_else(|| RuntimeError::index_out_of_bounds(index, length))?;
    *slot = value;
    Ok(())
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// Scopes and closures reference each other, so only names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.local_names())
            .field("has_parent", &self.frame.borrow().parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_indexed_mutates_shared_array() {
        let env = Environment::new();
        let array = Value::array(vec![Value::Null, Value::Null]);
        env.declare("a", array.clone()).unwrap();
        env.assign_indexed("a", 1, Value::Integer(7)).unwrap();

        if let Value::Array(items) = array {
            assert_eq!(items.borrow()[1], Value::Integer(7));
        } else {
            panic!("expected array");
        }
        assert!(env.assign_indexed("a", 2, Value::Null).is_err());
        assert!(env.assign_indexed("a", -1, Value::Null).is_err());
        env.declare("n", Value::Integer(1)).unwrap();
        assert!(env.assign_indexed("n", 0, Value::Null).is_err());
    }

    #[test]
    fn test_declare_and_lookup() {
        let env = Environment::new();
        env.declare("x", Value::Integer(42)).unwrap();
        assert_eq!(env.lookup("x").unwrap(), Value::Integer(42));
    }

    #[test]
    fn test_redeclaration_in_same_scope_fails() {
        let env = Environment::new();
        env.declare("x", Value::Integer(1)).unwrap();
        assert!(matches!(
            env.declare("x", Value::Integer(2)),
            Err(RuntimeError::Redeclaration { .. })
        ));
    }

    #[test]
    fn test_shadowing_in_child_scope() {
        let env = Environment::new();
        env.declare("x", Value::Integer(1)).unwrap();

        let block = env.child();
        block.declare("x", Value::Integer(2)).unwrap();
        assert_eq!(block.lookup("x").unwrap(), Value::Integer(2));
        assert_eq!(env.lookup("x").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_assign_updates_owner() {
        let env = Environment::new();
        env.declare("x", Value::Integer(1)).unwrap();

        let block = env.child();
        block.assign("x", Value::Integer(5));
        assert!(!block.has_local("x"));
        assert_eq!(env.lookup("x").unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_assign_unknown_declares_locally() {
        let env = Environment::new();
        let block = env.child();
        block.assign("y", Value::Boolean(true));
        assert!(block.has_local("y"));
        assert!(env.lookup("y").is_err());
    }

    #[test]
    fn test_lookup_missing_is_undefined_variable() {
        let env = Environment::new();
        assert!(matches!(env.lookup("nope"), Err(RuntimeError::UndefinedVariable { .. })));
    }

    #[test]
    fn test_signal_return_bubbles_to_function_boundary() {
        let global = Environment::new();
        let function = global.function_scope();
        let loop_body = function.child().child();

        loop_body.signal_return(Value::Integer(3)).unwrap();
        assert!(loop_body.is_terminated());
        assert!(function.is_terminated());
        assert!(!global.is_terminated());
        assert_eq!(function.take_return_value(), Some(Value::Integer(3)));
    }

    #[test]
    fn test_signal_return_at_root_fails() {
        let global = Environment::new();
        let block = global.child();
        assert!(matches!(
            block.signal_return(Value::Null),
            Err(RuntimeError::ReturnOutsideFunction { .. })
        ));
        assert!(!block.is_terminated());
    }
}
