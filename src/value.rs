use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::{ClassDecl, ClassMember, RoutineDecl, Visibility};
use crate::interpreter::environment::Environment;
use crate::interpreter::error::RuntimeError;
use crate::interpreter::host::Host;

pub type NativeFn = fn(&[Value], &Environment, &mut Host) -> Result<Value, RuntimeError>;
pub type NativeMethodFn = fn(&Value, &[Value], &Environment, &mut Host) -> Result<Value, RuntimeError>;
pub type NativeGetterFn = fn(&Value) -> Result<Value, RuntimeError>;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    /// Half-open `start to end`
    Range(i64, i64),
    Function(Rc<Routine>),
    Procedure(Rc<Routine>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    FileReader(Rc<RefCell<FileReader>>),
    FileWriter(Rc<RefCell<FileWriter>>),
    NativeFunction(NativeFunction),
    NativeMethod(NativeMethod),
    NativeGetter(NativeGetter),
}

impl Value {
    pub fn string(text: impl AsRef<str>) -> Self {
        Value::String(Rc::from(text.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Range(..) => "range",
            Value::Function(_) => "function",
            Value::Procedure(_) => "procedure",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::FileReader(_) => "file-reader",
            Value::FileWriter(_) => "file-writer",
            Value::NativeFunction(_) => "native-function",
            Value::NativeMethod(_) => "native-method",
            Value::NativeGetter(_) => "native-getter",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(n) = self { Some(*n) } else { None }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.borrow().is_empty(),
            _ => true,
        }
    }
}

/// Structural equality for tests and assertions. Language-level `==` lives in
/// `value_utils::values_equal`, which also compares integers with floats.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            // Identity, so arrays that contain themselves compare without recursing.
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Range(a1, a2), Value::Range(b1, b2)) => a1 == b1 && a2 == b2,
            (Value::Function(a), Value::Function(b)) | (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::FileReader(a), Value::FileReader(b)) => Rc::ptr_eq(a, b),
            (Value::FileWriter(a), Value::FileWriter(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => a.name == b.name,
            (Value::NativeMethod(a), Value::NativeMethod(b)) => a.name == b.name,
            (Value::NativeGetter(a), Value::NativeGetter(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// A user-defined function or procedure closed over its defining scope.
pub struct Routine {
    pub decl: Rc<RoutineDecl>,
    pub scope: Environment,
}

impl fmt::Debug for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routine")
            .field("name", &self.decl.name)
            .field("params", &self.decl.params)
            .finish()
    }
}

pub struct Class {
    pub decl: Rc<ClassDecl>,
    pub scope: Environment,
    pub parent: Option<Rc<Class>>,
}

impl Class {
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Finds a member declared directly on this class, ignoring the parent chain.
    pub fn own_member(&self, name: &str) -> Option<&ClassMember> {
        self.decl.members.iter().find(|member| member.name().as_ref() == name)
    }

}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.decl.name)
            .field("parent", &self.parent.as_ref().map(|parent| parent.name().to_string()))
            .finish()
    }
}

/// One layer of an object. Each class in the inheritance chain gets its own
/// layer holding that class's attributes and bound methods.
pub struct Instance {
    pub class: Rc<Class>,
    pub scope: Environment,
    pub super_instance: Option<Rc<Instance>>,
}

impl Instance {
    /// Finds the layer whose class declares `name`, starting from this one.
    pub fn layer_for(self: &Rc<Self>, name: &str) -> Option<(Rc<Instance>, Visibility)> {
        let mut layer = Some(Rc::clone(self));
        while let Some(current) = layer {
            if let Some(member) = current.class.own_member(name) {
                let visibility = member.visibility;
                return Some((current, visibility));
            }
            layer = current.super_instance.clone();
        }
        None
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("class", &self.class.name()).finish()
    }
}

#[derive(Debug, Clone)]
pub struct FileReader {
    pub path: String,
    pub lines: Vec<String>,
    pub current_line: usize,
    pub closed: bool,
}

impl FileReader {
    pub fn new(path: impl Into<String>, contents: &str) -> Self {
        let lines = if contents.is_empty() {
            Vec::new()
        } else {
            contents.split('\n').map(|line| line.trim_end_matches('\r').to_string()).collect()
        };
        Self { path: path.into(), lines, current_line: 0, closed: false }
    }
}

#[derive(Debug, Clone)]
pub struct FileWriter {
    pub path: String,
    pub lines: Vec<String>,
    pub closed: bool,
}

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub call: NativeFn,
}

#[derive(Clone, Copy)]
pub struct NativeMethod {
    pub name: &'static str,
    pub call: NativeMethodFn,
}

#[derive(Clone, Copy)]
pub struct NativeGetter {
    pub name: &'static str,
    pub call: NativeGetterFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeMethod({})", self.name)
    }
}

impl fmt::Debug for NativeGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeGetter({})", self.name)
    }
}
