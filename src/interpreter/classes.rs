//! Class declarations, instance construction and member access.
//!
//! An object is a chain of layers, one per class in its inheritance chain.
//! Each layer is a scope holding that class's attributes and its methods
//! bound to the layer, and its parent is the next layer up (or the scope the
//! base class was declared in). Method bodies therefore see their own
//! attributes, inherited attributes and globals through ordinary lookup.

use std::rc::Rc;

use super::environment::Environment;
use super::error::RuntimeError;
use super::evaluator::Interpreter;
use crate::ast::{ClassDecl, ClassMemberKind, RoutineKind, Visibility};
use crate::diagnostic::Span;
use crate::value::{Class, Instance, Routine, Value};

/// Name under which a sub-layer sees its super-instance.
pub const SUPER: &str = "super";
/// Name of the constructor method.
pub const CONSTRUCTOR: &str = "new";

/// Evaluates a class declaration: resolves the parent class and binds the
/// class value in `scope`.
pub fn declare_class(decl: &Rc<ClassDecl>, scope: &Environment) -> Result<Value, RuntimeError> {
    let parent = match &decl.parent {
        Some((name, span)) if *name == decl.name => {
            return Err(RuntimeError::invalid_operation_at(
                format!("class `{}` cannot inherit from itself", name),
                *span,
            ));
        }
        Some((name, span)) => match scope.lookup(name).map_err(|e| e.or_span(*span))? {
            Value::Class(class) => Some(class),
            other => {
                return Err(RuntimeError::type_error_at(
                    format!("class `{}` cannot inherit from `{}` of type {}", decl.name, name, other.type_name()),
                    *span,
                ));
            }
        },
        None => None,
    };

    let class = Value::Class(Rc::new(Class {
        decl: Rc::clone(decl),
        scope: scope.clone(),
        parent,
    }));
    scope.declare(&decl.name, class.clone()).map_err(|e| e.or_span(decl.span))?;
    Ok(class)
}

/// Builds the layer for `class` and, recursively, every layer above it.
/// Attributes start out as `null`; no constructor is run.
fn build_layers(class: &Rc<Class>) -> Result<Rc<Instance>, RuntimeError> {
    let super_instance = class.parent.as_ref().map(build_layers).transpose()?;
    let parent_scope = match &super_instance {
        Some(layer) => layer.scope.clone(),
        None => class.scope.clone(),
    };

    let scope = parent_scope.child();
    if let Some(layer) = &super_instance {
        scope.declare(SUPER, Value::Instance(Rc::clone(layer)))?;
    }
    for member in &class.decl.members {
        match &member.kind {
            ClassMemberKind::Attribute(name) => scope.declare(name, Value::Null)?,
            ClassMemberKind::Routine(decl) => {
                let routine = Rc::new(Routine { decl: Rc::clone(decl), scope: scope.clone() });
                let value = match decl.kind {
                    RoutineKind::Function => Value::Function(routine),
                    RoutineKind::Procedure => Value::Procedure(routine),
                };
                scope.declare(&decl.name, value)?;
            }
        }
    }

    Ok(Rc::new(Instance {
        class: Rc::clone(class),
        scope,
        super_instance,
    }))
}

impl Interpreter {
    /// `new Class(args)`: builds every layer, then runs the nearest `new`
    /// constructor against the layer that declares it.
    pub(super) fn instantiate(&mut self, class: &Rc<Class>, args: Vec<Value>, span: Span) -> Result<Value, RuntimeError> {
        let instance = build_layers(class).map_err(|e| e.or_span(span))?;

        match instance.layer_for(CONSTRUCTOR) {
            Some((layer, _)) => {
                let constructor = layer.scope.lookup(CONSTRUCTOR)?;
                match constructor {
                    Value::Function(routine) | Value::Procedure(routine) => {
                        self.call_routine(&routine, args, span)?;
                    }
                    other => {
                        return Err(RuntimeError::not_callable(other.type_name()).or_span(span));
                    }
                }
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::arity(class.name(), 0, args.len()).or_span(span));
            }
            None => {}
        }

        Ok(Value::Instance(instance))
    }
}

/// `object.name` from outside the class. Private members are never visible
/// this way; methods reach them through unqualified names instead.
pub fn get_member(instance: &Rc<Instance>, name: &str) -> Result<Value, RuntimeError> {
    match instance.layer_for(name) {
        Some((layer, Visibility::Private)) => Err(RuntimeError::private_member(name, layer.class.name())),
        Some((layer, Visibility::Public)) => layer.scope.lookup(name),
        None => Err(RuntimeError::invalid_operation(format!(
            "{} instance has no member `{}`",
            instance.class.name(),
            name
        ))),
    }
}

/// `object.name = value` from outside the class. Only public attributes can
/// be assigned; the store is shared by every alias of the object.
pub fn set_member(instance: &Rc<Instance>, name: &str, value: Value) -> Result<(), RuntimeError> {
    match instance.layer_for(name) {
        Some((layer, Visibility::Private)) => Err(RuntimeError::private_member(name, layer.class.name())),
        Some((layer, Visibility::Public)) => {
            let is_method = layer
                .class
                .own_member(name)
                .is_some_and(|member| matches!(member.kind, ClassMemberKind::Routine(_)));
            if is_method {
                return Err(RuntimeError::invalid_operation(format!(
                    "cannot assign to method `{}` of class {}",
                    name,
                    layer.class.name()
                )));
            }
            layer.scope.set_local(name, value);
            Ok(())
        }
        None => Err(RuntimeError::invalid_operation(format!(
            "{} instance has no attribute `{}`",
            instance.class.name(),
            name
        ))),
    }
}
