use std::rc::Rc;

use super::builtins;
use super::classes;
use super::control_flow::ControlFlow;
use super::environment::{Environment, store_element};
use super::error::{Error, RuntimeError};
use super::host::{Host, OutputEntry};
use super::prototype;
use super::value_utils::{binary_operation, unary_operation, values_equal};
use super::{InterpreterOptions, parse};
use crate::ast::{Expr, ExprKind, Program, RoutineKind, Stmt, SwitchCase};
use crate::diagnostic::Span;
use crate::value::{Routine, Value};

// Deep user recursion grows the host stack on demand instead of overflowing it.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Tree-walking evaluator. Globals persist across `run` calls, so a REPL can
/// feed one program after another into the same interpreter.
pub struct Interpreter {
    globals: Environment,
    host: Host,
    options: InterpreterOptions,
    depth: usize,
}

impl Interpreter {
    pub fn new(mut host: Host, options: InterpreterOptions) -> Self {
        if let Some(seed) = options.seed {
            host.reseed(seed);
        }
        let globals = Environment::new();
        builtins::register(&globals);
        Self { globals, host, options, depth: 0 }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    /// Runs a parsed program against the global scope and returns the value
    /// of the last statement executed.
    pub fn run(&mut self, program: &Program) -> Result<Value, Error> {
        self.depth = 0;
        let globals = self.globals.clone();
        match self.execute_block(&program.body, &globals)? {
            ControlFlow::Value(value) => Ok(value),
            ControlFlow::Return => Ok(Value::Null),
        }
    }

    /// Parses and runs `source`. A failure is also reported to the output
    /// sink as an error entry.
    pub fn execute(&mut self, source: &str) -> Result<Value, Error> {
        let result = parse(source).map_err(Error::from).and_then(|program| self.run(&program));
        if let Err(error) = &result {
            self.host.output.emit(OutputEntry::error(error.to_string()));
        }
        result
    }

    fn execute_block(&mut self, statements: &[Stmt], scope: &Environment) -> Result<ControlFlow, RuntimeError> {
        let mut last = Value::Null;
        for statement in statements {
            if let ControlFlow::Value(value) = self.execute_statement(statement, scope)? {
                last = value;
            }
            // set by `return` on every scope up to the function boundary
            if scope.is_terminated() {
                return Ok(ControlFlow::Return);
            }
        }
        Ok(ControlFlow::Value(last))
    }

    /// Runs a block in a fresh child scope. Statements such as `if` and loops
    /// produce `null`; only a `return` escapes.
    fn execute_nested(&mut self, statements: &[Stmt], scope: &Environment) -> Result<ControlFlow, RuntimeError> {
        match self.execute_block(statements, &scope.child())? {
            ControlFlow::Return => Ok(ControlFlow::Return),
            ControlFlow::Value(_) => Ok(ControlFlow::Value(Value::Null)),
        }
    }

    fn execute_statement(&mut self, statement: &Stmt, scope: &Environment) -> Result<ControlFlow, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.execute_statement_kind(statement, scope))
    }

    fn execute_statement_kind(&mut self, statement: &Stmt, scope: &Environment) -> Result<ControlFlow, RuntimeError> {
        match statement {
            Stmt::Let { name, value, span } => {
                let value = self.evaluate(value, scope)?;
                scope.declare(name, value.clone()).map_err(|e| e.or_span(*span))?;
                Ok(ControlFlow::Value(value))
            }
            Stmt::Array { name, dimensions, span } => {
                let mut sizes = Vec::with_capacity(dimensions.len());
                for dimension in dimensions {
                    match self.evaluate(dimension, scope)? {
                        Value::Integer(size) if size >= 0 => sizes.push(size as usize),
                        Value::Integer(size) => {
                            return Err(RuntimeError::invalid_operation_at(
                                format!("array dimensions cannot be negative, found {}", size),
                                dimension.span,
                            ));
                        }
                        other => {
                            return Err(RuntimeError::type_error_at(
                                format!("array dimensions must be integers, found {}", other.type_name()),
                                dimension.span,
                            ));
                        }
                    }
                }
                let array = make_array(&sizes);
                scope.declare(name, array.clone()).map_err(|e| e.or_span(*span))?;
                Ok(ControlFlow::Value(array))
            }
            Stmt::Routine(decl) => {
                let routine = Rc::new(Routine { decl: Rc::clone(decl), scope: scope.clone() });
                let value = match decl.kind {
                    RoutineKind::Function => Value::Function(routine),
                    RoutineKind::Procedure => Value::Procedure(routine),
                };
                scope.declare(&decl.name, value.clone()).map_err(|e| e.or_span(decl.span))?;
                Ok(ControlFlow::Value(value))
            }
            Stmt::Class(decl) => Ok(ControlFlow::Value(classes::declare_class(decl, scope)?)),
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition, scope)?.is_truthy() {
                    self.execute_nested(then_branch, scope)
                } else if let Some(else_branch) = else_branch {
                    self.execute_nested(else_branch, scope)
                } else {
                    Ok(ControlFlow::Value(Value::Null))
                }
            }
            Stmt::Switch { discriminant, cases } => self.execute_switch(discriminant, cases, scope),
            Stmt::For { var, start, end, body, span } => self.execute_for(var, start, end, body, *span, scope),
            Stmt::While { condition, body, span } => {
                let limit = self.options.max_while_iterations;
                let mut iterations = 0usize;
                while self.condition(condition, "while", scope)? {
                    iterations += 1;
                    if iterations > limit {
                        return Err(RuntimeError::loop_limit_at(limit, *span));
                    }
                    if let ControlFlow::Return = self.execute_nested(body, scope)? {
                        return Ok(ControlFlow::Return);
                    }
                }
                Ok(ControlFlow::Value(Value::Null))
            }
            Stmt::DoUntil { body, condition } => {
                loop {
                    if let ControlFlow::Return = self.execute_nested(body, scope)? {
                        return Ok(ControlFlow::Return);
                    }
                    if self.condition(condition, "do-until", scope)? {
                        break;
                    }
                }
                Ok(ControlFlow::Value(Value::Null))
            }
            Stmt::Return { value, span } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, scope)?,
                    None => Value::Null,
                };
                scope.signal_return(value).map_err(|e| e.or_span(*span))?;
                Ok(ControlFlow::Return)
            }
            Stmt::Expr(expr) => Ok(ControlFlow::Value(self.evaluate(expr, scope)?)),
        }
    }

    /// Loop conditions must be booleans; truthiness is only for `if`.
    fn condition(&mut self, condition: &Expr, construct: &str, scope: &Environment) -> Result<bool, RuntimeError> {
        match self.evaluate(condition, scope)? {
            Value::Boolean(value) => Ok(value),
            other => Err(RuntimeError::type_error_at(
                format!("{} condition must be a boolean, found {}", construct, other.type_name()),
                condition.span,
            )),
        }
    }

    fn execute_switch(
        &mut self,
        discriminant: &Expr,
        cases: &[SwitchCase],
        scope: &Environment,
    ) -> Result<ControlFlow, RuntimeError> {
        let subject = self.evaluate(discriminant, scope)?;
        for case in cases {
            let matched = match &case.test {
                Some(test) => values_equal(&subject, &self.evaluate(test, scope)?),
                None => true,
            };
            if matched {
                return self.execute_nested(&case.body, scope);
            }
        }
        Ok(ControlFlow::Value(Value::Null))
    }

    /// `for i = start to end`: inclusive of `end`. The variable lives in a loop
    /// scope and the body may reassign it; the next value is read back from it.
    fn execute_for(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        body: &[Stmt],
        span: Span,
        scope: &Environment,
    ) -> Result<ControlFlow, RuntimeError> {
        let start = self.loop_bound(start, scope)?;
        let end = self.loop_bound(end, scope)?;

        let loop_scope = scope.child();
        loop_scope.declare(var, Value::Integer(start))?;
        while loop_variable(&loop_scope, var, span)? <= end {
            if let ControlFlow::Return = self.execute_nested(body, &loop_scope)? {
                return Ok(ControlFlow::Return);
            }
            match loop_variable(&loop_scope, var, span)?.checked_add(1) {
                Some(next) => loop_scope.set_local(var, Value::Integer(next)),
                None => break,
            }
        }
        Ok(ControlFlow::Value(Value::Null))
    }

    fn loop_bound(&mut self, bound: &Expr, scope: &Environment) -> Result<i64, RuntimeError> {
        let value = self.evaluate(bound, scope)?;
        value.as_integer().ok_or_else(|| {
            RuntimeError::type_error_at(
                format!("for loop bounds must be integers, found {}", value.type_name()),
                bound.span,
            )
        })
    }

    pub fn evaluate(&mut self, expr: &Expr, scope: &Environment) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.evaluate_kind(expr, scope).map_err(|e| e.or_span(expr.span))
        })
    }

    fn evaluate_kind(&mut self, expr: &Expr, scope: &Environment) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Identifier(name) => scope.lookup(name),
            ExprKind::Integer(value) => Ok(Value::Integer(*value)),
            ExprKind::Float(value) => Ok(Value::Float(*value)),
            ExprKind::String(value) => Ok(Value::String(Rc::clone(value))),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Assignment { target, value } => {
                let value = self.evaluate(value, scope)?;
                self.assign(target, value.clone(), scope)?;
                Ok(value)
            }
            ExprKind::Binary { left, op, right } => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                binary_operation(*op, &left, &right)
            }
            ExprKind::Unary { op, expr } => {
                let value = self.evaluate(expr, scope)?;
                unary_operation(*op, &value)
            }
            ExprKind::Range { start, end } => {
                let start_value = self.evaluate(start, scope)?;
                let end_value = self.evaluate(end, scope)?;
                match (&start_value, &end_value) {
                    (Value::Integer(from), Value::Integer(to)) => Ok(Value::Range(*from, *to)),
                    _ => Err(RuntimeError::type_error(format!(
                        "range bounds must be integers, found {} and {}",
                        start_value.type_name(),
                        end_value.type_name()
                    ))),
                }
            }
            ExprKind::FieldAccess { object, field } => {
                let object = self.evaluate(object, scope)?;
                member(&object, field)
            }
            ExprKind::Index { object, index } => {
                let object = self.evaluate(object, scope)?;
                let index = self.evaluate(index, scope)?;
                index_value(&object, &index)
            }
            ExprKind::Call { callee, args } => self.evaluate_call(callee, args, expr.span, scope),
            ExprKind::New { class, args } => {
                let args = self.evaluate_args(args, scope)?;
                match self.evaluate(class, scope)? {
                    Value::Class(class) => self.instantiate(&class, args, expr.span),
                    other => Err(RuntimeError::type_error(format!(
                        "`new` requires a class, found {}",
                        other.type_name()
                    ))),
                }
            }
        }
    }

    fn evaluate_args(&mut self, args: &[Expr], scope: &Environment) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate(arg, scope)).collect()
    }

    fn assign(&mut self, target: &Expr, value: Value, scope: &Environment) -> Result<(), RuntimeError> {
        match &target.kind {
            ExprKind::Identifier(name) => {
                scope.assign(name, value);
                Ok(())
            }
            ExprKind::FieldAccess { object, field } => match self.evaluate(object, scope)? {
                Value::Instance(instance) => classes::set_member(&instance, field, value),
                other => Err(RuntimeError::invalid_operation(format!(
                    "cannot assign to member `{}` of {}",
                    field,
                    other.type_name()
                ))),
            },
            ExprKind::Index { object, index } => {
                let index = self.evaluate(index, scope)?;
                if let (ExprKind::Identifier(name), Value::Integer(i)) = (&object.kind, &index) {
                    return scope.assign_indexed(name, *i, value);
                }
                let container = self.evaluate(object, scope)?;
                match (&container, &index) {
                    (Value::Array(items), Value::Integer(i)) => store_element(items, *i, value),
                    (Value::Array(_), other) => Err(RuntimeError::type_error(format!(
                        "array elements can only be assigned through an integer index, found {}",
                        other.type_name()
                    ))),
                    (Value::String(_), _) => {
                        Err(RuntimeError::invalid_operation("strings cannot be modified in place"))
                    }
                    (other, _) => Err(RuntimeError::type_error(format!(
                        "cannot index into {}",
                        other.type_name()
                    ))),
                }
            }
            _ => Err(RuntimeError::invalid_operation("invalid assignment target")),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, args: &[Expr], span: Span, scope: &Environment) -> Result<Value, RuntimeError> {
        let args = self.evaluate_args(args, scope)?;
        let (function, receiver) = match &callee.kind {
            ExprKind::Identifier(_) | ExprKind::Index { .. } => (self.evaluate(callee, scope)?, None),
            // The receiver is evaluated once and handed to native methods.
            ExprKind::FieldAccess { object, field } => {
                let receiver = self.evaluate(object, scope)?;
                let function = member(&receiver, field).map_err(|e| e.or_span(callee.span))?;
                (function, Some(receiver))
            }
            _ => {
                return Err(RuntimeError::invalid_operation_at(
                    "only names and members can be called",
                    callee.span,
                ));
            }
        };

        match function {
            Value::NativeFunction(native) => (native.call)(&args, scope, &mut self.host),
            Value::NativeMethod(method) => match receiver {
                Some(receiver) => (method.call)(&receiver, &args, scope, &mut self.host),
                None => Err(RuntimeError::invalid_operation(format!(
                    "method `{}` must be called on a value",
                    method.name
                ))),
            },
            Value::Function(routine) | Value::Procedure(routine) => self.call_routine(&routine, args, span),
            other => Err(RuntimeError::not_callable(other.type_name())),
        }
    }

    /// Calls a user routine in a new function scope under its defining scope.
    /// Procedures always yield `null`.
    pub(super) fn call_routine(&mut self, routine: &Routine, args: Vec<Value>, span: Span) -> Result<Value, RuntimeError> {
        let decl = &routine.decl;
        if args.len() != decl.params.len() {
            return Err(RuntimeError::arity(decl.name.as_ref(), decl.params.len(), args.len()).or_span(span));
        }
        if self.depth >= self.options.max_call_depth {
            return Err(RuntimeError::invalid_operation_at(
                format!("maximum call depth of {} exceeded in `{}`", self.options.max_call_depth, decl.name),
                span,
            ));
        }

        let call_scope = routine.scope.function_scope();
        for (param, arg) in decl.params.iter().zip(args) {
            call_scope.declare(param, arg)?;
        }

        self.depth += 1;
        let outcome = self.execute_block(&decl.body, &call_scope);
        self.depth -= 1;
        outcome?;

        let result = call_scope.take_return_value().unwrap_or(Value::Null);
        Ok(match decl.kind {
            RoutineKind::Function => result,
            RoutineKind::Procedure => Value::Null,
        })
    }
}

fn loop_variable(loop_scope: &Environment, var: &str, span: Span) -> Result<i64, RuntimeError> {
    match loop_scope.lookup(var)? {
        Value::Integer(current) => Ok(current),
        other => Err(RuntimeError::type_error_at(
            format!("for loop variable `{}` must stay an integer, found {}", var, other.type_name()),
            span,
        )),
    }
}

/// `object.name`: instance members first, then the prototype of the value's type.
fn member(object: &Value, name: &str) -> Result<Value, RuntimeError> {
    match object {
        Value::Instance(instance) => classes::get_member(instance, name),
        Value::Class(class) => Err(RuntimeError::invalid_operation(format!(
            "class {} has no member `{}`; create an instance with `new`",
            class.name(),
            name
        ))),
        _ => prototype::member(object, name),
    }
}

/// `object[index]` for arrays and strings. A range index `[a to b]` returns
/// a copy of the half-open slice.
fn index_value(object: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (object, index) {
        (Value::Array(items), Value::Integer(i)) => {
            let items = items.borrow();
            usize::try_from(*i)
                .ok()
                .and_then(|position| items.get(position))
                .cloned()
                .ok_or_else(|| RuntimeError::index_out_of_bounds(*i, items.len()))
        }
        (Value::String(text), Value::Integer(i)) => {
            let length = text.chars().count();
            usize::try_from(*i)
                .ok()
                .and_then(|position| text.chars().nth(position))
                .map(|c| Value::string(c.to_string()))
                .ok_or_else(|| RuntimeError::index_out_of_bounds(*i, length))
        }
        (Value::Array(items), Value::Range(start, end)) => {
            let items = items.borrow();
            let (from, to) = slice_bounds(*start, *end, items.len())?;
            Ok(Value::array(items[from..to].to_vec()))
        }
        (Value::String(text), Value::Range(start, end)) => {
            let (from, to) = slice_bounds(*start, *end, text.chars().count())?;
            Ok(Value::string(text.chars().skip(from).take(to - from).collect::<String>()))
        }
        (Value::Array(_) | Value::String(_), other) => Err(RuntimeError::type_error(format!(
            "only integers and ranges can index into {}, found {}",
            object.type_name(),
            other.type_name()
        ))),
        (other, _) => Err(RuntimeError::type_error(format!("cannot index into {}", other.type_name()))),
    }
}

fn slice_bounds(start: i64, end: i64, length: usize) -> Result<(usize, usize), RuntimeError> {
    let from = usize::try_from(start).map_err(|_| RuntimeError::index_out_of_bounds(start, length))?;
    let to = usize::try_from(end)
        .ok()
        .filter(|to| *to <= length)
        .ok_or_else(|| RuntimeError::index_out_of_bounds(end, length))?;
    if from > to {
        return Err(RuntimeError::invalid_operation(format!(
            "slice start {} is after its end {}",
            start, end
        )));
    }
    Ok((from, to))
}

/// A rectangular array of `null`s; nested dimensions get separate storage.
fn make_array(sizes: &[usize]) -> Value {
    match sizes.split_first() {
        Some((&size, rest)) => Value::array((0..size).map(|_| make_array(rest)).collect()),
        None => Value::Null,
    }
}
