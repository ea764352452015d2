use std::fmt;

use crate::diagnostic::{Diagnostic, Label, Span};

/// A lexing or parsing failure. `line` and `column` are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub secondary: Option<(Span, String)>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            span,
            line,
            column,
            secondary: None,
        }
    }

    /// Points at a second location, e.g. the loop header a `next` fails to match.
    pub fn with_secondary(mut self, span: Span, message: impl Into<String>) -> Self {
        self.secondary = Some((span, message.into()));
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::syntax(self.message.clone())
            .with_code("E0101")
            .with_label(Label::primary(self.span, ""));
        if let Some((span, message)) = &self.secondary {
            diag = diag.with_label(Label::secondary(*span, message.clone()));
        }
        diag
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.column)
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UndefinedVariable { name: String, span: Span },
    Redeclaration { name: String, span: Span },
    TypeError { message: String, span: Span },
    IndexOutOfBounds { index: i64, length: usize, span: Span },
    DivisionByZero { span: Span },
    Arity { name: String, expected: usize, found: usize, span: Span },
    PrivateMember { member: String, class: String, span: Span },
    LoopLimit { limit: usize, span: Span },
    NotCallable { type_name: String, span: Span },
    ReturnOutsideFunction { span: Span },
    InvalidOperation { message: String, span: Span },
}

impl RuntimeError {
    // Built-ins raise errors without a location; the evaluator fills in the call site.
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable { name: name.into(), span: Span::dummy() }
    }

    pub fn redeclaration(name: impl Into<String>) -> Self {
        Self::Redeclaration { name: name.into(), span: Span::dummy() }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError { message: message.into(), span: Span::dummy() }
    }

    pub fn index_out_of_bounds(index: i64, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length, span: Span::dummy() }
    }

    pub fn division_by_zero() -> Self {
        Self::DivisionByZero { span: Span::dummy() }
    }

    pub fn arity(name: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::Arity { name: name.into(), expected, found, span: Span::dummy() }
    }

    pub fn private_member(member: impl Into<String>, class: impl Into<String>) -> Self {
        Self::PrivateMember { member: member.into(), class: class.into(), span: Span::dummy() }
    }

    pub fn not_callable(type_name: impl Into<String>) -> Self {
        Self::NotCallable { type_name: type_name.into(), span: Span::dummy() }
    }

    pub fn return_outside_function() -> Self {
        Self::ReturnOutsideFunction { span: Span::dummy() }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation { message: message.into(), span: Span::dummy() }
    }

    pub fn type_error_at(message: impl Into<String>, span: Span) -> Self {
        Self::TypeError { message: message.into(), span }
    }

    pub fn loop_limit_at(limit: usize, span: Span) -> Self {
        Self::LoopLimit { limit, span }
    }

    pub fn invalid_operation_at(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidOperation { message: message.into(), span }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::Redeclaration { span, .. }
            | Self::TypeError { span, .. }
            | Self::IndexOutOfBounds { span, .. }
            | Self::DivisionByZero { span }
            | Self::Arity { span, .. }
            | Self::PrivateMember { span, .. }
            | Self::LoopLimit { span, .. }
            | Self::NotCallable { span, .. }
            | Self::ReturnOutsideFunction { span }
            | Self::InvalidOperation { span, .. } => *span,
        }
    }

    /// Attaches `span` unless the error already points somewhere more precise.
    pub fn or_span(mut self, at: Span) -> Self {
        if self.span().is_dummy() {
            match &mut self {
                Self::UndefinedVariable { span, .. }
                | Self::Redeclaration { span, .. }
                | Self::TypeError { span, .. }
                | Self::IndexOutOfBounds { span, .. }
                | Self::DivisionByZero { span }
                | Self::Arity { span, .. }
                | Self::PrivateMember { span, .. }
                | Self::LoopLimit { span, .. }
                | Self::NotCallable { span, .. }
                | Self::ReturnOutsideFunction { span }
                | Self::InvalidOperation { span, .. } => *span = at,
            }
        }
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UndefinedVariable { name, span } => Diagnostic::runtime(format!("undefined variable `{}`", name))
                .with_code("E0201")
                .with_label(Label::primary(*span, "not found in this scope")),
            Self::Redeclaration { name, span } => Diagnostic::runtime(format!("`{}` is already declared in this scope", name))
                .with_code("E0202")
                .with_label(Label::primary(*span, "redeclared here"))
                .with_help("assign to it with `=` instead of declaring it again"),
            Self::TypeError { message, span } => Diagnostic::runtime(format!("type error: {}", message))
                .with_code("E0203")
                .with_label(Label::primary(*span, "")),
            Self::IndexOutOfBounds { index, length, span } => {
                Diagnostic::runtime(format!("index out of bounds: index is {} but length is {}", index, length))
                    .with_code("E0204")
                    .with_label(Label::primary(*span, format!("index {} is out of bounds", index)))
            }
            Self::DivisionByZero { span } => Diagnostic::runtime("division by zero")
                .with_code("E0205")
                .with_label(Label::primary(*span, "division by zero here")),
            Self::Arity { name, expected, found, span } => Diagnostic::runtime(format!(
                "`{}` takes {} argument{} but {} {} supplied",
                name,
                expected,
                if *expected == 1 { "" } else { "s" },
                found,
                if *found == 1 { "was" } else { "were" }
            ))
            .with_code("E0206")
            .with_label(Label::primary(*span, "")),
            Self::PrivateMember { member, class, span } => {
                Diagnostic::runtime(format!("`{}` is a private member of class `{}`", member, class))
                    .with_code("E0207")
                    .with_label(Label::primary(*span, "private member accessed here"))
                    .with_help("private members are only reachable from inside the class's own methods")
            }
            Self::LoopLimit { limit, span } => {
                Diagnostic::runtime(format!("while loop exceeded the limit of {} iterations", limit))
                    .with_code("E0208")
                    .with_label(Label::primary(*span, "this loop never stopped"))
            }
            Self::NotCallable { type_name, span } => Diagnostic::runtime(format!("value of type {} is not callable", type_name))
                .with_code("E0209")
                .with_label(Label::primary(*span, "")),
            Self::ReturnOutsideFunction { span } => Diagnostic::runtime("return outside function")
                .with_code("E0210")
                .with_label(Label::primary(*span, "")),
            Self::InvalidOperation { message, span } => Diagnostic::runtime(message.clone())
                .with_code("E0211")
                .with_label(Label::primary(*span, "")),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UndefinedVariable { name, .. } => write!(f, "Undefined variable: {}", name),
            RuntimeError::Redeclaration { name, .. } => {
                write!(f, "Cannot declare variable {} as it already exists in this scope", name)
            }
            RuntimeError::TypeError { message, .. } => write!(f, "Type error: {}", message),
            RuntimeError::IndexOutOfBounds { index, length, .. } => {
                write!(f, "Index out of bounds: {} (length: {})", index, length)
            }
            RuntimeError::DivisionByZero { .. } => write!(f, "Division by zero"),
            RuntimeError::Arity { name, expected, found, .. } => {
                write!(f, "{} expects {} argument(s) but got {}", name, expected, found)
            }
            RuntimeError::PrivateMember { member, class, .. } => {
                write!(f, "Cannot access private member {} of class {}", member, class)
            }
            RuntimeError::LoopLimit { limit, .. } => {
                write!(f, "While loop exceeded {} iterations", limit)
            }
            RuntimeError::NotCallable { type_name, .. } => write!(f, "Value of type {} is not callable", type_name),
            RuntimeError::ReturnOutsideFunction { .. } => write!(f, "Return outside function"),
            RuntimeError::InvalidOperation { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Anything that can abort a program run.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Syntax(SyntaxError),
    Runtime(RuntimeError),
}

impl Error {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Syntax(error) => error.to_diagnostic(),
            Error::Runtime(error) => error.to_diagnostic(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Error::Syntax(error) => error.span,
            Error::Runtime(error) => error.span(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }
}

impl From<SyntaxError> for Error {
    fn from(error: SyntaxError) -> Self {
        Error::Syntax(error)
    }
}

impl From<RuntimeError> for Error {
    fn from(error: RuntimeError) -> Self {
        Error::Runtime(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(error) => write!(f, "Syntax Error: {}", error),
            Error::Runtime(error) => write!(f, "Runtime Error: {}", error),
        }
    }
}

impl std::error::Error for Error {}
