use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// The four failure classes of the front-end.
///
/// Parse and scope errors abort the pass that raised them. Type errors abort inference
/// but are accumulated by the checker. Unresolved types are raised once unification
/// has run and a declaration still carries a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Scope,
    Type,
    UnresolvedType,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    /// Creates an error that is not tied to a source location.
    pub fn detached(error_impl: ErrorImpl) -> Self {
        Error::new(error_impl, Position::null())
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::ExpectedToken { .. }
            | ErrorImpl::UnexpectedEndOfInput { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorCategory::Parse,
            ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::BuiltinRedefinition { .. }
            | ErrorImpl::ModuleNotFound { .. } => ErrorCategory::Scope,
            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::OperatorTypeError { .. }
            | ErrorImpl::UnknownType { .. }
            | ErrorImpl::ExpectedExplicitValue { .. }
            | ErrorImpl::ArgumentTypeMatchError { .. }
            | ErrorImpl::UnexpectedArguments { .. }
            | ErrorImpl::MissingArguments { .. }
            | ErrorImpl::NotCallable { .. }
            | ErrorImpl::NotAssignable { .. }
            | ErrorImpl::ImmutableAssignment { .. }
            | ErrorImpl::InvalidMemberAccess { .. }
            | ErrorImpl::ReturnTypeConflict { .. } => ErrorCategory::Type,
            ErrorImpl::UnresolvedType { .. } => ErrorCategory::UnresolvedType,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::ExpectedToken { .. } => "ExpectedToken",
            ErrorImpl::UnexpectedEndOfInput { .. } => "UnexpectedEndOfInput",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::BuiltinRedefinition { .. } => "BuiltinRedefinition",
            ErrorImpl::ModuleNotFound { .. } => "ModuleNotFound",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::OperatorTypeError { .. } => "OperatorTypeError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::ExpectedExplicitValue { .. } => "ExpectedExplicitValue",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotAssignable { .. } => "NotAssignable",
            ErrorImpl::ImmutableAssignment { .. } => "ImmutableAssignment",
            ErrorImpl::InvalidMemberAccess { .. } => "InvalidMemberAccess",
            ErrorImpl::ReturnTypeConflict { .. } => "ReturnTypeConflict",
            ErrorImpl::UnresolvedType { .. } => "UnresolvedType",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::ExpectedToken { expected, received } => {
                ErrorTip::Suggestion(format!("Expected {}, got `{}`", expected, received))
            }
            ErrorImpl::UnexpectedEndOfInput { expected } => ErrorTip::Suggestion(format!(
                "Reached end of input while looking for {}",
                expected
            )),
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::VariableAlreadyDeclared { variable } => {
                ErrorTip::Suggestion(format!("`{}` is already declared in this scope", variable))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("`{}` is not declared", variable))
            }
            ErrorImpl::BuiltinRedefinition { name } => {
                ErrorTip::Suggestion(format!("`{}` is a builtin type and cannot be redefined", name))
            }
            ErrorImpl::ModuleNotFound { path } => {
                ErrorTip::Suggestion(format!("No module found at `{}`", path))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::OperatorTypeError { operator, left, right } => match right {
                Some(right) => ErrorTip::Suggestion(format!(
                    "Operator `{}` cannot be applied to `{}` and `{}`",
                    operator, left, right
                )),
                None => ErrorTip::Suggestion(format!(
                    "Operator `{}` cannot be applied to `{}`",
                    operator, left
                )),
            },
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::ExpectedExplicitValue { variable } => ErrorTip::Suggestion(format!(
                "`{}` needs a type annotation or an initial value",
                variable
            )),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::UnexpectedArguments { expected, received }
            | ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::NotCallable { name } => {
                ErrorTip::Suggestion(format!("`{}` is not a function", name))
            }
            ErrorImpl::NotAssignable { operator } => ErrorTip::Suggestion(format!(
                "Operator `{}` needs a variable as its operand",
                operator
            )),
            ErrorImpl::ImmutableAssignment { variable } => ErrorTip::Suggestion(format!(
                "`{}` is declared with `const` and cannot be modified",
                variable
            )),
            ErrorImpl::InvalidMemberAccess { property } => ErrorTip::Suggestion(format!(
                "`.{}` can only follow a module namespace",
                property
            )),
            ErrorImpl::ReturnTypeConflict { function, first, second } => {
                ErrorTip::Suggestion(format!(
                    "`{}` returns both `{}` and `{}`, add a return type annotation",
                    function, first, second
                ))
            }
            ErrorImpl::UnresolvedType { name } => ErrorTip::Suggestion(format!(
                "The type of `{}` could not be inferred, add a type annotation",
                name
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

fn describe_rhs(right: &Option<String>) -> String {
    match right {
        Some(right) => format!(" and {}", right),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("expected {expected}, got {received:?}")]
    ExpectedToken { expected: String, received: String },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("{variable:?} already declared in this scope")]
    VariableAlreadyDeclared { variable: String },
    #[error("undefined symbol {variable:?}")]
    VariableNotDeclared { variable: String },
    #[error("builtin type {name:?} cannot be redefined")]
    BuiltinRedefinition { name: String },
    #[error("module {path:?} not found")]
    ModuleNotFound { path: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("operator {operator} cannot be applied to {left}{}", describe_rhs(.right))]
    OperatorTypeError {
        operator: String,
        left: String,
        right: Option<String>,
    },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("expected type annotation or initializer for {variable:?}")]
    ExpectedExplicitValue { variable: String },
    #[error("argument types do not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("unexpected arguments: expected {expected}, received {received}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected}, received {received}")]
    MissingArguments { expected: usize, received: usize },
    #[error("{name:?} is not callable")]
    NotCallable { name: String },
    #[error("operand of {operator} is not assignable")]
    NotAssignable { operator: String },
    #[error("cannot modify constant {variable:?}")]
    ImmutableAssignment { variable: String },
    #[error("invalid member access .{property}")]
    InvalidMemberAccess { property: String },
    #[error("function {function:?} returns both {first} and {second}")]
    ReturnTypeConflict {
        function: String,
        first: String,
        second: String,
    },
    #[error("type of {name:?} is unresolved after unification")]
    UnresolvedType { name: String },
}
