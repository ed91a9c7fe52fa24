//! Error taxonomy shared by the binding engine, the table compiler and the
//! dispatch proxies.

use crate::binder::value::TypeKind;

/// Errors raised while building parameters, compiling extension tables or
/// binding and invoking methods.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("Parameter {name} is required")]
    MissingRequired { name: String },

    #[error("Parameter {name} must be parseable as {expected}")]
    InvalidFormat { name: String, expected: &'static str },

    #[error("Cannot convert from {from} to {to}. Requested converter does not exist")]
    UnsupportedConversion { from: TypeKind, to: TypeKind },

    #[error("Cannot convert from {from} to {to}. Conversion failed with {cause}")]
    ConversionFailed {
        from: TypeKind,
        to: TypeKind,
        cause: String,
    },

    #[error("Parameter type {0} is not valid")]
    UnsupportedType(String),

    #[error("Parameter [{name}] found with non-nullable type. Use a nullable type or change to required")]
    NonNullableOptional { name: String },

    #[error("Injectable type {0} not known")]
    NotInjectable(String),

    #[error("Function {function} expects {expected} arguments but was called with {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{0} is not available in the execution context")]
    MissingContext(String),

    #[error("Supplied max parameter count {max_params} is smaller than real param count {bound}")]
    RowTooNarrow { bound: usize, max_params: usize },

    #[error("Invalid date pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Argument {index} is not a usable {expected}")]
    ArgumentType { index: usize, expected: &'static str },

    #[error("Unable to execute {method}: {message}")]
    MethodFailed { method: String, message: String },

    #[error("Method {0} cannot be both a script function and a script variable")]
    ConflictingTags(String),

    #[error("Script variable {0} cannot take caller supplied arguments")]
    VariableTakesArguments(String),

    #[error("Exposed name {0} is declared more than once")]
    DuplicateName(String),

    #[error("No script function or variable named {0}")]
    UnknownName(String),

    #[error("No method registered for token {0}")]
    UnknownMethodToken(String),

    #[error("Method [{0}] must have a return type of int or void to be a filter")]
    InvalidFilterSignature(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BindError {
    /// Shortcut used by method bodies to report a domain failure.
    pub fn method_failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        BindError::MethodFailed {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Value and validation problems, as opposed to configuration or
    /// environment problems.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            BindError::MissingRequired { .. }
                | BindError::InvalidFormat { .. }
                | BindError::UnsupportedConversion { .. }
                | BindError::ConversionFailed { .. }
                | BindError::ArgumentType { .. }
        )
    }
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
