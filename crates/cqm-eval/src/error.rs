//! Evaluation errors for the measure engine

use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur during measure evaluation.
///
/// Any of these aborts the invocation that raised it: the engine performs no
/// retries and returns no partial results.
#[derive(Debug, Error, Clone)]
pub enum EvalError {
    /// Type mismatch error
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Invalid operand error
    #[error("Invalid operand for {operator}: {message}")]
    InvalidOperand { operator: String, message: String },

    /// Arithmetic overflow
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },

    /// Undefined expression reference
    #[error("Undefined expression: {name}")]
    UndefinedExpression { name: String },

    /// Undefined parameter
    #[error("Undefined parameter: {name}")]
    UndefinedParameter { name: String },

    /// Undefined value set reference
    #[error("Undefined value set: {name}")]
    UndefinedValueSet { name: String },

    /// Invalid property access
    #[error("Invalid property '{property}' on type {type_name}")]
    InvalidProperty { property: String, type_name: String },

    /// Conversion error
    #[error("Cannot convert '{value}' to {to_type}")]
    ConversionError { value: String, to_type: String },

    /// Unsupported expression type
    #[error("Unsupported expression type: {expr_type}")]
    UnsupportedExpression { expr_type: String },

    /// Unsupported operator for the given operand types
    #[error("Unsupported operator: {operator} for types {types}")]
    UnsupportedOperator { operator: String, types: String },

    /// Maximum recursion depth exceeded
    #[error("Maximum recursion depth exceeded")]
    RecursionLimit,

    /// Internal error (should not happen)
    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid operand error
    pub fn invalid_operand(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperand {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create an undefined expression error
    pub fn undefined_expression(name: impl Into<String>) -> Self {
        Self::UndefinedExpression { name: name.into() }
    }

    /// Create an undefined parameter error
    pub fn undefined_parameter(name: impl Into<String>) -> Self {
        Self::UndefinedParameter { name: name.into() }
    }

    /// Create an undefined value set error
    pub fn undefined_value_set(name: impl Into<String>) -> Self {
        Self::UndefinedValueSet { name: name.into() }
    }

    /// Create an invalid property error
    pub fn invalid_property(property: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::InvalidProperty {
            property: property.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion_error(value: impl Into<String>, to_type: impl Into<String>) -> Self {
        Self::ConversionError {
            value: value.into(),
            to_type: to_type.into(),
        }
    }

    /// Create an unsupported expression error
    pub fn unsupported_expression(expr_type: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            expr_type: expr_type.into(),
        }
    }

    /// Create an unsupported operator error
    pub fn unsupported_operator(operator: impl Into<String>, types: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            types: types.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
