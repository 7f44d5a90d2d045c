//! Executor error taxonomy
//!
//! Construction errors (invalid measure, invalid value sets, invalid patient
//! input) are detected synchronously, before any evaluation work begins.
//! Evaluation errors propagate from the engine and abort the whole
//! invocation; this layer performs no retries and returns no partial results.

use cqm_elm::ElmError;
use cqm_eval::EvalError;
use cqm_terminology::ValueSetError;
use thiserror::Error;

/// Errors surfaced by measure execution.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Malformed or incomplete ELM, detected at construction
    #[error(transparent)]
    InvalidMeasure(#[from] ElmError),

    /// Malformed value-set catalog, detected at construction
    #[error(transparent)]
    InvalidValueSet(#[from] ValueSetError),

    /// Patient data neither an object nor a sequence of objects
    #[error("invalid patient input: {message}")]
    InvalidInput { message: String },

    /// Raised by the evaluation engine during execution
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
}

impl ExecutorError {
    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
