//! Errors raised while constructing a measure from ELM JSON

use thiserror::Error;

/// Errors detected when parsing an ELM document into a measure library.
///
/// All variants are construction-time failures: they are reported before any
/// evaluation work begins.
#[derive(Debug, Error)]
pub enum ElmError {
    /// The document has no `library` root object
    #[error("invalid measure: ELM document has no 'library' root")]
    MissingLibrary,

    /// `library.identifier.id` is absent or empty
    #[error("invalid measure: library identifier is missing or empty")]
    MissingIdentifier,

    /// `library.statements` is absent
    #[error("invalid measure: library has no statements collection")]
    MissingStatements,

    /// The document is not structurally valid ELM (unsupported node type,
    /// malformed field, or invalid JSON)
    #[error("invalid measure: {0}")]
    Parse(#[from] serde_json::Error),
}
