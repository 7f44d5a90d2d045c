//! ELM (Expression Logical Model) structures for compiled clinical quality
//! measures.
//!
//! A measure arrives as ELM JSON: a `library` root carrying an identifier,
//! terminology definitions, and a collection of named statements. This crate
//! models the subset of ELM the evaluation engine executes and performs the
//! structural validation that must happen before any patient is touched.

pub mod error;
pub mod model;

pub use error::ElmError;
pub use model::{
    AccessModifier, BinaryExpression, Element, Expression, ExpressionDef, ExpressionRef,
    FirstLastExpression, IfExpression, InValueSetExpression, Library, ListExpression, Literal,
    NaryExpression, NullLiteral, ParameterDef, ParameterRef, Property, Retrieve, Statements,
    UnaryExpression, ValueSetDef, ValueSetRef, VersionedIdentifier,
};

use serde_json::Value;

/// Parse and validate an ELM JSON document into a [`Library`].
///
/// The structural checks run before deserialization so that a malformed
/// measure fails deterministically with a typed error and no evaluation
/// machinery is ever constructed:
///
/// - the document must have a `library` root object
/// - `library.identifier.id` must be present and non-empty
/// - `library.statements` must be present (zero statement defs is valid)
///
/// Anything deeper (an unsupported expression node, a malformed literal) is
/// reported as [`ElmError::Parse`].
pub fn parse_elm(value: &Value) -> Result<Library, ElmError> {
    let lib = value
        .get("library")
        .filter(|v| v.is_object())
        .ok_or(ElmError::MissingLibrary)?;

    let id = lib
        .pointer("/identifier/id")
        .and_then(Value::as_str)
        .unwrap_or("");
    if id.is_empty() {
        return Err(ElmError::MissingIdentifier);
    }

    if lib.get("statements").is_none() {
        return Err(ElmError::MissingStatements);
    }

    Ok(serde_json::from_value(lib.clone())?)
}

/// Parse an ELM document from JSON text. See [`parse_elm`].
pub fn parse_elm_str(text: &str) -> Result<Library, ElmError> {
    let value: Value = serde_json::from_str(text)?;
    parse_elm(&value)
}
