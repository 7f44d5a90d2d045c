//! Validated, immutable measure definition

use crate::error::ExecutorError;
use cqm_elm::{Library, parse_elm};
use serde_json::Value;
use std::sync::Arc;

/// An immutable, validated representation of a compiled measure.
///
/// Construction performs the fail-fast structural checks (identifier and
/// statements collection present); afterwards the definition is never
/// mutated and is shared read-only by every execution of the measure.
#[derive(Debug, Clone)]
pub struct MeasureDefinition {
    library: Arc<Library>,
}

impl MeasureDefinition {
    /// Build a measure definition from ELM JSON.
    pub fn from_elm(elm: &Value) -> Result<Self, ExecutorError> {
        let library = parse_elm(elm)?;
        Ok(Self {
            library: Arc::new(library),
        })
    }

    /// The measure identifier
    pub fn id(&self) -> &str {
        &self.library.identifier.id
    }

    /// The measure version, when declared
    pub fn version(&self) -> Option<&str> {
        self.library.identifier.version.as_deref()
    }

    /// Names of the public statements this measure reports, in library order.
    pub fn statement_names(&self) -> Vec<&str> {
        self.library
            .statement_defs()
            .iter()
            .filter(|def| def.is_public() && def.expression.is_some())
            .map(|def| def.name.as_str())
            .collect()
    }

    /// The underlying parsed library
    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }
}
