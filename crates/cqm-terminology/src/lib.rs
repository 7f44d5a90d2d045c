//! Value-set catalog: immutable lookup from a value-set identifier (OID or
//! URL) to its code membership.
//!
//! The catalog is built once per measure binding and shared read-only across
//! all executions. An empty catalog is valid: measures without
//! terminology-dependent statements never consult it, and membership tests
//! against it simply return false.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A clinical code: the unit of value-set membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// Code value
    pub code: String,
    /// Code system URI/OID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Code system version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Display text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Code {
    /// Create a code with a system and no version/display.
    pub fn new(code: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            system: Some(system.into()),
            version: None,
            display: None,
        }
    }

    /// Membership comparison: code values must match, and when both sides
    /// declare a system the systems must match too. Versions are ignored.
    pub fn matches(&self, other: &Code) -> bool {
        if self.code != other.code {
            return false;
        }
        match (&self.system, &other.system) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// A value-set definition as it appears on the wire: either a flat code list
/// or the version-nested map used by cql-execution value-set JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ValueSetDefJson {
    Codes(Vec<Code>),
    Versioned(IndexMap<String, Vec<Code>>),
}

/// Errors raised while constructing a value-set catalog.
#[derive(Debug, Error)]
pub enum ValueSetError {
    /// The catalog document is not a JSON object keyed by value-set id
    #[error("invalid value sets: expected an object keyed by value-set id, found {found}")]
    NotAnObject { found: &'static str },

    /// A value-set definition has an unrecognized shape
    #[error("invalid value set '{id}': {source}")]
    InvalidDefinition {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable mapping from value-set id to code membership.
#[derive(Debug, Clone, Default)]
pub struct ValueSetCatalog {
    sets: IndexMap<String, Vec<Code>>,
}

impl ValueSetCatalog {
    /// An empty catalog. Every membership test returns false.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from value-set JSON keyed by OID/URL.
    ///
    /// Each definition may be a flat array of codes or a map from version to
    /// code array; versions are merged, since version-pinned membership is a
    /// terminology-server concern outside this layer.
    pub fn from_json(value: &Value) -> Result<Self, ValueSetError> {
        let map = value.as_object().ok_or(ValueSetError::NotAnObject {
            found: json_kind(value),
        })?;

        let mut sets = IndexMap::with_capacity(map.len());
        for (id, def) in map {
            let def: ValueSetDefJson = serde_json::from_value(def.clone()).map_err(|source| {
                ValueSetError::InvalidDefinition {
                    id: id.clone(),
                    source,
                }
            })?;
            let codes = match def {
                ValueSetDefJson::Codes(codes) => codes,
                ValueSetDefJson::Versioned(by_version) => {
                    by_version.into_values().flatten().collect()
                }
            };
            sets.insert(id.clone(), codes);
        }

        Ok(Self { sets })
    }

    /// Number of value sets in the catalog.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the catalog holds no value sets.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The codes of a value set, if it is present in the catalog.
    pub fn codes(&self, value_set_id: &str) -> Option<&[Code]> {
        self.sets.get(value_set_id).map(Vec::as_slice)
    }

    /// Test whether a code is a member of the identified value set.
    ///
    /// An unknown value-set id resolves no membership rather than failing:
    /// the catalog is a lookup table, not a validator.
    pub fn contains(&self, value_set_id: &str, code: &Code) -> bool {
        self.sets
            .get(value_set_id)
            .is_some_and(|codes| codes.iter().any(|c| c.matches(code)))
    }

    /// Iterate over the value-set ids in the catalog, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
