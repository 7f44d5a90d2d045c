//! Runtime values produced by measure evaluation

use chrono::NaiveDate;
use cqm_terminology::Code;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value as JsonValue, json};

/// A CQL runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i32),
    /// Long value
    Long(i64),
    /// Decimal value
    Decimal(Decimal),
    /// String value
    String(String),
    /// Date value
    Date(NaiveDate),
    /// Clinical code
    Code(Code),
    /// List of values
    List(Vec<CqlValue>),
    /// Clinical record (opaque JSON, e.g. a patient record entry)
    Resource(JsonValue),
}

impl CqlValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Boolean view: `Some(b)` for Boolean, `None` for Null. Any other type
    /// is not a valid boolean operand.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Long(_) => "Long",
            Self::Decimal(_) => "Decimal",
            Self::String(_) => "String",
            Self::Date(_) => "Date",
            Self::Code(_) => "Code",
            Self::List(_) => "List",
            Self::Resource(_) => "Resource",
        }
    }

    /// Convert a JSON value into a runtime value.
    ///
    /// Numbers become Integer when they fit in i32, Long for larger integers,
    /// Decimal otherwise; objects stay opaque as [`CqlValue::Resource`].
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if let Ok(small) = i32::try_from(i) {
                        Self::Integer(small)
                    } else {
                        Self::Long(i)
                    }
                } else {
                    n.as_f64()
                        .and_then(Decimal::from_f64_retain)
                        .map_or(Self::Null, Self::Decimal)
                }
            }
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(_) => Self::Resource(value.clone()),
        }
    }

    /// Convert a runtime value to JSON for the execution result map.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Integer(i) => JsonValue::Number((*i).into()),
            Self::Long(l) => JsonValue::Number((*l).into()),
            Self::Decimal(d) => d
                .to_f64()
                .and_then(Number::from_f64)
                .map_or(JsonValue::Null, JsonValue::Number),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            Self::Code(c) => json!({
                "code": c.code,
                "system": c.system,
                "version": c.version,
                "display": c.display,
            }),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Resource(v) => v.clone(),
        }
    }
}
