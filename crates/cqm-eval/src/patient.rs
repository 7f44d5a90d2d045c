//! Patient records and the patient source consumed by a measure execution

use serde_json::Value;

/// An opaque clinical record keyed by identifier, with a declared record kind.
///
/// The record is supplied fresh on every execution and never retained by the
/// engine. Its identifier addresses the result slot; it need not be globally
/// unique, but duplicates within one cohort overwrite each other's results.
#[derive(Debug, Clone)]
pub struct PatientRecord {
    id: String,
    record_type: Option<String>,
    data: Value,
}

impl PatientRecord {
    /// Build a record from a patient JSON object.
    ///
    /// Returns `None` unless the value is an object carrying an `id` field
    /// (string or number).
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = match obj.get("id")? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let record_type = obj
            .get("recordType")
            .or_else(|| obj.get("resourceType"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        Some(Self {
            id,
            record_type,
            data: value.clone(),
        })
    }

    /// The record identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The declared record kind, when present
    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    /// The full record JSON
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// A named attribute of the record
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// The record's clinical entries (`records` array), used by Retrieve.
    pub fn entries(&self) -> &[Value] {
        self.data
            .get("records")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }
}

/// An ordered batch of patient records for one execution.
#[derive(Debug, Clone, Default)]
pub struct PatientSource {
    records: Vec<PatientRecord>,
}

impl PatientSource {
    /// Build a source from an ordered sequence of records.
    pub fn from_records(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }

    /// Number of records in the source
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate the records in input order
    pub fn iter(&self) -> impl Iterator<Item = &PatientRecord> {
        self.records.iter()
    }
}
