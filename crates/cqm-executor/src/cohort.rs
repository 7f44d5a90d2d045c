//! Patient cohort normalization
//!
//! Callers may submit a single patient record or an ordered sequence of
//! records; both normalize to the same cohort shape. An empty sequence is a
//! valid, empty cohort rather than an error.

use crate::error::ExecutorError;
use cqm_eval::{PatientRecord, PatientSource};
use serde_json::Value;

/// An ordered batch of patient records for one executor invocation.
///
/// Constructed fresh per invocation and discarded afterwards.
#[derive(Debug, Clone, Default)]
pub struct PatientCohort {
    records: Vec<PatientRecord>,
}

impl PatientCohort {
    /// Normalize patient input: a single JSON object or an array of objects.
    ///
    /// Anything else (a scalar, or an array containing non-objects or
    /// records without an `id`) is [`ExecutorError::InvalidInput`].
    pub fn from_json(patient_data: &Value) -> Result<Self, ExecutorError> {
        match patient_data {
            Value::Object(_) => {
                let record = Self::record(patient_data, None)?;
                Ok(Self {
                    records: vec![record],
                })
            }
            Value::Array(items) => {
                let records = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| Self::record(item, Some(index)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self { records })
            }
            other => Err(ExecutorError::invalid_input(format!(
                "patient data must be an object or an array of objects, found {}",
                json_kind(other)
            ))),
        }
    }

    fn record(value: &Value, index: Option<usize>) -> Result<PatientRecord, ExecutorError> {
        PatientRecord::from_json(value).ok_or_else(|| {
            let place = index.map_or(String::new(), |i| format!(" at index {i}"));
            ExecutorError::invalid_input(format!(
                "patient record{place} must be an object with an 'id' field"
            ))
        })
    }

    /// Number of records in the cohort
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cohort is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Convert the cohort into the patient source the engine consumes.
    pub fn into_source(self) -> PatientSource {
        PatientSource::from_records(self.records)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_object_and_array_normalize_identically() {
        let single = PatientCohort::from_json(&json!({ "id": "1" })).unwrap();
        let array = PatientCohort::from_json(&json!([{ "id": "1" }])).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn empty_array_is_a_valid_empty_cohort() {
        let cohort = PatientCohort::from_json(&json!([])).unwrap();
        assert!(cohort.is_empty());
    }

    #[test]
    fn preserves_input_order() {
        let cohort =
            PatientCohort::from_json(&json!([{ "id": "b" }, { "id": "a" }, { "id": "c" }]))
                .unwrap();
        let ids: Vec<String> = cohort
            .clone()
            .into_source()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn rejects_scalars() {
        for bad in [json!("patient"), json!(42), json!(null), json!(true)] {
            let err = PatientCohort::from_json(&bad).unwrap_err();
            assert!(matches!(err, ExecutorError::InvalidInput { .. }));
        }
    }

    #[test]
    fn rejects_array_with_non_object_member() {
        let err = PatientCohort::from_json(&json!([{ "id": "1" }, "oops"])).unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_record_without_id() {
        let err = PatientCohort::from_json(&json!({ "name": "anonymous" })).unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidInput { .. }));
    }
}
