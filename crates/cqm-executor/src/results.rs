//! Execution result aggregation

use cqm_eval::CqlValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-patient, per-statement evaluation results.
///
/// Serializes as `{ "<patientId>": { "<statementName>": <value> } }`. One
/// entry per evaluated cohort member; the statement-name set matches the
/// measure's public statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationResults(IndexMap<String, IndexMap<String, Value>>);

impl EvaluationResults {
    /// Reshape the engine's raw output into the result map.
    pub fn from_raw(raw: IndexMap<String, IndexMap<String, CqlValue>>) -> Self {
        Self(
            raw.into_iter()
                .map(|(patient_id, statements)| {
                    let statements = statements
                        .into_iter()
                        .map(|(name, value)| (name, value.to_json()))
                        .collect();
                    (patient_id, statements)
                })
                .collect(),
        )
    }

    /// Number of patients in the result
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the result holds no patients
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Statement results for one patient
    pub fn patient(&self, patient_id: &str) -> Option<&IndexMap<String, Value>> {
        self.0.get(patient_id)
    }

    /// Iterate patient ids in evaluation order
    pub fn patient_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate `(patient_id, statement results)` in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, Value>)> {
        self.0.iter().map(|(id, stmts)| (id.as_str(), stmts))
    }
}
