//! The reusable, measure-bound executor

use crate::cohort::PatientCohort;
use crate::error::ExecutorError;
use crate::measure::MeasureDefinition;
use crate::results::EvaluationResults;
use cqm_eval::{BoundMeasure, MeasureEngine};
use cqm_terminology::ValueSetCatalog;
use serde_json::Value;
use std::sync::Arc;

/// A measure bound to its value-set catalog, reusable across invocations.
///
/// The executor exclusively owns its bound artifacts and never mutates them
/// after construction, so any number of invocations, including concurrent
/// ones, may run against the same instance without interference.
#[derive(Debug)]
pub struct MeasureExecutor {
    definition: MeasureDefinition,
    bound: BoundMeasure,
}

impl MeasureExecutor {
    /// Bind a measure (ELM JSON) and a value-set catalog into an executor.
    ///
    /// All construction errors are reported here, before any patient is
    /// touched. An empty value-set catalog (`{}`) is valid.
    pub fn new(elm: &Value, value_sets: &Value) -> Result<Self, ExecutorError> {
        let definition = MeasureDefinition::from_elm(elm)?;
        let catalog = Arc::new(ValueSetCatalog::from_json(value_sets)?);
        let bound = MeasureEngine::new().bind(Arc::clone(definition.library()), catalog);
        tracing::debug!(
            measure = definition.id(),
            version = definition.version(),
            "bound measure executor"
        );
        Ok(Self { definition, bound })
    }

    /// The bound measure definition
    pub fn definition(&self) -> &MeasureDefinition {
        &self.definition
    }

    /// Execute the bound measure against patient data: a single patient JSON
    /// object or an ordered array of objects.
    ///
    /// Evaluates every public statement of the measure for every cohort
    /// member and returns the per-patient, per-statement result map. An empty
    /// cohort yields an empty result. The first evaluation error rejects the
    /// whole invocation with no partial results; callers needing per-patient
    /// resilience should invoke once per patient.
    ///
    /// The future completes without suspending: evaluation is CPU-bound tree
    /// traversal with no I/O.
    pub async fn exec(&self, patient_data: &Value) -> Result<EvaluationResults, ExecutorError> {
        let cohort = PatientCohort::from_json(patient_data)?;
        tracing::debug!(
            measure = self.definition.id(),
            patients = cohort.len(),
            "executing measure"
        );
        let raw = self.bound.exec(&cohort.into_source())?;
        Ok(EvaluationResults::from_raw(raw))
    }
}

/// Convenience composition for callers who do not plan to reuse the binding:
/// observably equivalent to [`MeasureExecutor::new`] followed by one
/// [`MeasureExecutor::exec`].
pub async fn execute_once(
    elm: &Value,
    patient_data: &Value,
    value_sets: &Value,
) -> Result<EvaluationResults, ExecutorError> {
    MeasureExecutor::new(elm, value_sets)?.exec(patient_data).await
}
