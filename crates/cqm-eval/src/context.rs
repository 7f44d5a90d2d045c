//! Evaluation context for measure execution
//!
//! A context is created fresh for each patient and discarded afterwards: the
//! bound library and value-set catalog are the only state shared between
//! evaluations, and both are read-only.

use crate::error::{EvalError, EvalResult};
use crate::patient::PatientRecord;
use crate::value::CqlValue;
use cqm_elm::Library;
use cqm_terminology::ValueSetCatalog;
use std::collections::HashMap;
use std::sync::Arc;

const MAX_RECURSION_DEPTH: usize = 512;

/// Per-patient evaluation state.
pub struct EvaluationContext {
    library: Arc<Library>,
    catalog: Arc<ValueSetCatalog>,
    patient: PatientRecord,
    parameters: HashMap<String, CqlValue>,
    /// Memoized statement results for this patient
    cache: HashMap<String, CqlValue>,
    depth: usize,
}

impl EvaluationContext {
    /// Create a context for evaluating one patient against a bound measure.
    pub fn new(
        library: Arc<Library>,
        catalog: Arc<ValueSetCatalog>,
        patient: PatientRecord,
    ) -> Self {
        Self {
            library,
            catalog,
            patient,
            parameters: HashMap::new(),
            cache: HashMap::new(),
            depth: 0,
        }
    }

    /// Set a parameter value
    pub fn set_parameter(&mut self, name: impl Into<String>, value: CqlValue) {
        self.parameters.insert(name.into(), value);
    }

    /// Get a parameter value
    pub fn get_parameter(&self, name: &str) -> Option<&CqlValue> {
        self.parameters.get(name)
    }

    /// The bound library
    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    /// The bound value-set catalog
    pub fn catalog(&self) -> &ValueSetCatalog {
        &self.catalog
    }

    /// The patient under evaluation
    pub fn patient(&self) -> &PatientRecord {
        &self.patient
    }

    /// Resolve a value-set name declared in the library to its OID/URL.
    pub fn resolve_value_set(&self, name: &str) -> EvalResult<&str> {
        self.library
            .value_set_id(name)
            .ok_or_else(|| EvalError::undefined_value_set(name))
    }

    /// Look up a memoized statement result
    pub fn get_cached(&self, key: &str) -> Option<CqlValue> {
        self.cache.get(key).cloned()
    }

    /// Memoize a statement result
    pub fn cache_result(&mut self, key: impl Into<String>, value: CqlValue) {
        self.cache.insert(key.into(), value);
    }

    /// Enter one level of expression recursion; false when the limit is hit.
    pub fn enter_recursion(&mut self) -> bool {
        if self.depth >= MAX_RECURSION_DEPTH {
            return false;
        }
        self.depth += 1;
        true
    }

    /// Exit one level of expression recursion
    pub fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
