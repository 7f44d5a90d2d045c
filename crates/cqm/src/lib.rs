//! Clinical quality measure execution for compiled CQL libraries.
//!
//! Measures arrive as ELM JSON (the compiled form of CQL) together with the
//! value sets they reference. A [`MeasureExecutor`] binds both once, then
//! evaluates any number of patient payloads against the bound measure.
//!
//! # Example
//!
//! ```ignore
//! use cqm::MeasureExecutor;
//!
//! let executor = MeasureExecutor::new(&elm, &value_sets)?;
//! let results = executor.exec(&patients).await?;
//! for (patient_id, statements) in results.iter() {
//!     println!("{patient_id}: {statements:?}");
//! }
//! ```

// Re-export the public APIs from internal crates
pub use cqm_elm as elm;
pub use cqm_eval as eval;
pub use cqm_executor as executor;
pub use cqm_terminology as terminology;

// Convenience re-exports
pub use cqm_elm::{ElmError, Library, parse_elm, parse_elm_str};
pub use cqm_eval::{BoundMeasure, CqlValue, EvalError, MeasureEngine, PatientRecord};
pub use cqm_executor::{
    EvaluationResults, ExecutorError, MeasureDefinition, MeasureExecutor, PatientCohort,
    execute_once,
};
pub use cqm_terminology::{Code, ValueSetCatalog, ValueSetError};
