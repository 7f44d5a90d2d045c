//! ELM expression evaluation for clinical quality measures.
//!
//! The engine evaluates the compiled (ELM) form of a measure against a single
//! patient record at a time. Expression kinds are a closed tagged union
//! ([`cqm_elm::Expression`]) dispatched with exhaustive pattern matching.
//!
//! The entry point is [`MeasureEngine::bind`]: binding a library and a
//! value-set catalog produces a [`BoundMeasure`] that can be executed against
//! any number of patient sources. The bound artifacts are shared read-only;
//! all per-evaluation state lives in an [`EvaluationContext`] created fresh
//! for every patient, so concurrent executions never interfere.
//!
//! # Three-valued logic
//!
//! CQL logical operators are three-valued: `and` is false-dominant, `or` is
//! true-dominant, and comparisons involving null yield null. The operator
//! implementations in [`operators`] follow that semantics throughout.

pub mod context;
pub mod engine;
pub mod error;
pub mod operators;
pub mod patient;
pub mod value;

pub use context::EvaluationContext;
pub use engine::{BoundMeasure, MeasureEngine};
pub use error::{EvalError, EvalResult};
pub use patient::{PatientRecord, PatientSource};
pub use value::CqlValue;
