//! Measure-execution orchestration.
//!
//! Compiling and binding a measure is the expensive step relative to
//! evaluating it against any one patient. [`MeasureExecutor::new`] pays that
//! cost once (parsing the ELM, building the value-set catalog, binding both
//! into the engine) and the resulting executor can then be invoked any
//! number of times at near-zero marginal setup cost:
//!
//! ```ignore
//! let executor = MeasureExecutor::new(&elm, &value_sets)?;
//! let results_a = executor.exec(&patient_a).await?;
//! let results_b = executor.exec(&patient_batch).await?;
//! ```
//!
//! Each invocation normalizes its patient input (a single JSON object or an
//! ordered array of objects) into a [`PatientCohort`], evaluates every public
//! statement of the bound measure for every cohort member, and returns
//! [`EvaluationResults`]: a map from patient identifier to statement-name /
//! value pairs. The executor is a pure function of (bound measure, bound
//! catalog, cohort); no state survives across invocations.

pub mod cohort;
pub mod error;
pub mod executor;
pub mod measure;
pub mod results;

pub use cohort::PatientCohort;
pub use error::ExecutorError;
pub use executor::{MeasureExecutor, execute_once};
pub use measure::MeasureDefinition;
pub use results::EvaluationResults;
