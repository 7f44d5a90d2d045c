//! HTTP front end for clinical quality measure execution.
//!
//! Measures are compiled libraries bundled with their value sets. Bundles
//! can be preloaded from disk into the [`MeasureRegistry`] at startup, or
//! supplied inline on the evaluate endpoint.

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod server;

pub use config::AppConfig;
pub use error::{ApiError, RegistryError};
pub use registry::{MeasureBundle, MeasureRegistry};
pub use server::{CqmServer, ServerBuilder, build_app};
