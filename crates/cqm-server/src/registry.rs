//! Named measure registry.
//!
//! Each registered measure is a bound [`MeasureExecutor`] kept behind an
//! `Arc`, so handlers can evaluate concurrently without re-reading or
//! re-validating the bundle.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use cqm_executor::MeasureExecutor;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

use crate::error::RegistryError;

/// On-disk measure bundle: the compiled library plus its terminology.
#[derive(Debug, Deserialize)]
pub struct MeasureBundle {
    pub elm: Value,
    /// Omitted value sets mean an empty catalog
    #[serde(rename = "valueSets", default = "empty_object")]
    pub value_sets: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Default)]
pub struct MeasureRegistry {
    measures: RwLock<HashMap<String, Arc<MeasureExecutor>>>,
}

impl MeasureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a measure under `name`, replacing any previous entry.
    pub fn register(&self, name: &str, bundle: &MeasureBundle) -> Result<(), RegistryError> {
        let executor = MeasureExecutor::new(&bundle.elm, &bundle.value_sets)
            .map_err(|source| RegistryError::InvalidBundle {
                name: name.to_string(),
                source,
            })?;
        self.measures
            .write()
            .insert(name.to_string(), Arc::new(executor));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<MeasureExecutor>> {
        self.measures.read().get(name).cloned()
    }

    /// Registered measure names, sorted for stable listings.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.measures.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.measures.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.read().is_empty()
    }

    /// Load every `*.json` bundle in `dir`, keyed by file stem.
    ///
    /// A malformed bundle aborts the load; a missing directory is an error
    /// too, since the operator explicitly asked for a preload.
    pub fn load_dir(&self, dir: &Path) -> Result<usize, RegistryError> {
        let mut loaded = 0;
        let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| RegistryError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            let bundle: MeasureBundle =
                serde_json::from_str(&text).map_err(|source| RegistryError::Parse {
                    path: path.clone(),
                    source,
                })?;
            self.register(stem, &bundle)?;
            tracing::info!(measure = stem, path = %path.display(), "measure registered");
            loaded += 1;
        }
        Ok(loaded)
    }
}
