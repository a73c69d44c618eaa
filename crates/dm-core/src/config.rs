//! Top-level folder-layout configuration.
//!
//! Mirrors the original generator's `config.json`: a flat set of folder
//! paths the surrounding application resolves at startup and passes down to
//! every component that touches disk. Loaded with `serde_json`, matching
//! the teacher framework's own example binaries.

use std::path::{Path, PathBuf};

use crate::{DmError, DmResult};

/// Folder layout recognized by the cache store, network builder, and
/// simulation output writers.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Root of all raw geospatial inputs (raster, places, roads, buildings).
    pub data_folder: PathBuf,
    /// Root of the cache store (C3).
    pub cache_folder: PathBuf,
    /// Root under which simulations write per-tick CSVs.
    pub results_folder: PathBuf,
    /// Folder holding the append-only error/warning sink.
    pub errors_folder: PathBuf,
    /// Filename (relative to `errors_folder`) of the error/warning sink.
    pub errors_file: String,
}

impl Config {
    /// Load a `Config` from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> DmResult<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| DmError::Parse(e.to_string()))
    }

    /// Full path to the error sink file.
    pub fn errors_path(&self) -> PathBuf {
        self.errors_folder.join(&self.errors_file)
    }
}
