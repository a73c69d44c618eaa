//! Append-only warning/error log, one row per event.
//!
//! Format matches the original generator's `utils/errors.write_error`:
//! `timestamp,source,severity,message\n`, appended to a single CSV-ish file
//! rather than a structured format, so a human (or `tail -f`) can read it
//! directly during a long-running build or simulation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::DmResult;

/// Severity of a logged event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Append-only sink for non-fatal build/simulation events.
pub struct ErrorSink {
    path: PathBuf,
}

impl ErrorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one `timestamp,source,severity,message` row.
    pub fn write_event(
        &self,
        source: &str,
        severity: Severity,
        message: &str,
        timestamp: NaiveDateTime,
    ) -> DmResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{timestamp},{source},{severity},{message}")?;
        // tracing mirrors the on-disk record so operators tailing logs see it
        // without reading the sink file.
        match severity {
            Severity::Warning => tracing::warn!(source, message, "simulation warning"),
            Severity::Error => tracing::error!(source, message, "simulation error"),
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
