//! The `OutputWriter` trait implemented by all backend writers.

use crate::{DeviceSnapshotRow, OutputResult};

/// Trait implemented by the CSV, SQLite, and Parquet backends.
///
/// One call to `write_tick` per simulation tick. `date` is the export
/// timestamp in `MM-DD-YYYY_HH:MM:SS` form (§6) — the CSV and Parquet
/// backends also use it as the file stem.
pub trait OutputWriter {
    fn write_tick(&mut self, date: &str, rows: &[DeviceSnapshotRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
