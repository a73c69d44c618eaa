//! `dm-output` — per-tick position output backends for the disaster-mobility
//! simulation framework.
//!
//! One file (or, for SQLite, one row batch) per simulation tick, written
//! under `results_folder/{simulation_id}/`, named `MM-DD-YYYY_HH:MM:SS.csv`
//! with header `id,date,lon,lat` (§6). Three backends are provided behind
//! Cargo features:
//!
//! | Feature   | Backend | File(s) per tick                    |
//! |-----------|---------|--------------------------------------|
//! | *(none)*  | CSV     | `{date}.csv`                         |
//! | `sqlite`  | SQLite  | rows appended to `output.db`         |
//! | `parquet` | Parquet | `{date}.parquet`                     |
//!
//! All backends implement [`OutputWriter`]. This crate does not depend on
//! `dm-sim` — the `SimObserver`-to-`OutputWriter` bridge lives in `dm-sim`
//! itself to avoid a dependency cycle (`dm-sim` already depends on
//! `dm-output` for export).
//!
//! # Usage
//!
//! ```rust,ignore
//! use dm_output::CsvWriter;
//!
//! let mut writer = CsvWriter::new(&results_folder, "sim-001")?;
//! writer.write_tick("07-31-2026_09:00:00", &rows)?;
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::DeviceSnapshotRow;
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
