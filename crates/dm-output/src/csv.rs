//! CSV output backend.
//!
//! One file per tick under `results_folder/{simulation_id}/`, named
//! `{date}.csv` with header `id,date,lon,lat` (§6). `date` is the filename
//! stem, repeated on every row.

use std::fs;
use std::path::{Path, PathBuf};

use crate::writer::OutputWriter;
use crate::{DeviceSnapshotRow, OutputResult};

/// Writes one CSV file per tick into a per-simulation directory.
pub struct CsvWriter {
    dir: PathBuf,
}

impl CsvWriter {
    /// Create (or reuse) `results_folder/{simulation_id}/`.
    pub fn new(results_folder: &Path, simulation_id: &str) -> OutputResult<Self> {
        let dir = results_folder.join(simulation_id);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick(&mut self, date: &str, rows: &[DeviceSnapshotRow]) -> OutputResult<()> {
        let mut writer = csv::Writer::from_path(self.dir.join(format!("{date}.csv")))?;
        writer.write_record(["id", "date", "lon", "lat"])?;
        for row in rows {
            writer.write_record(&[
                row.id.to_string(),
                date.to_string(),
                row.lon.to_string(),
                row.lat.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
