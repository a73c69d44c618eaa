//! Parquet output backend (feature `parquet`).
//!
//! One self-contained file per tick under `results_folder/{simulation_id}/`,
//! named `{date}.parquet`, mirroring the CSV schema (§6): `id, date, lon, lat`.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder, UInt32Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{DeviceSnapshotRow, OutputResult};

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::UInt32, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("lat", DataType::Float64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// Writes one Parquet file per tick. Each file is opened, written, and
/// closed within `write_tick` — there is no footer to flush across ticks,
/// unlike a single growing file.
pub struct ParquetWriter {
    dir: PathBuf,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(results_folder: &Path, simulation_id: &str) -> OutputResult<Self> {
        let dir = results_folder.join(simulation_id);
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, schema: snapshot_schema() })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_tick(&mut self, date: &str, rows: &[DeviceSnapshotRow]) -> OutputResult<()> {
        let file = File::create(self.dir.join(format!("{date}.parquet")))?;
        let mut writer = ArrowWriter::try_new(file, Arc::clone(&self.schema), Some(snappy_props()))?;

        let mut ids = UInt32Builder::new();
        let mut dates = StringBuilder::new();
        let mut lons = Float64Builder::new();
        let mut lats = Float64Builder::new();
        for row in rows {
            ids.append_value(row.id);
            dates.append_value(date);
            lons.append_value(row.lon);
            lats.append_value(row.lat);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                Arc::new(ids.finish()),
                Arc::new(dates.finish()),
                Arc::new(lons.finish()),
                Arc::new(lats.finish()),
            ],
        )?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
