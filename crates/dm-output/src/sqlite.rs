//! SQLite output backend (feature `sqlite`).
//!
//! A single `output.db` per simulation, one `snapshots` table matching the
//! CSV schema (§6): `id, date, lon, lat`.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::writer::OutputWriter;
use crate::{DeviceSnapshotRow, OutputResult};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Open (or create) `results_folder/{simulation_id}/output.db`.
    pub fn new(results_folder: &Path, simulation_id: &str) -> OutputResult<Self> {
        let dir = results_folder.join(simulation_id);
        std::fs::create_dir_all(&dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS snapshots (
                 id   INTEGER NOT NULL,
                 date TEXT    NOT NULL,
                 lon  REAL    NOT NULL,
                 lat  REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_tick(&mut self, date: &str, rows: &[DeviceSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO snapshots (id, date, lon, lat) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(params![row.id, date, row.lon, row.lat])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
