//! Integration tests for dm-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::DeviceSnapshotRow;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn row(id: u32, lon: f64, lat: f64) -> DeviceSnapshotRow {
        DeviceSnapshotRow { id, lon, lat }
    }

    #[test]
    fn tick_file_created_with_date_stem() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path(), "sim-001").unwrap();
        w.write_tick("07-31-2026_09:00:00", &[row(0, 1.0, 2.0)]).unwrap();
        assert!(dir.path().join("sim-001/07-31-2026_09:00:00.csv").exists());
    }

    #[test]
    fn header_matches_schema() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path(), "sim-001").unwrap();
        w.write_tick("07-31-2026_09:00:00", &[row(0, 1.0, 2.0)]).unwrap();

        let path = dir.path().join("sim-001/07-31-2026_09:00:00.csv");
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["id", "date", "lon", "lat"]);
    }

    #[test]
    fn row_count_equals_device_count() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path(), "sim-001").unwrap();
        let rows = vec![row(0, 0.0, 0.0), row(1, 1.0, 1.0), row(2, 2.0, 2.0)];
        w.write_tick("07-31-2026_09:00:00", &rows).unwrap();

        let path = dir.path().join("sim-001/07-31-2026_09:00:00.csv");
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let records: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[0][1], "07-31-2026_09:00:00");
    }

    #[test]
    fn each_tick_gets_its_own_file() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path(), "sim-001").unwrap();
        w.write_tick("07-31-2026_09:00:00", &[row(0, 0.0, 0.0)]).unwrap();
        w.write_tick("07-31-2026_10:00:00", &[row(0, 0.1, 0.1)]).unwrap();

        assert!(dir.path().join("sim-001/07-31-2026_09:00:00.csv").exists());
        assert!(dir.path().join("sim-001/07-31-2026_10:00:00.csv").exists());
    }

    #[test]
    fn empty_tick_still_writes_header() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path(), "sim-001").unwrap();
        w.write_tick("07-31-2026_09:00:00", &[]).unwrap();
        let path = dir.path().join("sim-001/07-31-2026_09:00:00.csv");
        assert!(path.exists());
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use crate::row::DeviceSnapshotRow;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path(), "sim-001").unwrap();
        assert!(dir.path().join("sim-001/output.db").exists());
    }

    #[test]
    fn snapshot_count_matches_rows() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path(), "sim-001").unwrap();
        let rows = vec![
            DeviceSnapshotRow { id: 0, lon: 0.0, lat: 0.0 },
            DeviceSnapshotRow { id: 1, lon: 1.0, lat: 1.0 },
        ];
        w.write_tick("07-31-2026_09:00:00", &rows).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("sim-001/output.db")).unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn rows_accumulate_across_ticks() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path(), "sim-001").unwrap();
        w.write_tick("07-31-2026_09:00:00", &[DeviceSnapshotRow { id: 0, lon: 0.0, lat: 0.0 }])
            .unwrap();
        w.write_tick("07-31-2026_10:00:00", &[DeviceSnapshotRow { id: 0, lon: 0.1, lat: 0.1 }])
            .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("sim-001/output.db")).unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use crate::parquet::ParquetWriter;
    use crate::row::DeviceSnapshotRow;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn tick_file_readable() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path(), "sim-001").unwrap();
        let rows = vec![
            DeviceSnapshotRow { id: 0, lon: 0.0, lat: 0.0 },
            DeviceSnapshotRow { id: 1, lon: 1.0, lat: 1.0 },
        ];
        w.write_tick("07-31-2026_09:00:00", &rows).unwrap();

        let file =
            std::fs::File::open(dir.path().join("sim-001/07-31-2026_09:00:00.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();

        let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total_rows, 2);

        let field_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(field_names, ["id", "date", "lon", "lat"]);
    }
}
