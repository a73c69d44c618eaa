//! File-backed cache store.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{CacheError, CacheResult};

/// A cache keyed by a human-readable id string (e.g. `"network-X-nodes"`).
/// Each key corresponds to one file under `root`, holding JSON Lines rows.
pub struct FileCacheStore {
    root: PathBuf,
}

impl FileCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Does a cache entry exist for `key`?
    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Load all rows cached under `key`, preserving their original order.
    /// Returns `None` if the key has no cache entry yet.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<Vec<T>>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: T = serde_json::from_str(&line).map_err(|source| CacheError::Malformed {
                key: key.to_string(),
                source,
            })?;
            rows.push(row);
        }
        Ok(Some(rows))
    }

    /// Persist `rows` under `key`, one JSON object per line, in order.
    pub fn save<T: Serialize>(&self, key: &str, rows: &[T]) -> CacheResult<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            let line = serde_json::to_string(row).map_err(|source| CacheError::Malformed {
                key: key.to_string(),
                source,
            })?;
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
