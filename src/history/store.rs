use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::record::{HistoryRecord, COLUMNS};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("history store I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history store at {} is not valid CSV: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Append-only CSV log of scoring events.
///
/// All file access goes through one lock, so appends from concurrent callers
/// are serialized and readers never observe a half-written row.
#[derive(Debug)]
pub struct PredictionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PredictionStore {
    /// Opens the store, creating the parent directory and a header-only
    /// file if nothing is there yet. Safe to call on every startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };
        {
            let _guard = store.lock.lock();
            if store.ensure_initialized()? {
                info!(path = %store.path.display(), "created predictions storage");
            }
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &HistoryRecord) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock();
        self.ensure_initialized()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io(e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record).map_err(|e| self.csv(e))?;
        writer.flush().map_err(|e| self.io(e))?;

        let file = writer.into_inner().map_err(|e| self.io(e.into_error()))?;
        file.sync_data().map_err(|e| self.io(e))?;

        debug!(path = %self.path.display(), category = %record.category, "prediction appended");
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<HistoryRecord>, PersistenceError> {
        let _guard = self.lock.lock();
        let file = File::open(&self.path).map_err(|e| self.io(e))?;
        let mut reader = csv::Reader::from_reader(file);

        reader
            .deserialize::<HistoryRecord>()
            .map(|row| row.map_err(|e| self.csv(e)))
            .collect()
    }

    /// Returns true when a fresh header was written. Caller holds the lock.
    fn ensure_initialized(&self) -> Result<bool, PersistenceError> {
        let empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(self.io(e)),
        };
        if !empty {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        let mut file = File::create(&self.path).map_err(|e| self.io(e))?;
        writeln!(file, "{}", COLUMNS.join(",")).map_err(|e| self.io(e))?;
        file.sync_data().map_err(|e| self.io(e))?;
        Ok(true)
    }

    fn io(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv(&self, source: csv::Error) -> PersistenceError {
        PersistenceError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}
