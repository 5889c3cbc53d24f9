//! Durable slot for the login attempt record.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure counter that survives process restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAttemptRecord {
    /// Failures since the record was last reset.
    pub count: u32,
    /// First failure since the last reset, ms since epoch. 0 when unset.
    pub first_attempt_at: u64,
    /// Lock deadline, ms since epoch.
    pub locked_until: Option<u64>,
}

impl LoginAttemptRecord {
    pub fn is_empty(&self) -> bool {
        *self == LoginAttemptRecord::default()
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access attempt record '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt attempt record '{path}': {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyed singleton holding the attempt record.
pub trait AttemptStorage: Send + Sync {
    fn load(&self) -> Result<Option<LoginAttemptRecord>, StorageError>;
    fn save(&self, record: &LoginAttemptRecord) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file guarded by an advisory lock while it is read or rewritten.
#[derive(Debug, Clone)]
pub struct FileAttemptStorage {
    path: PathBuf,
}

impl FileAttemptStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl AttemptStorage for FileAttemptStorage {
    fn load(&self) -> Result<Option<LoginAttemptRecord>, StorageError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        FileExt::lock_shared(&file).map_err(|e| self.io_error(e))?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content);
        let _ = FileExt::unlock(&file);
        read.map_err(|e| self.io_error(e))?;

        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, record: &LoginAttemptRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string(record).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        FileExt::lock_exclusive(&file).map_err(|e| self.io_error(e))?;
        let written = file
            .set_len(0)
            .and_then(|_| file.write_all(content.as_bytes()))
            .and_then(|_| file.sync_all());
        let _ = FileExt::unlock(&file);
        written.map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(self.io_error(e)),
            _ => Ok(()),
        }
    }
}

/// In-process storage. Clones share the slot, so a second guard loaded
/// from a clone behaves like a fresh process reading the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttemptStorage {
    slot: Arc<Mutex<Option<LoginAttemptRecord>>>,
}

impl MemoryAttemptStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStorage for MemoryAttemptStorage {
    fn load(&self) -> Result<Option<LoginAttemptRecord>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, record: &LoginAttemptRecord) -> Result<(), StorageError> {
        *self.slot.lock() = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
