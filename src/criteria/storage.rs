//! Durable key-value storage for persisted criteria.
//!
//! Mirrors a browser-style local storage: string keys, string values,
//! one flat namespace per file.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use thiserror::Error;

/// Errors that can occur while reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse stored data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// String key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

type Entries = BTreeMap<String, String>;

/// Key-value store backed by a single JSON object file.
///
/// Writes hold an exclusive advisory lock for the read-modify-write cycle
/// so two processes sharing the file don't drop each other's keys.
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| StorageError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        parse_entries(&content)
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries),
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;

        file.lock_exclusive().map_err(|e| StorageError::Lock {
            path: self.path.clone(),
            source: e,
        })?;
        let _unlock = scopeguard::guard(&file, |file| {
            let _ = FileExt::unlock(file);
        });

        let mut entries = match read_locked(&file, &self.path) {
            Ok(entries) => entries,
            Err(StorageError::Parse(e)) => {
                // Rewritten from scratch below.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unparseable store contents"
                );
                Entries::new()
            }
            Err(e) => return Err(e),
        };
        mutate(&mut entries);
        let serialized = serde_json::to_string_pretty(&entries)?;

        let mut writer = &file;
        writer.set_len(0).map_err(|e| self.write_error(e))?;
        writer
            .seek(SeekFrom::Start(0))
            .map_err(|e| self.write_error(e))?;
        writer
            .write_all(serialized.as_bytes())
            .map_err(|e| self.write_error(e))?;
        writer.flush().map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

fn read_locked(file: &File, path: &Path) -> Result<Entries, StorageError> {
    let mut content = String::new();
    let mut reader = file;
    reader
        .read_to_string(&mut content)
        .map_err(|e| StorageError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
    parse_entries(&content)
}

fn parse_entries(content: &str) -> Result<Entries, StorageError> {
    if content.trim().is_empty() {
        return Ok(Entries::new());
    }
    Ok(serde_json::from_str(content)?)
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
