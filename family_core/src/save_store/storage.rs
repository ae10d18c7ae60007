//! Slot-based storage backends.
//!
//! The store sees storage as a handful of named text slots, the way browser
//! local storage works. Backends report their own capacity problems through
//! [`StorageError::QuotaExceeded`]; the store translates every backend error
//! into its own error type.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Slot holding the map of save id to encoded save record.
pub const SAVES_SLOT: &str = "saves";
/// Slot holding the encoded auto-save record.
pub const AUTOSAVE_SLOT: &str = "autosave";
/// Slot holding the plaintext metadata cache.
pub const METADATA_SLOT: &str = "metadata";
/// Slot holding the plaintext obfuscation key.
pub const STORAGE_KEY_SLOT: &str = "storageKey";

/// Low-level storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A set of named text slots.
pub trait StorageBackend {
    /// Read a slot. Missing slots are `Ok(None)`.
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's contents. A slot is either fully written or left as it was.
    fn set(&mut self, slot: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot. Removing a missing slot is not an error.
    fn remove(&mut self, slot: &str) -> Result<(), StorageError>;
}

/// In-memory slots with an optional total byte capacity.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryStorage {
    /// Create unbounded in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that refuses writes once the slots hold `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            slots: HashMap::new(),
            capacity: Some(bytes),
        }
    }

    /// Total bytes currently held, slot names included.
    pub fn used_bytes(&self) -> usize {
        self.slots.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<(), StorageError> {
        if let Some(capacity) = self.capacity {
            let existing = self.slots.get(slot).map(|v| slot.len() + v.len()).unwrap_or(0);
            let projected = self.used_bytes() - existing + slot.len() + value.len();
            if projected > capacity {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> Result<(), StorageError> {
        self.slots.remove(slot);
        Ok(())
    }
}

/// One file per slot inside a directory. Writes go through a temporary file
/// and a rename, so a crash never leaves a half-written slot behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Use `root` as the storage directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid slot name '{slot}'")));
        }
        Ok(self.root.join(format!("{slot}.slot")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(slot)?) {
            Ok(text) => Ok(Some(text)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(slot)?;
        write_text_atomic(&path, value).map_err(map_write_error)
    }

    fn remove(&mut self, slot: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(slot)?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

fn map_write_error(error: io::Error) -> StorageError {
    match error.kind() {
        io::ErrorKind::StorageFull => StorageError::QuotaExceeded,
        _ => StorageError::Io(error),
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    let tmp_path = path.with_extension("slot.tmp");
    fs::write(&tmp_path, text.as_bytes())?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}
