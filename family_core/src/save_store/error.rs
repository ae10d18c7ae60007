//! Caller-facing save store errors.

use thiserror::Error;

use super::encoding::EncodingError;
use super::storage::StorageError;

/// Which quota a write ran into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaViolation {
    /// The serialized save map would exceed the configured limit.
    PayloadTooLarge { bytes: usize, limit: usize },
    /// The storage backend refused the write.
    StorageFull,
}

impl std::fmt::Display for QuotaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaViolation::PayloadTooLarge { bytes, limit } => {
                write!(f, "save data is {bytes} bytes, limit is {limit}")
            }
            QuotaViolation::StorageFull => write!(f, "storage is full"),
        }
    }
}

/// Errors surfaced by the save store. Backend failures never escape raw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("save not found: {0}")]
    NotFound(String),

    #[error("integrity check failed: {0}")]
    IntegrityCheckFailed(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(QuotaViolation),

    #[error("save limit reached: at most {max} saves")]
    LimitReached { max: usize },

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// Result type for save store operations.
pub type SaveResult<T> = Result<T, SaveError>;

impl From<StorageError> for SaveError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::QuotaExceeded => SaveError::QuotaExceeded(QuotaViolation::StorageFull),
            StorageError::Io(e) => SaveError::CorruptedData(format!("storage I/O: {e}")),
            StorageError::Unavailable(reason) => {
                SaveError::CorruptedData(format!("storage unavailable: {reason}"))
            }
        }
    }
}

impl From<EncodingError> for SaveError {
    fn from(error: EncodingError) -> Self {
        SaveError::CorruptedData(error.to_string())
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(error: serde_json::Error) -> Self {
        SaveError::CorruptedData(format!("malformed JSON: {error}"))
    }
}

impl From<family_rules::StateValidationError> for SaveError {
    fn from(error: family_rules::StateValidationError) -> Self {
        SaveError::ValidationFailed(error.to_string())
    }
}
