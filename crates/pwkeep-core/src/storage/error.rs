//! Storage error handling
//!
//! Provides typed errors for record store operations with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use crate::models::{RecordId, ValidationError};

/// Errors returned by [`crate::RecordStore`] operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field was empty
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced record does not exist
    #[error("Record not found: {id}")]
    NotFound { id: RecordId },

    /// A record with this id already exists
    #[error("A record with id {id} already exists")]
    Constraint { id: RecordId },

    /// The storage medium failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Whether the caller can simply retry or re-prompt
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Validation(_) | StoreError::NotFound { .. } | StoreError::Constraint { .. } => {
                true
            }
            StoreError::Storage(e) => e.is_recoverable(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        StoreError::Storage(StorageError::Database(error))
    }
}

/// Errors that can occur while touching the database file
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to open the database file
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The `passwords` table exists but lacks expected columns
    #[error("Schema mismatch in table '{table}': missing column(s) {}", .missing.join(", "))]
    SchemaMismatch {
        table: &'static str,
        missing: Vec<String>,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },
}

impl StorageError {
    /// Create an error from a failed directory creation
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::CreateDirectory {
                path,
                source: error,
            },
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            StorageError::DiskFull { .. } | StorageError::PermissionDenied { .. } => true,
            StorageError::Database(e) => is_busy(e) || is_disk_full(e) || is_read_only(e),
            _ => false,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StorageError::SchemaMismatch { .. } => {
                Some("The database was not created by pwkeep. Point --db at another file or restore a backup.")
            }
            StorageError::Database(e) if is_disk_full(e) => Some("Free up disk space and try again."),
            StorageError::Database(e) if is_read_only(e) => {
                Some("The database file is read-only. Check file and directory permissions.")
            }
            StorageError::Database(e) if is_busy(e) => {
                Some("The database is locked by another process. Close other pwkeep instances and try again.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

fn is_busy(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked)
    )
}

fn is_disk_full(error: &rusqlite::Error) -> bool {
    error.sqlite_error_code() == Some(rusqlite::ErrorCode::DiskFull)
}

fn is_read_only(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ReadOnly) | Some(rusqlite::ErrorCode::PermissionDenied)
    )
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;
