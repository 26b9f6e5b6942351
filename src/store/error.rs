//! Store layer error types
//!
//! All errors that can occur while talking to a backing file store are defined here.

use thiserror::Error;

use crate::store::path::{InvalidPathError, RelativePath};

/// the main error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// the requested file does not exist
    #[error("file not found: {0}")]
    NotFound(RelativePath),

    /// the requested folder does not exist
    #[error("folder not found: {0}")]
    FolderNotFound(RelativePath),

    /// I/O error (filesystem level)
    #[error("io error at {path}: {source}")]
    Io {
        path: RelativePath,
        #[source]
        source: std::io::Error,
    },

    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// a path could not be expressed relative to the store root
    #[error("invalid path: {0}")]
    InvalidPath(#[from] InvalidPathError),

    /// a file-name pattern could not be compiled
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// file content is not valid UTF-8
    #[error("invalid utf-8 in {path}")]
    InvalidUtf8 { path: RelativePath },

    /// the store does not accept writes
    #[error("store is read-only: cannot modify {0}")]
    ReadOnly(RelativePath),
}

impl StoreError {
    /// wrap an io error, mapping `NotFound` onto [`StoreError::NotFound`]
    pub(crate) fn io(path: &RelativePath, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path.clone())
        } else {
            StoreError::Io {
                path: path.clone(),
                source,
            }
        }
    }

    /// check if this error indicates the file or folder doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::FolderNotFound(_))
    }
}

/// result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
