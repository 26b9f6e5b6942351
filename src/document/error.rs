//! document model error types

use thiserror::Error;

use crate::store::InvalidPathError;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// a node has no path of its own and none could be derived
    #[error("{kind} document has no path")]
    MissingPath { kind: &'static str },

    /// `find` on a collection matched nothing
    #[error("no {kind} document matches the predicate")]
    NotFoundInCollection { kind: &'static str },

    /// typed content could not be converted to or from JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// typed content serialized to something other than a JSON object
    #[error("{kind} content must serialize to a JSON object")]
    NotAnObject { kind: &'static str },

    /// a name produced a path that is not store-relative
    #[error("invalid path: {0}")]
    InvalidPath(#[from] InvalidPathError),
}

impl DocumentError {
    pub fn is_missing_path(&self) -> bool {
        matches!(self, DocumentError::MissingPath { .. })
    }
}

pub type DocumentResult<T> = Result<T, DocumentError>;
