//! read/write error types

use thiserror::Error;

use crate::document::DocumentError;
use crate::store::{RelativePath, StoreError};

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// a file was found but its content is not a valid document
    #[error("malformed payload in {path}: {source}")]
    MalformedPayload {
        path: RelativePath,
        #[source]
        source: serde_json::Error,
    },

    /// the target already holds files and overwriting was not allowed
    #[error("destination is not empty ({files} files) and overwrite is disabled")]
    DestinationNotEmpty { files: usize },

    /// `write_back` on a tree that was not read from a store
    #[error("tree has no source store to write back to")]
    NoSourceStore,
}

impl TreeError {
    /// whether a read hitting this error must abort rather than carry on with defaults
    pub fn is_fatal_to_read(&self) -> bool {
        match self {
            TreeError::Store(e) => !e.is_not_found(),
            _ => true,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
