//! resolver error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// no candidate takes the value, or no object shape overlaps it
    #[error("value matches none of the candidate shapes [{candidates}]")]
    NoMatchingShape { candidates: String },

    /// a list element does not fit the element type its first element chose
    #[error("list element {position} does not match {element}, the element type chosen from the first element")]
    MixedList { position: usize, element: String },

    /// the chosen candidate could not be populated from the value
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolveError {
    pub(crate) fn no_match(candidates: &[super::Candidate]) -> Self {
        ResolveError::NoMatchingShape {
            candidates: candidates.iter().map(|c| c.name()).collect::<Vec<_>>().join(", "),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
