//! Flush error taxonomy.

use thiserror::Error;
use trailgate_common_http::{HttpError, ResponseError};
use trailgate_record::NormalizeError;

/// The caller identity lookup failed.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity lookup failed: {0}")]
    Http(#[from] HttpError),

    #[error("identity response unreadable: {0}")]
    Response(#[from] ResponseError),

    #[error("identity response has no {field}")]
    Incomplete { field: &'static str },
}

/// The batch submission call did not complete.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission failed: {0}")]
    Http(#[from] HttpError),

    #[error("submission response unreadable: {0}")]
    Response(#[from] ResponseError),
}

/// Why one record was dropped from the batch.
#[derive(Debug, Error)]
pub enum RecordSkip {
    #[error("record {index}: could not generate identifier: {reason}")]
    IdGeneration { index: usize, reason: String },

    #[error("record {index}: could not serialize event: {source}")]
    Serialization {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {index}: {source}")]
    Normalize {
        index: usize,
        #[source]
        source: NormalizeError,
    },
}

impl RecordSkip {
    /// Position of the skipped record in its batch.
    pub fn index(&self) -> usize {
        match self {
            Self::IdGeneration { index, .. }
            | Self::Serialization { index, .. }
            | Self::Normalize { index, .. } => *index,
        }
    }
}

/// A flush that could not complete.
#[derive(Debug, Error)]
pub enum FlushError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Submission(#[from] SubmitError),
}
