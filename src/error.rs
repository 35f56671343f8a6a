//! Error types for the status engine
//!
//! Every failure a caller can act on has its own variant, so a scan can skip
//! header-less files while still warning about corrupt ones.

use crate::models::record::RecordError;
use crate::parser::CodecError;
use crate::state::TransitionError;
use std::path::{Path, PathBuf};

/// Result type for store and query operations
pub type StatusResult<T> = Result<T, StatusError>;

/// Errors that can occur while loading, creating or saving artifacts
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("No metadata header in {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed metadata in {}: {cause}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        cause: MalformedCause,
    },

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("{} already carries metadata", path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("Unknown artifact kind: {kind}")]
    UnknownKind { kind: String },

    #[error("Artifact id must not be empty")]
    InvalidId,

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a header was rejected
#[derive(Debug, thiserror::Error)]
pub enum MalformedCause {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl StatusError {
    pub(crate) fn malformed(path: &Path, cause: impl Into<MalformedCause>) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            cause: cause.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The document exists but has no header
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The document has a header that could not be turned into a record
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
