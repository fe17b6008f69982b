//! Error types for encoding, parsing and patching persisted schemas.
//!
//! [`CodecError`] covers text that cannot be read back; [`SchemaError`]
//! unifies it with validation failures, patch conflicts, id mismatches and
//! configuration I/O so that callers branch on a single enum.

use entity_schema_core::{InvalidSchemaId, PatchError, SchemaId, ValidationError};
use thiserror::Error;

/// Failures reading persisted schema text.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not JSON, or its structure is impossible for any
    /// supported version.
    #[error("malformed persisted data: {0}")]
    MalformedPersistedData(String),

    /// `serializationVersion` names a version this crate does not know.
    #[error("malformed persisted data: unsupported serialization version {0:?}")]
    UnsupportedVersion(String),

    /// The stored id does not match the schema id pattern.
    #[error("malformed persisted data: {0}")]
    InvalidId(#[from] InvalidSchemaId),

    /// JSON parsing or serialization failure.
    #[error("malformed persisted data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any failure of a schema operation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Caller input was rejected before encoding.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Stored text could not be read.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A diff could not be applied.
    #[error("patch failed: {0}")]
    Patch(#[from] PatchError),

    /// The texts given to one diff/patch operation describe different
    /// schemas.
    #[error("id mismatch: expected {expected}, found {found}")]
    IdMismatch {
        /// Id of the first text.
        expected: SchemaId,
        /// First differing id.
        found: SchemaId,
    },

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SchemaError {
    /// Returns `true` for concurrent-edit conflicts (the caller may re-read
    /// a fresh base and retry).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Patch(_))
    }
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_are_classified() {
        assert!(SchemaError::from(PatchError::TextMergeConflict).is_conflict());
        assert!(
            !SchemaError::from(ValidationError::InvalidLanguageCode("xx".into())).is_conflict()
        );
    }

    #[test]
    fn test_codec_errors_read_as_malformed() {
        let err = CodecError::UnsupportedVersion("9.0".into());
        assert!(err.to_string().starts_with("malformed persisted data"));
    }
}
