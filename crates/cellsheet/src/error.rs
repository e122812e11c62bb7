//! Error types for extraction, merging and storage.

use std::path::PathBuf;

use thiserror::Error;

/// Why a document did not yield a settings config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The document has no `/* @settings ... */` block.
    #[error("no @settings block found")]
    MissingSchema,

    /// The block exists but its YAML does not decode into a config.
    #[error("malformed @settings block: {message}")]
    MalformedSchema { message: String },
}

impl From<SchemaError> for ExtractError {
    fn from(err: SchemaError) -> Self {
        ExtractError::MalformedSchema {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ExtractError {
    fn from(err: serde_yaml::Error) -> Self {
        ExtractError::MalformedSchema {
            message: err.to_string(),
        }
    }
}

/// A decoded YAML document that does not have the shape of a settings config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaError {
    /// Location of the problem, e.g. `settings[2].options[0]`.
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors produced while writing a config back into document text.
#[derive(Debug, Error)]
pub enum MergeError {
    /// YAML encoding failed.
    #[error("failed to encode settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The encoded settings contain `*/`, which would end the block early.
    #[error("settings contain '*/', which would terminate the @settings comment")]
    CommentTerminator,
}

/// Errors from the directory-backed snippet storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The name is empty or would escape the storage directory.
    #[error("invalid snippet name: {name:?}")]
    InvalidName { name: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result of session operations; other error types can be named explicitly.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Errors from an editing session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The current text has a settings block that cannot be read, so it is
    /// not replaced.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::new("settings[1]", "missing 'id'");
        assert_eq!(err.to_string(), "settings[1]: missing 'id'");
    }

    #[test]
    fn test_schema_error_becomes_malformed() {
        let err: ExtractError = SchemaError::new("settings", "expected a list").into();
        match err {
            ExtractError::MalformedSchema { message } => {
                assert!(message.contains("expected a list"))
            }
            other => panic!("Expected MalformedSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_store_error_has_source() {
        use std::error::Error as _;
        let err = StoreError::io(
            "/tmp/x.css",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/x.css"));
    }
}
