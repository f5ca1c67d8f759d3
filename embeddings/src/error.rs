//! Error types for the embeddings system.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Text is empty.
    #[error("text is empty")]
    EmptyText,

    /// Text too long for embedding.
    #[error("text too long: {length} bytes, max {max_length}")]
    TextTooLong { length: usize, max_length: usize },

    /// Requested dimension is zero or beyond the allocation limit.
    #[error("invalid dimension {dimension}: must be between 1 and {max}")]
    InvalidDimension { dimension: usize, max: usize },

    /// The model backend only produces its native dimension.
    #[error("unsupported dimension {requested}: model produces {supported}")]
    UnsupportedDimension { requested: usize, supported: usize },

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A required argument was missing at the foreign boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Model file does not exist.
    #[error("model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// The inference runtime rejected the model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The forward pass failed for this input.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The forward pass failed and the session can no longer be used.
    #[error("inference session invalidated: {0}")]
    SessionInvalidated(String),
}

/// Coarse classification of an [`EmbeddingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed something invalid. Nothing was computed.
    Input,
    /// The model could not be loaded.
    ModelLoad,
    /// The runtime failed while embedding a specific input.
    Inference,
}

impl EmbeddingError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyText
            | Self::TextTooLong { .. }
            | Self::InvalidDimension { .. }
            | Self::UnsupportedDimension { .. }
            | Self::DimensionMismatch { .. }
            | Self::InvalidArgument(_) => ErrorKind::Input,
            Self::ModelNotFound(_) | Self::ModelLoad(_) => ErrorKind::ModelLoad,
            Self::Inference(_) | Self::SessionInvalidated(_) => ErrorKind::Inference,
        }
    }

    /// Whether this is an input error.
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::Input
    }

    /// Whether the cached session must be dropped after this error.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::SessionInvalidated(_))
    }
}
