//! Error types for the embedding engine.

use fastembed_embeddings::EmbeddingError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur in the embedding engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Embedding error.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A blocking task panicked or was cancelled.
    #[error("embedding task failed: {0}")]
    Task(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// The underlying embedding error, if this is one.
    pub fn as_embedding(&self) -> Option<&EmbeddingError> {
        match self {
            Self::Embedding(err) => Some(err),
            _ => None,
        }
    }
}
