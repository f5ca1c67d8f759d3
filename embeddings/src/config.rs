//! Configuration for the model backend.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pooling::Pooling;
use crate::tokenize::DEFAULT_MAX_SEQUENCE_LENGTH;

/// Native output dimension of BERT-base sized models.
pub const DEFAULT_MODEL_DIMENSION: usize = 768;

/// Configuration for loading and running embedding models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Dimension the model emits. Requests for any other size fail.
    pub dimension: usize,

    /// Intra-op threads for the inference session.
    pub intra_threads: usize,

    /// How token states are pooled into one vector.
    pub pooling: Pooling,

    /// Maximum number of tokens fed to the model.
    pub max_sequence_length: usize,

    /// Tokenizer file. Defaults to `tokenizer.json` next to the model.
    pub tokenizer_path: Option<PathBuf>,

    /// Whether the model takes a `token_type_ids` input.
    pub use_token_type_ids: bool,
}

impl ModelConfig {
    /// Set the model dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the pooling strategy.
    pub fn with_pooling(mut self, pooling: Pooling) -> Self {
        self.pooling = pooling;
        self
    }

    /// Set the tokenizer file.
    pub fn with_tokenizer(mut self, path: impl Into<PathBuf>) -> Self {
        self.tokenizer_path = Some(path.into());
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_MODEL_DIMENSION,
            intra_threads: 2,
            pooling: Pooling::Cls,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            tokenizer_path: None,
            use_token_type_ids: true,
        }
    }
}
