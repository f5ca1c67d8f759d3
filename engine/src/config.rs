//! Configuration for the embedding engine.

use std::path::Path;

use fastembed_embeddings::{MAX_TEXT_BYTES, ModelConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Largest dimension any request may ask for.
pub const MAX_DIMENSION: usize = 2048;

/// Dimension used when a caller does not pick one.
pub const DEFAULT_DIMENSION: usize = 768;

/// Configuration for the embedding engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum text length in bytes.
    pub max_text_bytes: usize,

    /// Maximum requested dimension.
    pub max_dimension: usize,

    /// Dimension used when none is given.
    pub default_dimension: usize,

    /// Model backend configuration.
    pub model: ModelConfig,
}

impl EngineConfig {
    /// Set the maximum text length.
    pub fn with_max_text_bytes(mut self, max_text_bytes: usize) -> Self {
        self.max_text_bytes = max_text_bytes;
        self
    }

    /// Set the maximum dimension.
    pub fn with_max_dimension(mut self, max_dimension: usize) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Set the default dimension.
    pub fn with_default_dimension(mut self, dimension: usize) -> Self {
        self.default_dimension = dimension;
        self
    }

    /// Set the model configuration.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Check that the limits are consistent.
    pub fn validate(&self) -> Result<()> {
        if self.max_text_bytes == 0 {
            return Err(EngineError::Config(
                "max_text_bytes must be positive".to_string(),
            ));
        }
        if self.max_dimension == 0 {
            return Err(EngineError::Config(
                "max_dimension must be positive".to_string(),
            ));
        }
        if !(1..=self.max_dimension).contains(&self.default_dimension) {
            return Err(EngineError::Config(format!(
                "default_dimension {} is outside 1..={}",
                self.default_dimension, self.max_dimension
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_text_bytes: MAX_TEXT_BYTES,
            max_dimension: MAX_DIMENSION,
            default_dimension: DEFAULT_DIMENSION,
            model: ModelConfig::default(),
        }
    }
}
