//! # Embedding Engine
//!
//! This crate provides the embedding facade used by the C ABI and the CLI:
//!
//! - **Hash mode**: deterministic embeddings, no model, no I/O
//! - **Model mode**: ONNX model embeddings through a single-slot model cache
//! - **Vector operations**: dot product, norm, normalization, addition, cosine
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embedder                                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  generate(text, dimension, mode)                                │
//! │         │                                                       │
//! │         ▼                                                       │
//! │  ┌──────────────┐                                               │
//! │  │  Validation  │                                               │
//! │  └──────────────┘                                               │
//! │      │                 │                                        │
//! │      ▼                 ▼                                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │  HashEngine  │  │  ModelCache  │─►│ ModelBackend │          │
//! │  └──────────────┘  └──────────────┘  └──────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use fastembed_engine::{Embedder, EngineConfig, GenerationMode};
//!
//! let embedder = Embedder::hash_only(EngineConfig::default());
//! let a = embedder.generate("Hello world", 128, &GenerationMode::Hash)?;
//! let b = embedder.generate("hello world", 128, &GenerationMode::Hash)?;
//! assert_eq!(a, b);
//! # Ok::<(), fastembed_engine::EmbeddingError>(())
//! ```

pub mod async_engine;
pub mod config;
pub mod engine;
pub mod error;

pub use async_engine::AsyncEmbedder;
pub use config::{DEFAULT_DIMENSION, EngineConfig, MAX_DIMENSION};
pub use engine::{Embedder, GenerationMode};
pub use error::{EngineError, Result};

// Re-export from dependencies for convenience
pub use fastembed_embeddings::{
    EmbeddingError, ErrorKind, InferenceRuntime, ModelCacheStats, ModelConfig, Pooling,
    UnavailableRuntime,
};
#[cfg(feature = "ort")]
pub use fastembed_embeddings::OrtRuntime;
