//! # Embeddings
//!
//! Text embedding generation for the fastembed engine.
//!
//! ## Features
//!
//! - **Hash embeddings**: Deterministic vectors from byte hashing, no model needed
//! - **Model embeddings**: ONNX models behind the [`InferenceRuntime`] trait
//! - **Model cache**: One resident model, reloaded only when the path changes
//! - **Vector math**: Dot product, norm, cosine similarity and friends
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings                                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  HashEngine ─────────────────────────────┐                      │
//! │                                          ▼                      │
//! │  ModelCache ──► ModelBackend ──► vector (normalize, cosine)     │
//! │                      │                                          │
//! │                      ▼                                          │
//! │              InferenceRuntime (ort / unavailable)               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod hash;
#[cfg(feature = "ort")]
pub mod ort_runtime;
pub mod pooling;
pub mod tokenize;
pub mod vector;

pub use backend::{InferenceRuntime, LoadedModel, ModelBackend, UnavailableRuntime};
pub use cache::{ModelCache, ModelCacheStats};
pub use config::ModelConfig;
pub use error::{EmbeddingError, ErrorKind, Result};
pub use hash::{HashEngine, MAX_TEXT_BYTES, hash_embed};
#[cfg(feature = "ort")]
pub use ort_runtime::OrtRuntime;
pub use pooling::Pooling;
pub use tokenize::WordHashTokenizer;

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
