//! Embedding facade implementation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use fastembed_embeddings::{
    EmbeddingError, HashEngine, InferenceRuntime, ModelCache, ModelCacheStats, Result,
    UnavailableRuntime, vector,
};

use crate::config::EngineConfig;

/// Which backend produces an embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "path", rename_all = "snake_case")]
pub enum GenerationMode {
    /// Deterministic hash embedding.
    Hash,
    /// Neural model loaded from the given file.
    Model(PathBuf),
}

/// Entry point for generating embeddings and operating on them.
///
/// Dispatches between:
/// - the hash backend, which is pure and needs no locking
/// - the model backend, reached through a single-slot [`ModelCache`]
///
/// Validation shared by both paths runs before any computation.
pub struct Embedder<R: InferenceRuntime> {
    config: EngineConfig,
    hash: HashEngine,
    cache: ModelCache<R>,
}

impl Embedder<UnavailableRuntime> {
    /// Create an embedder with no model runtime. Model requests fail to load.
    pub fn hash_only(config: EngineConfig) -> Self {
        Self::new(config, UnavailableRuntime)
    }
}

impl<R: InferenceRuntime> Embedder<R> {
    /// Create an embedder over `runtime`.
    pub fn new(config: EngineConfig, runtime: R) -> Self {
        let hash = HashEngine::new().with_max_text_bytes(config.max_text_bytes);
        debug!(
            runtime = runtime.name(),
            max_text_bytes = config.max_text_bytes,
            max_dimension = config.max_dimension,
            "embedder created"
        );
        Self {
            config,
            hash,
            cache: ModelCache::new(runtime),
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate one embedding of `text`.
    pub fn generate(&self, text: &str, dimension: usize, mode: &GenerationMode) -> Result<Vec<f32>> {
        self.validate(text, dimension, mode)?;
        match mode {
            GenerationMode::Hash => self.hash.generate(text, dimension),
            GenerationMode::Model(path) => self.cache.with_model(path, |backend, model| {
                check_model_dimension(model.dimension(), dimension)?;
                backend.embed(model, text)
            }),
        }
    }

    /// Generate embeddings for several texts.
    ///
    /// Every text is validated before any is embedded. With a model, all
    /// texts run under one cache lock.
    pub fn generate_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        dimension: usize,
        mode: &GenerationMode,
    ) -> Result<Vec<Vec<f32>>> {
        for text in texts {
            self.validate(text.as_ref(), dimension, mode)?;
        }
        match mode {
            GenerationMode::Hash => self.hash.generate_batch(texts, dimension),
            GenerationMode::Model(path) => self.cache.with_model(path, |backend, model| {
                check_model_dimension(model.dimension(), dimension)?;
                texts
                    .iter()
                    .map(|text| backend.embed(model, text.as_ref()))
                    .collect()
            }),
        }
    }

    /// Release the cached model. Returns whether one was loaded.
    pub fn unload_model(&self) -> bool {
        self.cache.unload()
    }

    /// Whether a model is currently cached.
    pub fn is_model_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// Snapshot of the model cache.
    pub fn model_stats(&self) -> ModelCacheStats {
        self.cache.stats()
    }

    /// Dot product of two vectors of equal length.
    pub fn dot_product(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        vector::dot_product(a, b)
    }

    /// L2 norm of a vector.
    pub fn vector_norm(&self, v: &[f32]) -> f32 {
        vector::norm(v)
    }

    /// Unit-length copy of `v`. A zero vector is returned unchanged.
    pub fn normalize_vector(&self, v: &[f32]) -> Vec<f32> {
        vector::normalize(v)
    }

    /// Elementwise sum.
    pub fn add_vectors(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        vector::add(a, b)
    }

    /// Cosine similarity, `0.0` when either vector is zero.
    pub fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        vector::cosine_similarity(a, b)
    }

    fn validate(&self, text: &str, dimension: usize, mode: &GenerationMode) -> Result<()> {
        if dimension == 0 || dimension > self.config.max_dimension {
            return Err(EmbeddingError::InvalidDimension {
                dimension,
                max: self.config.max_dimension,
            });
        }
        if text.len() > self.config.max_text_bytes {
            return Err(EmbeddingError::TextTooLong {
                length: text.len(),
                max_length: self.config.max_text_bytes,
            });
        }
        match mode {
            GenerationMode::Hash if text.is_empty() => Err(EmbeddingError::EmptyText),
            GenerationMode::Hash => Ok(()),
            GenerationMode::Model(_) => match self.cache.backend().runtime().expected_dimension() {
                Some(supported) => check_model_dimension(supported, dimension),
                None => Ok(()),
            },
        }
    }
}

fn check_model_dimension(supported: usize, requested: usize) -> Result<()> {
    if supported == requested {
        Ok(())
    } else {
        Err(EmbeddingError::UnsupportedDimension {
            requested,
            supported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastembed_embeddings::{ErrorKind, hash_embed};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    /// Emits `dimension` copies of the text length.
    struct LengthRuntime;

    impl InferenceRuntime for LengthRuntime {
        type Session = ();

        fn name(&self) -> &str {
            "length"
        }

        fn load(&self, path: &Path) -> Result<()> {
            if path.ends_with("missing.onnx") {
                return Err(EmbeddingError::ModelNotFound(path.to_path_buf()));
            }
            Ok(())
        }

        fn infer(&self, _session: &mut (), text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32 + 1.0; 4])
        }

        fn unload(&self, _session: ()) {}

        fn dimension(&self, _session: &()) -> usize {
            4
        }

        fn expected_dimension(&self) -> Option<usize> {
            Some(4)
        }
    }

    fn embedder() -> Embedder<LengthRuntime> {
        Embedder::new(EngineConfig::default(), LengthRuntime)
    }

    fn model(path: &str) -> GenerationMode {
        GenerationMode::Model(PathBuf::from(path))
    }

    #[test]
    fn test_hash_mode_matches_hash_engine() {
        let embedder = embedder();
        let embedding = embedder
            .generate("Hello world", 64, &GenerationMode::Hash)
            .unwrap();
        assert_eq!(embedding, hash_embed("Hello world", 64).unwrap());
    }

    #[test]
    fn test_dimension_bounds() {
        let embedder = embedder();
        for dimension in [0, 2049] {
            let err = embedder
                .generate("text", dimension, &GenerationMode::Hash)
                .unwrap_err();
            assert!(matches!(err, EmbeddingError::InvalidDimension { .. }));
        }
        assert!(
            embedder
                .generate("text", 2048, &GenerationMode::Hash)
                .is_ok()
        );
    }

    #[test]
    fn test_text_bounds_apply_to_both_modes() {
        let embedder = embedder();
        let long = "a".repeat(8193);
        for mode in [GenerationMode::Hash, model("/models/a.onnx")] {
            let err = embedder.generate(&long, 4, &mode).unwrap_err();
            assert!(matches!(err, EmbeddingError::TextTooLong { .. }));
        }
        assert!(!embedder.is_model_loaded());
    }

    #[test]
    fn test_empty_text_only_rejected_for_hash() {
        let embedder = embedder();
        let err = embedder
            .generate("", 4, &GenerationMode::Hash)
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyText));

        let embedding = embedder.generate("", 4, &model("/models/a.onnx")).unwrap();
        assert_eq!(embedding.len(), 4);
    }

    #[test]
    fn test_model_mode_is_normalized() {
        let embedder = embedder();
        let embedding = embedder
            .generate("hello", 4, &model("/models/a.onnx"))
            .unwrap();
        assert!((embedder.vector_norm(&embedding) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_model_rejects_other_dimensions() {
        let embedder = embedder();
        let err = embedder
            .generate("hello", 8, &model("/models/a.onnx"))
            .unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::UnsupportedDimension {
                requested: 8,
                supported: 4
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_wrong_dimension_keeps_cached_model() {
        let embedder = embedder();
        embedder
            .generate("x", 4, &model("/models/a.onnx"))
            .unwrap();

        let err = embedder
            .generate("x", 8, &model("/models/b.onnx"))
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::UnsupportedDimension { .. }));

        let err = embedder
            .generate_batch(&["x", "y"], 8, &model("/models/b.onnx"))
            .unwrap_err();
        assert!(err.is_input_error());

        let stats = embedder.model_stats();
        assert_eq!(stats.loaded_path, Some(PathBuf::from("/models/a.onnx")));
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.unloads, 0);
    }

    #[test]
    fn test_missing_model_is_load_error() {
        let embedder = embedder();
        let err = embedder
            .generate("hello", 4, &model("/models/missing.onnx"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoad);
        assert!(!embedder.is_model_loaded());
    }

    #[test]
    fn test_batch_validates_everything_first() {
        let embedder = embedder();
        let texts = ["fine", "", "also fine"];
        let err = embedder
            .generate_batch(&texts, 16, &GenerationMode::Hash)
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyText));

        let long = "a".repeat(9000);
        let err = embedder
            .generate_batch(&["ok", long.as_str()], 4, &model("/models/a.onnx"))
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(!embedder.is_model_loaded());
    }

    #[test]
    fn test_batch_with_model_loads_once() {
        let embedder = embedder();
        let embeddings = embedder
            .generate_batch(&["a", "bb", "ccc"], 4, &model("/models/a.onnx"))
            .unwrap();
        assert_eq!(embeddings.len(), 3);
        assert_eq!(embedder.model_stats().loads, 1);
    }

    #[test]
    fn test_unload_model() {
        let embedder = embedder();
        assert!(!embedder.unload_model());
        embedder
            .generate("hello", 4, &model("/models/a.onnx"))
            .unwrap();
        assert!(embedder.unload_model());
        assert!(!embedder.is_model_loaded());
    }

    #[test]
    fn test_vector_operations() {
        let embedder = embedder();
        assert_eq!(embedder.dot_product(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), 11.0);
        assert_eq!(embedder.vector_norm(&[3.0, 4.0]), 5.0);
        assert_eq!(embedder.normalize_vector(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert_eq!(
            embedder.add_vectors(&[1.0, 2.0], &[3.0, 4.0]).unwrap(),
            vec![4.0, 6.0]
        );
        assert_eq!(embedder.cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]).unwrap(), 0.0);
        assert!(embedder.cosine_similarity(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_hash_only_cannot_load_models() {
        let embedder = Embedder::hash_only(EngineConfig::default());
        assert!(embedder.generate("hi", 8, &GenerationMode::Hash).is_ok());
        let err = embedder
            .generate("hi", 768, &model("/models/a.onnx"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoad);
    }

    #[test]
    fn test_generation_mode_serde() {
        assert_eq!(
            serde_json::to_string(&GenerationMode::Hash).unwrap(),
            r#"{"mode":"hash"}"#
        );
        let mode: GenerationMode =
            serde_json::from_str(r#"{"mode":"model","path":"/m.onnx"}"#).unwrap();
        assert_eq!(mode, model("/m.onnx"));
    }
}
