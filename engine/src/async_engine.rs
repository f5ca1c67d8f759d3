//! Async wrapper around [`Embedder`].
//!
//! Model loads and inference block for their natural duration, so every
//! call is moved onto tokio's blocking pool.

use std::sync::Arc;

use fastembed_embeddings::{InferenceRuntime, ModelCacheStats};

use crate::engine::{Embedder, GenerationMode};
use crate::error::{EngineError, Result};

/// Shares one [`Embedder`] across async tasks.
pub struct AsyncEmbedder<R: InferenceRuntime> {
    inner: Arc<Embedder<R>>,
}

impl<R: InferenceRuntime> Clone for AsyncEmbedder<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: InferenceRuntime + 'static> AsyncEmbedder<R> {
    /// Wrap an embedder.
    pub fn new(embedder: Embedder<R>) -> Self {
        Self {
            inner: Arc::new(embedder),
        }
    }

    /// The shared synchronous embedder.
    pub fn inner(&self) -> &Arc<Embedder<R>> {
        &self.inner
    }

    /// Generate one embedding on the blocking pool.
    pub async fn generate(
        &self,
        text: impl Into<String>,
        dimension: usize,
        mode: GenerationMode,
    ) -> Result<Vec<f32>> {
        let text = text.into();
        self.run(move |embedder| embedder.generate(&text, dimension, &mode))
            .await
    }

    /// Generate several embeddings on the blocking pool.
    pub async fn generate_batch(
        &self,
        texts: Vec<String>,
        dimension: usize,
        mode: GenerationMode,
    ) -> Result<Vec<Vec<f32>>> {
        self.run(move |embedder| embedder.generate_batch(&texts, dimension, &mode))
            .await
    }

    /// Release the cached model.
    pub async fn unload_model(&self) -> Result<bool> {
        self.run(|embedder| Ok(embedder.unload_model())).await
    }

    /// Snapshot of the model cache.
    pub fn model_stats(&self) -> ModelCacheStats {
        self.inner.model_stats()
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Embedder<R>) -> fastembed_embeddings::Result<T> + Send + 'static,
    {
        let embedder = Arc::clone(&self.inner);
        let result = tokio::task::spawn_blocking(move || f(&embedder))
            .await
            .map_err(|e| EngineError::Task(e.to_string()))?;
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use fastembed_embeddings::{EmbeddingError, hash_embed};
    use pretty_assertions::assert_eq;

    fn embedder() -> AsyncEmbedder<fastembed_embeddings::UnavailableRuntime> {
        AsyncEmbedder::new(Embedder::hash_only(EngineConfig::default()))
    }

    #[tokio::test]
    async fn test_generate() {
        let embedder = embedder();
        let embedding = embedder
            .generate("Hello world", 32, GenerationMode::Hash)
            .await
            .unwrap();
        assert_eq!(embedding, hash_embed("Hello world", 32).unwrap());
    }

    #[tokio::test]
    async fn test_errors_keep_their_type() {
        let embedder = embedder();
        let err = embedder
            .generate("", 32, GenerationMode::Hash)
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_embedding(),
            Some(EmbeddingError::EmptyText)
        ));
    }

    #[tokio::test]
    async fn test_batch_and_unload() {
        let embedder = embedder();
        let texts = vec!["one".to_string(), "two".to_string()];
        let embeddings = embedder
            .generate_batch(texts, 8, GenerationMode::Hash)
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!(!embedder.unload_model().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks() {
        let embedder = embedder();
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let embedder = embedder.clone();
                tokio::spawn(async move {
                    embedder
                        .generate(format!("text {i}"), 16, GenerationMode::Hash)
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().len(), 16);
        }
    }
}
