//! Model backend.
//!
//! The inference runtime is an external collaborator reached through
//! [`InferenceRuntime`]: load a model, run one forward pass, unload.
//! [`ModelBackend`] adds the post-processing every runtime shares:
//! dimension checking and L2 normalization.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::vector::normalize_in_place;

/// Contract the core needs from an inference runtime.
pub trait InferenceRuntime: Send + Sync {
    /// A loaded inference session.
    type Session: Send;

    /// Name of this runtime, for diagnostics.
    fn name(&self) -> &str;

    /// Load the model at `path`.
    ///
    /// Fails with [`EmbeddingError::ModelNotFound`] or
    /// [`EmbeddingError::ModelLoad`].
    fn load(&self, path: &Path) -> Result<Self::Session>;

    /// Run one forward pass and return the pooled, unnormalized vector.
    ///
    /// Fails with [`EmbeddingError::Inference`], or
    /// [`EmbeddingError::SessionInvalidated`] when the session is unusable.
    fn infer(&self, session: &mut Self::Session, text: &str) -> Result<Vec<f32>>;

    /// Release a session.
    fn unload(&self, session: Self::Session);

    /// Dimension of the vectors `session` produces.
    fn dimension(&self, session: &Self::Session) -> usize;

    /// Dimension every model will produce, if known without loading one.
    fn expected_dimension(&self) -> Option<usize> {
        None
    }
}

/// A model loaded by a runtime, tagged with where it came from.
pub struct LoadedModel<S> {
    session: S,
    path: PathBuf,
    dimension: usize,
}

impl<S> LoadedModel<S> {
    /// Path the model was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dimension of the vectors this model produces.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl<S> fmt::Debug for LoadedModel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("path", &self.path)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

/// Runs text through a model and post-processes the result.
pub struct ModelBackend<R> {
    runtime: R,
}

impl<R: InferenceRuntime> ModelBackend<R> {
    /// Create a backend over `runtime`.
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// The underlying runtime.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Load the model at `path`.
    pub fn load(&self, path: &Path) -> Result<LoadedModel<R::Session>> {
        let session = self.runtime.load(path)?;
        let dimension = self.runtime.dimension(&session);
        debug!(
            runtime = self.runtime.name(),
            path = %path.display(),
            dimension,
            "model loaded"
        );
        Ok(LoadedModel {
            session,
            path: path.to_path_buf(),
            dimension,
        })
    }

    /// Embed `text` with `model`, returning a unit-length vector.
    ///
    /// Empty text is passed to the runtime as is.
    pub fn embed(&self, model: &mut LoadedModel<R::Session>, text: &str) -> Result<Vec<f32>> {
        let mut embedding = self.runtime.infer(&mut model.session, text)?;

        if embedding.len() != model.dimension {
            return Err(EmbeddingError::Inference(format!(
                "model produced {} values, expected {}",
                embedding.len(),
                model.dimension
            )));
        }

        normalize_in_place(&mut embedding);
        Ok(embedding)
    }

    /// Release `model`. Taking it by value makes a second release impossible.
    pub fn release(&self, model: LoadedModel<R::Session>) {
        debug!(path = %model.path.display(), "releasing model");
        self.runtime.unload(model.session);
    }
}

/// Runtime used when no inference runtime is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRuntime;

impl InferenceRuntime for UnavailableRuntime {
    type Session = ();

    fn name(&self) -> &str {
        "unavailable"
    }

    fn load(&self, path: &Path) -> Result<Self::Session> {
        Err(EmbeddingError::ModelLoad(format!(
            "no inference runtime available to load {}; build with the `ort` feature",
            path.display()
        )))
    }

    fn infer(&self, _session: &mut Self::Session, _text: &str) -> Result<Vec<f32>> {
        Err(EmbeddingError::SessionInvalidated(
            "no inference runtime available".to_string(),
        ))
    }

    fn unload(&self, _session: Self::Session) {}

    fn dimension(&self, _session: &Self::Session) -> usize {
        0
    }
}
