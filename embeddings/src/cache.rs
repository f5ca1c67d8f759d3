//! Single-slot cache for a loaded model.
//!
//! At most one model is resident. Asking for a different path evicts
//! the current model before loading the new one. Every load, unload and
//! inference runs under one lock, so a model swap can never overlap an
//! inference call on the old session.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{InferenceRuntime, LoadedModel, ModelBackend};
use crate::error::{EmbeddingError, Result};

struct Slot<S> {
    model: Option<LoadedModel<S>>,
    loads: u64,
    unloads: u64,
}

/// Cache holding at most one loaded model.
pub struct ModelCache<R: InferenceRuntime> {
    backend: ModelBackend<R>,
    slot: Mutex<Slot<R::Session>>,
}

impl<R: InferenceRuntime> ModelCache<R> {
    /// Create an empty cache over `runtime`.
    pub fn new(runtime: R) -> Self {
        Self {
            backend: ModelBackend::new(runtime),
            slot: Mutex::new(Slot {
                model: None,
                loads: 0,
                unloads: 0,
            }),
        }
    }

    /// The backend used to load and run models.
    pub fn backend(&self) -> &ModelBackend<R> {
        &self.backend
    }

    /// Run `f` against the model at `path`, loading it first if needed.
    ///
    /// If another model is resident it is released before the load. A
    /// failed load leaves the cache empty and `f` is not called. If `f`
    /// fails with an error that invalidates the session, the model is
    /// evicted.
    pub fn with_model<T, F>(&self, path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&ModelBackend<R>, &mut LoadedModel<R::Session>) -> Result<T>,
    {
        let key = cache_key(path)?;
        let mut slot = self.slot.lock();

        let cached = slot.model.as_ref().is_some_and(|model| model.path() == key.as_path());
        if cached {
            debug!(path = %key.display(), "reusing cached model");
        } else {
            if let Some(old) = slot.model.take() {
                info!(
                    old = %old.path().display(),
                    new = %key.display(),
                    "evicting cached model"
                );
                self.backend.release(old);
                slot.unloads += 1;
            }
            let model = self.backend.load(&key)?;
            slot.loads += 1;
            info!(path = %key.display(), dimension = model.dimension(), "model cached");
            slot.model = Some(model);
        }

        let Some(model) = slot.model.as_mut() else {
            return Err(EmbeddingError::ModelLoad(format!(
                "model {} is not resident",
                key.display()
            )));
        };

        let result = f(&self.backend, model);

        if let Err(err) = &result {
            if err.invalidates_session() {
                if let Some(model) = slot.model.take() {
                    warn!(path = %model.path().display(), "evicting invalidated model: {err}");
                    self.backend.release(model);
                    slot.unloads += 1;
                }
            }
        }

        result
    }

    /// Release the resident model, if any. Returns whether one was released.
    pub fn unload(&self) -> bool {
        let mut slot = self.slot.lock();
        match slot.model.take() {
            Some(model) => {
                info!(path = %model.path().display(), "unloading model");
                self.backend.release(model);
                slot.unloads += 1;
                true
            }
            None => false,
        }
    }

    /// Whether a model is resident.
    pub fn is_loaded(&self) -> bool {
        self.slot.lock().model.is_some()
    }

    /// Path of the resident model.
    pub fn loaded_path(&self) -> Option<PathBuf> {
        self.slot
            .lock()
            .model
            .as_ref()
            .map(|model| model.path().to_path_buf())
    }

    /// Snapshot of the cache state.
    pub fn stats(&self) -> ModelCacheStats {
        let slot = self.slot.lock();
        ModelCacheStats {
            loaded_path: slot.model.as_ref().map(|m| m.path().to_path_buf()),
            dimension: slot.model.as_ref().map(LoadedModel::dimension),
            loads: slot.loads,
            unloads: slot.unloads,
        }
    }
}

impl<R: InferenceRuntime> Drop for ModelCache<R> {
    fn drop(&mut self) {
        if let Some(model) = self.slot.get_mut().model.take() {
            self.backend.release(model);
        }
    }
}

/// Statistics about the model cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCacheStats {
    /// Path of the resident model.
    pub loaded_path: Option<PathBuf>,

    /// Dimension of the resident model.
    pub dimension: Option<usize>,

    /// Successful loads since creation.
    pub loads: u64,

    /// Releases since creation, by unload, eviction or invalidation.
    pub unloads: u64,
}

/// Absolutize `path` lexically so equivalent spellings share one entry.
fn cache_key(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(EmbeddingError::InvalidArgument(
            "model path is empty".to_string(),
        ));
    }
    path.absolutize()
        .map(Cow::into_owned)
        .map_err(|e| EmbeddingError::ModelLoad(format!("cannot resolve {}: {e}", path.display())))
}
