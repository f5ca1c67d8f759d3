//! Process-wide embedder behind the C entry points.

use std::sync::OnceLock;

use fastembed_engine::{Embedder, EngineConfig};
use tracing::{debug, warn};

/// Environment variable naming a TOML configuration file.
pub const CONFIG_ENV: &str = "FASTEMBED_CONFIG";

#[cfg(feature = "ort")]
pub(crate) type Runtime = fastembed_engine::OrtRuntime;

#[cfg(not(feature = "ort"))]
pub(crate) type Runtime = fastembed_engine::UnavailableRuntime;

static EMBEDDER: OnceLock<Embedder<Runtime>> = OnceLock::new();

/// The shared embedder, created on first use.
pub(crate) fn embedder() -> &'static Embedder<Runtime> {
    EMBEDDER.get_or_init(|| {
        let config = load_config();
        let runtime = runtime(&config);
        Embedder::new(config, runtime)
    })
}

fn load_config() -> EngineConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV) else {
        return EngineConfig::default();
    };
    match EngineConfig::load(&path) {
        Ok(config) => {
            debug!(path = ?path, "using configuration from {CONFIG_ENV}");
            config
        }
        Err(err) => {
            warn!(path = ?path, "ignoring unreadable configuration: {err}");
            EngineConfig::default()
        }
    }
}

#[cfg(feature = "ort")]
fn runtime(config: &EngineConfig) -> Runtime {
    fastembed_engine::OrtRuntime::new(config.model.clone())
}

#[cfg(not(feature = "ort"))]
fn runtime(_config: &EngineConfig) -> Runtime {
    fastembed_engine::UnavailableRuntime
}
