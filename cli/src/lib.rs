//! `fastembed` command line tool.
//!
//! Machine-readable output only: results go to stdout as JSON, logs and
//! errors go to stderr.

pub mod cli;
pub mod vector_op;

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use fastembed_engine::{Embedder, EngineConfig, GenerationMode};
use tracing::debug;

pub use cli::{Cli, Command};
pub use vector_op::{VectorOp, VectorRequest, VectorResponse, VectorValue};

#[cfg(feature = "ort")]
type Runtime = fastembed_engine::OrtRuntime;

#[cfg(not(feature = "ort"))]
type Runtime = fastembed_engine::UnavailableRuntime;

#[cfg(feature = "ort")]
fn runtime(config: &EngineConfig) -> Runtime {
    fastembed_engine::OrtRuntime::new(config.model.clone())
}

#[cfg(not(feature = "ort"))]
fn runtime(_config: &EngineConfig) -> Runtime {
    fastembed_engine::UnavailableRuntime
}

/// Run one command, reading from `input` and writing results to `output`.
pub fn run(cli: Cli, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let embedder = Embedder::new(config.clone(), runtime(&config));

    match cli.command {
        Command::Generate {
            text,
            dimension,
            model,
        } => {
            let text = match text {
                Some(text) => text,
                None => read_first_line(input)?,
            };
            let (mode, default_dimension) = match model {
                Some(path) => (GenerationMode::Model(path), config.model.dimension),
                None => (GenerationMode::Hash, config.default_dimension),
            };
            let dimension = dimension.unwrap_or(default_dimension);
            debug!(?mode, dimension, "generating embedding");

            let embedding = embedder.generate(&text, dimension, &mode)?;
            serde_json::to_writer(&mut *output, &embedding)?;
        }
        Command::Vector => {
            let mut body = String::new();
            input.read_to_string(&mut body)?;
            let request: VectorRequest =
                serde_json::from_str(&body).context("invalid vector request")?;
            let response = request.apply(&embedder)?;
            serde_json::to_writer(&mut *output, &response)?;
        }
    }

    writeln!(output)?;
    Ok(())
}

fn read_first_line(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read stdin")?;
    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}
