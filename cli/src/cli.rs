//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Generate text embeddings and operate on vectors.
#[derive(Debug, Parser)]
#[command(name = "fastembed", version, about)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Embed text and print the vector as a JSON array.
    Generate {
        /// Text to embed. Read from the first line of stdin when omitted.
        text: Option<String>,

        /// Embedding dimension.
        #[arg(short, long)]
        dimension: Option<usize>,

        /// ONNX model to embed with instead of the hash backend.
        #[arg(short, long, value_name = "PATH")]
        model: Option<PathBuf>,
    },

    /// Read a JSON vector request from stdin and print the result.
    Vector,
}

impl Cli {
    /// Default log filter for the verbosity flag.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
