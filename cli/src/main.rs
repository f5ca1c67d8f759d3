use std::io;
use std::process::ExitCode;

use clap::Parser;
use fastembed_cli::Cli;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries results, so logs go to stderr.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    match fastembed_cli::run(cli, &mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = serde_json::json!({ "error": format!("{err:#}") });
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
