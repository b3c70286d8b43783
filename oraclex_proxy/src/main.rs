#![deny(clippy::unwrap_used, clippy::expect_used)]

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use oraclex_proxy::cli::{run, Args};

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_writer(std::io::stderr)
        .init();

    let outcome = run(&args, std::io::stdin().lock(), &mut std::io::stdout().lock())?;
    Ok(outcome.into())
}
