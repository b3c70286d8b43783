//! `oraclex-proxy` command line: argument types and dispatch.
//!
//! `main` only parses arguments and installs the log subscriber; everything
//! else runs through [`run`] so it can be driven with in-memory IO.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use oraclex_core::{verify_commitment, Probability, ResolverCfg};

use crate::adapter::{handle, render};

#[derive(Debug, Parser)]
#[command(name = "oraclex-proxy")]
#[command(about = "Deterministic OracleX resolver: JSON request on stdin, resolution on stdout")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Read the request from a file instead of stdin.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Fill a missing timestamp with the current time (not reproducible).
    #[arg(long)]
    pub allow_clock_fallback: bool,

    /// Indent the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Log filter (logs go to stderr).
    #[arg(long, default_value = "warn")]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that an aiHash commits to the given probability and explanation.
    Verify {
        #[arg(long)]
        probability: u8,
        #[arg(long)]
        explanation: String,
        #[arg(long)]
        ai_hash: String,
    },
}

/// How a run ended. Maps onto the process exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Success envelope, or a commitment that verified.
    Success,
    /// Error envelope, or a commitment that did not verify.
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(o: Outcome) -> Self {
        match o {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

impl Args {
    pub fn resolver_cfg(&self) -> ResolverCfg {
        if self.allow_clock_fallback {
            ResolverCfg::with_clock_fallback()
        } else {
            ResolverCfg::default()
        }
    }
}

/// Execute one invocation. `stdin` is read only when no subcommand and no
/// `--input` file are given. Exactly one line of JSON goes to `out`.
///
/// `Err` is reserved for IO failures (unreadable input file, closed stdout);
/// malformed requests come back as an error envelope with `Outcome::Failure`.
pub fn run<R, W>(args: &Args, mut stdin: R, out: &mut W) -> io::Result<Outcome>
where
    R: Read,
    W: Write,
{
    if let Some(Command::Verify {
        probability,
        explanation,
        ai_hash,
    }) = &args.command
    {
        let valid = Probability::new(*probability)
            .map(|p| verify_commitment(p, explanation, ai_hash))
            .unwrap_or(false);
        writeln!(out, "{}", serde_json::json!({ "valid": valid }))?;
        out.flush()?;
        return Ok(if valid { Outcome::Success } else { Outcome::Failure });
    }

    let input = match &args.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            stdin.read_to_end(&mut buf)?;
            buf
        }
    };

    let envelope = handle(&input, &args.resolver_cfg());
    writeln!(out, "{}", render(&envelope, args.pretty))?;
    out.flush()?;

    Ok(if envelope.is_error() { Outcome::Failure } else { Outcome::Success })
}
