//! oraclex_proxy
//!
//! Outside-world facing layer for `oraclex_core`.
//!
//! Responsibilities:
//! - turn raw request bytes into pipeline input and format the response envelope
//! - keep per-market commitments (one per market) with snapshot/restore
//! - argument parsing and dispatch for the `oraclex-proxy` binary
//!
//! Non-goals:
//! - no network IO
//! - no persistence (snapshots are plain data)
//! - no derivation logic (lives in core)

pub mod adapter;
pub mod cli;
pub mod registry;

pub use adapter::{
    Envelope,
    parse_request,
    handle,
    handle_to_string,
    render,
};

pub use registry::{
    CommitmentRegistry,
    CommitRecord,
    CommitOutcome,
    RegistryError,
    RegistryResult,
    RegistrySnapshot,
    RestoreStats,
    market_key,
};
