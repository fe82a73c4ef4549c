// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tracing setup
//!
//! The library only emits `tracing` events. Test binaries and embedding
//! applications call [`init_tracing`] once to get formatted output filtered
//! by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered by `RUST_LOG` (default `info`)
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
