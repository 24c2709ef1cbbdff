//! Diagnostic logging setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber filtered by `filter`.
///
/// An unparsable filter falls back to `info`. Command output goes to stdout
/// separately, so diagnostics never interleave with `list-forks --json`.
pub fn init(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
