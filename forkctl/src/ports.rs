//! Local port allocation for new forks.

use std::collections::HashSet;

use crate::error::{ForkError, Result};

/// Port tried first when the caller doesn't ask for one.
pub const DEFAULT_PORT: u16 = 8545;

/// Lowest port at or above `requested` (or [`DEFAULT_PORT`]) not in `in_use`.
pub fn next_free_port(requested: Option<u16>, in_use: &HashSet<u16>) -> Result<u16> {
    let start = requested.unwrap_or(DEFAULT_PORT);
    let mut candidate = start;
    while in_use.contains(&candidate) {
        candidate = candidate
            .checked_add(1)
            .ok_or(ForkError::PortsExhausted { start })?;
    }
    Ok(candidate)
}
