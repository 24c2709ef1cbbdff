//! Process supervision: detached spawning, liveness probes and termination.
//!
//! Nothing in here knows about chains or forks; callers hand over a command
//! and get a pid back.

mod signal;
mod spawn;

use crate::error::Result;

pub use signal::{is_alive, terminate};
pub use spawn::{spawn_detached, ProcessOptions};

/// Operations on OS processes needed by the registry and the glue service.
pub trait Supervisor: Send + Sync {
    /// Launch a detached process and return its pid.
    fn spawn(&self, options: &ProcessOptions) -> Result<i32>;

    /// Whether `pid` is currently a live, signalable process.
    fn is_alive(&self, pid: i32) -> bool;

    /// Kill `pid` without confirming it exited.
    fn terminate(&self, pid: i32);
}

/// Supervisor backed by the real OS process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSupervisor;

impl Supervisor for OsSupervisor {
    fn spawn(&self, options: &ProcessOptions) -> Result<i32> {
        spawn_detached(options)
    }

    fn is_alive(&self, pid: i32) -> bool {
        is_alive(pid)
    }

    fn terminate(&self, pid: i32) {
        terminate(pid);
    }
}

#[cfg(test)]
pub use fake::FakeSupervisor;
