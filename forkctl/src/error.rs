//! Error taxonomy for fork and glue management.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the registry, supervisor and glue publisher.
///
/// Liveness probe failures are deliberately absent: they are logged and
/// resolved as "not alive" instead of aborting a command.
#[derive(Debug, Error)]
pub enum ForkError {
    /// A live fork already exists for this chain.
    #[error("{chain} fork already exists (pid {pid}, port {port})")]
    AlreadyRunning { chain: String, pid: i32, port: u16 },

    /// The same chain was requested twice in one invocation.
    #[error("chain {0} was requested more than once")]
    DuplicateChain(String),

    /// The alias has no chain id in the directory.
    #[error("unknown chain alias: {0}")]
    UnknownChain(String),

    /// No upstream RPC configured for the chain.
    #[error("no rpc found for {chain}: set {var}")]
    MissingRpc { chain: String, var: String },

    /// The command line had no program to run.
    #[error("cannot spawn an empty command line")]
    EmptyCommand,

    /// The OS refused to launch the program.
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process launched but no usable pid came back.
    #[error("no pid for `{command}`")]
    NoPid { command: String },

    /// Every port from the starting point upward is taken.
    #[error("no free port at or above {start}")]
    PortsExhausted { start: u16 },

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ForkError {
    /// Whether the error is the caller's mistake rather than a fault.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::AlreadyRunning { .. } | Self::DuplicateChain(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ForkError> = std::result::Result<T, E>;
