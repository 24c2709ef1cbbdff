//! Glue service configuration and pid handle.

use serde::{Deserialize, Serialize};

/// One chain entry routed by the glue service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueChain {
    /// Numeric chain id.
    pub id: u64,
    /// Local fork RPC URL.
    pub rpc: String,
}

/// Document written to `glueConfig.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueConfig {
    pub chains: Vec<GlueChain>,
}

/// Pid of the singleton glue process, persisted in `glue.pid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueHandle {
    pub pid: i32,
}
