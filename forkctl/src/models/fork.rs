//! Fork record representing one running chain fork process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A running fork process.
///
/// Records are replaced whole, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkRecord {
    /// Chain alias the fork serves.
    pub chain: String,
    /// Local RPC port.
    pub port: u16,
    /// OS process id of the fork.
    pub pid: i32,
    /// When the fork was spawned, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl ForkRecord {
    /// Create a record stamped with the current time.
    pub fn new(chain: impl Into<String>, port: u16, pid: i32) -> Self {
        Self {
            chain: chain.into(),
            port,
            pid,
            started_at: Some(Utc::now()),
        }
    }

    /// Local RPC URL the glue service should route to.
    pub fn local_rpc(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl std::fmt::Display for ForkRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chain: {} - port: {} - pid: {}",
            self.chain, self.port, self.pid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_records_without_timestamp() {
        let record: ForkRecord =
            serde_json::from_str(r#"{"chain":"ethereum","port":8545,"pid":42}"#).unwrap();
        assert_eq!(record.chain, "ethereum");
        assert_eq!(record.port, 8545);
        assert_eq!(record.pid, 42);
        assert!(record.started_at.is_none());
    }

    #[test]
    fn test_omits_missing_timestamp() {
        let record = ForkRecord {
            chain: "base".to_string(),
            port: 8546,
            pid: 7,
            started_at: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"chain":"base","port":8546,"pid":7}"#);
    }

    #[test]
    fn test_display_and_rpc() {
        let record = ForkRecord::new("ethereum", 8545, 123);
        assert_eq!(record.to_string(), "chain: ethereum - port: 8545 - pid: 123");
        assert_eq!(record.local_rpc(), "http://127.0.0.1:8545");
    }
}
