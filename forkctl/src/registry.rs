//! Registry of running forks, backed by `runningForks.json`.
//!
//! The in-memory table is hydrated from disk at most once per registry and
//! reconciled against OS process liveness on every [`ForkRegistry::load`], so
//! each command sees which forks are actually still running.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::models::ForkRecord;
use crate::process::Supervisor;
use crate::store;

/// Alias-keyed table of running forks.
pub struct ForkRegistry {
    path: PathBuf,
    supervisor: Arc<dyn Supervisor>,
    forks: BTreeMap<String, ForkRecord>,
    hydrated: bool,
}

impl ForkRegistry {
    /// Create an empty registry backed by `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>, supervisor: Arc<dyn Supervisor>) -> Self {
        Self {
            path: path.into(),
            supervisor,
            forks: BTreeMap::new(),
            hydrated: false,
        }
    }

    /// Hydrate on first use, then drop every entry whose process is gone.
    pub async fn load(&mut self) -> &BTreeMap<String, ForkRecord> {
        if !self.hydrated {
            let stored: BTreeMap<String, ForkRecord> = store::read_json_if_exists(&self.path)
                .await
                .unwrap_or_default();
            for (chain, record) in stored {
                self.forks.entry(chain).or_insert(record);
            }
            self.hydrated = true;
        }

        self.reconcile();
        &self.forks
    }

    fn reconcile(&mut self) {
        let supervisor = Arc::clone(&self.supervisor);
        self.forks.retain(|chain, record| {
            let alive = supervisor.is_alive(record.pid);
            if !alive {
                tracing::info!(chain = %chain, pid = record.pid, "fork does not exist, removing");
            }
            alive
        });
    }

    pub fn get(&self, chain: &str) -> Option<&ForkRecord> {
        self.forks.get(chain)
    }

    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }

    /// Insert or replace the record for `chain`.
    pub fn upsert(&mut self, chain: impl Into<String>, record: ForkRecord) {
        self.forks.insert(chain.into(), record);
    }

    /// Remove and return the record for `chain`, if any.
    pub fn remove(&mut self, chain: &str) -> Option<ForkRecord> {
        self.forks.remove(chain)
    }

    /// Ports held by records in the table.
    pub fn ports_in_use(&self) -> HashSet<u16> {
        self.forks.values().map(|record| record.port).collect()
    }

    /// Reconcile, then overwrite the backing file with the whole table.
    pub async fn persist(&mut self) -> Result<()> {
        self.load().await;
        store::write_json(&self.path, &self.forks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::FakeSupervisor;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_forks(path: &Path, forks: &[ForkRecord]) {
        let map: BTreeMap<_, _> = forks.iter().map(|f| (f.chain.clone(), f.clone())).collect();
        std::fs::write(path, serde_json::to_string(&map).unwrap()).unwrap();
    }

    fn record(chain: &str, port: u16, pid: i32) -> ForkRecord {
        ForkRecord {
            chain: chain.to_string(),
            port,
            pid,
            started_at: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let supervisor = Arc::new(FakeSupervisor::new());
        let mut registry = ForkRegistry::new(dir.path().join("runningForks.json"), supervisor);

        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_drops_dead_forks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runningForks.json");
        write_forks(&path, &[record("ethereum", 8545, 11), record("base", 8546, 12)]);

        let supervisor = Arc::new(FakeSupervisor::new());
        supervisor.add_alive(11);
        let mut registry = ForkRegistry::new(&path, supervisor);

        let forks = registry.load().await;
        assert_eq!(forks.len(), 1);
        assert!(forks.contains_key("ethereum"));
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runningForks.json");
        write_forks(&path, &[record("ethereum", 8545, 11), record("base", 8546, 12)]);

        let supervisor = Arc::new(FakeSupervisor::new());
        supervisor.add_alive(11);
        supervisor.add_alive(12);
        let mut registry = ForkRegistry::new(&path, supervisor);

        let first = registry.load().await.clone();
        let second = registry.load().await.clone();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_reconciles_on_every_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runningForks.json");
        write_forks(&path, &[record("ethereum", 8545, 11)]);

        let supervisor = Arc::new(FakeSupervisor::new());
        supervisor.add_alive(11);
        let mut registry = ForkRegistry::new(&path, Arc::clone(&supervisor) as Arc<dyn Supervisor>);

        assert_eq!(registry.load().await.len(), 1);
        supervisor.kill_externally(11);
        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_persist_omits_dead_fork() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runningForks.json");
        write_forks(&path, &[record("ethereum", 8545, 11), record("base", 8546, 12)]);

        let supervisor = Arc::new(FakeSupervisor::new());
        supervisor.add_alive(12);
        let mut registry = ForkRegistry::new(&path, supervisor);
        registry.persist().await.unwrap();

        let on_disk: BTreeMap<String, ForkRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert!(!on_disk.contains_key("ethereum"));
        assert_eq!(on_disk["base"].port, 8546);
    }

    #[tokio::test]
    async fn test_hydration_keeps_in_memory_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runningForks.json");
        write_forks(&path, &[record("ethereum", 8545, 11)]);

        let supervisor = Arc::new(FakeSupervisor::new());
        supervisor.add_alive(11);
        supervisor.add_alive(21);
        let mut registry = ForkRegistry::new(&path, supervisor);

        registry.upsert("ethereum", record("ethereum", 9000, 21));
        let forks = registry.load().await;
        assert_eq!(forks["ethereum"].pid, 21);
        assert_eq!(forks["ethereum"].port, 9000);
    }

    #[tokio::test]
    async fn test_hydrates_only_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runningForks.json");

        let supervisor = Arc::new(FakeSupervisor::new());
        supervisor.add_alive(11);
        let mut registry = ForkRegistry::new(&path, supervisor);
        assert!(registry.load().await.is_empty());

        write_forks(&path, &[record("ethereum", 8545, 11)]);
        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_remove_and_ports() {
        let dir = TempDir::new().unwrap();
        let supervisor = Arc::new(FakeSupervisor::new());
        let mut registry = ForkRegistry::new(dir.path().join("runningForks.json"), supervisor);

        registry.upsert("ethereum", record("ethereum", 8545, 11));
        registry.upsert("base", record("base", 8546, 12));
        assert_eq!(registry.ports_in_use(), HashSet::from([8545, 8546]));

        assert_eq!(registry.remove("base").map(|r| r.pid), Some(12));
        assert!(registry.remove("base").is_none());
        assert_eq!(registry.ports_in_use(), HashSet::from([8545]));
    }
}
