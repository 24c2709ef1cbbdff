//! Glue service: routing config generation and process lifecycle.
//!
//! The glue process aggregates every fork's RPC endpoint behind one
//! interface keyed by chain id. Its config is a pure projection of the fork
//! registry and is rewritten from scratch on every change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chains::ChainDirectory;
use crate::config::Settings;
use crate::error::Result;
use crate::models::{ForkRecord, GlueChain, GlueConfig, GlueHandle};
use crate::process::{ProcessOptions, Supervisor};
use crate::store;

/// Project the fork table into a glue config.
///
/// Fails without producing anything if any fork's chain has no chain id.
pub fn build_config(
    forks: &BTreeMap<String, ForkRecord>,
    chains: &ChainDirectory,
) -> Result<GlueConfig> {
    let entries = forks
        .values()
        .map(|fork| {
            Ok(GlueChain {
                id: chains.id_of(&fork.chain)?,
                rpc: fork.local_rpc(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(GlueConfig { chains: entries })
}

/// Build the glue config and write it to `path`, replacing prior content.
pub async fn publish(
    path: &Path,
    forks: &BTreeMap<String, ForkRecord>,
    chains: &ChainDirectory,
) -> Result<GlueConfig> {
    let config = build_config(forks, chains)?;
    store::write_json(path, &config).await?;
    tracing::debug!(path = %path.display(), chains = config.chains.len(), "wrote glue config");
    Ok(config)
}

/// Lifecycle of the singleton glue process.
pub struct GlueService {
    command: String,
    log_file: PathBuf,
    pid_file: PathBuf,
    supervisor: Arc<dyn Supervisor>,
}

impl GlueService {
    pub fn new(settings: &Settings, supervisor: Arc<dyn Supervisor>) -> Self {
        Self {
            command: settings.glue_cmd.clone(),
            log_file: settings.glue_log(),
            pid_file: settings.glue_pid_file(),
            supervisor,
        }
    }

    /// The persisted handle, if its process is still alive.
    pub async fn status(&self) -> Option<GlueHandle> {
        let handle: GlueHandle = store::read_json_if_exists::<Option<GlueHandle>>(&self.pid_file)
            .await
            .flatten()?;
        self.supervisor.is_alive(handle.pid).then_some(handle)
    }

    /// Kill the glue process if running and forget its handle.
    ///
    /// Returns whether a live process was signalled.
    pub async fn stop(&self) -> Result<bool> {
        let stopped = match self.status().await {
            Some(handle) => {
                tracing::info!(pid = handle.pid, "stopping glue service");
                self.supervisor.terminate(handle.pid);
                true
            }
            None => false,
        };
        store::remove_if_exists(&self.pid_file).await?;
        Ok(stopped)
    }

    /// Stop any running glue process and start a fresh one.
    ///
    /// Returns once the new process has a pid; readiness is not awaited.
    pub async fn restart(&self) -> Result<GlueHandle> {
        self.stop().await?;

        let options = ProcessOptions::from_command_line(&self.command)?.log_file(&self.log_file);
        let pid = self.supervisor.spawn(&options)?;
        let handle = GlueHandle { pid };
        store::write_json(&self.pid_file, &handle).await?;

        tracing::info!(pid, "started glue service");
        Ok(handle)
    }
}
