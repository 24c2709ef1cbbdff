//! CLI command execution.
//!
//! Every command reconciles the fork registry first. Commands that change
//! the fork set regenerate the glue config, restart (or stop) the glue
//! service and persist the registry before returning.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::chains::ChainDirectory;
use crate::config::Settings;
use crate::error::ForkError;
use crate::glue::{self, GlueService};
use crate::models::{ForkRecord, GlueHandle};
use crate::ports::next_free_port;
use crate::process::{OsSupervisor, ProcessOptions, Supervisor};
use crate::registry::ForkRegistry;

use super::args::{Cli, Commands};

impl From<&Cli> for Settings {
    fn from(cli: &Cli) -> Self {
        let state_dir = cli.state_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        Self::new(state_dir)
            .with_fork_bin(cli.fork_bin.clone())
            .with_glue_cmd(cli.glue_cmd.clone())
    }
}

/// Collaborators shared by every command in one invocation.
pub struct Context {
    pub settings: Settings,
    pub chains: ChainDirectory,
    pub supervisor: Arc<dyn Supervisor>,
}

impl Context {
    pub fn new(settings: Settings, chains: ChainDirectory, supervisor: Arc<dyn Supervisor>) -> Self {
        Self {
            settings,
            chains,
            supervisor,
        }
    }

    fn registry(&self) -> ForkRegistry {
        ForkRegistry::new(self.settings.forks_file(), Arc::clone(&self.supervisor))
    }

    fn glue(&self) -> GlueService {
        GlueService::new(&self.settings, Arc::clone(&self.supervisor))
    }
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let settings = Settings::from(&cli);
    let ctx = Context::new(settings, ChainDirectory::from_env(), Arc::new(OsSupervisor));

    match cli.command {
        Commands::StartFork {
            chain,
            port,
            extra_args,
        } => start_fork(&ctx, &chain, port, &extra_args).await.map(drop),
        Commands::StartForks { chains } => start_forks(&ctx, &chains).await.map(drop),
        Commands::ListForks { json } => list_forks(&ctx, json).await.map(drop),
        Commands::StopFork { chain } => stop_fork(&ctx, &chain).await.map(drop),
        Commands::StopAllForks => stop_all_forks(&ctx).await.map(drop),
        Commands::StartGlue => start_glue(&ctx).await.map(drop),
        Commands::StopGlue => stop_glue(&ctx).await,
    }
}

/// Start one fork, then refresh glue and persist.
pub async fn start_fork(
    ctx: &Context,
    chain: &str,
    port: Option<u16>,
    extra_args: &[String],
) -> Result<ForkRecord> {
    let mut registry = ctx.registry();
    registry.load().await;

    let rpc = check_startable(ctx, &registry, chain)?;
    let record = spawn_fork(ctx, &mut registry, chain, &rpc, port, extra_args)?;

    sync_glue(ctx, &mut registry).await?;
    Ok(record)
}

/// Start several forks with automatically assigned ports.
///
/// All chains are validated before anything is spawned. If a spawn fails
/// part-way, the forks already started are still published and persisted.
pub async fn start_forks(ctx: &Context, chains: &[String]) -> Result<Vec<ForkRecord>> {
    let mut registry = ctx.registry();
    registry.load().await;

    let mut seen = HashSet::new();
    let mut planned = Vec::new();
    for chain in chains.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !seen.insert(chain) {
            return Err(ForkError::DuplicateChain(chain.to_string()).into());
        }
        let rpc = check_startable(ctx, &registry, chain)?;
        planned.push((chain, rpc));
    }
    if planned.is_empty() {
        bail!("no chains given");
    }

    let mut started = Vec::new();
    let mut failure = None;
    for (chain, rpc) in planned {
        match spawn_fork(ctx, &mut registry, chain, &rpc, None, &[]) {
            Ok(record) => started.push(record),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if !started.is_empty() {
        sync_glue(ctx, &mut registry).await?;
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(started),
    }
}

/// Print every live fork.
pub async fn list_forks(ctx: &Context, json: bool) -> Result<Vec<ForkRecord>> {
    let mut registry = ctx.registry();
    let forks: Vec<ForkRecord> = registry.load().await.values().cloned().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&forks)?);
        return Ok(forks);
    }

    if forks.is_empty() {
        println!("No forks running.");
    }
    for fork in &forks {
        match fork.started_at {
            Some(started) => println!("{fork} - started: {}", started.format("%Y-%m-%d %H:%M:%S")),
            None => println!("{fork}"),
        }
    }
    if let Some(handle) = ctx.glue().status().await {
        println!("glue - pid: {}", handle.pid);
    }

    Ok(forks)
}

/// Kill the fork of `chain` and drop it from the registry.
///
/// A chain with no live fork is reported but not treated as a failure.
pub async fn stop_fork(ctx: &Context, chain: &str) -> Result<Option<ForkRecord>> {
    let mut registry = ctx.registry();
    registry.load().await;

    let Some(record) = registry.remove(chain) else {
        println!("no pid found: {chain}");
        return Ok(None);
    };

    // Removed regardless of whether the kill takes effect.
    ctx.supervisor.terminate(record.pid);
    println!("stopped {chain} fork (pid {})", record.pid);

    sync_glue(ctx, &mut registry).await?;
    Ok(Some(record))
}

/// Kill every fork, clear the registry and stop the glue service.
pub async fn stop_all_forks(ctx: &Context) -> Result<Vec<ForkRecord>> {
    let mut registry = ctx.registry();
    let chains: Vec<String> = registry.load().await.keys().cloned().collect();

    let mut stopped = Vec::new();
    for chain in chains {
        if let Some(record) = registry.remove(&chain) {
            ctx.supervisor.terminate(record.pid);
            println!("stopped {chain} fork (pid {})", record.pid);
            stopped.push(record);
        }
    }

    sync_glue(ctx, &mut registry).await?;
    Ok(stopped)
}

/// Regenerate the glue config from the current forks and restart glue.
pub async fn start_glue(ctx: &Context) -> Result<GlueHandle> {
    let mut registry = ctx.registry();

    let published = publish_config(ctx, &mut registry).await;
    let handle = match published {
        Ok(()) => ctx.glue().restart().await.context("failed to start glue service"),
        Err(e) => Err(e),
    };
    registry.persist().await?;

    let handle = handle?;
    println!("glue service started (pid {})", handle.pid);
    Ok(handle)
}

pub async fn stop_glue(ctx: &Context) -> Result<()> {
    if ctx.glue().stop().await? {
        println!("glue service stopped");
    } else {
        println!("glue service is not running");
    }
    Ok(())
}

/// Reject a start for `chain` and return its upstream RPC if it can go ahead.
fn check_startable(ctx: &Context, registry: &ForkRegistry, chain: &str) -> Result<String> {
    if let Some(existing) = registry.get(chain) {
        return Err(ForkError::AlreadyRunning {
            chain: chain.to_string(),
            pid: existing.pid,
            port: existing.port,
        }
        .into());
    }
    ctx.chains.id_of(chain)?;
    Ok(ctx.chains.rpc_of(chain)?)
}

/// Spawn a fork on the next free port and record it in memory.
fn spawn_fork(
    ctx: &Context,
    registry: &mut ForkRegistry,
    chain: &str,
    rpc: &str,
    port: Option<u16>,
    extra_args: &[String],
) -> Result<ForkRecord> {
    let port = next_free_port(port, &registry.ports_in_use())?;

    let options = ProcessOptions::from_command_line(&ctx.settings.fork_bin)?
        .arg("-p")
        .arg(port.to_string())
        .arg("-f")
        .arg(rpc)
        .args(extra_args.iter().cloned())
        .log_file(ctx.settings.fork_log(chain));
    let pid = ctx
        .supervisor
        .spawn(&options)
        .with_context(|| format!("failed to start {chain} fork"))?;

    let record = ForkRecord::new(chain, port, pid);
    println!("started new fork at: {}", serde_json::to_string_pretty(&record)?);
    registry.upsert(chain, record.clone());
    Ok(record)
}

async fn publish_config(ctx: &Context, registry: &mut ForkRegistry) -> Result<()> {
    let forks = registry.load().await;
    glue::publish(&ctx.settings.glue_config_file(), forks, &ctx.chains)
        .await
        .context("failed to write glue config")?;
    Ok(())
}

/// Bring glue in line with the fork set, then persist the registry.
///
/// The registry is persisted even when the glue step fails so that freshly
/// spawned forks are never left untracked.
async fn sync_glue(ctx: &Context, registry: &mut ForkRegistry) -> Result<()> {
    let synced = match publish_config(ctx, registry).await {
        Ok(()) if registry.is_empty() => ctx.glue().stop().await.map(drop).map_err(anyhow::Error::from),
        Ok(()) => ctx
            .glue()
            .restart()
            .await
            .map(drop)
            .context("failed to restart glue service"),
        Err(e) => Err(e),
    };
    registry.persist().await?;
    synced
}
