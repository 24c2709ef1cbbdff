//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_FORK_BIN, DEFAULT_GLUE_CMD};

/// Forkctl - run local forks of remote chains behind a single glue service
#[derive(Parser, Debug)]
#[command(name = "forkctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding runningForks.json, glueConfig.json, glue.pid and .forks/ logs
    #[arg(long, global = true, env = "FORKCTL_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Command line started for each fork (invoked as `<cmd> -p <port> -f <rpc>`)
    #[arg(long, global = true, env = "FORKCTL_FORK_BIN", default_value = DEFAULT_FORK_BIN)]
    pub fork_bin: String,

    /// Command line started for the glue service
    #[arg(long, global = true, env = "FORKCTL_GLUE_CMD", default_value = DEFAULT_GLUE_CMD)]
    pub glue_cmd: String,

    /// Log filter (e.g. info, debug, forkctl=trace)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a fork of a chain
    StartFork {
        /// Chain alias
        #[arg(long, default_value = "ethereum")]
        chain: String,

        /// Port to start on (the next free port at or above it is used)
        #[arg(long)]
        port: Option<u16>,

        /// Extra arguments passed to the fork binary
        #[arg(last = true)]
        extra_args: Vec<String>,
    },

    /// Start forks of multiple chains
    StartForks {
        /// Comma-separated list of chain aliases
        #[arg(long, value_delimiter = ',', required = true)]
        chains: Vec<String>,
    },

    /// List running forks
    ListForks {
        /// Print the fork table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stop the fork of a chain
    StopFork {
        /// Chain alias
        #[arg(long)]
        chain: String,
    },

    /// Stop every running fork and the glue service
    StopAllForks,

    /// Regenerate the glue config and (re)start the glue service
    StartGlue,

    /// Stop the glue service
    StopGlue,
}
