//! Forkctl - run local forks of remote chains behind a single glue service.
//!
//! Architecture:
//! - Each chain fork is a detached process tracked in `runningForks.json`
//! - The registry is reconciled against live processes on every command
//! - A singleton glue process routes RPC traffic by chain id, configured via
//!   `glueConfig.json` and tracked in `glue.pid`

mod chains;
mod cli;
mod config;
mod error;
mod glue;
mod logging;
mod models;
mod ports;
mod process;
mod registry;
mod store;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};
use error::ForkError;

#[tokio::main]
async fn main() -> Result<()> {
    // Upstream RPC variables usually live in .env; real env vars take precedence.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    match execute(cli).await {
        Err(e) if e.downcast_ref::<ForkError>().is_some_and(ForkError::is_user_error) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        other => other,
    }
}
