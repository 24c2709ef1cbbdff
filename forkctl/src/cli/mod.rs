//! Command-line surface: argument parsing and command dispatch.

mod args;
mod commands;

pub use args::Cli;
pub use commands::execute;
