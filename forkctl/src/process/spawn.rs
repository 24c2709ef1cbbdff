//! Detached process spawning with file-backed output.
//!
//! Spawned processes:
//! - run in their own process group so they outlive the CLI
//! - have stdin closed and stdout/stderr appended to a log file
//! - are never waited on; the caller only gets the pid

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{ForkError, Result};

/// Configuration for spawning a detached process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// The program to execute.
    pub program: String,

    /// Arguments to pass to the program.
    pub args: Vec<String>,

    /// File receiving stdout and stderr, opened for append.
    /// Output is discarded when unset.
    pub log_file: Option<PathBuf>,
}

impl ProcessOptions {
    /// Create new options for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            log_file: None,
        }
    }

    /// Split a whitespace-delimited command line into program and arguments.
    ///
    /// Empty tokens are dropped. There is no quoting support.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut tokens = command_line.split_whitespace();
        let program = tokens.next().ok_or(ForkError::EmptyCommand)?;
        Ok(Self::new(program).args(tokens))
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append stdout and stderr to `path`.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// The full command line, for logging and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Launch a detached process and return its pid without waiting on it.
pub fn spawn_detached(options: &ProcessOptions) -> Result<i32> {
    if options.program.is_empty() {
        return Err(ForkError::EmptyCommand);
    }

    let command = options.command_line();
    tracing::info!(%command, "running command");

    let mut cmd = Command::new(&options.program);
    cmd.args(&options.args);
    cmd.stdin(Stdio::null());

    if let Some(ref path) = options.log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ForkError::io(parent, e))?;
        }
        let out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ForkError::io(path, e))?;
        let err = out.try_clone().map_err(|e| ForkError::io(path, e))?;
        cmd.stdout(out);
        cmd.stderr(err);
    } else {
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let child = cmd.spawn().map_err(|source| ForkError::Spawn {
        command: command.clone(),
        source,
    })?;

    // The child handle is dropped without waiting. If it exits while this
    // invocation is still running, `is_alive` reaps the zombie.
    match i32::try_from(child.id()) {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(ForkError::NoPid { command }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_parse_command_line() {
        let opts = ProcessOptions::from_command_line("  anvil -p 8545   -f http://rpc ").unwrap();
        assert_eq!(opts.program, "anvil");
        assert_eq!(opts.args, vec!["-p", "8545", "-f", "http://rpc"]);
        assert_eq!(opts.command_line(), "anvil -p 8545 -f http://rpc");
    }

    #[test]
    fn test_parse_empty_command_line() {
        assert!(matches!(
            ProcessOptions::from_command_line("   "),
            Err(ForkError::EmptyCommand)
        ));
    }

    #[test]
    fn test_spawn_nonexistent() {
        let result = spawn_detached(&ProcessOptions::new("nonexistent_command_12345"));
        assert!(matches!(result, Err(ForkError::Spawn { .. })));
    }

    #[test]
    fn test_spawn_returns_pid() {
        let pid = spawn_detached(&ProcessOptions::new("sleep").arg("2")).unwrap();
        assert!(pid > 0);
    }

    #[test]
    fn test_spawn_appends_to_log() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("logs").join("echo.log");
        std::fs::create_dir_all(log.parent().unwrap()).unwrap();
        std::fs::write(&log, "earlier\n").unwrap();

        spawn_detached(&ProcessOptions::new("echo").arg("hello").log_file(&log)).unwrap();

        let mut content = String::new();
        for _ in 0..50 {
            content = std::fs::read_to_string(&log).unwrap();
            if content.contains("hello") {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(content.starts_with("earlier\n"));
        assert!(content.contains("hello"));
    }
}
