//! Resolved runtime settings and state file layout.

use std::path::PathBuf;

/// Registry of running forks.
pub const FORKS_FILE: &str = "runningForks.json";
/// Generated glue routing config.
pub const GLUE_CONFIG_FILE: &str = "glueConfig.json";
/// Pid handle of the glue process.
pub const GLUE_PID_FILE: &str = "glue.pid";
/// Directory holding per-process logs.
pub const LOGS_DIR: &str = ".forks";

/// Default fork binary.
pub const DEFAULT_FORK_BIN: &str = "anvil";
/// Default glue command.
pub const DEFAULT_GLUE_CMD: &str = "forknet-glue";

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding state files and logs.
    pub state_dir: PathBuf,
    /// Command line started for each fork, before `-p`/`-f`.
    pub fork_bin: String,
    /// Command line started for the glue service.
    pub glue_cmd: String,
}

impl Settings {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            fork_bin: DEFAULT_FORK_BIN.to_string(),
            glue_cmd: DEFAULT_GLUE_CMD.to_string(),
        }
    }

    pub fn with_fork_bin(mut self, fork_bin: impl Into<String>) -> Self {
        self.fork_bin = fork_bin.into();
        self
    }

    pub fn with_glue_cmd(mut self, glue_cmd: impl Into<String>) -> Self {
        self.glue_cmd = glue_cmd.into();
        self
    }

    pub fn forks_file(&self) -> PathBuf {
        self.state_dir.join(FORKS_FILE)
    }

    pub fn glue_config_file(&self) -> PathBuf {
        self.state_dir.join(GLUE_CONFIG_FILE)
    }

    pub fn glue_pid_file(&self) -> PathBuf {
        self.state_dir.join(GLUE_PID_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join(LOGS_DIR)
    }

    /// Log file for the fork of `chain`.
    pub fn fork_log(&self, chain: &str) -> PathBuf {
        self.logs_dir().join(format!("{chain}.log"))
    }

    pub fn glue_log(&self) -> PathBuf {
        self.logs_dir().join("glue.log")
    }
}
