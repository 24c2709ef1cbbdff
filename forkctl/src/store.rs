//! Whole-document JSON persistence for state files.
//!
//! Reads are forgiving: a missing, unreadable or malformed file is treated as
//! absent. Writes replace the whole file via a uniquely named sibling temp
//! file and rename, so a reader never observes a half-written document.
//! Concurrent writers are not serialised; the last rename wins.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ForkError, Result};

/// Read and parse `path`, returning `None` when it can't be used.
///
/// An empty file parses as `T::default()`.
pub async fn read_json_if_exists<T>(path: &Path) -> Option<T>
where
    T: DeserializeOwned + Default,
{
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "state file not readable");
            return None;
        }
    };

    if content.trim().is_empty() {
        return Some(T::default());
    }

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed state file");
            None
        }
    }
}

/// Serialise `value` as pretty JSON and replace `path` with it.
pub async fn write_json<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_string_pretty(value).map_err(|source| ForkError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ForkError::io(dir, e))?;

    let mut prefix = path.file_name().unwrap_or_default().to_os_string();
    prefix.push(".");
    let tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ForkError::io(dir, e))?;

    tokio::fs::write(tmp.path(), body)
        .await
        .map_err(|e| ForkError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| ForkError::io(path, e.error))?;
    Ok(())
}

/// Delete `path`, treating an already-missing file as success.
pub async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ForkError::io(path, e)),
    }
}
