//! Advisory locking for a batch store.
//!
//! A store is guarded by an exclusive `fs2` lock on a sidecar file next to its index. The lock is
//! per open file description, so two handles inside one process exclude each other as well.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use serde::Deserialize;

use crate::constants::{DEFAULT_LOCK_POLL_MS, DEFAULT_LOCK_TIMEOUT_MS};
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LockSettings {
    pub timeout_ms: u64,
    pub poll_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            poll_ms: DEFAULT_LOCK_POLL_MS,
        }
    }
}

/// Held exclusive lock. Unlocks on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock at `path`, creating the lock file if needed and polling until
    /// `settings.timeout_ms` elapses.
    pub fn acquire(path: &Path, settings: &LockSettings) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|err| {
                CatalogError::Lock(format!("failed to open {}: {err}", path.display()))
            })?;

        let deadline = Instant::now() + Duration::from_millis(settings.timeout_ms);
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                    if Instant::now() >= deadline {
                        return Err(CatalogError::Lock(format!(
                            "timed out after {}ms waiting for {}",
                            settings.timeout_ms,
                            path.display()
                        )));
                    }
                    thread::sleep(Duration::from_millis(settings.poll_ms.max(1)));
                }
                Err(err) => {
                    return Err(CatalogError::Lock(format!(
                        "failed to lock {}: {err}",
                        path.display()
                    )));
                }
            }
        }

        tracing::debug!(target = "catalog::lock", path = %path.display(), "lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(
                target = "catalog::lock",
                path = %self.path.display(),
                error = %err,
                "failed to release lock"
            );
        }
    }
}
