use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::model::config::StorageConfig;

/// Advisory write lock on a plan directory.
///
/// Held for the duration of a load-mutate-save cycle so two `ht`
/// invocations cannot interleave their saves.
pub struct PlanLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path} within {waited_ms} ms: another ht process is writing")]
    Timeout { path: PathBuf, waited_ms: u128 },
}

impl PlanLock {
    /// Acquire the lock, retrying every 10 ms until `timeout` elapses.
    pub fn acquire(plan_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = plan_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let start = Instant::now();
        while try_lock(&file).is_err() {
            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    path,
                    waited_ms: timeout.as_millis(),
                });
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(PlanLock { _file: file, path })
    }

    /// Acquire with the timeout from `[storage]` in plan.toml
    pub fn acquire_configured(plan_dir: &Path, storage: &StorageConfig) -> Result<Self, LockError> {
        Self::acquire(plan_dir, Duration::from_millis(storage.lock_timeout_ms))
    }
}

impl Drop for PlanLock {
    fn drop(&mut self) {
        // flock is released with the file; the lock file itself is disposable
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
