//! Per-id advisory file locking with backoff retry

use crate::store::error::StoreError;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Exclusive lock guard; the lock is released when the guard drops,
/// including on error paths out of a critical section.
pub struct LockGuard {
    #[allow(dead_code)]
    file: File,
    #[cfg(not(unix))]
    path: std::path::PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
        #[cfg(not(unix))]
        {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Acquire an exclusive advisory lock on `path`.
///
/// Non-blocking attempts with exponential backoff between them (50ms,
/// 100ms, 200ms, ...), so a held lock delays the caller by a bounded amount
/// rather than hanging it. After `max_retries` failed waits the call gives
/// up with [`StoreError::LockTimeout`].
pub fn acquire(path: &Path, max_retries: u32) -> Result<LockGuard, StoreError> {
    #[cfg(unix)]
    {
        acquire_flock(path, max_retries)
    }
    #[cfg(not(unix))]
    {
        acquire_create_new(path, max_retries)
    }
}

fn backoff(attempt: u32) {
    let wait_ms = 50u64 * (1 << attempt);
    std::thread::sleep(Duration::from_millis(wait_ms));
}

#[cfg(unix)]
fn acquire_flock(path: &Path, max_retries: u32) -> Result<LockGuard, StoreError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    for attempt in 0..=max_retries {
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc == 0 {
            return Ok(LockGuard { file });
        }

        let err = std::io::Error::last_os_error();
        let held_elsewhere = err.raw_os_error() == Some(libc::EWOULDBLOCK)
            || err.raw_os_error() == Some(libc::EAGAIN);
        if !held_elsewhere {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }

        if attempt < max_retries {
            backoff(attempt);
        }
    }

    Err(StoreError::LockTimeout {
        path: path.to_path_buf(),
        retries: max_retries,
    })
}

/// Fallback for platforms without `flock`: lock-file creation with
/// `create_new`, removed again when the guard drops.
#[cfg(not(unix))]
fn acquire_create_new(path: &Path, max_retries: u32) -> Result<LockGuard, StoreError> {
    for attempt in 0..=max_retries {
        match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => {
                return Ok(LockGuard {
                    file,
                    path: path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if attempt < max_retries {
                    backoff(attempt);
                }
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    Err(StoreError::LockTimeout {
        path: path.to_path_buf(),
        retries: max_retries,
    })
}
