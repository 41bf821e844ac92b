//! Lock file management for single-instance enforcement.
//!
//! Two boards driven from the same SPI bus would fight over the LEDs, so only
//! one process may run at a time. The lock is an exclusive `flock` on
//! `$XDG_RUNTIME_DIR/metarmap.lock` (falling back to `/tmp`) holding the PID of
//! the owner. The kernel drops the lock when the owner dies, so a leftover
//! file never blocks a new instance.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;

const LOCK_FILE_NAME: &str = "metarmap.lock";

/// Held lock. Released and removed on drop.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join(LOCK_FILE_NAME)
}

/// Acquire the instance lock, failing with the owner's PID when it is held.
pub fn acquire_lock() -> Result<InstanceLock> {
    let path = lock_path();

    // Open without truncating so a running owner's PID stays readable
    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        match read_owner_pid(&path) {
            Some(pid) => anyhow::bail!("metarmap is already running (PID {pid})"),
            None => anyhow::bail!("metarmap is already running (lock {})", path.display()),
        }
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(&file, "{}", std::process::id())?;
    file.flush()?;

    Ok(InstanceLock { file, path })
}

fn read_owner_pid(path: &PathBuf) -> Option<u32> {
    std::fs::read_to_string(path)
        .ok()?
        .lines()
        .next()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_runtime_dir<T>(f: impl FnOnce() -> T) -> T {
        let dir = tempfile::tempdir().unwrap();
        let original = std::env::var("XDG_RUNTIME_DIR").ok();
        unsafe {
            std::env::set_var("XDG_RUNTIME_DIR", dir.path());
        }

        let result = f();

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_RUNTIME_DIR", val),
                None => std::env::remove_var("XDG_RUNTIME_DIR"),
            }
        }
        result
    }

    #[test]
    #[serial]
    fn test_lock_records_pid_and_is_exclusive() {
        with_runtime_dir(|| {
            let lock = acquire_lock().unwrap();
            let content = std::fs::read_to_string(lock.path()).unwrap();
            assert_eq!(content.trim(), std::process::id().to_string());

            let err = acquire_lock().unwrap_err();
            assert!(
                err.to_string()
                    .contains(&format!("PID {}", std::process::id()))
            );
        });
    }

    #[test]
    #[serial]
    fn test_lock_released_on_drop() {
        with_runtime_dir(|| {
            let lock = acquire_lock().unwrap();
            let path = lock.path().clone();
            drop(lock);
            assert!(!path.exists());

            assert!(acquire_lock().is_ok());
        });
    }
}
