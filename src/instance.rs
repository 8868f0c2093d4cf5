//! Single-instance guard.
//!
//! The host may start a new plugin process before the old one is gone (after
//! an update or a crash of the host itself). The PID file in the temp dir
//! lets the new process terminate the stale one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

pub(crate) const PID_FILE_NAME: &str = "ymdeck.pid";

pub(crate) fn default_pid_path() -> PathBuf {
    std::env::temp_dir().join(PID_FILE_NAME)
}

/// Holds the PID file until dropped.
#[derive(Debug)]
pub(crate) struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Stop any previous instance recorded at `path`, then record this one.
    pub(crate) fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(previous) = read_pid(path) {
            if previous != std::process::id() && is_process_running(previous) {
                info!(pid = previous, "Stopping previous instance");
                terminate(previous);
            } else {
                debug!(pid = previous, "Replacing stale PID file");
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, std::process::id().to_string())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // A newer instance may have taken the file over already.
        if read_pid(&self.path) != Some(std::process::id()) {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove PID file");
        }
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    i32::try_from(pid).is_ok_and(|pid| kill(Pid::from_raw(pid), None).is_ok())
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    false
}

#[cfg(unix)]
fn terminate(pid: u32) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else { return };
    if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
        warn!(pid, error = %e, "Failed to stop previous instance");
    }
}

#[cfg(not(unix))]
fn terminate(pid: u32) {
    warn!(pid, "Cannot stop previous instance on this platform");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_writes_and_drop_removes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join(PID_FILE_NAME);

        let lock = InstanceLock::acquire(&path).unwrap();
        assert_eq!(lock.path(), path.as_path());
        assert_eq!(read_pid(&path), Some(std::process::id()));

        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_stale_and_garbage_files_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PID_FILE_NAME);

        fs::write(&path, "not a pid").unwrap();
        let lock = InstanceLock::acquire(&path).unwrap();
        assert_eq!(read_pid(&path), Some(std::process::id()));
        drop(lock);

        // Own pid is never signalled.
        fs::write(&path, std::process::id().to_string()).unwrap();
        let _lock = InstanceLock::acquire(&path).unwrap();
        assert_eq!(read_pid(&path), Some(std::process::id()));
    }

    #[test]
    fn test_drop_keeps_newer_owner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PID_FILE_NAME);

        let lock = InstanceLock::acquire(&path).unwrap();
        fs::write(&path, "1").unwrap();
        drop(lock);
        assert_eq!(read_pid(&path), Some(1));
    }
}
