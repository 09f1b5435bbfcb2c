//! Exclusive lock around exports and cleans
//!
//! A second trigger while an export is still writing files fails fast
//! instead of interleaving its writes with the first one.

use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const LOCK_FILE: &str = ".sceneport.lock";

/// A lock this old is treated as abandoned even if its owner looks alive
pub const STALE_AFTER: Duration = Duration::from_secs(10 * 60);

/// Held for the duration of one export or clean; removed on drop
#[derive(Debug)]
pub struct ExportLock {
    path: PathBuf,
}

impl ExportLock {
    /// Take the lock in `dir`, creating the directory if needed
    ///
    /// A lock left behind by a process that no longer runs, or one older
    /// than [`STALE_AFTER`], is removed and taken over.
    pub fn acquire(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let path = dir.join(LOCK_FILE);
        match Self::create(path) {
            Err(Error::ExportInProgress(path)) if is_stale(&path) => {
                tracing::warn!("removing stale lock {}", path.display());
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::io(path, e)),
                }
                Self::create(path)
            }
            other => other,
        }
    }

    fn create(path: PathBuf) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::ExportInProgress(path));
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            tracing::debug!("could not write pid to {}: {}", path.display(), e);
        }

        tracing::debug!("acquired {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExportLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("failed to release {}: {}", self.path.display(), e);
        }
    }
}

/// Whether an existing lock file was abandoned by its owner
fn is_stale(path: &Path) -> bool {
    let owner = fs::read_to_string(path)
        .ok()
        .and_then(|contents| contents.trim().parse::<u32>().ok());
    if owner.is_some_and(|pid| process_alive(pid) == Some(false)) {
        return true;
    }

    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_AFTER)
}

/// `None` where liveness cannot be checked without a process table
#[cfg(target_os = "linux")]
#[allow(clippy::unnecessary_wraps)]
fn process_alive(pid: u32) -> Option<bool> {
    Some(Path::new("/proc").join(pid.to_string()).exists())
}

#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> Option<bool> {
    None
}
