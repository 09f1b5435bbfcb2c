//! Removal of previously exported artifacts
//!
//! Deletes every `.glb` file and every `lights_and_cameras.json` below the
//! viewer's public folder. Directories and unrelated files stay. Removal is
//! best effort: failures are logged and counted, never returned.

use crate::Result;
use crate::layout::{SCENE_JSON, ViewerLayout};
use crate::lock::ExportLock;
use std::fs;
use std::path::{Path, PathBuf};

/// What a clean pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Files that were deleted
    pub removed: Vec<PathBuf>,
    /// Files or directories that could not be read or deleted
    pub failed: usize,
}

impl CleanReport {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.failed == 0
    }
}

impl std::fmt::Display for CleanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Removed {} file(s)", self.removed.len())?;
        if self.failed > 0 {
            write!(f, ", {} could not be removed", self.failed)?;
        }
        Ok(())
    }
}

/// Whether a file name is an export artifact
pub fn is_export_artifact(file_name: &str) -> bool {
    file_name.ends_with(".glb") || file_name == SCENE_JSON
}

/// Recursively remove export artifacts below `root`
///
/// A missing `root` is not an error.
pub fn clean_export_folder(root: &Path) -> CleanReport {
    let mut report = CleanReport::default();

    if !root.is_dir() {
        tracing::debug!("{} does not exist, nothing to clean", root.display());
        return report;
    }

    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cannot read {}: {}", dir.display(), e);
                report.failed += 1;
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                report.failed += 1;
                continue;
            };

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            let is_artifact = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_export_artifact);
            if !is_artifact {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("removed {}", path.display());
                    report.removed.push(path);
                }
                Err(e) => {
                    tracing::warn!("failed to remove {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    report.removed.sort();
    report
}

/// Clean the viewer's public folder while holding the export lock
///
/// Does nothing (and creates nothing) when the folder is absent.
pub fn clean_viewer(layout: &ViewerLayout) -> Result<CleanReport> {
    let root = layout.public_dir();
    if !root.is_dir() {
        tracing::debug!("{} does not exist, nothing to clean", root.display());
        return Ok(CleanReport::default());
    }

    let _lock = ExportLock::acquire(&root)?;
    let report = clean_export_folder(&root);
    tracing::info!("{} in {}", report, root.display());
    Ok(report)
}
