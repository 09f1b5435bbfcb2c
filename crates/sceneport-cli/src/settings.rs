//! User settings
//!
//! Stored in `{config_dir}/sceneport/settings.json`. A missing or unreadable
//! file falls back to the defaults.

use anyhow::{Context, Result, bail};
use sceneport_launch::ServiceSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Services started by `sceneport launch`
    pub services: Vec<ServiceSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            services: ServiceSpec::defaults(),
        }
    }
}

/// Get the path to the settings file
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sceneport").join("settings.json"))
}

/// Parse the contents of a settings file
pub fn parse_settings(contents: &str) -> Result<Settings> {
    serde_json::from_str(contents).context("Invalid settings")
}

/// Read settings from `path`; a missing file gives the defaults
pub fn read_settings(path: &Path) -> Result<Settings> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_settings(&contents)
            .with_context(|| format!("Ignoring {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Load settings from disk
///
/// Always yields usable settings. The error, if any, explains why the
/// defaults were used instead of the file; the caller reports it once
/// logging is up.
pub fn load_settings() -> (Settings, Option<anyhow::Error>) {
    let Some(path) = settings_path() else {
        return (Settings::default(), None);
    };

    match read_settings(&path) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    }
}

/// Save settings to disk, returning the file written
pub fn save_settings(settings: &Settings) -> Result<PathBuf> {
    let Some(path) = settings_path() else {
        bail!("Could not determine config directory");
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(&path, json).context("Failed to write settings file")?;
    Ok(path)
}
