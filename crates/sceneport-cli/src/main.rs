//! Sceneport CLI - export scenes to the web viewer and run its services

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod settings;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sceneport_core::prelude::*;
use sceneport_launch::{Launcher, ServiceSpec, SystemSpawner};
use settings::Settings;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "sceneport")]
#[command(about = "Export scenes to a web 3D viewer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write lights_and_cameras.json and one GLB per mesh
    Export {
        /// Scene snapshot (JSON)
        snapshot: PathBuf,

        /// Project folder containing `viewer/` (defaults to the snapshot's folder)
        #[arg(short, long)]
        project_dir: Option<PathBuf>,
    },

    /// Remove previously exported files
    Clear {
        /// Project folder containing `viewer/`
        #[arg(short, long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// Start the viewer dev server and backend
    Launch {
        /// Project folder containing `viewer/` and `server/`
        #[arg(short, long, default_value = ".")]
        project_dir: PathBuf,

        /// Start a single service by name
        #[arg(long)]
        only: Option<String>,
    },

    /// Clean stale exports after the host opens a document (internal use)
    #[command(hide = true)]
    DocumentLoaded {
        #[arg(short, long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// Show the settings file, or write the defaults
    Settings {
        /// Overwrite the settings file with the defaults
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (settings, settings_error) = settings::load_settings();
    init_logging(&settings.log_level);
    if let Some(e) = settings_error {
        tracing::warn!("{:#}, using defaults", e);
    }

    let result = match cli.command {
        Commands::Export {
            snapshot,
            project_dir,
        } => run_export(&snapshot, project_dir),
        Commands::Clear { project_dir } => run_clear(&project_dir),
        Commands::Launch { project_dir, only } => {
            run_launch(&project_dir, &settings.services, only.as_deref())
        }
        Commands::DocumentLoaded { project_dir } => run_document_loaded(&project_dir),
        Commands::Settings { init } => run_settings(&settings, init),
    };

    match result {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only the action's message
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run_export(snapshot_path: &Path, project_dir: Option<PathBuf>) -> Result<String> {
    let project_dir = project_dir.unwrap_or_else(|| default_project_dir(snapshot_path));

    let snapshot = SceneSnapshot::load(snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;
    let layout = ViewerLayout::new(project_dir);

    let summary = export_scene(&snapshot, &layout, &GlbExporter::default())
        .context("Export failed")?;
    for skipped in &summary.skipped {
        tracing::warn!("skipped {}", skipped);
    }

    Ok(summary.to_string())
}

fn default_project_dir(snapshot_path: &Path) -> PathBuf {
    snapshot_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn run_clear(project_dir: &Path) -> Result<String> {
    let layout = ViewerLayout::new(project_dir);
    let report = clean_viewer(&layout).context("Clear failed")?;

    if report.is_noop() {
        return Ok("Nothing to clear".to_string());
    }
    if report.failed > 0 {
        bail!("{} in {}", report, layout.public_dir().display());
    }
    Ok(format!("{} in {}", report, layout.public_dir().display()))
}

/// Host load hook: never fails the host because an export is running
fn run_document_loaded(project_dir: &Path) -> Result<String> {
    let layout = ViewerLayout::new(project_dir);
    match clean_viewer(&layout) {
        Ok(report) => Ok(format!("Cleared stale exports: {}", report)),
        Err(Error::ExportInProgress(lock)) => {
            tracing::warn!("{} is held, leaving exports in place", lock.display());
            Ok("Export in progress, cleanup skipped".to_string())
        }
        Err(e) => Err(e).context("Cleanup on load failed"),
    }
}

fn run_launch(project_dir: &Path, services: &[ServiceSpec], only: Option<&str>) -> Result<String> {
    let selected: Vec<ServiceSpec> = services
        .iter()
        .filter(|s| only.is_none_or(|name| s.name == name))
        .cloned()
        .collect();

    if selected.is_empty() {
        let known: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        bail!(
            "No service named '{}' (known: {})",
            only.unwrap_or_default(),
            known.join(", ")
        );
    }

    let launcher = Launcher::new(SystemSpawner);
    let results = launcher.launch_all(&selected, project_dir);

    let mut lines = Vec::with_capacity(results.len());
    let mut failed = false;
    for (spec, outcome) in results {
        match outcome {
            Ok(outcome) => lines.push(format!("{}: {}", spec.name, outcome)),
            Err(e) => {
                failed = true;
                lines.push(e.to_string());
            }
        }
    }

    if failed {
        bail!("{}", lines.join("\n"));
    }
    Ok(lines.join("\n"))
}

fn run_settings(settings: &Settings, init: bool) -> Result<String> {
    if init {
        let path = settings::save_settings(&Settings::default())?;
        return Ok(format!("Wrote default settings to {}", path.display()));
    }

    let path = settings::settings_path()
        .map_or_else(|| "<no config directory>".to_string(), |p| p.display().to_string());
    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    Ok(format!("{}\n{}", path, json))
}
