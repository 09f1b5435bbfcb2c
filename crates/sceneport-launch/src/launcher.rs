//! Start services that are not already listening

use crate::error::{LaunchError, Result};
use crate::probe::port_in_use;
use crate::service::ServiceSpec;
use crate::spawner::Spawner;
use std::fmt;
use std::path::Path;

/// What a launch did for one service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Something already listens on the port; nothing was started
    AlreadyRunning { port: u16 },
    /// A new process was started
    Started { pid: u32, installed: bool },
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning { port } => write!(f, "already running on port {}", port),
            Self::Started { pid, installed: true } => {
                write!(f, "installed dependencies and started (pid {})", pid)
            }
            Self::Started { pid, installed: false } => write!(f, "started (pid {})", pid),
        }
    }
}

/// Launches services relative to a project folder
pub struct Launcher<S> {
    spawner: S,
    probe: fn(u16) -> bool,
}

impl<S: Spawner> Launcher<S> {
    pub fn new(spawner: S) -> Self {
        Self {
            spawner,
            probe: port_in_use,
        }
    }

    /// Replace the port check
    pub fn with_probe(mut self, probe: fn(u16) -> bool) -> Self {
        self.probe = probe;
        self
    }

    /// Start `spec` unless its port is taken
    ///
    /// Missing dependencies are installed first and the install must succeed.
    pub fn launch(&self, spec: &ServiceSpec, project_dir: &Path) -> Result<LaunchOutcome> {
        if (self.probe)(spec.port) {
            tracing::info!("{} already running on port {}", spec.name, spec.port);
            return Ok(LaunchOutcome::AlreadyRunning { port: spec.port });
        }

        let dir = project_dir.join(&spec.dir);
        if !dir.is_dir() {
            return Err(LaunchError::MissingDir {
                service: spec.name.clone(),
                dir,
            });
        }

        let installed = self.install_if_needed(spec, &dir)?;

        let pid = self
            .spawner
            .spawn_detached(&spec.run, &dir)
            .map_err(|source| LaunchError::Spawn {
                service: spec.name.clone(),
                command: spec.run.to_string(),
                source,
            })?;

        tracing::info!("{} started on port {} (pid {})", spec.name, spec.port, pid);
        Ok(LaunchOutcome::Started { pid, installed })
    }

    /// Launch each service independently, in order
    pub fn launch_all<'a>(
        &self,
        specs: &'a [ServiceSpec],
        project_dir: &Path,
    ) -> Vec<(&'a ServiceSpec, Result<LaunchOutcome>)> {
        specs
            .iter()
            .map(|spec| {
                let outcome = self.launch(spec, project_dir);
                if let Err(e) = &outcome {
                    tracing::error!("{}", e);
                }
                (spec, outcome)
            })
            .collect()
    }

    fn install_if_needed(&self, spec: &ServiceSpec, dir: &Path) -> Result<bool> {
        let (Some(install), Some(deps_dir)) = (&spec.install, &spec.deps_dir) else {
            return Ok(false);
        };
        if dir.join(deps_dir).exists() {
            return Ok(false);
        }

        tracing::info!("{}: {} missing, running `{}`", spec.name, deps_dir.display(), install);
        let code = self
            .spawner
            .run_blocking(install, dir)
            .map_err(|source| LaunchError::Spawn {
                service: spec.name.clone(),
                command: install.to_string(),
                source,
            })?;

        if code != Some(0) {
            return Err(LaunchError::InstallFailed {
                service: spec.name.clone(),
                command: install.to_string(),
                code,
            });
        }
        Ok(true)
    }
}
