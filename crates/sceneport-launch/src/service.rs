//! Definitions of the long-running processes the viewer needs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// One service started by the launch action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Short name used in messages
    pub name: String,
    /// Working directory, relative to the project folder
    pub dir: PathBuf,
    /// Port the service listens on once running
    pub port: u16,
    /// Folder whose absence triggers `install` (relative to `dir`)
    #[serde(default)]
    pub deps_dir: Option<PathBuf>,
    /// Run to completion before `run` when dependencies are missing
    #[serde(default)]
    pub install: Option<CommandSpec>,
    /// Long-running command, started detached
    pub run: CommandSpec,
}

impl ServiceSpec {
    /// Front-end dev server in `viewer/`
    pub fn viewer() -> Self {
        Self {
            name: "viewer".to_string(),
            dir: PathBuf::from("viewer"),
            port: 5173,
            deps_dir: Some(PathBuf::from("node_modules")),
            install: Some(CommandSpec::new("npm", &["install"])),
            run: CommandSpec::new("npm", &["run", "dev"]),
        }
    }

    /// Reload/static backend in `server/`
    pub fn server() -> Self {
        Self {
            name: "server".to_string(),
            dir: PathBuf::from("server"),
            port: 4000,
            deps_dir: Some(PathBuf::from("node_modules")),
            install: Some(CommandSpec::new("npm", &["install"])),
            run: CommandSpec::new("npx", &["tsx", "server.ts"]),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::viewer(), Self::server()]
    }
}
