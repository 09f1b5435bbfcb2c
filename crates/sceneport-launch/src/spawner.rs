//! Process creation

use crate::service::CommandSpec;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs the commands a launch needs
///
/// The launcher only talks to this trait, so tests can record calls instead
/// of starting `npm`.
pub trait Spawner {
    /// Run to completion and return the exit code (`None` if killed)
    fn run_blocking(&self, command: &CommandSpec, cwd: &Path) -> io::Result<Option<i32>>;

    /// Start without waiting and return the child's process id
    fn spawn_detached(&self, command: &CommandSpec, cwd: &Path) -> io::Result<u32>;
}

impl<T: Spawner + ?Sized> Spawner for &T {
    fn run_blocking(&self, command: &CommandSpec, cwd: &Path) -> io::Result<Option<i32>> {
        (**self).run_blocking(command, cwd)
    }

    fn spawn_detached(&self, command: &CommandSpec, cwd: &Path) -> io::Result<u32> {
        (**self).spawn_detached(command, cwd)
    }
}

/// Spawns real operating system processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl SystemSpawner {
    fn command(spec: &CommandSpec, cwd: &Path) -> Command {
        // npm and npx are batch scripts on Windows
        #[cfg(target_os = "windows")]
        let mut command = {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&spec.program);
            c
        };
        #[cfg(not(target_os = "windows"))]
        let mut command = Command::new(&spec.program);

        command.args(&spec.args).current_dir(cwd).stdin(Stdio::null());
        command
    }
}

impl Spawner for SystemSpawner {
    fn run_blocking(&self, command: &CommandSpec, cwd: &Path) -> io::Result<Option<i32>> {
        tracing::info!("running `{}` in {}", command, cwd.display());
        // Installer output goes to stderr; stdout carries only the CLI's message
        let status = Self::command(command, cwd)
            .stdout(Stdio::from(io::stderr()))
            .status()?;
        Ok(status.code())
    }

    fn spawn_detached(&self, command: &CommandSpec, cwd: &Path) -> io::Result<u32> {
        tracing::info!("starting `{}` in {}", command, cwd.display());
        let mut process = Self::command(command, cwd);
        process.stdout(Stdio::null()).stderr(Stdio::null());

        // Own process group: Ctrl-C or a hangup in this terminal leaves it alone
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            process.process_group(0);
        }

        // The child keeps running after its handle is dropped
        let child = process.spawn()?;
        Ok(child.id())
    }
}
