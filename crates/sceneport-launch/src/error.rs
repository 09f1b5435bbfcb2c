//! Launch error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("{service}: directory not found: {}", .dir.display())]
    MissingDir { service: String, dir: PathBuf },

    #[error("{service}: `{command}` {}", exit_text(.code))]
    InstallFailed {
        service: String,
        command: String,
        code: Option<i32>,
    },

    #[error("{service}: could not run `{command}`: {source}")]
    Spawn {
        service: String,
        command: String,
        #[source]
        source: std::io::Error,
    },
}

#[allow(clippy::ref_option)]
fn exit_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
