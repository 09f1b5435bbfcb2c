//! # Sceneport Launch
//!
//! Starts the viewer's dev server and backend from a project folder.
//! A service whose port already accepts connections is left alone, so
//! launching twice never starts a second copy.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod error;
pub mod launcher;
pub mod probe;
pub mod service;
pub mod spawner;

pub use error::{LaunchError, Result};
pub use launcher::{LaunchOutcome, Launcher};
pub use probe::port_in_use;
pub use service::{CommandSpec, ServiceSpec};
pub use spawner::{Spawner, SystemSpawner};
