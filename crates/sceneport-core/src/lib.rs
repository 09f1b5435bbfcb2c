//! # Sceneport Core
//!
//! Turns a snapshot of an authoring tool's scene into the files a web 3D
//! viewer loads: `lights_and_cameras.json` plus one GLB per mesh object.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sceneport_core::prelude::*;
//!
//! let snapshot = SceneSnapshot::load("scene.snapshot.json".as_ref())?;
//! let layout = ViewerLayout::new("/path/to/project");
//!
//! let summary = export_scene(&snapshot, &layout, &GlbExporter::default())?;
//! println!("{summary}");
//! ```
//!
//! ## Conventions
//!
//! - **Host space**: right-handed, Z-up. Rotations are XYZ Euler angles in radians.
//! - **Viewer space**: right-handed, Y-up. `(x, y, z)` maps to `(x, z, -y)`.
//! - **Precision**: every emitted vector component and color channel is
//!   rounded to 4 decimal places.
//! - **Names**: spaces and hyphens become underscores.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp))]

pub mod cleaner;
pub mod export;
pub mod layout;
pub mod lock;
pub mod math;
pub mod owners;
pub mod records;
pub mod serializer;
pub mod snapshot;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cleaner::{CleanReport, clean_export_folder, clean_viewer};
    pub use crate::export::{GlbExportOptions, GlbExporter, MeshExporter};
    pub use crate::layout::ViewerLayout;
    pub use crate::math::{remap, safe_name};
    pub use crate::records::{CameraRecord, LightRecord, SceneExport};
    pub use crate::serializer::{ExportSummary, SkippedRecord, export_scene};
    pub use crate::snapshot::{
        CameraData, Color, Constraint, ConstraintKind, LightData, LightType, MeshData,
        ObjectKind, SceneObject, SceneSnapshot, World,
    };
    pub use crate::{Error, Result};
}
