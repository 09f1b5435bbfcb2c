//! Per-object mesh export
//!
//! The serializer hands exactly one object to the exporter per call, so an
//! exporter never sees (and never bundles) unrelated objects.

mod glb;

use crate::Result;
use crate::snapshot::{MeshData, SceneObject};
use std::path::Path;

pub use glb::{GlbExportOptions, GlbExporter};

/// Writes one binary geometry file for one mesh object
pub trait MeshExporter {
    /// Export `object` (instantiating `mesh`) to `path`, overwriting it
    fn export(&self, object: &SceneObject, mesh: &MeshData, path: &Path) -> Result<()>;
}

impl<T: MeshExporter + ?Sized> MeshExporter for &T {
    fn export(&self, object: &SceneObject, mesh: &MeshData, path: &Path) -> Result<()> {
        (**self).export(object, mesh, path)
    }
}
