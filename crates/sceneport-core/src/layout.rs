//! Fixed output locations inside a project folder

use std::path::{Path, PathBuf};

/// Name of the scene description document
pub const SCENE_JSON: &str = "lights_and_cameras.json";

/// Folder (inside `viewer/public`) holding one GLB per mesh
pub const GLTF_DIR: &str = "exported_gltfs";

/// Mesh list read by the viewer's mesh loader
pub const MESH_MANIFEST: &str = "scene.json";

/// Paths of the viewer project next to the host document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerLayout {
    project_dir: PathBuf,
}

impl ViewerLayout {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// `<project>/viewer`
    pub fn viewer_dir(&self) -> PathBuf {
        self.project_dir.join("viewer")
    }

    /// `<project>/viewer/public`, root of everything the cleaner touches
    pub fn public_dir(&self) -> PathBuf {
        self.viewer_dir().join("public")
    }

    /// `<project>/viewer/public/exported_gltfs`
    pub fn gltf_dir(&self) -> PathBuf {
        self.public_dir().join(GLTF_DIR)
    }

    /// `<project>/viewer/public/lights_and_cameras.json`
    pub fn scene_json(&self) -> PathBuf {
        self.public_dir().join(SCENE_JSON)
    }

    /// `<project>/viewer/public/exported_gltfs/scene.json`
    pub fn mesh_manifest(&self) -> PathBuf {
        self.gltf_dir().join(MESH_MANIFEST)
    }

    /// Where the GLB for a mesh file name goes
    pub fn mesh_path(&self, file_name: &str) -> PathBuf {
        self.gltf_dir().join(file_name)
    }
}
