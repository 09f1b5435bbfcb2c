//! Scene export: snapshot in, JSON document and GLB files out
//!
//! Record order follows the host's iteration order. A data block without an
//! owning object only drops its own record; filesystem and mesh export
//! failures abort the whole export.

use crate::export::MeshExporter;
use crate::layout::ViewerLayout;
use crate::lock::ExportLock;
use crate::math::{rgb_rounded, safe_name};
use crate::owners::{Owner, OwnerIndex};
use crate::records::{CameraRecord, LightRecord, SceneExport};
use crate::snapshot::{ObjectKind, SceneObject, SceneSnapshot};
use crate::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// A record left out of the export and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub kind: ObjectKind,
    pub name: String,
    pub reason: String,
}

impl std::fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} '{}': {}", self.kind, self.name, self.reason)
    }
}

/// Cameras and lights collected from a snapshot, before anything is written
#[derive(Debug, Clone, Default)]
pub struct CollectedRecords {
    pub cameras: Vec<CameraRecord>,
    pub lights: Vec<LightRecord>,
    pub background: [f64; 3],
    pub skipped: Vec<SkippedRecord>,
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub export: SceneExport,
    pub scene_json: PathBuf,
    pub mesh_files: Vec<PathBuf>,
    pub skipped: Vec<SkippedRecord>,
}

impl std::fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Exported {} camera(s), {} light(s), {} mesh(es) to {}",
            self.export.cameras.len(),
            self.export.lights.len(),
            self.export.meshes.len(),
            self.scene_json.display()
        )?;
        if !self.skipped.is_empty() {
            write!(f, " ({} skipped)", self.skipped.len())?;
        }
        Ok(())
    }
}

/// Build camera and light records and the background color
pub fn collect_records(snapshot: &SceneSnapshot) -> CollectedRecords {
    let index = OwnerIndex::build(snapshot);
    let mut collected = CollectedRecords::default();

    for camera in &snapshot.cameras {
        if let Some(object) = owner_of(&index, ObjectKind::Camera, &camera.name, &mut collected.skipped) {
            collected.cameras.push(CameraRecord::new(object, camera));
        }
    }

    for light in &snapshot.lights {
        if let Some(object) = owner_of(&index, ObjectKind::Light, &light.name, &mut collected.skipped) {
            collected.lights.push(LightRecord::new(object, light, snapshot));
        }
    }

    collected.background = match &snapshot.world {
        Some(world) => rgb_rounded(world.color.0),
        None => {
            tracing::warn!("snapshot has no world, using black background");
            [0.0; 3]
        }
    };

    collected
}

fn owner_of<'a>(
    index: &OwnerIndex<'a>,
    kind: ObjectKind,
    data: &str,
    skipped: &mut Vec<SkippedRecord>,
) -> Option<&'a SceneObject> {
    match index.resolve(kind, data) {
        Owner::Missing => {
            tracing::warn!("{:?} data '{}' is not used by any object, skipping", kind, data);
            skipped.push(SkippedRecord {
                kind,
                name: data.to_string(),
                reason: "no object uses this data".to_string(),
            });
            None
        }
        Owner::Unique(object) => Some(object),
        Owner::Shared { first, count } => {
            tracing::warn!(
                "{:?} data '{}' is used by {} objects, exporting '{}'",
                kind,
                data,
                count,
                first.name
            );
            Some(first)
        }
    }
}

/// Export a snapshot into the viewer folder of `layout`
///
/// Overwrites `lights_and_cameras.json`, the mesh manifest and every GLB it
/// writes. Holds the export lock for the whole run.
pub fn export_scene<E: MeshExporter + ?Sized>(
    snapshot: &SceneSnapshot,
    layout: &ViewerLayout,
    exporter: &E,
) -> Result<ExportSummary> {
    let public_dir = layout.public_dir();
    let _lock = ExportLock::acquire(&public_dir)?;

    let gltf_dir = layout.gltf_dir();
    fs::create_dir_all(&gltf_dir).map_err(|e| Error::io(&gltf_dir, e))?;

    let CollectedRecords {
        cameras,
        lights,
        background,
        mut skipped,
    } = collect_records(snapshot);

    let mut meshes = Vec::new();
    let mut mesh_files = Vec::new();
    let mut seen = HashSet::new();

    for object in snapshot.objects.iter().filter(|o| o.kind == ObjectKind::Mesh) {
        let Some(mesh) = object.data.as_deref().and_then(|name| snapshot.mesh(name)) else {
            tracing::warn!("mesh object '{}' has no mesh data, skipping", object.name);
            skipped.push(SkippedRecord {
                kind: ObjectKind::Mesh,
                name: object.name.clone(),
                reason: "mesh data not found".to_string(),
            });
            continue;
        };

        let file_name = format!("{}.glb", safe_name(&object.name));
        if !seen.insert(file_name.clone()) {
            tracing::warn!("'{}' maps to {} which is already exported, overwriting", object.name, file_name);
        }

        let path = layout.mesh_path(&file_name);
        exporter.export(object, mesh, &path)?;

        meshes.push(file_name);
        mesh_files.push(path);
    }

    let export = SceneExport {
        cameras,
        lights,
        background,
        meshes,
    };

    let scene_json = layout.scene_json();
    fs::write(&scene_json, export.to_json()?).map_err(|e| Error::io(&scene_json, e))?;

    let manifest = layout.mesh_manifest();
    let manifest_json = serde_json::to_string_pretty(&export.meshes)?;
    fs::write(&manifest, manifest_json).map_err(|e| Error::io(&manifest, e))?;

    tracing::info!(
        cameras = export.cameras.len(),
        lights = export.lights.len(),
        meshes = export.meshes.len(),
        skipped = skipped.len(),
        "exported scene to {}",
        scene_json.display()
    );

    Ok(ExportSummary {
        export,
        scene_json,
        mesh_files,
        skipped,
    })
}
