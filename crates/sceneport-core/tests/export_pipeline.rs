//! Integration tests for snapshot to viewer folder export

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use sceneport_core::lock::ExportLock;
use sceneport_core::prelude::*;
use serde_json::Value;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

fn scratch_project(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sceneport_it_{}_{}", name, std::process::id()));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).expect("create project dir");
    dir
}

const CUBE_ONLY: &str = r#"{
    "objects": [
        { "name": "My Cube", "kind": "mesh", "data": "CubeMesh", "location": [0, 0, 1] }
    ],
    "meshes": [{
        "name": "CubeMesh",
        "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]],
        "indices": [0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]
    }],
    "world": { "color": [0.12345, 0.6, 1.0, 0.0] }
}"#;

const STAGED: &str = r#"{
    "objects": [
        { "name": "Main-Camera", "kind": "camera", "data": "Camera",
          "location": [7.3589, -6.9258, 4.9583], "rotation_euler": [1.1093, 0.0, 0.8149] },
        { "name": "Key Light", "kind": "light", "data": "Spot",
          "location": [0, 0, 0] },
        { "name": "Rim", "kind": "light", "data": "RimSpot", "location": [2, 0, 3],
          "constraints": [{ "kind": "track_to", "target": "Floor" }] },
        { "name": "Fill", "kind": "light", "data": "Point", "location": [1, 1, 1] },
        { "name": "Floor", "kind": "mesh", "data": "Plane", "location": [0, 5, -1] }
    ],
    "cameras": [{ "name": "Camera", "lens": 50.0 }, { "name": "Unused", "lens": 35.0 }],
    "lights": [
        { "name": "Spot", "type": "SPOT", "color": [1.0, 0.9, 0.81234], "energy": 1000, "spot_size": 0.7854 },
        { "name": "RimSpot", "type": "SPOT", "color": [1, 1, 1], "energy": 250 },
        { "name": "Point", "type": "POINT", "color": [1, 1, 1, 1], "energy": 40 }
    ],
    "meshes": [{
        "name": "Plane",
        "positions": [[-1, -1, 0], [1, -1, 0], [1, 1, 0], [-1, 1, 0]],
        "uvs": [[0, 0], [1, 0], [1, 1], [0, 1]],
        "indices": [0, 1, 2, 0, 2, 3]
    }]
}"#;

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read json")).expect("parse json")
}

#[test]
fn single_mesh_scene_round_trip() {
    let project = scratch_project("round_trip");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(CUBE_ONLY).expect("snapshot");

    let summary = export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");

    assert_eq!(summary.export.meshes, vec!["My_Cube.glb".to_string()]);
    assert!(summary.export.cameras.is_empty());
    assert!(summary.export.lights.is_empty());
    assert!(summary.skipped.is_empty());

    let json = read_json(&layout.scene_json());
    assert_eq!(json["cameras"], serde_json::json!([]));
    assert_eq!(json["lights"], serde_json::json!([]));
    assert_eq!(json["meshes"], serde_json::json!(["My_Cube.glb"]));
    assert_eq!(json["background"], serde_json::json!([0.1235, 0.6, 1.0]));

    let manifest = read_json(&layout.mesh_manifest());
    assert_eq!(manifest, serde_json::json!(["My_Cube.glb"]));

    let text = fs::read_to_string(layout.scene_json()).unwrap();
    assert!(text.contains("\n  \"cameras\""), "two-space indentation");

    fs::remove_dir_all(&project).ok();
}

#[test]
fn exported_glb_is_readable() {
    let project = scratch_project("glb_readable");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(CUBE_ONLY).expect("snapshot");

    export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");

    let bytes = fs::read(layout.mesh_path("My_Cube.glb")).expect("glb written");
    let (document, buffers, _images) = gltf::import_slice(&bytes).expect("valid glb");

    assert_eq!(document.meshes().count(), 1);
    let node = document.nodes().next().expect("one node");
    assert_eq!(node.name(), Some("My Cube"));
    let (translation, _rotation, scale) = node.transform().decomposed();
    assert_eq!(translation, [0.0, 1.0, 0.0]);
    assert_eq!(scale, [1.0, 1.0, 1.0]);

    let mesh = document.meshes().next().unwrap();
    assert_eq!(mesh.name(), Some("CubeMesh"));
    let primitive = mesh.primitives().next().expect("one primitive");
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader.read_positions().expect("positions").collect();
    assert_eq!(positions.len(), 4);
    // Host (0, 1, 0) is viewer (0, 0, -1); host (0, 0, 1) is viewer (0, 1, 0)
    assert_eq!(positions[2], [0.0, 0.0, -1.0]);
    assert_eq!(positions[3], [0.0, 1.0, 0.0]);

    let indices: Vec<u32> = reader.read_indices().expect("indices").into_u32().collect();
    assert_eq!(indices.len(), 12);
    assert!(reader.read_normals().is_some());
    assert!(reader.read_tex_coords(0).is_none());

    fs::remove_dir_all(&project).ok();
}

#[test]
fn staged_scene_records() {
    let project = scratch_project("staged");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(STAGED).expect("snapshot");

    let summary = export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");
    let export = &summary.export;

    assert_eq!(export.cameras.len(), 1);
    let camera = &export.cameras[0];
    assert_eq!(camera.name, "Main_Camera");
    assert_eq!(camera.fov, 50.0);
    assert_eq!(camera.position, [7.3589, 4.9583, 6.9258]);
    assert_eq!(camera.rotation, [1.1093, 0.8149, 0.0]);

    let names: Vec<&str> = export.lights.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Key_Light", "Rim", "Fill"]);

    let key = &export.lights[0];
    assert_eq!(key.light_type, LightType::Spot);
    assert_eq!(key.color, [1.0, 0.9, 0.8123]);
    assert_eq!(key.target, Some([0.0, -1.0, 0.0]));
    assert_eq!(key.angle, Some(0.7854));

    let rim = &export.lights[1];
    assert_eq!(rim.target, Some([0.0, -1.0, -5.0]));
    assert_eq!(rim.angle, Some(std::f64::consts::FRAC_PI_4));

    let fill = &export.lights[2];
    assert_eq!(fill.position, [1.0, 1.0, -1.0]);
    assert_eq!(fill.target, None);

    assert_eq!(export.meshes, vec!["Floor.glb".to_string()]);
    assert_eq!(export.background, [0.0, 0.0, 0.0]);

    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "Unused");

    let json = read_json(&layout.scene_json());
    assert!(json["lights"][2].get("target").is_none());
    assert!(json["lights"][2].get("angle").is_none());
    assert_eq!(json["lights"][0]["type"], "SPOT");
    assert_eq!(json["cameras"][0]["type"], "PerspectiveCamera");

    fs::remove_dir_all(&project).ok();
}

/// Records which objects it was asked to export, in order
#[derive(Default)]
struct RecordingExporter {
    calls: RefCell<Vec<(String, String, PathBuf)>>,
}

impl MeshExporter for RecordingExporter {
    fn export(&self, object: &SceneObject, mesh: &MeshData, path: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((object.name.clone(), mesh.name.clone(), path.to_path_buf()));
        fs::write(path, b"stub").map_err(|e| Error::io(path, e))
    }
}

#[test]
fn exporter_sees_one_object_per_call_in_host_order() {
    let project = scratch_project("isolation");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(
        r#"{
        "objects": [
            { "name": "b-mesh", "kind": "mesh", "data": "M" },
            { "name": "Camera", "kind": "camera", "data": "C" },
            { "name": "a mesh", "kind": "mesh", "data": "M" },
            { "name": "Broken", "kind": "mesh", "data": "Missing" }
        ],
        "meshes": [{ "name": "M", "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]] }]
    }"#,
    )
    .expect("snapshot");

    let exporter = RecordingExporter::default();
    let summary = export_scene(&snapshot, &layout, &exporter).expect("export");

    let calls = exporter.calls.borrow();
    let objects: Vec<&str> = calls.iter().map(|(o, _, _)| o.as_str()).collect();
    assert_eq!(objects, vec!["b-mesh", "a mesh"]);
    assert!(calls.iter().all(|(_, mesh, _)| mesh == "M"));
    assert_eq!(calls[0].2, layout.gltf_dir().join("b_mesh.glb"));

    assert_eq!(summary.export.meshes, vec!["b_mesh.glb", "a_mesh.glb"]);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "Broken");

    fs::remove_dir_all(&project).ok();
}

struct FailingExporter;

impl MeshExporter for FailingExporter {
    fn export(&self, object: &SceneObject, _mesh: &MeshData, _path: &Path) -> Result<()> {
        Err(Error::MeshExport {
            object: object.name.clone(),
            reason: "exporter unavailable".to_string(),
        })
    }
}

#[test]
fn mesh_export_failure_aborts_export() {
    let project = scratch_project("failure");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(CUBE_ONLY).expect("snapshot");

    let err = export_scene(&snapshot, &layout, &FailingExporter).unwrap_err();
    assert!(matches!(err, Error::MeshExport { ref object, .. } if object == "My Cube"));
    assert!(!layout.scene_json().exists());

    // The lock is released even when the export fails
    export_scene(&snapshot, &layout, &GlbExporter::default()).expect("second export");

    fs::remove_dir_all(&project).ok();
}

#[test]
fn concurrent_export_is_rejected() {
    let project = scratch_project("locked");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(CUBE_ONLY).expect("snapshot");

    let held = ExportLock::acquire(&layout.public_dir()).expect("lock");
    let err = export_scene(&snapshot, &layout, &GlbExporter::default()).unwrap_err();
    assert!(matches!(err, Error::ExportInProgress(_)));
    assert!(clean_viewer(&layout).is_err());
    drop(held);

    fs::remove_dir_all(&project).ok();
}

#[test]
fn clean_after_export_removes_artifacts() {
    let project = scratch_project("clean");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(STAGED).expect("snapshot");
    export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");

    let keep = layout.public_dir().join("favicon.ico");
    fs::write(&keep, b"icon").unwrap();

    let first = clean_viewer(&layout).expect("clean");
    assert_eq!(first.removed.len(), 2);
    assert!(!layout.scene_json().exists());
    assert!(!layout.mesh_path("Floor.glb").exists());
    assert!(keep.exists());
    assert!(layout.gltf_dir().is_dir());

    let second = clean_viewer(&layout).expect("clean again");
    assert!(second.is_noop());

    fs::remove_dir_all(&project).ok();
}

#[test]
fn clean_without_viewer_folder_creates_nothing() {
    let project = scratch_project("clean_missing");
    let layout = ViewerLayout::new(&project);

    let report = clean_viewer(&layout).expect("clean");
    assert!(report.is_noop());
    assert!(!layout.public_dir().exists());

    fs::remove_dir_all(&project).ok();
}

const CAMERA_AND_EMPTY_MESH: &str = r#"{
    "objects": [
        { "name": "Cam", "kind": "camera", "data": "Cam", "location": [0, -5, 1] },
        { "name": "Empty Mesh", "kind": "mesh", "data": "Nothing", "location": [0, 0, 2] }
    ],
    "cameras": [{ "name": "Cam", "lens": 50.0 }],
    "meshes": [{ "name": "Nothing", "positions": [] }]
}"#;

#[test]
fn empty_mesh_does_not_abort_export() {
    let project = scratch_project("empty_mesh");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(CAMERA_AND_EMPTY_MESH).expect("snapshot");

    let summary = export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");
    assert_eq!(summary.export.cameras.len(), 1);
    assert_eq!(summary.export.meshes, vec!["Empty_Mesh.glb".to_string()]);

    let json = read_json(&layout.scene_json());
    assert_eq!(json["cameras"][0]["position"], serde_json::json!([0.0, 1.0, 5.0]));

    let bytes = fs::read(layout.mesh_path("Empty_Mesh.glb")).expect("glb written");
    let (document, _buffers, _images) = gltf::import_slice(&bytes).expect("valid glb");
    let node = document.nodes().next().expect("one node");
    assert_eq!(node.name(), Some("Empty Mesh"));
    assert!(node.mesh().is_none());
    assert_eq!(document.meshes().count(), 0);

    fs::remove_dir_all(&project).ok();
}

#[test]
fn collinear_triangle_has_unit_normals() {
    let project = scratch_project("collinear");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(
        r#"{
            "objects": [{ "name": "Line", "kind": "mesh", "data": "Line" }],
            "meshes": [{ "name": "Line", "positions": [[0, 0, 0], [1, 0, 0], [2, 0, 0]] }]
        }"#,
    )
    .expect("snapshot");

    export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");

    let bytes = fs::read(layout.mesh_path("Line.glb")).expect("glb written");
    let (document, buffers, _images) = gltf::import_slice(&bytes).expect("valid glb");
    let primitive = document.meshes().next().unwrap().primitives().next().unwrap();
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    for [x, y, z] in reader.read_normals().expect("normals") {
        let length = (x * x + y * y + z * z).sqrt();
        approx::assert_relative_eq!(length, 1.0, epsilon = 1e-6);
    }

    fs::remove_dir_all(&project).ok();
}

#[test]
fn uvs_are_flipped_for_gltf() {
    let project = scratch_project("uvs");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(STAGED).expect("snapshot");
    export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");

    let bytes = fs::read(layout.mesh_path("Floor.glb")).expect("glb written");
    let (document, buffers, _images) = gltf::import_slice(&bytes).expect("valid glb");
    let primitive = document.meshes().next().unwrap().primitives().next().unwrap();
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let uvs: Vec<[f32; 2]> = reader.read_tex_coords(0).expect("uvs").into_f32().collect();
    assert_eq!(uvs, vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);

    fs::remove_dir_all(&project).ok();
}

/// Leave a lock file behind as a killed run would
fn plant_abandoned_lock(layout: &ViewerLayout) {
    fs::create_dir_all(layout.public_dir()).unwrap();
    let path = layout.public_dir().join(".sceneport.lock");
    fs::write(&path, format!("{}\n", i32::MAX)).unwrap();
    let old = std::time::SystemTime::now() - sceneport_core::lock::STALE_AFTER * 2;
    fs::File::options()
        .write(true)
        .open(&path)
        .and_then(|f| f.set_modified(old))
        .unwrap();
}

#[test]
fn abandoned_lock_does_not_block_export_or_clean() {
    let project = scratch_project("abandoned_lock");
    let layout = ViewerLayout::new(&project);
    let snapshot = SceneSnapshot::from_json(CUBE_ONLY).expect("snapshot");

    plant_abandoned_lock(&layout);
    export_scene(&snapshot, &layout, &GlbExporter::default()).expect("export");
    assert!(!layout.public_dir().join(".sceneport.lock").exists());

    plant_abandoned_lock(&layout);
    let report = clean_viewer(&layout).expect("clean");
    assert_eq!(report.removed.len(), 2);

    fs::remove_dir_all(&project).ok();
}
