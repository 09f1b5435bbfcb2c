//! Records written to `lights_and_cameras.json`
//!
//! Field order here is the key order in the emitted JSON.

use crate::math::{forward_target, remap, rgb_rounded, safe_name};
use crate::snapshot::{CameraData, LightData, LightType, SceneObject, SceneSnapshot};
use serde::{Deserialize, Serialize};

/// The only camera type the viewer understands
pub const PERSPECTIVE_CAMERA: &str = "PerspectiveCamera";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub camera_type: String,
    pub fov: f64,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

impl CameraRecord {
    pub fn new(object: &SceneObject, camera: &CameraData) -> Self {
        Self {
            name: safe_name(&object.name),
            camera_type: PERSPECTIVE_CAMERA.to_string(),
            fov: camera.lens,
            position: remap(object.location()),
            rotation: remap(object.rotation_euler()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub light_type: LightType,
    pub color: [f64; 3],
    pub intensity: f64,
    pub position: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

impl LightRecord {
    /// Build a light record; spot lights also get an aim point and cone angle
    ///
    /// `snapshot` resolves constraint targets by object name.
    pub fn new(object: &SceneObject, light: &LightData, snapshot: &SceneSnapshot) -> Self {
        let mut record = Self {
            name: safe_name(&object.name),
            light_type: light.light_type,
            color: rgb_rounded(light.color.0),
            intensity: light.energy,
            position: remap(object.location()),
            target: None,
            angle: None,
        };

        if light.light_type == LightType::Spot {
            record.target = Some(spot_target(object, snapshot));
            record.angle = Some(light.spot_size);
        }

        record
    }
}

/// Aim point of a spot light
///
/// The first aim constraint with a resolvable target wins. Without one the
/// light aims one unit along its local -Z axis.
fn spot_target(object: &SceneObject, snapshot: &SceneSnapshot) -> [f64; 3] {
    let aim_targets: Vec<&str> = object
        .constraints
        .iter()
        .filter(|c| c.kind.is_aim())
        .filter_map(|c| c.target.as_deref())
        .collect();

    for name in &aim_targets {
        match snapshot.object(name) {
            Some(target) => return remap(target.location()),
            None => {
                tracing::warn!(light = %object.name, target = name, "constraint target not found");
            }
        }
    }

    let has_aim = object.constraints.iter().any(|c| c.kind.is_aim());
    if has_aim {
        tracing::warn!(
            light = %object.name,
            "aim constraint without usable target, aiming along local -Z"
        );
    }

    remap(forward_target(object.location(), object.rotation_euler()))
}

/// Root of the exported JSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneExport {
    pub cameras: Vec<CameraRecord>,
    pub lights: Vec<LightRecord>,
    pub background: [f64; 3],
    pub meshes: Vec<String>,
}

impl SceneExport {
    /// Pretty JSON with 2-space indentation
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
