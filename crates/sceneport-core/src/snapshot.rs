//! Read-only snapshot of the host's scene graph
//!
//! The host writes one of these per export request. Every list keeps the
//! host's iteration order, which in turn fixes the order of the exported
//! records.

use crate::{Error, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete scene state handed to the serializer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub cameras: Vec<CameraData>,
    #[serde(default)]
    pub lights: Vec<LightData>,
    #[serde(default)]
    pub meshes: Vec<MeshData>,
    #[serde(default)]
    pub world: Option<World>,
}

impl SceneSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot file written by the host
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&json)
    }

    /// Look up an object by its exact name
    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Look up mesh data by its exact name
    pub fn mesh(&self, name: &str) -> Option<&MeshData> {
        self.meshes.iter().find(|m| m.name == name)
    }
}

/// Kind of a scene object, mirrored from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Mesh,
    Camera,
    Light,
    Empty,
    #[serde(other)]
    Other,
}

/// A placed object in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    /// Name of the camera, light or mesh data block this object instantiates
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub location: [f64; 3],
    /// Euler angles in radians, XYZ order
    #[serde(default)]
    pub rotation_euler: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

fn unit_scale() -> [f64; 3] {
    [1.0; 3]
}

impl SceneObject {
    pub fn location(&self) -> DVec3 {
        DVec3::from_array(self.location)
    }

    pub fn rotation_euler(&self) -> DVec3 {
        DVec3::from_array(self.rotation_euler)
    }

    pub fn scale(&self) -> DVec3 {
        DVec3::from_array(self.scale)
    }
}

/// Object constraint kinds that matter for aiming lights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    TrackTo,
    DampedTrack,
    LockedTrack,
    #[serde(other)]
    Other,
}

impl ConstraintKind {
    /// Whether this constraint points the object at its target
    pub fn is_aim(self) -> bool {
        matches!(self, Self::TrackTo | Self::DampedTrack | Self::LockedTrack)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Name of the target object, if one is set
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraData {
    pub name: String,
    /// Focal length as reported by the host
    pub lens: f64,
}

/// Light types, spelled the way the host and the viewer spell them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightType {
    Point,
    Sun,
    Spot,
    Area,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightData {
    pub name: String,
    #[serde(rename = "type")]
    pub light_type: LightType,
    pub color: Color,
    pub energy: f64,
    /// Spot cone angle as reported by the host
    #[serde(default = "default_spot_size")]
    pub spot_size: f64,
}

fn default_spot_size() -> f64 {
    std::f64::consts::FRAC_PI_4
}

/// Triangle geometry for one mesh data block, in host (Z-up) space
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    /// May be empty; such a mesh exports as a node without geometry
    #[serde(default)]
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Option<Vec<[f32; 3]>>,
    /// Host convention: origin at the bottom-left, V pointing up
    #[serde(default)]
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Triangle list; when absent the positions are already a triangle list
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub color: Color,
}

/// RGBA color accepting either three or four channels on input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColorRepr", into = "[f64; 4]")]
pub struct Color(pub [f64; 4]);

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Rgba([f64; 4]),
    Rgb([f64; 3]),
}

impl From<ColorRepr> for Color {
    fn from(repr: ColorRepr) -> Self {
        match repr {
            ColorRepr::Rgba(c) => Self(c),
            ColorRepr::Rgb([r, g, b]) => Self([r, g, b, 1.0]),
        }
    }
}

impl From<Color> for [f64; 4] {
    fn from(color: Color) -> Self {
        color.0
    }
}
