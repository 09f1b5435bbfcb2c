//! Binary glTF (GLB) writer for single mesh objects
//!
//! Output is one scene with one node carrying the object's transform and one
//! mesh with a single triangle primitive. Geometry and transform are
//! converted from the host's Z-up space to glTF's Y-up space.

use super::MeshExporter;
use crate::math::{euler_rotation, quat_z_up_to_y_up, z_up_to_y_up};
use crate::snapshot::{MeshData, SceneObject};
use crate::{Error, Result};
use glam::Vec3;
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Export options for GLB
#[derive(Debug, Clone)]
pub struct GlbExportOptions {
    /// Write the object's location/rotation/scale on the node
    pub export_transform: bool,
    /// Written to `asset.generator`
    pub generator: String,
}

impl Default for GlbExportOptions {
    fn default() -> Self {
        Self {
            export_transform: true,
            generator: format!("Sceneport {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Default mesh exporter: one `.glb` per object
#[derive(Debug, Clone, Default)]
pub struct GlbExporter {
    pub options: GlbExportOptions,
}

impl GlbExporter {
    pub fn new(options: GlbExportOptions) -> Self {
        Self { options }
    }
}

impl MeshExporter for GlbExporter {
    fn export(&self, object: &SceneObject, mesh: &MeshData, path: &Path) -> Result<()> {
        if mesh.positions.is_empty() {
            let json = build_empty_json(object, &self.options);
            write_glb(path, &serde_json::to_vec(&json)?, &[])?;
            tracing::debug!(object = %object.name, "mesh has no vertices, wrote bare node to {}", path.display());
            return Ok(());
        }

        let geometry = Geometry::from_mesh(mesh).map_err(|reason| Error::MeshExport {
            object: object.name.clone(),
            reason,
        })?;

        let buffer = geometry.to_buffer();
        let json = build_json(object, mesh, &geometry, buffer.len(), &self.options);
        let json_bytes = serde_json::to_vec(&json)?;

        write_glb(path, &json_bytes, &buffer)?;

        tracing::debug!(
            object = %object.name,
            vertices = geometry.positions.len(),
            triangles = geometry.indices.len() / 3,
            "wrote {}",
            path.display()
        );
        Ok(())
    }
}

/// Y-up geometry ready to be laid out in the BIN chunk
struct Geometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Option<Vec<[f32; 2]>>,
    indices: Vec<u32>,
    min: [f32; 3],
    max: [f32; 3],
}

impl Geometry {
    fn from_mesh(mesh: &MeshData) -> std::result::Result<Self, String> {
        let vertex_count = mesh.positions.len();
        if vertex_count == 0 {
            return Err("mesh has no vertices".to_string());
        }

        let indices: Vec<u32> = match &mesh.indices {
            Some(indices) => indices.clone(),
            None => {
                let count = u32::try_from(vertex_count)
                    .map_err(|_| format!("too many vertices ({vertex_count})"))?;
                (0..count).collect()
            }
        };
        if indices.len() % 3 != 0 {
            return Err(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            ));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(format!(
                "index {bad} out of range for {vertex_count} vertices"
            ));
        }

        let positions: Vec<[f32; 3]> = mesh
            .positions
            .iter()
            .map(|&p| to_y_up(Vec3::from_array(p)).to_array())
            .collect();

        let normals = match &mesh.normals {
            Some(normals) if normals.len() == vertex_count => normals
                .iter()
                .map(|&n| to_y_up(Vec3::from_array(n)).normalize_or(Vec3::Y).to_array())
                .collect(),
            Some(normals) => {
                return Err(format!(
                    "{} normals for {vertex_count} vertices",
                    normals.len()
                ));
            }
            None => smooth_normals(&positions, &indices),
        };

        let uvs = match &mesh.uvs {
            // glTF puts the UV origin at the top-left
            Some(uvs) if uvs.len() == vertex_count => {
                Some(uvs.iter().map(|&[u, v]| [u, 1.0 - v]).collect())
            }
            Some(uvs) => {
                return Err(format!("{} uvs for {vertex_count} vertices", uvs.len()));
            }
            None => None,
        };

        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in &positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Ok(Self {
            positions,
            normals,
            uvs,
            indices,
            min,
            max,
        })
    }

    /// Byte ranges `(offset, length)` of positions, normals, uvs, indices
    fn views(&self) -> Vec<(usize, usize)> {
        let vertex_count = self.positions.len();
        let mut sizes = vec![vertex_count * 12, vertex_count * 12];
        if self.uvs.is_some() {
            sizes.push(vertex_count * 8);
        }
        sizes.push(self.indices.len() * 4);

        let mut offset = 0;
        sizes
            .into_iter()
            .map(|size| {
                let view = (offset, size);
                offset += size;
                view
            })
            .collect()
    }

    fn to_buffer(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(bytemuck::cast_slice(&self.positions));
        buffer.extend_from_slice(bytemuck::cast_slice(&self.normals));
        if let Some(uvs) = &self.uvs {
            buffer.extend_from_slice(bytemuck::cast_slice(uvs));
        }
        buffer.extend_from_slice(bytemuck::cast_slice(&self.indices));
        buffer
    }
}

fn to_y_up(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Area-weighted vertex normals
///
/// Vertices that only touch degenerate triangles get +Y so every normal
/// stays unit length.
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from_array(positions[i0]);
        let p1 = Vec3::from_array(positions[i1]);
        let p2 = Vec3::from_array(positions[i2]);
        let face_normal = (p1 - p0).cross(p2 - p0);

        for i in [i0, i1, i2] {
            normals[i] += face_normal;
        }
    }

    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y).to_array())
        .collect()
}

fn build_json(
    object: &SceneObject,
    mesh: &MeshData,
    geometry: &Geometry,
    buffer_len: usize,
    options: &GlbExportOptions,
) -> Value {
    let vertex_count = geometry.positions.len();
    let views = geometry.views();
    let has_uvs = geometry.uvs.is_some();

    let mut attributes = json!({ "POSITION": 0, "NORMAL": 1 });
    let mut accessors = vec![
        json!({
            "bufferView": 0,
            "componentType": COMPONENT_FLOAT,
            "count": vertex_count,
            "type": "VEC3",
            "min": geometry.min,
            "max": geometry.max,
        }),
        json!({
            "bufferView": 1,
            "componentType": COMPONENT_FLOAT,
            "count": vertex_count,
            "type": "VEC3",
        }),
    ];
    if has_uvs {
        attributes["TEXCOORD_0"] = json!(2);
        accessors.push(json!({
            "bufferView": 2,
            "componentType": COMPONENT_FLOAT,
            "count": vertex_count,
            "type": "VEC2",
        }));
    }
    let index_accessor = accessors.len();
    accessors.push(json!({
        "bufferView": index_accessor,
        "componentType": COMPONENT_UNSIGNED_INT,
        "count": geometry.indices.len(),
        "type": "SCALAR",
    }));

    let buffer_views: Vec<Value> = views
        .iter()
        .enumerate()
        .map(|(i, &(offset, length))| {
            let target = if i == index_accessor {
                TARGET_ELEMENT_ARRAY_BUFFER
            } else {
                TARGET_ARRAY_BUFFER
            };
            json!({
                "buffer": 0,
                "byteOffset": offset,
                "byteLength": length,
                "target": target,
            })
        })
        .collect();

    json!({
        "asset": { "version": "2.0", "generator": options.generator },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [node_json(object, options, Some(0))],
        "meshes": [{
            "name": mesh.name,
            "primitives": [{ "attributes": attributes, "indices": index_accessor }],
        }],
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [{ "byteLength": buffer_len }],
    })
}

/// Document for a mesh without vertices: one node, no mesh or buffers
fn build_empty_json(object: &SceneObject, options: &GlbExportOptions) -> Value {
    json!({
        "asset": { "version": "2.0", "generator": options.generator },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [node_json(object, options, None)],
    })
}

fn node_json(object: &SceneObject, options: &GlbExportOptions, mesh: Option<usize>) -> Value {
    let mut node = json!({ "name": object.name });
    if let Some(mesh) = mesh {
        node["mesh"] = json!(mesh);
    }
    if options.export_transform {
        let translation = z_up_to_y_up(object.location());
        let rotation = quat_z_up_to_y_up(euler_rotation(object.rotation_euler()));
        let scale = object.scale();
        node["translation"] = json!(translation.to_array());
        node["rotation"] = json!(rotation.to_array());
        node["scale"] = json!([scale.x, scale.z, scale.y]);
    }
    node
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn write_glb(path: &Path, json: &[u8], bin: &[u8]) -> Result<()> {
    let json_padding = padding(json.len());
    let bin_padding = padding(bin.len());

    // The BIN chunk is omitted when there is no binary data
    let bin_chunk_size = if bin.is_empty() { 0 } else { 8 + bin.len() + bin_padding };
    let total_size = 12 // header
        + 8 + json.len() + json_padding
        + bin_chunk_size;

    let as_u32 = |n: usize| {
        u32::try_from(n).map_err(|_| Error::MeshExport {
            object: path.display().to_string(),
            reason: format!("GLB too large ({n} bytes)"),
        })
    };
    let total_size = as_u32(total_size)?;
    let json_chunk_len = as_u32(json.len() + json_padding)?;
    let bin_chunk_len = as_u32(bin.len() + bin_padding)?;

    let write = || -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);

        out.write_all(GLB_MAGIC)?;
        out.write_all(&GLB_VERSION.to_le_bytes())?;
        out.write_all(&total_size.to_le_bytes())?;

        out.write_all(&json_chunk_len.to_le_bytes())?;
        out.write_all(&CHUNK_JSON.to_le_bytes())?;
        out.write_all(json)?;
        out.write_all(&vec![b' '; json_padding])?;

        if !bin.is_empty() {
            out.write_all(&bin_chunk_len.to_le_bytes())?;
            out.write_all(&CHUNK_BIN.to_le_bytes())?;
            out.write_all(bin)?;
            out.write_all(&vec![0u8; bin_padding])?;
        }

        out.flush()
    };

    write().map_err(|e| Error::io(path, e))
}
