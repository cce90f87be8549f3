//! glTF 2.0 / GLB loading via the `gltf` crate
//!
//! Buffers come from the GLB binary chunk, inline `data:` URIs, or the
//! caller's resolver. Version 1.x assets are recognized and reported as
//! not implemented rather than failing as parse errors; the 1.0 schema is a
//! different format in everything but name.

use base64::Engine as _;
use glam::{Vec2, Vec3};
use gltf::buffer::Source;
use tracing::debug;

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
    resolver::{Resolver, percent_decode},
    scene::Scene,
};

const GLB_MAGIC: &[u8; 4] = b"glTF";

pub(crate) fn load(
    bytes: &[u8],
    file_type: FileType,
    resolver: Option<&dyn Resolver>,
) -> Result<Scene> {
    check_version(bytes)?;

    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).map_err(|e| Error::parse(format!("glTF: {e}")))?;
    let buffers = load_buffers(&document, blob, resolver)?;

    // One mesh per primitive; a multi-primitive glTF mesh is really several
    // draw batches with independent attribute layouts.
    let mut scene = Scene::new(file_type);
    for mesh_def in document.meshes() {
        for primitive in mesh_def.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!(mode = ?primitive.mode(), "skipping non-triangle primitive");
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                continue;
            };

            let mut mesh = Mesh::new();
            mesh.name = mesh_def.name().map(String::from);
            mesh.positions = positions.map(Vec3::from).collect();

            if let Some(normals) = reader.read_normals() {
                let normals: Vec<Vec3> = normals.map(Vec3::from).collect();
                if normals.len() == mesh.positions.len() {
                    mesh.normals = Some(normals);
                }
            }
            if let Some(tex_coords) = reader.read_tex_coords(0) {
                let tex_coords: Vec<Vec2> = tex_coords.into_f32().map(Vec2::from).collect();
                if tex_coords.len() == mesh.positions.len() {
                    mesh.tex_coords = Some(tex_coords);
                }
            }

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                // Non-indexed triangle soup.
                None => (0..mesh.positions.len() as u32).collect(),
            };
            for chunk in indices.chunks_exact(3) {
                mesh.faces.push([chunk[0], chunk[1], chunk[2]]);
            }

            scene.push_mesh(mesh);
        }
    }

    Ok(scene)
}

/// Reject pre-2.0 assets with a [`Error::NotImplemented`] before the real
/// parser sees them.
fn check_version(bytes: &[u8]) -> Result<()> {
    if bytes.len() >= 8 && &bytes[..4] == GLB_MAGIC {
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != 2 {
            return Err(Error::not_implemented(format!(
                "GLB container version {version} is not supported"
            )));
        }
        return Ok(());
    }

    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| Error::parse(format!("glTF: {e}")))?;
    match json
        .get("asset")
        .and_then(|asset| asset.get("version"))
        .and_then(|version| version.as_str())
    {
        Some(version) if version.starts_with('2') => Ok(()),
        Some(version) => Err(Error::not_implemented(format!(
            "glTF {version} assets are not supported, only 2.x"
        ))),
        None => Err(Error::not_implemented(
            "glTF asset without a version predates 2.0 and is not supported",
        )),
    }
}

fn load_buffers(
    document: &gltf::Document,
    mut blob: Option<Vec<u8>>,
    resolver: Option<&dyn Resolver>,
) -> Result<Vec<Vec<u8>>> {
    let mut buffers = Vec::with_capacity(document.buffers().len());
    for buffer in document.buffers() {
        let mut data = match buffer.source() {
            Source::Bin => blob
                .take()
                .ok_or_else(|| Error::parse("glTF: GLB binary chunk is missing"))?,
            Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)?,
            Source::Uri(uri) => {
                let resolver = resolver.ok_or_else(|| {
                    Error::file_not_found(format!(
                        "external buffer {uri} requires a resolver"
                    ))
                })?;
                resolver.get(&percent_decode(uri))?
            }
        };
        if data.len() < buffer.length() {
            return Err(Error::parse(format!(
                "glTF: buffer holds {} bytes but declares {}",
                data.len(),
                buffer.length()
            )));
        }
        data.truncate(buffer.length());
        buffers.push(data);
    }
    Ok(buffers)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let encoded = uri
        .split_once(',')
        .map(|(_, payload)| payload)
        .ok_or_else(|| Error::parse("glTF: malformed data URI"))?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| Error::parse(format!("glTF: data URI: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryResolver;
    use base64::Engine as _;

    /// One triangle; positions live in an external buffer named tri.bin.
    fn triangle_gltf(buffer_uri: &str) -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "buffers": [ {{ "uri": "{buffer_uri}", "byteLength": 36 }} ],
  "bufferViews": [ {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }} ],
  "accessors": [ {{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0, 0, 0], "max": [1, 1, 0]
  }} ],
  "meshes": [ {{ "name": "tri", "primitives": [ {{ "attributes": {{ "POSITION": 0 }} }} ] }} ],
  "nodes": [ {{ "mesh": 0 }} ],
  "scenes": [ {{ "nodes": [0] }} ],
  "scene": 0
}}"#
        )
    }

    fn triangle_buffer() -> Vec<u8> {
        let mut data = Vec::new();
        for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_external_buffer_through_resolver() {
        let mut resolver = MemoryResolver::new();
        resolver.add_file("tri.bin", triangle_buffer());

        let scene = load(
            triangle_gltf("tri.bin").as_bytes(),
            FileType::Gltf,
            Some(&resolver),
        )
        .unwrap();
        assert_eq!(scene.vertex_count(), 3);
        assert_eq!(scene.face_count(), 1);
    }

    #[test]
    fn test_data_uri_buffer() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(triangle_buffer());
        let gltf = triangle_gltf(&format!("data:application/octet-stream;base64,{encoded}"));
        let scene = load(gltf.as_bytes(), FileType::Gltf, None).unwrap();
        assert_eq!(scene.vertex_count(), 3);
    }

    #[test]
    fn test_missing_external_buffer_without_resolver() {
        let result = load(triangle_gltf("tri.bin").as_bytes(), FileType::Gltf, None);
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_gltf_1_is_not_implemented() {
        let gltf = r#"{ "asset": { "version": "1.0" }, "buffers": {} }"#;
        let result = load(gltf.as_bytes(), FileType::Gltf, None);
        assert!(matches!(result, Err(Error::NotImplemented { .. })));
    }

    #[test]
    fn test_glb_v1_container_is_not_implemented() {
        let mut data = b"glTF".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[0; 16]);
        let result = load(&data, FileType::Glb, None);
        assert!(matches!(result, Err(Error::NotImplemented { .. })));
    }

    #[test]
    fn test_versionless_asset_is_not_implemented() {
        let gltf = r#"{ "buffers": {}, "meshes": {} }"#;
        let result = load(gltf.as_bytes(), FileType::Gltf, None);
        assert!(matches!(result, Err(Error::NotImplemented { .. })));
    }
}
