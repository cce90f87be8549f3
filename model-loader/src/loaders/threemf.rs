//! 3MF loading
//!
//! A 3MF file is a zip package; the geometry lives in an XML part, usually
//! `3D/3dmodel.model`, as indexed vertices and triangles.

use std::io::{Cursor, Read};

use glam::Vec3;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
    scene::Scene,
};

pub(crate) fn load(bytes: &[u8]) -> Result<Scene> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::parse(format!("3MF: not a zip package: {e}")))?;

    let model_part = find_model_part(&mut archive)?;
    let mut xml = String::new();
    archive
        .by_name(&model_part)
        .map_err(|e| Error::parse(format!("3MF: cannot open {model_part:?}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::parse(format!("3MF: {model_part:?}: {e}")))?;

    parse_model(&xml)
}

fn find_model_part<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>) -> Result<String> {
    // Spec location first, case variants seen in the wild after.
    let candidates = ["3D/3dmodel.model", "3d/3dmodel.model", "3D/3DModel.model"];
    for candidate in candidates {
        if archive.by_name(candidate).is_ok() {
            return Ok(candidate.to_string());
        }
    }
    for index in 0..archive.len() {
        if let Ok(file) = archive.by_index(index) {
            if file.name().to_lowercase().ends_with(".model") {
                return Ok(file.name().to_string());
            }
        }
    }
    Err(Error::parse("3MF: package contains no model part"))
}

fn parse_model(xml: &str) -> Result<Scene> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scene = Scene::new(FileType::ThreeMf);
    let mut mesh = Mesh::new();
    let mut in_vertices = false;
    let mut in_triangles = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"vertices" => in_vertices = true,
                b"triangles" => in_triangles = true,
                b"vertex" if in_vertices => {
                    let mut position = Vec3::ZERO;
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value);
                        let slot = match attr.key.local_name().as_ref() {
                            b"x" => &mut position.x,
                            b"y" => &mut position.y,
                            b"z" => &mut position.z,
                            _ => continue,
                        };
                        *slot = value
                            .parse()
                            .map_err(|_| Error::parse(format!("3MF: bad coordinate {value:?}")))?;
                    }
                    mesh.positions.push(position);
                }
                b"triangle" if in_triangles => {
                    let mut face = [0u32; 3];
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value);
                        let slot = match attr.key.local_name().as_ref() {
                            b"v1" => &mut face[0],
                            b"v2" => &mut face[1],
                            b"v3" => &mut face[2],
                            _ => continue,
                        };
                        *slot = value
                            .parse()
                            .map_err(|_| Error::parse(format!("3MF: bad index {value:?}")))?;
                    }
                    mesh.faces.push(face);
                }
                b"object" => {
                    // New object: bank whatever the previous one produced.
                    if !mesh.positions.is_empty() {
                        scene.push_mesh(std::mem::take(&mut mesh));
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"vertices" => in_vertices = false,
                b"triangles" => in_triangles = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::parse(format!("3MF: XML: {e}"))),
            _ => {}
        }
    }

    if !mesh.positions.is_empty() {
        scene.push_mesh(mesh);
    }
    debug!(
        geometry = scene.geometry_count(),
        vertices = scene.vertex_count(),
        "parsed 3MF model part"
    );
    Ok(scene)
}
