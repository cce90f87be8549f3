//! Wavefront OBJ loading via `tobj`
//!
//! Material libraries are fetched through the resolver; a missing or broken
//! MTL degrades to an untextured model instead of failing the load.

use std::io::Cursor;

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
    resolver::Resolver,
    scene::Scene,
};

pub(crate) fn load(bytes: &[u8], resolver: Option<&dyn Resolver>) -> Result<Scene> {
    let mut reader = Cursor::new(bytes);
    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, materials) = tobj::load_obj_buf(&mut reader, &load_options, |mtl_path| {
        let Some(resolver) = resolver else {
            return Err(tobj::LoadError::OpenFileFailed);
        };
        let name = mtl_path.to_string_lossy();
        match resolver.get(name.as_ref()) {
            Ok(data) => tobj::load_mtl_buf(&mut Cursor::new(data)),
            Err(_) => Err(tobj::LoadError::OpenFileFailed),
        }
    })
    .map_err(|e| Error::parse(format!("OBJ: {e}")))?;

    if let Err(e) = &materials {
        debug!("material library unavailable: {e}");
    }

    let mut scene = Scene::new(FileType::Obj);
    for model in models {
        let obj_mesh = model.mesh;
        let mut mesh = Mesh::with_capacity(obj_mesh.positions.len() / 3, obj_mesh.indices.len() / 3);
        mesh.name = (!model.name.is_empty()).then_some(model.name);

        for chunk in obj_mesh.positions.chunks_exact(3) {
            mesh.positions.push(Vec3::new(chunk[0], chunk[1], chunk[2]));
        }
        if obj_mesh.normals.len() == obj_mesh.positions.len() {
            mesh.normals = Some(
                obj_mesh
                    .normals
                    .chunks_exact(3)
                    .map(|n| Vec3::new(n[0], n[1], n[2]))
                    .collect(),
            );
        }
        if obj_mesh.texcoords.len() / 2 == obj_mesh.positions.len() / 3 {
            mesh.tex_coords = Some(
                obj_mesh
                    .texcoords
                    .chunks_exact(2)
                    .map(|t| Vec2::new(t[0], t[1]))
                    .collect(),
            );
        }
        for chunk in obj_mesh.indices.chunks_exact(3) {
            mesh.faces.push([chunk[0], chunk[1], chunk[2]]);
        }

        scene.push_mesh(mesh);
    }

    Ok(scene)
}
