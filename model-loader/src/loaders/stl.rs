//! STL loading via `stl_io` (binary and ASCII)

use std::io::Cursor;

use glam::Vec3;

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
    scene::Scene,
};

pub(crate) fn load(bytes: &[u8]) -> Result<Scene> {
    let mut reader = Cursor::new(bytes);
    let stl = stl_io::read_stl(&mut reader).map_err(|e| Error::parse(format!("STL: {e}")))?;

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for v in &stl.vertices {
        mesh.positions.push(Vec3::new(v.0[0], v.0[1], v.0[2]));
    }
    for face in &stl.faces {
        let indices = [
            face.vertices[0] as u32,
            face.vertices[1] as u32,
            face.vertices[2] as u32,
        ];
        // Degenerate triangles show up in scanned data; drop them.
        if indices[0] != indices[1] && indices[1] != indices[2] && indices[0] != indices[2] {
            mesh.faces.push(indices);
        }
    }

    let mut scene = Scene::new(FileType::Stl);
    scene.push_mesh(mesh);
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII_TRIANGLE: &str = "\
solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 100 0 0
      vertex 0 100 0
    endloop
  endfacet
endsolid test
";

    #[test]
    fn test_load_ascii_stl() {
        let scene = load(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(scene.vertex_count(), 3);
        assert_eq!(scene.face_count(), 1);

        let mesh = scene.meshes().next().unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::ZERO);
        assert_eq!(max, Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            load(b"solid nope\nnot a facet"),
            Err(Error::Parse { .. })
        ));
    }
}
