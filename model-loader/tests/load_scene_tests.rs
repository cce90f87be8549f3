//! End-to-end loading through the public API
//! These tests drive load_scene the way the corpus harness does: bytes plus
//! a type hint plus a resolver rooted where the file lives.

use std::io::Write;

use model_loader::resolver::{MemoryResolver, Resolver, ZipResolver};
use model_loader::{Error, FileType, load_scene};

const CUBE_OBJ: &str = "\
mtllib cube.mtl
o cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 2 3 4
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

#[test]
fn test_obj_cube_with_materials() {
    let mut resolver = MemoryResolver::new();
    resolver.add_file("cube.mtl", b"newmtl gray\nKd 0.5 0.5 0.5\n".to_vec());

    let scene = load_scene(CUBE_OBJ.as_bytes(), "cube.obj", Some(&resolver)).unwrap();
    assert_eq!(scene.source(), FileType::Obj);
    assert_eq!(scene.vertex_count(), 8);
    // Six quads triangulate to twelve faces.
    assert_eq!(scene.face_count(), 12);
    assert_eq!(
        scene.to_string(),
        "Scene(source=obj, geometry=1, vertices=8, faces=12)"
    );
}

#[test]
fn test_formats_dispatch_by_hint_case_insensitively() {
    let scene = load_scene(b"0 0 0\n1 2 3\n", "POINTS.XYZ", None).unwrap();
    assert_eq!(scene.source(), FileType::Xyz);
    assert_eq!(scene.vertex_count(), 2);
}

#[test]
fn test_gltf_with_sibling_buffer_in_archive() {
    // Lay the fixture out the way a repository snapshot looks: the .gltf and
    // its .bin side by side under a models/ directory.
    let gltf = r#"{
  "asset": { "version": "2.0" },
  "buffers": [ { "uri": "tri.bin", "byteLength": 36 } ],
  "bufferViews": [ { "buffer": 0, "byteOffset": 0, "byteLength": 36 } ],
  "accessors": [ {
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0, 0, 0], "max": [1, 1, 0]
  } ],
  "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 } } ] } ]
}"#;
    let mut buffer = Vec::new();
    for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        buffer.extend_from_slice(&value.to_le_bytes());
    }

    let archive = tempfile::NamedTempFile::with_suffix(".zip").unwrap();
    let mut writer = zip::ZipWriter::new(archive.reopen().unwrap());
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("snap-1234/models/tri.gltf", options).unwrap();
    writer.write_all(gltf.as_bytes()).unwrap();
    writer.start_file("snap-1234/models/tri.bin", options).unwrap();
    writer.write_all(&buffer).unwrap();
    writer.finish().unwrap();

    let zip = ZipResolver::open(archive.path()).unwrap();
    let resolver = zip.namespaced("snap-1234/models").unwrap();
    let bytes = resolver.get("tri.gltf").unwrap();

    let scene = load_scene(&bytes, "tri.gltf", Some(&resolver)).unwrap();
    assert_eq!(scene.vertex_count(), 3);
    assert_eq!(scene.face_count(), 1);
}

#[test]
fn test_stl_and_ply_agree_on_a_triangle() {
    let stl = "\
solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";
    let ply = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
";
    let from_stl = load_scene(stl.as_bytes(), "tri.stl", None).unwrap();
    let from_ply = load_scene(ply.as_bytes(), "tri.ply", None).unwrap();
    assert_eq!(from_stl.vertex_count(), from_ply.vertex_count());
    assert_eq!(from_stl.face_count(), from_ply.face_count());
}

#[test]
fn test_malformed_input_reports_parse_error() {
    for (bytes, hint) in [
        (&b"ply\nformat ascii 1.0\n"[..], "no_end.ply"),
        (&b"OFF\n9 9 9\n0 0 0\n"[..], "short.off"),
        (&b"not a zip"[..], "box.3mf"),
    ] {
        match load_scene(bytes, hint, None) {
            Err(Error::Parse { .. }) => {}
            other => panic!("{hint}: expected a parse error, got {other:?}"),
        }
    }
}
