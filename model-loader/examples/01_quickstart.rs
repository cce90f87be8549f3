//! Load a model given on the command line and print a summary

use std::path::Path;

use model_loader::load_scene;
use model_loader::resolver::DirResolver;

fn main() -> model_loader::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("usage: 01_quickstart <model-file>");
        std::process::exit(2);
    });
    let path = Path::new(&path);

    // Root a resolver where the file lives so material libraries and glTF
    // buffers next to it resolve.
    let resolver = DirResolver::new(path.parent().unwrap_or(Path::new(".")));
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let scene = load_scene(&bytes, &name, Some(&resolver))?;
    println!("{scene}");
    for (index, mesh) in scene.meshes().enumerate() {
        println!(
            "  mesh {}: {} vertices, {} faces{}",
            index,
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.name
                .as_deref()
                .map(|name| format!(" ({name})"))
                .unwrap_or_default()
        );
    }
    Ok(())
}
