//! The generic load entry point

use tracing::debug;

use crate::{
    error::{Error, Result},
    format::{FileType, extension_of},
    loaders,
    resolver::Resolver,
    scene::Scene,
};

/// Load a scene from raw bytes.
///
/// `file_type` is a type hint: a file name or a bare extension, matched
/// case-insensitively against the format registry. The resolver, when given,
/// services cross-file references (OBJ material libraries, glTF buffers);
/// loaders that need one and don't have it fail with
/// [`Error::FileNotFound`].
///
/// The returned scene is validated: it holds at least one vertex and every
/// face index is in range.
pub fn load_scene(
    bytes: &[u8],
    file_type: &str,
    resolver: Option<&dyn Resolver>,
) -> Result<Scene> {
    let extension = extension_of(file_type);
    let Some(ty) = FileType::from_extension(&extension) else {
        return Err(Error::unsupported_format(file_type));
    };
    debug!(file_type = %extension, size = bytes.len(), "loading scene");

    let scene = match ty {
        FileType::Obj => loaders::obj::load(bytes, resolver)?,
        FileType::Stl => loaders::stl::load(bytes)?,
        FileType::Ply => loaders::ply::load(bytes)?,
        FileType::Off => loaders::off::load(bytes)?,
        FileType::Gltf | FileType::Glb => loaders::gltf::load(bytes, ty, resolver)?,
        FileType::ThreeMf => loaders::threemf::load(bytes)?,
        FileType::Xyz => loaders::xyz::load(bytes)?,
        FileType::Collada => {
            return Err(Error::not_implemented(
                "COLLADA (.dae) import is not implemented",
            ));
        }
    };
    scene.validate()?;
    Ok(scene)
}
