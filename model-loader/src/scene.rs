//! Scene representation
//!
//! A [`Scene`] is what every loader returns: the geometry found in one file,
//! tagged with the format it came from. The `Display` rendering is a stable
//! one-line summary used by bulk loading reports.

use std::fmt;

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
};

/// A loaded scene: the geometry of a single source file
#[derive(Debug, Clone)]
pub struct Scene {
    source: FileType,
    geometry: Vec<Mesh>,
}

impl Scene {
    /// Create an empty scene for the given source format
    pub fn new(source: FileType) -> Self {
        Self {
            source,
            geometry: Vec::new(),
        }
    }

    /// The format the scene was loaded from
    pub fn source(&self) -> FileType {
        self.source
    }

    /// Append a mesh to the scene
    pub fn push_mesh(&mut self, mesh: Mesh) {
        self.geometry.push(mesh);
    }

    /// Number of meshes in the scene
    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }

    /// Iterate over the meshes in the scene
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.geometry.iter()
    }

    /// Total vertex count across all meshes
    pub fn vertex_count(&self) -> usize {
        self.geometry.iter().map(Mesh::vertex_count).sum()
    }

    /// Total triangle count across all meshes
    pub fn face_count(&self) -> usize {
        self.geometry.iter().map(Mesh::face_count).sum()
    }

    /// Whether the scene contains no geometry at all
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Check that the scene is usable.
    ///
    /// A scene with no vertices is rejected, as is any mesh whose indices or
    /// attribute arrays are inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::invalid_scene("scene contains no geometry"));
        }
        for mesh in &self.geometry {
            mesh.validate()?;
        }
        Ok(())
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene(source={}, geometry={}, vertices={}, faces={})",
            self.source.extension(),
            self.geometry_count(),
            self.vertex_count(),
            self.face_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_display_summary() {
        let mut scene = Scene::new(FileType::Obj);
        let mut mesh = Mesh::new();
        mesh.positions.push(Vec3::ZERO);
        mesh.positions.push(Vec3::X);
        mesh.positions.push(Vec3::Y);
        mesh.faces.push([0, 1, 2]);
        scene.push_mesh(mesh);

        assert_eq!(
            scene.to_string(),
            "Scene(source=obj, geometry=1, vertices=3, faces=1)"
        );
    }

    #[test]
    fn test_empty_scene_fails_validation() {
        let scene = Scene::new(FileType::Stl);
        assert!(matches!(
            scene.validate(),
            Err(Error::InvalidScene { .. })
        ));
    }

    #[test]
    fn test_point_cloud_scene_is_valid() {
        let mut scene = Scene::new(FileType::Xyz);
        let mut mesh = Mesh::new();
        mesh.positions.push(Vec3::ZERO);
        scene.push_mesh(mesh);
        assert!(scene.validate().is_ok());
    }
}
