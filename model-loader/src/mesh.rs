//! Indexed triangle mesh data

use glam::{Vec2, Vec3};

use crate::error::{Error, Result};

/// An indexed triangle mesh.
///
/// Positions are always present; normals and texture coordinates are optional
/// and, when present, run parallel to `positions`. A mesh with no faces is a
/// point cloud (XYZ files load this way).
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Name carried over from the source file, if any
    pub name: Option<String>,
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, parallel to `positions`
    pub normals: Option<Vec<Vec3>>,
    /// Per-vertex texture coordinates, parallel to `positions`
    pub tex_coords: Option<Vec<Vec2>>,
    /// Triangle faces as indices into `positions`
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with reserved capacity
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
            ..Self::default()
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangle faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh carries vertices but no faces
    pub fn is_point_cloud(&self) -> bool {
        !self.positions.is_empty() && self.faces.is_empty()
    }

    /// Axis-aligned bounds of the vertex positions, or `None` when empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some((min, max))
    }

    /// Check internal consistency.
    ///
    /// Fails when a face references a vertex index out of range, or when an
    /// optional attribute array does not run parallel to the positions.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.positions.len() as u32;
        for face in &self.faces {
            if face.iter().any(|&index| index >= vertex_count) {
                return Err(Error::invalid_scene(format!(
                    "face references vertex {} but the mesh has {} vertices",
                    face.iter().max().copied().unwrap_or(0),
                    vertex_count
                )));
            }
        }
        if let Some(normals) = &self.normals {
            if normals.len() != self.positions.len() {
                return Err(Error::invalid_scene(format!(
                    "{} normals for {} vertices",
                    normals.len(),
                    self.positions.len()
                )));
            }
        }
        if let Some(tex_coords) = &self.tex_coords {
            if tex_coords.len() != self.positions.len() {
                return Err(Error::invalid_scene(format!(
                    "{} texture coordinates for {} vertices",
                    tex_coords.len(),
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.positions.push(Vec3::new(0.0, 0.0, 0.0));
        mesh.positions.push(Vec3::new(1.0, 0.0, 0.0));
        mesh.positions.push(Vec3::new(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_counts_and_bounds() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert!(!mesh.is_point_cloud());

        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.x, 0.0);
        assert_relative_eq!(max.x, 1.0);
        assert_relative_eq!(max.y, 1.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range_face() {
        let mut mesh = triangle();
        mesh.faces.push([0, 1, 9]);
        assert!(matches!(
            mesh.validate(),
            Err(Error::InvalidScene { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_mismatched_normals() {
        let mut mesh = triangle();
        mesh.normals = Some(vec![Vec3::Z]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(Mesh::new().bounds().is_none());
    }
}
