//! XYZ point cloud loading
//!
//! Rows of `x y z` (extra columns ignored), `#` comments allowed. Commas are
//! accepted as separators since exporters disagree on the delimiter.

use glam::Vec3;

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
    scene::Scene,
};

pub(crate) fn load(bytes: &[u8]) -> Result<Scene> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::parse(format!("XYZ: {e}")))?;

    let mut mesh = Mesh::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").replace(',', " ");
        let mut fields = line.split_whitespace();
        let Some(x) = fields.next() else { continue };
        let (Some(y), Some(z)) = (fields.next(), fields.next()) else {
            return Err(Error::parse(format!(
                "XYZ: line {} has fewer than three columns",
                line_no + 1
            )));
        };
        let parse = |s: &str| {
            s.parse::<f32>()
                .map_err(|_| Error::parse(format!("XYZ: bad coordinate {s:?} on line {}", line_no + 1)))
        };
        mesh.positions.push(Vec3::new(parse(x)?, parse(y)?, parse(z)?));
    }

    if mesh.positions.is_empty() {
        return Err(Error::parse("XYZ: no coordinate rows"));
    }

    let mut scene = Scene::new(FileType::Xyz);
    scene.push_mesh(mesh);
    Ok(scene)
}
