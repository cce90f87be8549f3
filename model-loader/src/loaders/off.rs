//! Object File Format loading
//!
//! Handles the classic layout: an optional `OFF` (or `COFF`/`NOFF` variant)
//! keyword, a `vertices faces edges` count line, then vertex and face rows.
//! The keyword and the counts may share a line. Faces are fan-triangulated.

use glam::Vec3;

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
    scene::Scene,
};

pub(crate) fn load(bytes: &[u8]) -> Result<Scene> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::parse(format!("OFF: {e}")))?;

    // Strip comments, keep non-empty lines as token rows.
    let mut rows = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().collect::<Vec<_>>());

    let mut header = rows
        .next()
        .ok_or_else(|| Error::parse("OFF: empty file"))?;
    if header
        .first()
        .is_some_and(|token| token.to_ascii_uppercase().ends_with("OFF"))
    {
        header.remove(0);
        if header.is_empty() {
            header = rows
                .next()
                .ok_or_else(|| Error::parse("OFF: missing count line"))?;
        }
    }
    if header.len() < 2 {
        return Err(Error::parse("OFF: count line needs vertex and face counts"));
    }
    let vertex_count: usize = header[0]
        .parse()
        .map_err(|_| Error::parse(format!("OFF: bad vertex count {:?}", header[0])))?;
    let face_count: usize = header[1]
        .parse()
        .map_err(|_| Error::parse(format!("OFF: bad face count {:?}", header[1])))?;

    let mut mesh = Mesh::with_capacity(vertex_count, face_count);
    for _ in 0..vertex_count {
        let row = rows
            .next()
            .ok_or_else(|| Error::parse("OFF: fewer vertex rows than the header declares"))?;
        if row.len() < 3 {
            return Err(Error::parse("OFF: vertex row has fewer than three columns"));
        }
        let parse = |s: &str| {
            s.parse::<f32>()
                .map_err(|_| Error::parse(format!("OFF: bad coordinate {s:?}")))
        };
        mesh.positions
            .push(Vec3::new(parse(row[0])?, parse(row[1])?, parse(row[2])?));
    }

    for _ in 0..face_count {
        let row = rows
            .next()
            .ok_or_else(|| Error::parse("OFF: fewer face rows than the header declares"))?;
        let arity: usize = row[0]
            .parse()
            .map_err(|_| Error::parse(format!("OFF: bad face arity {:?}", row[0])))?;
        if row.len() < arity + 1 {
            return Err(Error::parse("OFF: face row shorter than its arity"));
        }
        let indices = row[1..=arity]
            .iter()
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|_| Error::parse(format!("OFF: bad face index {s:?}")))
            })
            .collect::<Result<Vec<_>>>()?;
        for window in 1..arity.saturating_sub(1) {
            mesh.faces
                .push([indices[0], indices[window], indices[window + 1]]);
        }
    }

    let mut scene = Scene::new(FileType::Off);
    scene.push_mesh(mesh);
    Ok(scene)
}
