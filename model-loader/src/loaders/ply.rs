//! Polygon File Format loading
//!
//! Hand-parsed: the header drives a property layout that the body reader
//! follows exactly, so unknown elements and properties are consumed and
//! skipped rather than tripping the parser. ASCII and both binary byte
//! orders are supported. Polygonal faces are fan-triangulated.

use glam::{Vec2, Vec3};

use crate::{
    error::{Error, Result},
    format::FileType,
    mesh::Mesh,
    scene::Scene,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittle,
    BinaryBig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "char" | "int8" => Self::I8,
            "uchar" | "uint8" => Self::U8,
            "short" | "int16" => Self::I16,
            "ushort" | "uint16" => Self::U16,
            "int" | "int32" => Self::I32,
            "uint" | "uint32" => Self::U32,
            "float" | "float32" => Self::F32,
            "double" | "float64" => Self::F64,
            _ => return None,
        })
    }

    fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

#[derive(Debug, Clone)]
enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    kind: PropertyKind,
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

#[derive(Debug)]
struct Header {
    format: PlyFormat,
    elements: Vec<Element>,
}

pub(crate) fn load(bytes: &[u8]) -> Result<Scene> {
    let (header, body_offset) = parse_header(bytes)?;
    let body = &bytes[body_offset..];

    let mut mesh = Mesh::new();
    match header.format {
        PlyFormat::Ascii => read_ascii_body(&header, body, &mut mesh)?,
        PlyFormat::BinaryLittle => read_binary_body(&header, body, true, &mut mesh)?,
        PlyFormat::BinaryBig => read_binary_body(&header, body, false, &mut mesh)?,
    }

    let mut scene = Scene::new(FileType::Ply);
    scene.push_mesh(mesh);
    Ok(scene)
}

fn parse_header(bytes: &[u8]) -> Result<(Header, usize)> {
    let mut offset = 0;
    let mut lines = Vec::new();
    let mut saw_end = false;

    while offset < bytes.len() {
        let end = bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|pos| offset + pos)
            .unwrap_or(bytes.len());
        let line = std::str::from_utf8(&bytes[offset..end])
            .map_err(|_| Error::parse("PLY: header is not valid UTF-8"))?
            .trim_end_matches('\r')
            .trim();
        offset = end + 1;
        if line == "end_header" {
            saw_end = true;
            break;
        }
        lines.push(line.to_string());
    }
    if !saw_end {
        return Err(Error::parse("PLY: header has no end_header"));
    }

    let mut lines = lines.into_iter();
    match lines.next().as_deref() {
        Some("ply") => {}
        _ => return Err(Error::parse("PLY: missing magic")),
    }

    let mut format = None;
    let mut elements: Vec<Element> = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] | ["comment", ..] | ["obj_info", ..] => {}
            ["format", kind, _version] => {
                format = Some(match *kind {
                    "ascii" => PlyFormat::Ascii,
                    "binary_little_endian" => PlyFormat::BinaryLittle,
                    "binary_big_endian" => PlyFormat::BinaryBig,
                    other => {
                        return Err(Error::parse(format!("PLY: unknown format {other:?}")));
                    }
                });
            }
            ["element", name, count] => {
                let count = count
                    .parse()
                    .map_err(|_| Error::parse(format!("PLY: bad element count {count:?}")))?;
                elements.push(Element {
                    name: (*name).to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            ["property", "list", count_ty, item_ty, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| Error::parse("PLY: property before any element"))?;
                let count = ScalarType::from_keyword(count_ty)
                    .ok_or_else(|| Error::parse(format!("PLY: unknown type {count_ty:?}")))?;
                let item = ScalarType::from_keyword(item_ty)
                    .ok_or_else(|| Error::parse(format!("PLY: unknown type {item_ty:?}")))?;
                element.properties.push(Property {
                    name: (*name).to_string(),
                    kind: PropertyKind::List { count, item },
                });
            }
            ["property", ty, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| Error::parse("PLY: property before any element"))?;
                let ty = ScalarType::from_keyword(ty)
                    .ok_or_else(|| Error::parse(format!("PLY: unknown type {ty:?}")))?;
                element.properties.push(Property {
                    name: (*name).to_string(),
                    kind: PropertyKind::Scalar(ty),
                });
            }
            _ => return Err(Error::parse(format!("PLY: unrecognized header line {line:?}"))),
        }
    }

    let format = format.ok_or_else(|| Error::parse("PLY: header has no format line"))?;
    Ok((Header { format, elements }, offset))
}

/// Indices of the interesting vertex properties within an element layout.
#[derive(Default)]
struct VertexLayout {
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
    nx: Option<usize>,
    ny: Option<usize>,
    nz: Option<usize>,
    u: Option<usize>,
    v: Option<usize>,
}

impl VertexLayout {
    fn of(element: &Element) -> Self {
        let mut layout = Self::default();
        for (index, property) in element.properties.iter().enumerate() {
            let slot = match property.name.as_str() {
                "x" => &mut layout.x,
                "y" => &mut layout.y,
                "z" => &mut layout.z,
                "nx" => &mut layout.nx,
                "ny" => &mut layout.ny,
                "nz" => &mut layout.nz,
                "s" | "u" | "texture_u" => &mut layout.u,
                "t" | "v" | "texture_v" => &mut layout.v,
                _ => continue,
            };
            *slot = Some(index);
        }
        layout
    }

    fn position_indices(&self) -> Result<(usize, usize, usize)> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Ok((x, y, z)),
            _ => Err(Error::parse("PLY: vertex element lacks x/y/z properties")),
        }
    }
}

fn is_face_list(name: &str) -> bool {
    matches!(name, "vertex_indices" | "vertex_index")
}

fn push_face_fan(mesh: &mut Mesh, indices: &[f64]) {
    for window in 1..indices.len().saturating_sub(1) {
        mesh.faces.push([
            indices[0] as u32,
            indices[window] as u32,
            indices[window + 1] as u32,
        ]);
    }
}

fn finish_vertex(
    mesh: &mut Mesh,
    layout: &VertexLayout,
    values: &[f64],
    xyz: (usize, usize, usize),
) {
    mesh.positions.push(Vec3::new(
        values[xyz.0] as f32,
        values[xyz.1] as f32,
        values[xyz.2] as f32,
    ));
    if let (Some(nx), Some(ny), Some(nz)) = (layout.nx, layout.ny, layout.nz) {
        mesh.normals.get_or_insert_with(Vec::new).push(Vec3::new(
            values[nx] as f32,
            values[ny] as f32,
            values[nz] as f32,
        ));
    }
    if let (Some(u), Some(v)) = (layout.u, layout.v) {
        mesh.tex_coords
            .get_or_insert_with(Vec::new)
            .push(Vec2::new(values[u] as f32, values[v] as f32));
    }
}

fn read_ascii_body(header: &Header, body: &[u8], mesh: &mut Mesh) -> Result<()> {
    let text =
        std::str::from_utf8(body).map_err(|_| Error::parse("PLY: ASCII body is not UTF-8"))?;
    let mut tokens = text.split_ascii_whitespace();
    let mut next_value = |context: &str| -> Result<f64> {
        let token = tokens
            .next()
            .ok_or_else(|| Error::parse(format!("PLY: unexpected end of data in {context}")))?;
        token
            .parse::<f64>()
            .map_err(|_| Error::parse(format!("PLY: bad value {token:?} in {context}")))
    };

    for element in &header.elements {
        let is_vertex = element.name == "vertex";
        let is_face = element.name == "face";
        let layout = VertexLayout::of(element);
        let xyz = if is_vertex {
            Some(layout.position_indices()?)
        } else {
            None
        };

        let mut values = vec![0.0f64; element.properties.len()];
        for _ in 0..element.count {
            let mut face_indices: Option<Vec<f64>> = None;
            for (slot, property) in element.properties.iter().enumerate() {
                match &property.kind {
                    PropertyKind::Scalar(_) => values[slot] = next_value(&element.name)?,
                    PropertyKind::List { .. } => {
                        let arity = next_value(&element.name)? as usize;
                        let mut list = Vec::with_capacity(arity);
                        for _ in 0..arity {
                            list.push(next_value(&element.name)?);
                        }
                        if is_face && is_face_list(&property.name) {
                            face_indices = Some(list);
                        }
                    }
                }
            }
            if let Some(xyz) = xyz {
                finish_vertex(mesh, &layout, &values, xyz);
            }
            if let Some(indices) = face_indices {
                push_face_fan(mesh, &indices);
            }
        }
    }
    Ok(())
}

fn read_binary_body(header: &Header, body: &[u8], little: bool, mesh: &mut Mesh) -> Result<()> {
    let mut offset = 0usize;
    let mut next_value = |body: &[u8], offset: &mut usize, ty: ScalarType| -> Result<f64> {
        let size = ty.size();
        let slice = body
            .get(*offset..*offset + size)
            .ok_or_else(|| Error::parse("PLY: binary body ends mid-record"))?;
        *offset += size;
        Ok(decode_scalar(slice, ty, little))
    };

    for element in &header.elements {
        let is_vertex = element.name == "vertex";
        let is_face = element.name == "face";
        let layout = VertexLayout::of(element);
        let xyz = if is_vertex {
            Some(layout.position_indices()?)
        } else {
            None
        };

        let mut values = vec![0.0f64; element.properties.len()];
        for _ in 0..element.count {
            let mut face_indices: Option<Vec<f64>> = None;
            for (slot, property) in element.properties.iter().enumerate() {
                match &property.kind {
                    PropertyKind::Scalar(ty) => {
                        values[slot] = next_value(body, &mut offset, *ty)?;
                    }
                    PropertyKind::List { count, item } => {
                        let arity = next_value(body, &mut offset, *count)? as usize;
                        let mut list = Vec::with_capacity(arity);
                        for _ in 0..arity {
                            list.push(next_value(body, &mut offset, *item)?);
                        }
                        if is_face && is_face_list(&property.name) {
                            face_indices = Some(list);
                        }
                    }
                }
            }
            if let Some(xyz) = xyz {
                finish_vertex(mesh, &layout, &values, xyz);
            }
            if let Some(indices) = face_indices {
                push_face_fan(mesh, &indices);
            }
        }
    }
    Ok(())
}

fn decode_scalar(slice: &[u8], ty: ScalarType, little: bool) -> f64 {
    macro_rules! decode {
        ($t:ty) => {{
            let array: [u8; size_of::<$t>()] = slice.try_into().expect("sized by caller");
            if little {
                <$t>::from_le_bytes(array) as f64
            } else {
                <$t>::from_be_bytes(array) as f64
            }
        }};
    }
    match ty {
        ScalarType::I8 => decode!(i8),
        ScalarType::U8 => decode!(u8),
        ScalarType::I16 => decode!(i16),
        ScalarType::U16 => decode!(u16),
        ScalarType::I32 => decode!(i32),
        ScalarType::U32 => decode!(u32),
        ScalarType::F32 => decode!(f32),
        ScalarType::F64 => decode!(f64),
    }
}
