//! Format registry
//!
//! This module maps file extensions to the loaders that handle them and
//! records per-format capability flags. The corpus harness uses the registry
//! to decide which archive entries are worth attempting.

use std::collections::BTreeSet;

use bitflags::bitflags;

bitflags! {
    /// Capability flags carried by each format descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FormatFlags: u32 {
        /// The format has a textual encoding that the loader accepts
        const TEXT = 1 << 0;
        /// The format has a binary encoding that the loader accepts
        const BINARY = 1 << 1;
        /// The loader reads only a subset of what the format can express
        const LIMITED_SUPPORT = 1 << 2;
        /// The registered loader is a stub deferring to tooling this crate
        /// does not ship; such formats are skipped by bulk loading runs
        const THIN_WRAPPER = 1 << 3;
    }
}

/// File formats known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Wavefront OBJ
    Obj,
    /// Stereolithography, binary or ASCII
    Stl,
    /// Polygon File Format
    Ply,
    /// Object File Format
    Off,
    /// glTF 2.0, JSON flavor
    Gltf,
    /// glTF 2.0, binary container
    Glb,
    /// 3D Manufacturing Format (zip + XML)
    ThreeMf,
    /// Whitespace-separated point rows
    Xyz,
    /// COLLADA; registered but handled by a stub loader
    Collada,
}

impl FileType {
    /// Look up the format owning `extension` (lowercase, without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        FORMATS
            .iter()
            .find(|desc| desc.extensions.contains(&extension))
            .map(|desc| desc.file_type)
    }

    /// Look up the format from a file name or a bare extension.
    ///
    /// The hint is lowercased and the segment after the last dot is used, so
    /// `"models/Duck.GLB"`, `"duck.glb"` and `"glb"` all resolve to [`FileType::Glb`].
    pub fn from_hint(hint: &str) -> Option<Self> {
        Self::from_extension(&extension_of(hint))
    }

    /// The descriptor registered for this format
    pub fn descriptor(&self) -> &'static FormatDesc {
        FORMATS
            .iter()
            .find(|desc| desc.file_type == *self)
            .expect("every FileType has a registry entry")
    }

    /// Primary extension for this format
    pub fn extension(&self) -> &'static str {
        self.descriptor().extensions[0]
    }
}

/// Descriptor for a registered format
#[derive(Debug, Clone, Copy)]
pub struct FormatDesc {
    /// Human readable format name
    pub name: &'static str,
    /// The format this descriptor belongs to
    pub file_type: FileType,
    /// Extensions claimed by the format, lowercase, primary first
    pub extensions: &'static [&'static str],
    /// Capability flags
    pub flags: FormatFlags,
}

/// The registry: one descriptor per known format
pub const FORMATS: &[FormatDesc] = &[
    FormatDesc {
        name: "Wavefront OBJ",
        file_type: FileType::Obj,
        extensions: &["obj"],
        flags: FormatFlags::TEXT,
    },
    FormatDesc {
        name: "Stereolithography",
        file_type: FileType::Stl,
        extensions: &["stl"],
        flags: FormatFlags::TEXT.union(FormatFlags::BINARY),
    },
    FormatDesc {
        name: "Polygon File Format",
        file_type: FileType::Ply,
        extensions: &["ply"],
        flags: FormatFlags::TEXT.union(FormatFlags::BINARY),
    },
    FormatDesc {
        name: "Object File Format",
        file_type: FileType::Off,
        extensions: &["off"],
        flags: FormatFlags::TEXT,
    },
    FormatDesc {
        name: "glTF 2.0",
        file_type: FileType::Gltf,
        extensions: &["gltf"],
        flags: FormatFlags::TEXT,
    },
    FormatDesc {
        name: "Binary glTF 2.0",
        file_type: FileType::Glb,
        extensions: &["glb"],
        flags: FormatFlags::BINARY,
    },
    FormatDesc {
        name: "3D Manufacturing Format",
        file_type: FileType::ThreeMf,
        extensions: &["3mf"],
        flags: FormatFlags::BINARY.union(FormatFlags::LIMITED_SUPPORT),
    },
    FormatDesc {
        name: "XYZ point cloud",
        file_type: FileType::Xyz,
        extensions: &["xyz"],
        flags: FormatFlags::TEXT.union(FormatFlags::LIMITED_SUPPORT),
    },
    FormatDesc {
        name: "COLLADA",
        file_type: FileType::Collada,
        extensions: &["dae"],
        flags: FormatFlags::THIN_WRAPPER,
    },
];

/// Lowercased segment after the last dot of `hint`.
///
/// A hint with no dot is returned whole, so a bare extension passes through.
pub fn extension_of(hint: &str) -> String {
    hint.rsplit('.')
        .next()
        .unwrap_or(hint)
        .trim()
        .to_ascii_lowercase()
}

/// Every extension with a registry entry
pub fn available_formats() -> BTreeSet<String> {
    FORMATS
        .iter()
        .flat_map(|desc| desc.extensions.iter().map(|ext| ext.to_string()))
        .collect()
}

/// Extensions whose loader is built in, i.e. not flagged [`FormatFlags::THIN_WRAPPER`].
///
/// This is the set a bulk loading pass should attempt: wrapper-backed formats
/// would only report on tooling that is not part of this crate.
pub fn native_load_extensions() -> BTreeSet<String> {
    FORMATS
        .iter()
        .filter(|desc| !desc.flags.contains(FormatFlags::THIN_WRAPPER))
        .flat_map(|desc| desc.extensions.iter().map(|ext| ext.to_string()))
        .collect()
}

/// Check if a file extension has a registry entry
pub fn is_extension_supported(extension: &str) -> bool {
    FileType::from_extension(&extension.to_ascii_lowercase()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("models/Duck.GLB"), "glb");
        assert_eq!(extension_of("box.test.obj"), "obj");
        assert_eq!(extension_of("stl"), "stl");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_from_hint() {
        assert_eq!(FileType::from_hint("cube.obj"), Some(FileType::Obj));
        assert_eq!(FileType::from_hint("CUBE.OBJ"), Some(FileType::Obj));
        assert_eq!(FileType::from_hint("gltf"), Some(FileType::Gltf));
        assert_eq!(FileType::from_hint("scene.unknown"), None);
    }

    #[test]
    fn test_registry_covers_every_file_type() {
        for desc in FORMATS {
            assert_eq!(desc.file_type.descriptor().name, desc.name);
            assert!(!desc.extensions.is_empty());
        }
    }

    #[test]
    fn test_wrapper_formats_excluded_from_native_set() {
        let available = available_formats();
        let native = native_load_extensions();

        assert!(available.contains("dae"));
        assert!(!native.contains("dae"));
        assert!(native.contains("obj"));
        assert!(native.contains("glb"));
        assert!(native.is_subset(&available));
    }

    #[test]
    fn test_is_extension_supported() {
        assert!(is_extension_supported("obj"));
        assert!(is_extension_supported("PLY"));
        assert!(!is_extension_supported("fbx"));
    }
}
