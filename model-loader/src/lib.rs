//! # Model Loader
//!
//! Pure-Rust loading for common 3D model formats, built around two ideas:
//!
//! - **A format registry** ([`format`]) mapping file extensions to loaders,
//!   with capability flags that callers can use to decide what to attempt.
//! - **Resolvers** ([`resolver`]) that answer by-name byte lookups against a
//!   root location, so cross-file references (material libraries, glTF
//!   buffers) work the same whether the source is a directory, a zip
//!   archive, or a cached GitHub commit snapshot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use model_loader::load_scene;
//!
//! # fn main() -> model_loader::Result<()> {
//! let bytes = std::fs::read("model.obj")?;
//! let scene = load_scene(&bytes, "model.obj", None)?;
//! println!("{scene}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading out of an archive
//!
//! ```rust,no_run
//! use model_loader::load_scene;
//! use model_loader::resolver::{GithubResolver, Resolver};
//! # fn main() -> model_loader::Result<()> {
//! let repo = GithubResolver::new(
//!     "assimp/assimp",
//!     "c2967cf79acdc4cd48ecb0729e2733bf45b38a6f",
//!     std::path::Path::new("/tmp/snapshot-cache"),
//! )?;
//! for path in repo.keys() {
//!     let Some((directory, name)) = path.rsplit_once('/') else { continue };
//!     let resolver = repo.namespaced(directory)?;
//!     if let Ok(bytes) = resolver.get(name) {
//!         let _ = load_scene(&bytes, name, Some(&resolver));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Re-export common types for convenience
pub use crate::{
    error::{Error, Result},
    format::{FileType, FormatDesc, FormatFlags, available_formats, is_extension_supported,
        native_load_extensions},
    load::load_scene,
    mesh::Mesh,
    scene::Scene,
};

// Core modules
pub mod error;
pub mod format;
pub mod load;
pub mod mesh;
pub mod scene;

// Byte resolution
pub mod resolver;

// Format loaders
mod loaders;

/// Version of this crate
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");
