//! Per-format loaders
//!
//! Each submodule turns raw bytes into a [`crate::scene::Scene`]. Loaders are
//! dispatched by [`crate::load::load_scene`] and never touch the filesystem
//! directly; cross-file references go through the caller's resolver.

pub(crate) mod gltf;
pub(crate) mod obj;
pub(crate) mod off;
pub(crate) mod ply;
pub(crate) mod stl;
pub(crate) mod threemf;
pub(crate) mod xyz;
