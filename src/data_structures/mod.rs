//! Engine data structures: transforms, the component registry, materials and meshes.
//!
//! - `sparse_set` packed per-component storage
//! - `registry` entities, component storages, views and the drawables group
//! - `transform` local/world transforms with parent links
//! - `uniform` WGSL uniform block layouts
//! - `material` shader programs and materials
//! - `mesh` CPU vertex/index data and procedural shapes
//! - `texture` GPU texture wrapper and creation utilities

pub mod material;
pub mod mesh;
pub mod registry;
pub mod sparse_set;
pub mod texture;
pub mod transform;
pub mod uniform;
