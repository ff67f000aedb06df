//! tabletop
//!
//! A small real-time 3D scene: a table with chess pieces, a bottle, a cake and
//! a few reflective spheres under a sky box, drawn with wgpu and inspected
//! through an egui debug panel. Entities live in a component registry, their
//! transforms form a parent/child hierarchy, and behaviours move them every
//! frame. Drawables are sorted by render layer, program and material so that
//! each is bound once per run.
//!
//! High-level modules
//! - `behaviour`: per-entity behaviours (path following, manual control, fly camera)
//! - `camera`: perspective/orthographic lens and view matrices
//! - `context`: start-up settings and the window/device context
//! - `data_structures`: registry, transforms, uniforms, materials, meshes, textures
//! - `flow`: the frame driver and application event loop
//! - `input`: keyboard and mouse state, key press watchers
//! - `lighting`: light parameters and the debug lighting modes
//! - `overlay`: the egui overlay frame on top of the scene
//! - `pipelines`: WGSL programs and the scene draw backend
//! - `render`: draw keys, the sort and the draw pass
//! - `resources`: the asset library and its file loaders
//! - `scene`: the tabletop scene itself
//! - `ui`: the debug panel sections
//!

pub mod behaviour;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod input;
pub mod lighting;
pub mod overlay;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod ui;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
