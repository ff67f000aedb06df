//! State-sorted drawing.
//!
//! Every frame the drawables are sorted by [`DrawKey`] (render layer, then
//! shader, then material) and walked once. A shader is bound, with the frame
//! uniforms, only when it differs from the previous drawable's shader, and a
//! material is applied only when it differs from the previous material. Every
//! drawable then gets its per-object uniforms and a draw call.
//!
//! The GPU sits behind [`DrawBackend`], so the pass itself runs (and is tested)
//! without a device.
//!
//! # Key types
//!
//! - [`Renderable`] is the component pairing a mesh with a material
//! - [`DrawKey`] is the sort key; its derived ordering is the draw order
//! - [`DrawStats`] counts binds, material applications and draws of one pass

use cgmath::{Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::{
    data_structures::{
        registry::Registry,
        uniform::{UniformBlock, UniformLayout},
    },
    resources::{Assets, MaterialId, MeshId, ShaderId},
};

/// Mesh + material for one entity. Both are shared and owned by [`Assets`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderable {
    pub mesh: MeshId,
    pub material: MaterialId,
}

impl Renderable {
    pub fn new(mesh: MeshId, material: MaterialId) -> Self {
        Self { mesh, material }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawKey {
    pub layer: i32,
    pub shader: ShaderId,
    pub material: MaterialId,
}

impl DrawKey {
    pub fn of(renderable: &Renderable, assets: &Assets) -> Self {
        let material = assets.material(renderable.material);
        Self {
            layer: material.render_layer,
            shader: material.shader,
            material: renderable.material,
        }
    }
}

/// Uniforms pushed once per shader bind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub view: Matrix4<f32>,
    pub view_projection: Matrix4<f32>,
    /// Projection times the rotation-only part of the view.
    pub skybox: Matrix4<f32>,
    pub camera_position: Vector3<f32>,
}

impl FrameUniforms {
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        let rotation_only = Matrix4::from_cols(
            view.x.truncate().extend(0.0),
            view.y.truncate().extend(0.0),
            view.z.truncate().extend(0.0),
            Vector4::unit_w(),
        );
        let camera_position = view
            .invert()
            .map(|world| world.w.truncate())
            .unwrap_or_else(|| Vector3::new(0.0, 0.0, 0.0));
        Self {
            view,
            view_projection: projection * view,
            skybox: projection * rotation_only,
            camera_position,
        }
    }

    pub fn to_block(&self) -> UniformBlock {
        let mut block = UniformBlock::new(UniformLayout::frame());
        block.set("u_View", self.view);
        block.set("u_ViewProjection", self.view_projection);
        block.set("u_SkyboxMatrix", self.skybox);
        block.set("u_CamPos", self.camera_position);
        block
    }
}

/// Uniforms pushed for every draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectUniforms {
    pub model: Matrix4<f32>,
    pub model_view_projection: Matrix4<f32>,
    pub normal: Matrix3<f32>,
}

impl ObjectUniforms {
    pub fn to_block(&self) -> UniformBlock {
        let mut block = UniformBlock::new(UniformLayout::object());
        block.set("u_ModelViewProjection", self.model_view_projection);
        block.set("u_Model", self.model);
        block.set("u_NormalMatrix", self.normal);
        block
    }
}

/// Receiver of the sorted draw stream.
pub trait DrawBackend {
    fn bind_shader(&mut self, shader: ShaderId, frame: &FrameUniforms);
    fn apply_material(&mut self, material: MaterialId);
    fn draw_mesh(&mut self, mesh: MeshId, object: &ObjectUniforms);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub shader_binds: usize,
    pub material_applications: usize,
    pub draws: usize,
}

/// Re-sort the renderable storage by [`DrawKey`]. Stable for equal keys.
pub fn sort_drawables(registry: &mut Registry, assets: &Assets) {
    registry.sort_drawables(|a, b| DrawKey::of(a, assets).cmp(&DrawKey::of(b, assets)));
}

/// Walk the drawables in their current order and feed `backend`.
///
/// Transforms must have been updated this frame.
pub fn draw_all(
    registry: &Registry,
    assets: &Assets,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    backend: &mut impl DrawBackend,
) -> DrawStats {
    let frame = FrameUniforms::new(view, projection);
    let mut stats = DrawStats::default();
    let mut current_shader: Option<ShaderId> = None;
    let mut current_material: Option<MaterialId> = None;

    for (_, renderable, transform) in registry.drawables() {
        let shader = assets.material(renderable.material).shader;
        if current_shader != Some(shader) {
            current_shader = Some(shader);
            backend.bind_shader(shader, &frame);
            stats.shader_binds += 1;
        }
        if current_material != Some(renderable.material) {
            current_material = Some(renderable.material);
            backend.apply_material(renderable.material);
            stats.material_applications += 1;
        }
        let model = *transform.world_transform();
        let object = ObjectUniforms {
            model,
            model_view_projection: frame.view_projection * model,
            normal: *transform.world_normal_matrix(),
        };
        backend.draw_mesh(renderable.mesh, &object);
        stats.draws += 1;
    }
    stats
}
