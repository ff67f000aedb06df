#![allow(dead_code)]

use std::{collections::HashMap, ops::RangeInclusive};

use cgmath::Vector3;
use tabletop::{
    context::Settings,
    data_structures::{material::Material, mesh::MeshData},
    render::{DrawBackend, FrameUniforms, ObjectUniforms, Renderable},
    resources::{AssetRoot, Assets, MaterialId, MeshId, ShaderId},
    scene::Scene,
    ui::DebugUi,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Call {
    Shader(ShaderId),
    Material(MaterialId),
    Draw(MeshId),
}

/// Draw backend that only remembers what it was asked to do.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub(crate) calls: Vec<Call>,
    pub(crate) frames: Vec<FrameUniforms>,
    pub(crate) objects: Vec<ObjectUniforms>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn draws(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Draw(_))).count()
    }
}

impl DrawBackend for RecordingBackend {
    fn bind_shader(&mut self, shader: ShaderId, frame: &FrameUniforms) {
        self.calls.push(Call::Shader(shader));
        self.frames.push(*frame);
    }

    fn apply_material(&mut self, material: MaterialId) {
        self.calls.push(Call::Material(material));
    }

    fn draw_mesh(&mut self, mesh: MeshId, object: &ObjectUniforms) {
        self.calls.push(Call::Draw(mesh));
        self.objects.push(*object);
    }
}

/// Debug UI that answers widgets from a script and records what was shown.
#[derive(Default)]
pub(crate) struct ScriptedUi {
    /// Buttons reported as clicked.
    pub(crate) clicks: Vec<String>,
    /// Values sliders and drags are moved to.
    pub(crate) values: HashMap<String, f32>,
    pub(crate) colours: HashMap<String, [f32; 3]>,
    /// Checkboxes that get flipped.
    pub(crate) toggles: Vec<String>,
    pub(crate) shown: Vec<String>,
    pub(crate) texts: Vec<String>,
    pub(crate) plots: Vec<(String, usize)>,
}

impl ScriptedUi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn click(mut self, label: &str) -> Self {
        self.clicks.push(label.to_string());
        self
    }

    pub(crate) fn set(mut self, label: &str, value: f32) -> Self {
        self.values.insert(label.to_string(), value);
        self
    }

    pub(crate) fn colour(mut self, label: &str, rgb: [f32; 3]) -> Self {
        self.colours.insert(label.to_string(), rgb);
        self
    }

    pub(crate) fn toggle(mut self, label: &str) -> Self {
        self.toggles.push(label.to_string());
        self
    }

    pub(crate) fn saw(&self, label: &str) -> bool {
        self.shown.iter().any(|shown| shown == label)
    }

    fn scripted(&mut self, label: &str, value: &mut f32) -> bool {
        self.shown.push(label.to_string());
        match self.values.get(label) {
            Some(v) => {
                *value = *v;
                true
            }
            None => false,
        }
    }
}

impl DebugUi for ScriptedUi {
    fn collapsing(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn DebugUi)) {
        self.shown.push(title.to_string());
        body(self);
    }

    fn slider(&mut self, label: &str, value: &mut f32, range: RangeInclusive<f32>) -> bool {
        let changed = self.scripted(label, value);
        *value = value.clamp(*range.start(), *range.end());
        changed
    }

    fn drag(&mut self, label: &str, value: &mut f32, _speed: f32, range: RangeInclusive<f32>) -> bool {
        let changed = self.scripted(label, value);
        *value = value.clamp(*range.start(), *range.end());
        changed
    }

    fn drag_vec3(&mut self, label: &str, value: &mut Vector3<f32>, _speed: f32, _range: RangeInclusive<f32>) -> bool {
        self.scripted(label, &mut value.x)
    }

    fn color_edit(&mut self, label: &str, rgb: &mut Vector3<f32>) -> bool {
        self.shown.push(label.to_string());
        match self.colours.get(label) {
            Some(c) => {
                *rgb = (*c).into();
                true
            }
            None => false,
        }
    }

    fn button(&mut self, label: &str) -> bool {
        self.shown.push(label.to_string());
        self.clicks.iter().any(|c| c == label)
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        self.shown.push(label.to_string());
        if self.toggles.iter().any(|t| t == label) {
            *value = !*value;
            return true;
        }
        false
    }

    fn text(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }

    fn plot(&mut self, label: &str, values: &[f32]) {
        self.plots.push((label.to_string(), values.len()));
    }
}

/// The demo scene built from a root with no files, so every asset is a placeholder.
pub(crate) async fn placeholder_scene() -> Scene {
    let root = AssetRoot::new("definitely/not/an/asset/root");
    Scene::build(&root, &Settings::default()).await
}

/// Small library: one cube mesh, and a material per (name, shader, layer).
pub(crate) fn assets_with(shaders: &[tabletop::data_structures::material::ShaderKind], materials: &[(&str, usize, i32)]) -> (Assets, Vec<ShaderId>, Vec<MaterialId>, MeshId) {
    let mut assets = Assets::new();
    let shader_ids: Vec<ShaderId> = shaders.iter().map(|kind| assets.add_shader(*kind)).collect();
    let material_ids = materials
        .iter()
        .map(|(name, shader, layer)| assets.add_material(Material::new(*name, shader_ids[*shader]).with_layer(*layer)))
        .collect();
    let mesh = assets.add_mesh(MeshData::cube("cube", 1.0));
    (assets, shader_ids, material_ids, mesh)
}

pub(crate) fn renderable(mesh: MeshId, material: MaterialId) -> Renderable {
    Renderable::new(mesh, material)
}
