//! Shader programs and materials as plain data.
//!
//! A [`ShaderProgram`] names the WGSL program to use and owns the program
//! level uniform state (lighting). A [`Material`] points at a program, carries
//! its own uniform values and texture bindings, and a render layer used only
//! for draw ordering.

use std::collections::BTreeMap;

use cgmath::{Matrix3, SquareMatrix};

use crate::{
    data_structures::uniform::{UniformBlock, UniformLayout, UniformValue},
    resources::ShaderId,
};

/// The WGSL programs the scene pipeline knows how to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    BlinnPhongTextured,
    Reflection,
    BlinnPhongReflection,
    Skybox,
}

impl ShaderKind {
    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::BlinnPhongTextured => "blinn-phong textured",
            ShaderKind::Reflection => "reflection",
            ShaderKind::BlinnPhongReflection => "blinn-phong reflection",
            ShaderKind::Skybox => "skybox",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShaderProgram {
    kind: ShaderKind,
    uniforms: UniformBlock,
}

impl ShaderProgram {
    pub fn new(kind: ShaderKind) -> Self {
        let mut uniforms = UniformBlock::new(UniformLayout::material());
        uniforms.set("u_LightAttenuationConstant", 1.0_f32);
        uniforms.set("u_EnvironmentRotation", Matrix3::identity());
        Self { kind, uniforms }
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    /// Writes the value if the program declares `name`, otherwise does nothing.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        if !self.uniforms.set(name, value) {
            log::trace!("{} ignores uniform {name}", self.kind.label());
        }
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }
}

/// Texture slots a material may bind, in binding order.
pub const TEXTURE_SLOTS: [&str; 5] = [
    "s_Diffuse",
    "s_Diffuse2",
    "s_Specular",
    "s_Reflectivity",
    "s_Environment",
];

#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub shader: ShaderId,
    /// Higher layers draw later.
    pub render_layer: i32,
    values: BTreeMap<String, UniformValue>,
}

impl Material {
    pub fn new(name: impl Into<String>, shader: ShaderId) -> Self {
        Self {
            name: name.into(),
            shader,
            render_layer: 0,
            values: BTreeMap::new(),
        }
    }

    pub fn with_layer(mut self, render_layer: i32) -> Self {
        self.render_layer = render_layer;
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder flavour of [`Material::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The program block with this material's values written on top. Names the
    /// program does not declare and texture bindings are skipped.
    pub fn resolve(&self, program: &ShaderProgram) -> UniformBlock {
        let mut block = program.uniforms().clone();
        for (name, value) in &self.values {
            block.set(name, *value);
        }
        block
    }
}
