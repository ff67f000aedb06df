//! Named uniform blocks laid out for WGSL.
//!
//! A [`UniformLayout`] maps uniform names to byte offsets following the WGSL
//! uniform address space rules (vec3 and matrices align to 16 bytes, a mat3
//! takes three padded columns). A [`UniformBlock`] is a byte buffer in such a
//! layout that can be uploaded to a GPU buffer as-is.
//!
//! Writing a name the layout does not know is a silent no-op. Materials rely
//! on this to push their whole value map onto any program.
//!
//! # Key layouts
//!
//! - [`UniformLayout::frame`] view, view-projection, skybox and camera position
//! - [`UniformLayout::material`] lighting values plus per-material scalars
//! - [`UniformLayout::object`] model, model-view-projection and normal matrix

use std::{collections::HashMap, sync::OnceLock};

use cgmath::{Matrix3, Matrix4, Vector3};

use crate::resources::TextureId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Vec3,
    Mat3,
    Mat4,
}

impl UniformKind {
    fn align(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Vec3 | UniformKind::Mat3 | UniformKind::Mat4 => 16,
        }
    }

    fn size(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Vec3 => 12,
            UniformKind::Mat3 => 48,
            UniformKind::Mat4 => 64,
        }
    }
}

/// A value that can be stored on a program or material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3(Vector3<f32>),
    Mat3(Matrix3<f32>),
    Mat4(Matrix4<f32>),
    Texture(TextureId),
    CubeMap(TextureId),
}

impl UniformValue {
    /// The block kind for plain data, `None` for texture bindings.
    pub fn kind(&self) -> Option<UniformKind> {
        match self {
            UniformValue::Float(_) => Some(UniformKind::Float),
            UniformValue::Int(_) => Some(UniformKind::Int),
            UniformValue::Vec3(_) => Some(UniformKind::Vec3),
            UniformValue::Mat3(_) => Some(UniformKind::Mat3),
            UniformValue::Mat4(_) => Some(UniformKind::Mat4),
            UniformValue::Texture(_) | UniformValue::CubeMap(_) => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(value: Vector3<f32>) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Matrix3<f32>> for UniformValue {
    fn from(value: Matrix3<f32>) -> Self {
        UniformValue::Mat3(value)
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(value: Matrix4<f32>) -> Self {
        UniformValue::Mat4(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformField {
    pub offset: usize,
    pub kind: UniformKind,
}

#[derive(Debug, Default)]
pub struct UniformLayout {
    fields: HashMap<&'static str, UniformField>,
    size: usize,
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder::default()
    }

    pub fn field(&self, name: &str) -> Option<UniformField> {
        self.fields.get(name).copied()
    }

    /// Total size in bytes, padded to 16.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn frame() -> &'static UniformLayout {
        static LAYOUT: OnceLock<UniformLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            UniformLayout::builder()
                .push("u_View", UniformKind::Mat4)
                .push("u_ViewProjection", UniformKind::Mat4)
                .push("u_SkyboxMatrix", UniformKind::Mat4)
                .push("u_CamPos", UniformKind::Vec3)
                .build()
        })
    }

    /// Must stay in sync with `MaterialUniforms` in `common.wgsl`.
    pub fn material() -> &'static UniformLayout {
        static LAYOUT: OnceLock<UniformLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            UniformLayout::builder()
                .push("u_LightPos", UniformKind::Vec3)
                .push("u_AmbientLightStrength", UniformKind::Float)
                .push("u_LightCol", UniformKind::Vec3)
                .push("u_SpecularLightStrength", UniformKind::Float)
                .push("u_AmbientCol", UniformKind::Vec3)
                .push("u_AmbientStrength", UniformKind::Float)
                .push("u_LightAttenuationConstant", UniformKind::Float)
                .push("u_LightAttenuationLinear", UniformKind::Float)
                .push("u_LightAttenuationQuadratic", UniformKind::Float)
                .push("u_Shininess", UniformKind::Float)
                .push("u_TextureMix", UniformKind::Float)
                .push("u_NoLighting", UniformKind::Int)
                .push("u_Ambient", UniformKind::Int)
                .push("u_Specular", UniformKind::Int)
                .push("u_AmbientAndSpecular", UniformKind::Int)
                .push("u_AmbientSpecularToon", UniformKind::Int)
                .push("u_EnvironmentRotation", UniformKind::Mat3)
                .build()
        })
    }

    pub fn object() -> &'static UniformLayout {
        static LAYOUT: OnceLock<UniformLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            UniformLayout::builder()
                .push("u_ModelViewProjection", UniformKind::Mat4)
                .push("u_Model", UniformKind::Mat4)
                .push("u_NormalMatrix", UniformKind::Mat3)
                .build()
        })
    }
}

#[derive(Default)]
pub struct UniformLayoutBuilder {
    layout: UniformLayout,
    cursor: usize,
}

impl UniformLayoutBuilder {
    pub fn push(mut self, name: &'static str, kind: UniformKind) -> Self {
        let offset = self.cursor.next_multiple_of(kind.align());
        self.layout.fields.insert(name, UniformField { offset, kind });
        self.cursor = offset + kind.size();
        self
    }

    pub fn build(mut self) -> UniformLayout {
        self.layout.size = self.cursor.next_multiple_of(16);
        self.layout
    }
}

/// Raw bytes for one uniform buffer.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    layout: &'static UniformLayout,
    bytes: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: &'static UniformLayout) -> Self {
        Self {
            layout,
            bytes: vec![0; layout.size()],
        }
    }

    pub fn layout(&self) -> &'static UniformLayout {
        self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Store `value` under `name`. Returns false (and changes nothing) when the
    /// name is unknown, the value kind does not match or the value is a texture.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        let value = value.into();
        let Some(field) = self.layout.field(name) else {
            return false;
        };
        if value.kind() != Some(field.kind) {
            log::debug!("uniform {name} expects {:?}, got {:?}", field.kind, value);
            return false;
        }
        let at = field.offset;
        match value {
            UniformValue::Float(v) => self.write(at, bytemuck::bytes_of(&v)),
            UniformValue::Int(v) => self.write(at, bytemuck::bytes_of(&v)),
            UniformValue::Vec3(v) => {
                let raw: [f32; 3] = v.into();
                self.write(at, bytemuck::cast_slice(&raw));
            }
            UniformValue::Mat3(m) => {
                for (column, v) in [m.x, m.y, m.z].into_iter().enumerate() {
                    let raw: [f32; 3] = v.into();
                    self.write(at + column * 16, bytemuck::cast_slice(&raw));
                }
            }
            UniformValue::Mat4(m) => {
                let raw: [[f32; 4]; 4] = m.into();
                self.write(at, bytemuck::cast_slice(&raw));
            }
            UniformValue::Texture(_) | UniformValue::CubeMap(_) => return false,
        }
        true
    }

    fn write(&mut self, at: usize, data: &[u8]) {
        self.bytes[at..at + data.len()].copy_from_slice(data);
    }

    fn read<const N: usize>(&self, at: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[at..at + N]);
        out
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        let field = self.layout.field(name).filter(|f| f.kind == UniformKind::Float)?;
        Some(f32::from_ne_bytes(self.read(field.offset)))
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        let field = self.layout.field(name).filter(|f| f.kind == UniformKind::Int)?;
        Some(i32::from_ne_bytes(self.read(field.offset)))
    }

    pub fn get_vec3(&self, name: &str) -> Option<Vector3<f32>> {
        let field = self.layout.field(name).filter(|f| f.kind == UniformKind::Vec3)?;
        let component = |i: usize| f32::from_ne_bytes(self.read(field.offset + i * 4));
        Some(Vector3::new(component(0), component(1), component(2)))
    }

    pub fn get_mat4(&self, name: &str) -> Option<Matrix4<f32>> {
        let field = self.layout.field(name).filter(|f| f.kind == UniformKind::Mat4)?;
        let raw: [f32; 16] = bytemuck::pod_read_unaligned(&self.bytes[field.offset..field.offset + 64]);
        Some(Matrix4::new(
            raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7], raw[8], raw[9], raw[10],
            raw[11], raw[12], raw[13], raw[14], raw[15],
        ))
    }
}
