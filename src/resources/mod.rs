//! Shared scene resources and their loaders.
//!
//! [`Assets`] is an arena for shader programs, materials, meshes and
//! textures. Everything else refers to its entries through small copyable ids,
//! and the ids' ordering is what the draw sort compares. Assets are created
//! before the frame loop starts and outlive every entity using them.
//!
//! Loading never fails hard: a missing or broken file logs a warning and the
//! caller gets a placeholder (a cube mesh or a solid colour texture).

use std::path::{Path, PathBuf};

use crate::data_structures::{
    material::{Material, ShaderKind, ShaderProgram},
    mesh::MeshData,
};

pub mod mesh;
pub mod texture;

pub use texture::TextureData;

macro_rules! asset_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

asset_id!(ShaderId);
asset_id!(MaterialId);
asset_id!(MeshId);
asset_id!(TextureId);

#[derive(Default)]
pub struct Assets {
    shaders: Vec<ShaderProgram>,
    materials: Vec<Material>,
    meshes: Vec<MeshData>,
    textures: Vec<TextureData>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shader(&mut self, kind: ShaderKind) -> ShaderId {
        self.shaders.push(ShaderProgram::new(kind));
        ShaderId(self.shaders.len() as u32 - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    pub fn add_texture(&mut self, texture: TextureData) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() as u32 - 1)
    }

    pub fn shader(&self, id: ShaderId) -> &ShaderProgram {
        &self.shaders[id.index()]
    }

    pub fn shader_mut(&mut self, id: ShaderId) -> &mut ShaderProgram {
        &mut self.shaders[id.index()]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.index()]
    }

    pub fn mesh(&self, id: MeshId) -> &MeshData {
        &self.meshes[id.index()]
    }

    pub fn texture(&self, id: TextureId) -> &TextureData {
        &self.textures[id.index()]
    }

    pub fn shaders(&self) -> impl Iterator<Item = (ShaderId, &ShaderProgram)> {
        self.shaders.iter().enumerate().map(|(i, s)| (ShaderId(i as u32), s))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter().enumerate().map(|(i, m)| (MaterialId(i as u32), m))
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &MeshData)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i as u32), m))
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureId, &TextureData)> {
        self.textures.iter().enumerate().map(|(i, t)| (TextureId(i as u32), t))
    }

    pub fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials().find(|(_, m)| m.name == name).map(|(id, _)| id)
    }
}

/// Where asset files are looked up.
#[derive(Clone, Debug)]
pub struct AssetRoot(PathBuf);

impl AssetRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, file_name: &str) -> PathBuf {
        self.0.join(file_name)
    }
}

pub async fn load_string(root: &AssetRoot, file_name: &str) -> anyhow::Result<String> {
    let path = root.join(file_name);
    Ok(tokio::fs::read_to_string(&path).await?)
}

pub async fn load_binary(root: &AssetRoot, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = root.join(file_name);
    Ok(tokio::fs::read(&path).await?)
}
