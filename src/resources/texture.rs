//! Decoding texture files into RGBA pixel data.

use std::path::Path;

use anyhow::Context as _;
use image::RgbaImage;

use crate::resources::{AssetRoot, load_binary};

/// Face suffixes in wgpu cube layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const CUBE_FACES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

#[derive(Clone, Debug)]
pub enum TextureData {
    Image { name: String, image: RgbaImage },
    CubeMap { name: String, faces: Box<[RgbaImage; 6]> },
}

impl TextureData {
    pub fn name(&self) -> &str {
        match self {
            TextureData::Image { name, .. } | TextureData::CubeMap { name, .. } => name,
        }
    }

    pub fn is_cube_map(&self) -> bool {
        matches!(self, TextureData::CubeMap { .. })
    }

    /// 1×1 texture of one colour.
    pub fn solid(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        TextureData::Image {
            name: name.into(),
            image: RgbaImage::from_pixel(1, 1, image::Rgba(rgba)),
        }
    }

    /// Cube map with every face a single colour.
    pub fn solid_cube(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        let face = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        TextureData::CubeMap {
            name: name.into(),
            faces: Box::new(std::array::from_fn(|_| face.clone())),
        }
    }
}

async fn load_image(root: &AssetRoot, file_name: &str) -> anyhow::Result<RgbaImage> {
    let bytes = load_binary(root, file_name)
        .await
        .with_context(|| format!("reading {}", root.join(file_name).display()))?;
    Ok(image::load_from_memory(&bytes)
        .with_context(|| format!("decoding {file_name}"))?
        .to_rgba8())
}

pub async fn load_texture(root: &AssetRoot, file_name: &str) -> anyhow::Result<TextureData> {
    Ok(TextureData::Image {
        name: file_name.to_string(),
        image: load_image(root, file_name).await?,
    })
}

/// Face file names for a cube map: `sky/ocean.jpg` becomes `sky/ocean_posx.jpg` and so on.
pub fn cube_face_names(file_name: &str) -> [String; 6] {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    CUBE_FACES.map(|face| {
        let name = format!("{stem}_{face}{ext}");
        match dir {
            Some(dir) => dir.join(name).to_string_lossy().into_owned(),
            None => name,
        }
    })
}

pub async fn load_cube_map(root: &AssetRoot, file_name: &str) -> anyhow::Result<TextureData> {
    let mut faces = Vec::with_capacity(6);
    for face in cube_face_names(file_name) {
        faces.push(load_image(root, &face).await?);
    }
    let size = faces[0].dimensions();
    if faces.iter().any(|face| face.dimensions() != size) {
        anyhow::bail!("cube map {file_name} has faces of different sizes");
    }
    let faces: [RgbaImage; 6] = faces
        .try_into()
        .map_err(|_| anyhow::anyhow!("cube map {file_name} needs six faces"))?;
    Ok(TextureData::CubeMap {
        name: file_name.to_string(),
        faces: Box::new(faces),
    })
}

/// [`load_texture`], or a solid colour placeholder.
pub async fn load_texture_or(root: &AssetRoot, file_name: &str, fallback: [u8; 4]) -> TextureData {
    load_texture(root, file_name).await.unwrap_or_else(|e| {
        log::warn!("Texture {file_name} could not be loaded ({e:#}), using a solid colour.");
        TextureData::solid(file_name, fallback)
    })
}

/// [`load_cube_map`], or a solid colour cube.
pub async fn load_cube_map_or(root: &AssetRoot, file_name: &str, fallback: [u8; 4]) -> TextureData {
    load_cube_map(root, file_name).await.unwrap_or_else(|e| {
        log::warn!("Cube map {file_name} could not be loaded ({e:#}), using a solid colour.");
        TextureData::solid_cube(file_name, fallback)
    })
}
