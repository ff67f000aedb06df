use std::io::{BufReader, Cursor};

use anyhow::Context as _;

use crate::{
    data_structures::mesh::{MeshData, Vertex},
    resources::{AssetRoot, load_string},
};

/// Load an OBJ file into a single mesh. All models in the file are merged and
/// materials are ignored (materials come from the scene).
pub async fn load_mesh(root: &AssetRoot, file_name: &str) -> anyhow::Result<MeshData> {
    let obj_text = load_string(root, file_name)
        .await
        .with_context(|| format!("reading {}", root.join(file_name).display()))?;
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));

    let (models, _) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| async { Err(tobj::LoadError::OpenFileFailed) },
    )
    .await
    .with_context(|| format!("parsing {file_name}"))?;

    let mut mesh = MeshData::new(file_name);
    for model in &models {
        mesh.append(&to_mesh_data(model));
    }
    if mesh.indices.is_empty() {
        anyhow::bail!("{file_name} contains no triangles");
    }
    Ok(mesh)
}

fn to_mesh_data(model: &tobj::Model) -> MeshData {
    let m = &model.mesh;
    let vertices = (0..m.positions.len() / 3)
        .map(|i| Vertex {
            position: [m.positions[i * 3], m.positions[i * 3 + 1], m.positions[i * 3 + 2]],
            normal: [
                m.normals.get(i * 3).map_or(0.0, |f| *f),
                m.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                m.normals.get(i * 3 + 2).map_or(1.0, |f| *f),
            ],
            // OBJ has v pointing up, wgpu samples with v pointing down
            tex_coords: [
                m.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            color: [
                m.vertex_color.get(i * 3).map_or(1.0, |f| *f),
                m.vertex_color.get(i * 3 + 1).map_or(1.0, |f| *f),
                m.vertex_color.get(i * 3 + 2).map_or(1.0, |f| *f),
                1.0,
            ],
        })
        .collect();
    MeshData {
        name: model.name.clone(),
        vertices,
        indices: m.indices.clone(),
    }
}

/// [`load_mesh`], or a unit cube if that fails.
pub async fn load_mesh_or_cube(root: &AssetRoot, file_name: &str) -> MeshData {
    match load_mesh(root, file_name).await {
        Ok(mesh) => mesh,
        Err(e) => {
            log::warn!("Mesh {file_name} could not be loaded ({e:#}), using a cube instead.");
            MeshData::cube(file_name, 1.0)
        }
    }
}
