use tabletop::{
    data_structures::mesh::MeshData,
    resources::{
        AssetRoot,
        mesh::load_mesh_or_cube,
        texture::{TextureData, cube_face_names, load_cube_map_or, load_texture_or},
    },
};

fn missing_root() -> AssetRoot {
    AssetRoot::new("no/such/dir")
}

#[tokio::test]
async fn missing_texture_becomes_a_solid_pixel() {
    let texture = load_texture_or(&missing_root(), "images/none.png", [1, 2, 3, 255]).await;
    match texture {
        TextureData::Image { name, image } => {
            assert_eq!(name, "images/none.png");
            assert_eq!(image.dimensions(), (1, 1));
            assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3, 255]);
        }
        TextureData::CubeMap { .. } => panic!("expected a 2D texture"),
    }
}

#[tokio::test]
async fn missing_cube_map_keeps_six_faces() {
    let texture = load_cube_map_or(&missing_root(), "sky/ocean.jpg", [0, 0, 0, 255]).await;
    assert!(texture.is_cube_map());
    assert_eq!(texture.name(), "sky/ocean.jpg");
}

#[tokio::test]
async fn missing_mesh_becomes_a_cube() {
    let mesh = load_mesh_or_cube(&missing_root(), "models/none.obj").await;
    assert_eq!(mesh.vertices.len(), 24);
    assert_eq!(mesh.indices.len(), 36);
}

#[test]
fn cube_faces_follow_the_file_name() {
    let names = cube_face_names("images/cubemaps/skybox/ocean.jpg");
    assert_eq!(names[0], "images/cubemaps/skybox/ocean_posx.jpg");
    assert_eq!(names[5], "images/cubemaps/skybox/ocean_negz.jpg");
    assert_eq!(cube_face_names("sky")[2], "sky_posy");
}

#[test]
fn inverted_sphere_keeps_its_triangles() {
    let mut sphere = MeshData::ico_sphere("sky", cgmath::Vector3::new(0.0, 0.0, 0.0), 1.0, 2);
    let before = sphere.indices.clone();
    sphere.invert_faces();
    assert_eq!(sphere.triangle_count(), 320);
    assert_eq!(&sphere.indices[..3], &[before[0], before[2], before[1]]);
    for v in &sphere.vertices {
        let n = cgmath::Vector3::from(v.normal);
        let p = cgmath::Vector3::from(v.position);
        assert!(cgmath::InnerSpace::dot(n, p) < 0.0);
    }
}
