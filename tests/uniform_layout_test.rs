use approx::assert_relative_eq;
use cgmath::{Matrix3, Matrix4, SquareMatrix, Vector3};
use tabletop::{
    camera::Camera,
    data_structures::{
        material::{Material, ShaderKind, ShaderProgram},
        uniform::{UniformBlock, UniformKind, UniformLayout},
    },
    lighting::{LightSettings, LightingMode},
    render::ObjectUniforms,
    resources::Assets,
};

#[test]
fn material_layout_matches_the_shader_struct() {
    let layout = UniformLayout::material();
    let offsets = [
        ("u_LightPos", 0),
        ("u_AmbientLightStrength", 12),
        ("u_LightCol", 16),
        ("u_SpecularLightStrength", 28),
        ("u_AmbientCol", 32),
        ("u_AmbientStrength", 44),
        ("u_LightAttenuationConstant", 48),
        ("u_LightAttenuationLinear", 52),
        ("u_LightAttenuationQuadratic", 56),
        ("u_Shininess", 60),
        ("u_TextureMix", 64),
        ("u_NoLighting", 68),
        ("u_AmbientSpecularToon", 84),
        ("u_EnvironmentRotation", 96),
    ];
    for (name, offset) in offsets {
        assert_eq!(layout.field(name).map(|f| f.offset), Some(offset), "{name}");
    }
    assert_eq!(layout.size(), 144);
    assert_eq!(UniformLayout::frame().size(), 208);
    assert_eq!(UniformLayout::object().size(), 176);
    assert_eq!(UniformLayout::object().field("u_NormalMatrix").map(|f| f.kind), Some(UniformKind::Mat3));
}

#[test]
fn unknown_names_and_wrong_kinds_are_ignored() {
    let mut block = UniformBlock::new(UniformLayout::material());
    let before = block.bytes().to_vec();
    assert!(!block.set("u_DoesNotExist", 1.0_f32));
    assert!(!block.set("u_Shininess", 3_i32));
    assert!(!block.set("u_LightPos", 1.0_f32));
    assert_eq!(block.bytes(), &before[..]);
    assert!(block.set("u_Shininess", 3.0_f32));
    assert_eq!(block.get_f32("u_Shininess"), Some(3.0));
}

#[test]
fn mat3_columns_are_padded() {
    let mut block = UniformBlock::new(UniformLayout::object());
    let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
    block.set("u_NormalMatrix", m);
    let floats: &[f32] = bytemuck::cast_slice(&block.bytes()[128..176]);
    assert_eq!(floats, &[1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 9.0, 0.0]);
}

#[test]
fn object_block_round_trips_its_matrices() {
    let model = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    let object = ObjectUniforms {
        model,
        model_view_projection: Matrix4::from_scale(2.0) * model,
        normal: Matrix3::identity(),
    };
    let block = object.to_block();
    assert_eq!(block.get_mat4("u_Model"), Some(model));
    assert_eq!(block.get_mat4("u_ModelViewProjection"), Some(object.model_view_projection));
}

#[test]
fn material_values_override_the_program() {
    let mut assets = Assets::new();
    let shader = assets.add_shader(ShaderKind::BlinnPhongTextured);
    LightSettings::default().apply(assets.shader_mut(shader));
    let plain = Material::new("plain", shader);
    let shiny = Material::new("shiny", shader).with("u_Shininess", 32.0_f32).with("u_Unused", 1.0_f32);

    let program = assets.shader(shader);
    let resolved = shiny.resolve(program);
    assert_eq!(resolved.get_f32("u_Shininess"), Some(32.0));
    assert_eq!(resolved.get_f32("u_AmbientStrength"), Some(0.1));
    assert_eq!(plain.resolve(program).get_f32("u_Shininess"), Some(0.0));
}

#[test]
fn lighting_pushes_every_value() {
    let mut program = ShaderProgram::new(ShaderKind::BlinnPhongTextured);
    let settings = LightSettings {
        mode: LightingMode::Specular,
        ..LightSettings::default()
    };
    settings.apply(&mut program);
    let uniforms = program.uniforms();
    assert_eq!(uniforms.get_vec3("u_LightPos"), Some(Vector3::new(0.0, 0.0, 2.0)));
    assert_eq!(uniforms.get_f32("u_LightAttenuationConstant"), Some(1.0));
    assert_eq!(uniforms.get_i32("u_Specular"), Some(1));
    assert_eq!(uniforms.get_i32("u_Ambient"), Some(0));

    let full: Vec<_> = LightingMode::Full.flags().collect();
    assert!(full.iter().all(|(_, flag)| *flag == 0));
}

#[test]
fn camera_toggles_and_resizes() {
    let mut camera = Camera::new();
    camera.resize_window(1600, 800);
    assert_relative_eq!(camera.aspect(), 2.0);
    let perspective = camera.projection();
    camera.toggle_ortho();
    assert!(camera.is_ortho());
    assert_ne!(camera.projection(), perspective);
    camera.toggle_ortho();
    assert_eq!(camera.projection(), perspective);

    camera.set_fov_degrees(60.0);
    assert_ne!(camera.projection(), perspective);

    // a minimised window keeps the last aspect
    camera.resize_window(0, 600);
    assert_relative_eq!(camera.aspect(), 2.0);
}
