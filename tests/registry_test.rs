use tabletop::{
    camera::Camera,
    data_structures::{
        registry::{Registry, Tag},
        transform::Transform,
    },
    render::Renderable,
    resources::{MaterialId, MeshId},
};

mod common;
use common::test_utils::assets_with;
use tabletop::data_structures::material::ShaderKind;

fn some_renderable() -> (MeshId, MaterialId) {
    let (_, _, materials, mesh) = assets_with(&[ShaderKind::BlinnPhongTextured], &[("only", 0, 0)]);
    (mesh, materials[0])
}

#[test]
fn created_entities_have_a_name_and_a_transform() {
    let mut registry = Registry::new();
    let entity = registry.create("pawn");
    assert_eq!(registry.name(entity), Some("pawn"));
    assert!(registry.contains::<Transform>(entity));
    assert!(!registry.contains::<Camera>(entity));
    assert_eq!(registry.len(), 1);
}

#[test]
fn destroyed_handles_go_stale() {
    let mut registry = Registry::new();
    let first = registry.create("first");
    assert!(registry.destroy(first));
    assert!(!registry.is_alive(first));
    assert!(registry.get::<Tag>(first).is_none());
    assert!(!registry.destroy(first));

    // the slot is reused under a new generation
    let second = registry.create("second");
    assert_eq!(second.index(), first.index());
    assert_ne!(second.generation(), first.generation());
    assert!(registry.get::<Tag>(first).is_none());
    assert_eq!(registry.name(second), Some("second"));
}

#[test]
fn inserting_on_a_dead_entity_is_ignored() {
    let mut registry = Registry::new();
    let entity = registry.create("gone");
    registry.destroy(entity);
    assert!(registry.insert(entity, Camera::new()).is_none());
    assert_eq!(registry.view::<Camera>().count(), 0);
}

#[test]
fn insert_replaces_and_returns_previous() {
    let mut registry = Registry::new();
    let entity = registry.create("cam");
    assert!(registry.insert(entity, Camera::new()).is_none());
    let mut ortho = Camera::new();
    ortho.toggle_ortho();
    let previous = registry.insert(entity, ortho).unwrap();
    assert!(!previous.is_ortho());
    assert!(registry.get::<Camera>(entity).unwrap().is_ortho());
}

#[test]
fn views_visit_only_holders() {
    let mut registry = Registry::new();
    let a = registry.create("a");
    let _b = registry.create("b");
    let c = registry.create("c");
    registry.insert(a, Camera::new());
    registry.insert(c, Camera::new());

    let mut holders: Vec<_> = registry.view::<Camera>().map(|(entity, _)| entity).collect();
    holders.sort();
    assert_eq!(holders, vec![a, c]);
    assert_eq!(registry.view::<Tag>().count(), 3);
}

#[test]
fn view_mut_edits_in_place() {
    let mut registry = Registry::new();
    let entity = registry.create("cam");
    registry.insert(entity, Camera::new());
    for (_, camera) in registry.view_mut::<Camera>() {
        camera.set_fov_degrees(60.0);
    }
    assert_eq!(registry.get::<Camera>(entity).unwrap().fov_degrees(), 60.0);
}

#[test]
fn find_by_name_returns_the_live_entity() {
    let mut registry = Registry::new();
    let table = registry.create("Table");
    registry.create("cake");
    assert_eq!(registry.find_by_name("Table"), Some(table));
    assert_eq!(registry.find_by_name("chair"), None);
}

#[test]
fn drawables_need_a_transform() {
    let (mesh, material) = some_renderable();
    let mut registry = Registry::new();
    let shown = registry.create("shown");
    let hidden = registry.create("hidden");
    registry.insert(shown, Renderable::new(mesh, material));
    registry.insert(hidden, Renderable::new(mesh, material));
    registry.remove::<Transform>(hidden);
    registry.update_transforms();

    let drawn: Vec<_> = registry.drawables().map(|(entity, _, _)| entity).collect();
    assert_eq!(drawn, vec![shown]);
}

#[test]
fn removing_a_component_keeps_the_entity() {
    let mut registry = Registry::new();
    let entity = registry.create("cam");
    registry.insert(entity, Camera::new());
    assert!(registry.remove::<Camera>(entity).is_some());
    assert!(registry.is_alive(entity));
    assert!(registry.remove::<Camera>(entity).is_none());
}

#[test]
fn queued_camera_target_aims_the_transform_once() {
    let mut registry = Registry::new();
    let camera = registry.create("camera");
    registry
        .get_mut::<Transform>(camera)
        .unwrap()
        .set_local_position([4.0, 0.0, 0.0]);
    let mut lens = Camera::new();
    lens.set_up(cgmath::Vector3::unit_z());
    lens.look_at([0.0, 0.0, 0.0]);
    registry.insert(camera, lens);

    registry.aim_cameras();
    registry.update_transforms();
    assert!(registry.get::<Camera>(camera).unwrap().target().is_none());
    let world = *registry.get::<Transform>(camera).unwrap().world_transform();
    let forward = (world * cgmath::Vector4::new(0.0, 0.0, -1.0, 0.0)).truncate();
    let up = (world * cgmath::Vector4::new(0.0, 1.0, 0.0, 0.0)).truncate();
    approx::assert_relative_eq!(forward, cgmath::Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
    approx::assert_relative_eq!(up, cgmath::Vector3::unit_z(), epsilon = 1e-5);

    // a consumed target no longer overrides later rotations
    registry
        .get_mut::<Transform>(camera)
        .unwrap()
        .set_local_rotation(0.0, 0.0, 30.0);
    let turned = registry.get::<Transform>(camera).unwrap().local_rotation();
    registry.aim_cameras();
    assert_eq!(registry.get::<Transform>(camera).unwrap().local_rotation(), turned);
}
