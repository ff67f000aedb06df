use approx::assert_relative_eq;
use cgmath::{Matrix4, Point3, SquareMatrix, Vector3};
use tabletop::data_structures::{registry::Registry, transform::Transform};

#[test]
fn local_matrix_is_translate_rotate_scale() {
    let mut transform = Transform::new();
    transform
        .set_local_position([1.0, 2.0, 3.0])
        .set_local_rotation(0.0, 0.0, 90.0)
        .set_local_scale([2.0, 2.0, 2.0]);
    transform.update_world_matrix(None);

    // +X scaled by 2, rotated onto +Y, then moved
    let p = transform.world_transform() * cgmath::Vector4::new(1.0, 0.0, 0.0, 1.0);
    assert_relative_eq!(p.truncate(), Vector3::new(1.0, 4.0, 3.0), epsilon = 1e-5);
}

#[test]
fn euler_angles_apply_x_then_y_then_z() {
    let mut transform = Transform::new();
    transform.set_local_rotation(90.0, 0.0, 90.0);
    transform.update_world_matrix(None);

    // +Y goes to +Z under X, and Z rotation leaves +Z alone
    let up = transform.world_transform() * cgmath::Vector4::new(0.0, 1.0, 0.0, 0.0);
    assert_relative_eq!(up.truncate(), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    // +X stays under X, then goes to +Y under Z
    let right = transform.world_transform() * cgmath::Vector4::new(1.0, 0.0, 0.0, 0.0);
    assert_relative_eq!(right.truncate(), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
}

#[test]
fn euler_readback_matches_setter() {
    let mut transform = Transform::new();
    transform.set_local_rotation(30.0, -20.0, 45.0);
    assert_relative_eq!(transform.local_rotation_euler(), Vector3::new(30.0, -20.0, 45.0), epsilon = 1e-3);
}

#[test]
fn child_follows_parent() {
    let mut registry = Registry::new();
    let parent = registry.create("parent");
    let child = registry.create("child");
    registry
        .get_mut::<Transform>(parent)
        .unwrap()
        .set_local_position([1.0, 0.0, 0.0])
        .set_local_rotation(0.0, 0.0, 90.0);
    registry
        .get_mut::<Transform>(child)
        .unwrap()
        .set_local_position([1.0, 0.0, 0.0])
        .set_parent(Some(parent));
    registry.update_transforms();

    let world = registry.get::<Transform>(child).unwrap().world_position();
    assert_relative_eq!(world, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-5);
}

#[test]
fn child_created_before_parent_still_sees_current_parent() {
    let mut registry = Registry::new();
    let child = registry.create("child");
    let parent = registry.create("parent");
    registry.get_mut::<Transform>(child).unwrap().set_parent(Some(parent));
    registry.update_transforms();

    registry
        .get_mut::<Transform>(parent)
        .unwrap()
        .set_local_position([0.0, 0.0, 5.0]);
    registry.update_transforms();

    let world = registry.get::<Transform>(child).unwrap().world_position();
    assert_relative_eq!(world, Point3::new(0.0, 0.0, 5.0), epsilon = 1e-6);
}

#[test]
fn updating_twice_changes_nothing() {
    let mut registry = Registry::new();
    let entity = registry.create("thing");
    registry
        .get_mut::<Transform>(entity)
        .unwrap()
        .set_local_position([3.0, -1.0, 2.0])
        .set_local_rotation(10.0, 20.0, 30.0);
    registry.update_transforms();
    let first = *registry.get::<Transform>(entity).unwrap().world_transform();
    registry.update_transforms();
    let second = *registry.get::<Transform>(entity).unwrap().world_transform();
    assert_eq!(first, second);
}

#[test]
fn normal_matrix_undoes_non_uniform_scale() {
    let mut transform = Transform::new();
    transform.set_local_scale([2.0, 1.0, 1.0]);
    transform.update_world_matrix(None);
    let normal = transform.world_normal_matrix();
    assert_relative_eq!(normal.x.x, 0.5, epsilon = 1e-6);
    assert_relative_eq!(normal.y.y, 1.0, epsilon = 1e-6);
}

#[test]
fn look_at_points_minus_z_at_target() {
    let mut transform = Transform::new();
    transform
        .set_local_position([0.0, 6.0, 6.0])
        .look_at([0.0, 0.0, 0.0], Vector3::unit_z());
    transform.update_world_matrix(None);

    let forward = transform.world_transform() * cgmath::Vector4::new(0.0, 0.0, -1.0, 0.0);
    let expected = Vector3::new(0.0, -1.0, -1.0) / 2.0_f32.sqrt();
    assert_relative_eq!(forward.truncate(), expected, epsilon = 1e-5);
}

#[test]
fn look_at_own_position_keeps_rotation() {
    let mut transform = Transform::new();
    transform.set_local_rotation(0.0, 0.0, 45.0);
    let before = transform.local_rotation();
    transform.look_at([0.0, 0.0, 0.0], Vector3::unit_z());
    assert_eq!(transform.local_rotation(), before);
}

#[test]
fn fresh_transform_is_identity() {
    let mut transform = Transform::new();
    assert!(transform.is_stale());
    transform.update_world_matrix(None);
    assert!(!transform.is_stale());
    assert_eq!(*transform.world_transform(), Matrix4::identity());
}
