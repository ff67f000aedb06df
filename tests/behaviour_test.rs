use approx::assert_relative_eq;
use cgmath::Vector3;
use tabletop::{
    behaviour::{BehaviourContext, CameraControl, FollowPath, SimpleMove},
    data_structures::{
        registry::{Entity, Registry},
        transform::Transform,
    },
    input::InputState,
};
use winit::{event::MouseButton, keyboard::KeyCode};

fn step(registry: &mut Registry, input: &InputState, dt: f32) {
    registry.run_behaviours(&BehaviourContext { dt, input });
    registry.update_transforms();
}

fn position(registry: &Registry, entity: Entity) -> Vector3<f32> {
    registry.get::<Transform>(entity).unwrap().local_position()
}

fn walker(registry: &mut Registry, enabled: bool) -> Entity {
    let entity = registry.create("walker");
    registry.bind_behaviour(
        entity,
        FollowPath::new(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(6.0, 0.0, 0.0)], 1.0),
        enabled,
    );
    entity
}

#[test]
fn path_follower_moves_at_constant_speed() {
    let mut registry = Registry::new();
    let entity = walker(&mut registry, true);
    let input = InputState::new();

    step(&mut registry, &input, 0.5);
    assert_relative_eq!(position(&registry, entity), Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-5);
    for _ in 0..5 {
        step(&mut registry, &input, 0.5);
    }
    assert_relative_eq!(position(&registry, entity), Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
}

#[test]
fn path_end_is_reached_then_wraps() {
    let mut registry = Registry::new();
    let entity = walker(&mut registry, true);
    let input = InputState::new();

    for _ in 0..12 {
        step(&mut registry, &input, 0.5);
    }
    assert_relative_eq!(position(&registry, entity), Vector3::new(6.0, 0.0, 0.0), epsilon = 1e-5);

    step(&mut registry, &input, 0.5);
    assert_relative_eq!(position(&registry, entity), Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-5);
    assert_relative_eq!(registry.behaviour::<FollowPath>(entity).unwrap().progress(), 0.5);
}

#[test]
fn path_follows_every_segment() {
    let mut path = FollowPath::new(
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 0.0),
        ],
        1.0,
    );
    assert_relative_eq!(path.length(), 4.0);
    assert_relative_eq!(path.position_at(3.0).unwrap(), Vector3::new(2.0, 1.0, 0.0), epsilon = 1e-5);
    path.points.clear();
    assert!(path.position_at(1.0).is_none());
}

#[test]
fn disabled_behaviour_leaves_entity_alone() {
    let mut registry = Registry::new();
    let entity = walker(&mut registry, false);
    registry
        .get_mut::<Transform>(entity)
        .unwrap()
        .set_local_position([9.0, 9.0, 9.0]);
    let input = InputState::new();

    for _ in 0..4 {
        step(&mut registry, &input, 0.5);
    }
    assert_relative_eq!(position(&registry, entity), Vector3::new(9.0, 9.0, 9.0), epsilon = 1e-5);
    assert_eq!(registry.behaviour::<FollowPath>(entity).unwrap().progress(), 0.0);

    assert!(registry.set_behaviour_enabled::<FollowPath>(entity, true));
    step(&mut registry, &input, 0.5);
    assert_relative_eq!(position(&registry, entity), Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-5);
}

#[test]
fn disabling_mid_path_freezes_the_walker() {
    let mut registry = Registry::new();
    let entity = walker(&mut registry, true);
    let input = InputState::new();

    step(&mut registry, &input, 0.5);
    step(&mut registry, &input, 0.5);
    let frozen_at = position(&registry, entity);
    let frozen_progress = registry.behaviour::<FollowPath>(entity).unwrap().progress();
    assert_relative_eq!(frozen_at, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-5);

    assert!(registry.set_behaviour_enabled::<FollowPath>(entity, false));
    for _ in 0..7 {
        step(&mut registry, &input, 0.5);
    }
    assert_eq!(position(&registry, entity), frozen_at);
    assert_eq!(registry.behaviour::<FollowPath>(entity).unwrap().progress(), frozen_progress);

    assert!(registry.set_behaviour_enabled::<FollowPath>(entity, true));
    step(&mut registry, &input, 0.5);
    assert_relative_eq!(position(&registry, entity), Vector3::new(1.5, 0.0, 0.0), epsilon = 1e-5);
    assert_relative_eq!(registry.behaviour::<FollowPath>(entity).unwrap().progress(), 1.5, epsilon = 1e-5);
}

#[test]
fn huge_steps_wrap_in_one_frame() {
    let mut registry = Registry::new();
    let fast = registry.create("fast");
    registry.bind_behaviour(
        fast,
        FollowPath::new(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)], 1e9),
        true,
    );
    let reverse = registry.create("reverse");
    registry.bind_behaviour(
        reverse,
        FollowPath::new(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)], -3e12),
        true,
    );
    let input = InputState::new();

    step(&mut registry, &input, 1.0);
    for entity in [fast, reverse] {
        let progress = registry.behaviour::<FollowPath>(entity).unwrap().progress();
        assert!((0.0..=1.0).contains(&progress), "progress {progress} left the path");
        let p = position(&registry, entity);
        assert!((0.0..=1.0).contains(&p.x) && p.y == 0.0 && p.z == 0.0);
    }
}

#[test]
fn non_finite_speed_does_not_move_the_walker() {
    let mut registry = Registry::new();
    let entity = walker(&mut registry, true);
    let input = InputState::new();
    step(&mut registry, &input, 0.5);

    registry.behaviour_mut::<FollowPath>(entity).unwrap().speed = f32::INFINITY;
    step(&mut registry, &input, 0.5);
    assert_relative_eq!(position(&registry, entity), Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-5);

    registry.behaviour_mut::<FollowPath>(entity).unwrap().speed = f32::NAN;
    step(&mut registry, &input, 0.5);
    assert_relative_eq!(registry.behaviour::<FollowPath>(entity).unwrap().progress(), 0.5, epsilon = 1e-5);
}

#[test]
fn toggling_a_missing_behaviour_reports_false() {
    let mut registry = Registry::new();
    let entity = walker(&mut registry, true);
    assert!(!registry.set_behaviour_enabled::<SimpleMove>(entity, true));
    assert!(registry.behaviour::<SimpleMove>(entity).is_none());
}

#[test]
fn simple_move_pitches_with_arrow_keys() {
    let mut registry = Registry::new();
    let entity = registry.create("pawn");
    registry.bind_behaviour(entity, SimpleMove::default(), true);
    let mut input = InputState::new();
    input.set_key(KeyCode::ArrowUp, true);

    step(&mut registry, &input, 1.0);
    let euler = registry.get::<Transform>(entity).unwrap().local_rotation_euler();
    assert_relative_eq!(euler, Vector3::new(SimpleMove::ROTATE_SPEED, 0.0, 0.0), epsilon = 1e-3);
}

#[test]
fn simple_move_translates_along_own_axes_when_relative() {
    let mut registry = Registry::new();
    let entity = registry.create("pawn");
    registry
        .get_mut::<Transform>(entity)
        .unwrap()
        .set_local_rotation(0.0, 0.0, 90.0);
    registry.bind_behaviour(entity, SimpleMove::default(), true);
    let mut input = InputState::new();
    input.set_key(KeyCode::KeyL, true);

    step(&mut registry, &input, 0.5);
    // local +X is world +Y after the yaw
    assert_relative_eq!(position(&registry, entity), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-5);

    registry.behaviour_mut::<SimpleMove>(entity).unwrap().relative = false;
    step(&mut registry, &input, 0.5);
    assert_relative_eq!(position(&registry, entity), Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-5);
}

#[test]
fn camera_control_needs_the_right_button_to_look() {
    let mut registry = Registry::new();
    let camera = registry.create("camera");
    registry.bind_behaviour(camera, CameraControl::default(), true);
    let mut input = InputState::new();
    input.add_mouse_delta(50.0, 0.0);

    step(&mut registry, &input, 0.1);
    let before = registry.get::<Transform>(camera).unwrap().local_rotation();
    assert_eq!(before, cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0));

    input.set_button(MouseButton::Right, true);
    step(&mut registry, &input, 0.1);
    let euler = registry.get::<Transform>(camera).unwrap().local_rotation_euler();
    assert_relative_eq!(euler.z, -50.0 * CameraControl::default().look_speed, epsilon = 1e-3);
}

#[test]
fn camera_control_flies_forward() {
    let mut registry = Registry::new();
    let camera = registry.create("camera");
    registry.bind_behaviour(camera, CameraControl::default(), true);
    let mut input = InputState::new();
    input.set_button(MouseButton::Right, true);
    input.set_key(KeyCode::KeyW, true);

    step(&mut registry, &input, 0.5);
    assert_relative_eq!(position(&registry, camera), Vector3::new(0.0, 0.0, -2.0), epsilon = 1e-5);
}

#[test]
fn behaviours_run_in_attachment_order() {
    let mut registry = Registry::new();
    let entity = registry.create("both");
    registry.bind_behaviour(
        entity,
        FollowPath::new(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 10.0, 0.0)], 1.0),
        true,
    );
    registry.bind_behaviour(entity, SimpleMove { relative: false }, true);
    let mut input = InputState::new();
    input.set_key(KeyCode::KeyL, true);

    step(&mut registry, &input, 1.0);
    // the path sets the position, then the mover offsets it
    assert_relative_eq!(position(&registry, entity), Vector3::new(2.0, 1.0, 0.0), epsilon = 1e-5);
}
