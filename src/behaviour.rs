//! Per-entity scripted behaviours.
//!
//! Behaviours are a closed set dispatched by a single `match` in
//! [`Behaviour::update`]. An entity carries them in a [`BehaviourSet`]
//! component; each slot has its own `enabled` flag which only outside code
//! (key watchers, the debug panel) toggles. A disabled slot never touches its
//! entity.
//!
//! # Key types
//!
//! - [`FollowPath`] moves along an open polyline at constant speed, wrapping
//!   back to the first point once the end is passed
//! - [`SimpleMove`] keyboard driven rotation and translation
//! - [`CameraControl`] mouse-look and fly controls while the right mouse button is held

use cgmath::{InnerSpace, Vector3};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    data_structures::registry::{Entity, EntityMut, Registry},
    input::InputState,
};

/// What a behaviour gets to see each frame besides its entity.
pub struct BehaviourContext<'a> {
    /// Clamped frame time in seconds.
    pub dt: f32,
    pub input: &'a InputState,
}

#[derive(Clone, Debug)]
pub struct FollowPath {
    pub points: Vec<Vector3<f32>>,
    pub speed: f32,
    progress: f32,
}

impl FollowPath {
    pub fn new(points: Vec<Vector3<f32>>, speed: f32) -> Self {
        Self {
            points,
            speed,
            progress: 0.0,
        }
    }

    /// Distance travelled along the path since the last wrap.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| (w[1] - w[0]).magnitude()).sum()
    }

    /// The point `distance` units along the path, clamped to its ends.
    pub fn position_at(&self, distance: f32) -> Option<Vector3<f32>> {
        let first = *self.points.first()?;
        let mut remaining = distance.max(0.0);
        for w in self.points.windows(2) {
            let segment = (w[1] - w[0]).magnitude();
            if remaining <= segment {
                if segment <= f32::EPSILON {
                    return Some(w[1]);
                }
                return Some(w[0] + (w[1] - w[0]) * (remaining / segment));
            }
            remaining -= segment;
        }
        Some(*self.points.last().unwrap_or(&first))
    }

    fn advance(&mut self, dt: f32) -> Option<Vector3<f32>> {
        match self.points.len() {
            0 => return None,
            1 => return Some(self.points[0]),
            _ => {}
        }
        let length = self.length();
        if length <= f32::EPSILON {
            return None;
        }
        let step = self.speed * dt;
        if step.is_finite() {
            self.progress += step;
        }
        if !self.progress.is_finite() {
            self.progress = 0.0;
        }
        // exactly `length` stays on the last point
        if self.progress > length || self.progress < 0.0 {
            self.progress = self.progress.rem_euclid(length);
        }
        self.position_at(self.progress)
    }

    fn update(&mut self, entity: &mut EntityMut<'_>, ctx: &BehaviourContext<'_>) {
        let Some(position) = self.advance(ctx.dt) else {
            return;
        };
        if let Some(transform) = entity.transform() {
            transform.set_local_position(position);
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimpleMove {
    /// Move and rotate along the entity's own axes instead of the world's.
    pub relative: bool,
}

impl Default for SimpleMove {
    fn default() -> Self {
        Self { relative: true }
    }
}

impl SimpleMove {
    /// Degrees per second.
    pub const ROTATE_SPEED: f32 = 90.0;
    /// Units per second.
    pub const MOVE_SPEED: f32 = 2.0;

    fn update(&mut self, entity: &mut EntityMut<'_>, ctx: &BehaviourContext<'_>) {
        let input = ctx.input;
        let turn = Self::ROTATE_SPEED * ctx.dt;
        let step = Self::MOVE_SPEED * ctx.dt;
        let pitch = input.axis(KeyCode::ArrowUp, KeyCode::ArrowDown) * turn;
        let roll = input.axis(KeyCode::ArrowLeft, KeyCode::ArrowRight) * turn;
        let yaw = input.axis(KeyCode::KeyQ, KeyCode::KeyE) * turn;
        let delta = Vector3::new(
            input.axis(KeyCode::KeyL, KeyCode::KeyJ),
            input.axis(KeyCode::KeyI, KeyCode::KeyK),
            input.axis(KeyCode::KeyO, KeyCode::KeyU),
        ) * step;

        let Some(transform) = entity.transform() else {
            return;
        };
        let rotating = pitch != 0.0 || roll != 0.0 || yaw != 0.0;
        let moving = delta.magnitude2() > 0.0;
        if self.relative {
            if rotating {
                transform.rotate_local(pitch, roll, yaw);
            }
            if moving {
                transform.move_local(delta);
            }
        } else {
            if rotating {
                transform.rotate_fixed(pitch, roll, yaw);
            }
            if moving {
                transform.move_fixed(delta);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraControl {
    /// Degrees per pixel of mouse motion.
    pub look_speed: f32,
    /// Units per second.
    pub move_speed: f32,
}

impl Default for CameraControl {
    fn default() -> Self {
        Self {
            look_speed: 0.2,
            move_speed: 4.0,
        }
    }
}

impl CameraControl {
    fn update(&mut self, entity: &mut EntityMut<'_>, ctx: &BehaviourContext<'_>) {
        let input = ctx.input;
        if !input.is_button_down(MouseButton::Right) {
            return;
        }
        let Some(transform) = entity.transform() else {
            return;
        };
        let (dx, dy) = input.mouse_delta();
        if dx != 0.0 {
            transform.rotate_fixed(0.0, 0.0, -dx * self.look_speed);
        }
        if dy != 0.0 {
            transform.rotate_local(-dy * self.look_speed, 0.0, 0.0);
        }

        let step = self.move_speed * ctx.dt;
        let local = Vector3::new(
            input.axis(KeyCode::KeyD, KeyCode::KeyA),
            0.0,
            -input.axis(KeyCode::KeyW, KeyCode::KeyS),
        ) * step;
        if local.magnitude2() > 0.0 {
            transform.move_local(local);
        }
        let lift = input.axis(KeyCode::Space, KeyCode::ShiftLeft) * step;
        if lift != 0.0 {
            transform.move_fixed(Vector3::new(0.0, 0.0, lift));
        }
    }
}

#[derive(Clone, Debug)]
pub enum Behaviour {
    FollowPath(FollowPath),
    SimpleMove(SimpleMove),
    CameraControl(CameraControl),
}

impl Behaviour {
    pub fn update(&mut self, entity: &mut EntityMut<'_>, ctx: &BehaviourContext<'_>) {
        match self {
            Behaviour::FollowPath(path) => path.update(entity, ctx),
            Behaviour::SimpleMove(mover) => mover.update(entity, ctx),
            Behaviour::CameraControl(control) => control.update(entity, ctx),
        }
    }
}

/// Typed access into a [`BehaviourSet`].
pub trait BehaviourKind: Sized {
    fn from_ref(behaviour: &Behaviour) -> Option<&Self>;
    fn from_mut(behaviour: &mut Behaviour) -> Option<&mut Self>;
}

macro_rules! behaviour_kind {
    ($ty:ident) => {
        impl From<$ty> for Behaviour {
            fn from(value: $ty) -> Self {
                Behaviour::$ty(value)
            }
        }

        impl BehaviourKind for $ty {
            fn from_ref(behaviour: &Behaviour) -> Option<&Self> {
                match behaviour {
                    Behaviour::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_mut(behaviour: &mut Behaviour) -> Option<&mut Self> {
                match behaviour {
                    Behaviour::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

behaviour_kind!(FollowPath);
behaviour_kind!(SimpleMove);
behaviour_kind!(CameraControl);

#[derive(Clone, Debug)]
pub struct BehaviourSlot {
    pub enabled: bool,
    pub behaviour: Behaviour,
}

/// The behaviours attached to one entity, in attachment order.
#[derive(Clone, Debug, Default)]
pub struct BehaviourSet {
    slots: Vec<BehaviourSlot>,
}

impl BehaviourSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, behaviour: impl Into<Behaviour>) -> &mut Self {
        self.slots.push(BehaviourSlot {
            enabled: true,
            behaviour: behaviour.into(),
        });
        self
    }

    pub fn bind_disabled(&mut self, behaviour: impl Into<Behaviour>) -> &mut Self {
        self.slots.push(BehaviourSlot {
            enabled: false,
            behaviour: behaviour.into(),
        });
        self
    }

    pub fn slots(&self) -> &[BehaviourSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [BehaviourSlot] {
        &mut self.slots
    }

    /// First behaviour of kind `B`.
    pub fn get<B: BehaviourKind>(&self) -> Option<&B> {
        self.slots.iter().find_map(|slot| B::from_ref(&slot.behaviour))
    }

    pub fn get_mut<B: BehaviourKind>(&mut self) -> Option<&mut B> {
        self.slots.iter_mut().find_map(|slot| B::from_mut(&mut slot.behaviour))
    }

    fn slot_of<B: BehaviourKind>(&mut self) -> Option<&mut BehaviourSlot> {
        self.slots
            .iter_mut()
            .find(|slot| B::from_ref(&slot.behaviour).is_some())
    }

    pub fn is_enabled<B: BehaviourKind>(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.enabled && B::from_ref(&slot.behaviour).is_some())
    }

    /// Returns false when no behaviour of kind `B` is attached.
    pub fn set_enabled<B: BehaviourKind>(&mut self, enabled: bool) -> bool {
        match self.slot_of::<B>() {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, entity: &mut EntityMut<'_>, ctx: &BehaviourContext<'_>) {
        for slot in self.slots.iter_mut().filter(|slot| slot.enabled) {
            slot.behaviour.update(entity, ctx);
        }
    }
}

impl Registry {
    /// Attach a behaviour, creating the entity's [`BehaviourSet`] if needed.
    pub fn bind_behaviour(&mut self, entity: Entity, behaviour: impl Into<Behaviour>, enabled: bool) {
        if !self.contains::<BehaviourSet>(entity) {
            self.insert(entity, BehaviourSet::new());
        }
        if let Some(set) = self.get_mut::<BehaviourSet>(entity) {
            if enabled {
                set.bind(behaviour);
            } else {
                set.bind_disabled(behaviour);
            }
        }
    }

    pub fn behaviour<B: BehaviourKind>(&self, entity: Entity) -> Option<&B> {
        self.get::<BehaviourSet>(entity)?.get::<B>()
    }

    pub fn behaviour_mut<B: BehaviourKind>(&mut self, entity: Entity) -> Option<&mut B> {
        self.get_mut::<BehaviourSet>(entity)?.get_mut::<B>()
    }

    pub fn set_behaviour_enabled<B: BehaviourKind>(&mut self, entity: Entity, enabled: bool) -> bool {
        self.get_mut::<BehaviourSet>(entity)
            .is_some_and(|set| set.set_enabled::<B>(enabled))
    }
}
