//! Local/world transforms with an optional parent link.
//!
//! A [`Transform`] stores local position, rotation and scale and caches the
//! world matrix plus its inverse-transpose normal matrix. The caches are
//! pulled: the registry recomputes every transform once per frame, parents
//! before children, via [`Transform::update_world_matrix`].
//!
//! # Conventions
//!
//! - Local matrix: `T · R · S`.
//! - Rotation is kept as a unit quaternion. The Euler setters take degrees and
//!   apply X first, then Y, then Z, each about the fixed parent axes
//!   (`R = Rz · Ry · Rx`).
//! - [`Transform::look_at`] overwrites the rotation so local `-Z` faces the
//!   target and local `+Y` leans towards the given up vector.

use cgmath::{
    Deg, EuclideanSpace, InnerSpace, Matrix, Matrix3, Matrix4, One, Point3, Quaternion, Rad,
    Rotation3, SquareMatrix, Vector3, Zero,
};

use crate::data_structures::registry::Entity;

/// Build the rotation for Euler angles given in degrees (X, then Y, then Z about fixed axes).
pub fn euler_degrees(x: f32, y: f32, z: f32) -> Quaternion<f32> {
    Quaternion::from_angle_z(Deg(z)) * Quaternion::from_angle_y(Deg(y)) * Quaternion::from_angle_x(Deg(x))
}

#[derive(Clone, Debug)]
pub struct Transform {
    position: Vector3<f32>,
    rotation: Quaternion<f32>,
    scale: Vector3<f32>,
    parent: Option<Entity>,
    world: Matrix4<f32>,
    normal: Matrix3<f32>,
    stale: bool,
    updated_once: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            parent: None,
            world: Matrix4::identity(),
            normal: Matrix3::identity(),
            stale: true,
            updated_once: false,
        }
    }

    pub fn set_local_position(&mut self, position: impl Into<Vector3<f32>>) -> &mut Self {
        self.position = position.into();
        self.stale = true;
        self
    }

    /// Euler angles in degrees, see the module docs for the order.
    pub fn set_local_rotation(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.set_local_rotation_quat(euler_degrees(x, y, z))
    }

    pub fn set_local_rotation_quat(&mut self, rotation: Quaternion<f32>) -> &mut Self {
        self.rotation = rotation.normalize();
        self.stale = true;
        self
    }

    pub fn set_local_scale(&mut self, scale: impl Into<Vector3<f32>>) -> &mut Self {
        self.scale = scale.into();
        self.stale = true;
        self
    }

    pub fn local_position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn local_rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    pub fn local_scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// Current rotation decomposed back into X/Y/Z degrees.
    ///
    /// Near gimbal lock (Y at ±90°) the Z angle is reported as zero and the
    /// whole remaining twist is folded into X.
    pub fn local_rotation_euler(&self) -> Vector3<f32> {
        let m = Matrix3::from(self.rotation);
        // cgmath is column-major: m[col][row]
        let sin_y = (-m[0][2]).clamp(-1.0, 1.0);
        let y = sin_y.asin();
        let (x, z) = if sin_y.abs() < 0.9999 {
            (m[1][2].atan2(m[2][2]), m[0][1].atan2(m[0][0]))
        } else {
            ((-m[2][1]).atan2(m[1][1]), 0.0)
        };
        Vector3::new(
            Deg::from(Rad(x)).0,
            Deg::from(Rad(y)).0,
            Deg::from(Rad(z)).0,
        )
    }

    /// Translate along the transform's own axes.
    pub fn move_local(&mut self, delta: impl Into<Vector3<f32>>) -> &mut Self {
        self.position += self.rotation * delta.into();
        self.stale = true;
        self
    }

    /// Translate along the parent's axes.
    pub fn move_fixed(&mut self, delta: impl Into<Vector3<f32>>) -> &mut Self {
        self.position += delta.into();
        self.stale = true;
        self
    }

    /// Rotate about the transform's own axes (degrees).
    pub fn rotate_local(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        let rotation = self.rotation * euler_degrees(x, y, z);
        self.set_local_rotation_quat(rotation)
    }

    /// Rotate about the parent's axes (degrees).
    pub fn rotate_fixed(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        let rotation = euler_degrees(x, y, z) * self.rotation;
        self.set_local_rotation_quat(rotation)
    }

    /// Point local `-Z` at `target`. A target on top of the position is ignored.
    pub fn look_at(&mut self, target: impl Into<Vector3<f32>>, up: impl Into<Vector3<f32>>) -> &mut Self {
        let to_target = target.into() - self.position;
        if to_target.magnitude2() <= f32::EPSILON {
            log::warn!("look_at target coincides with the transform position");
            return self;
        }
        let forward = to_target.normalize();
        let mut up = up.into();
        if forward.cross(up).magnitude2() <= f32::EPSILON {
            // forward is parallel to up, borrow another axis
            up = if forward.z.abs() < 0.9 { Vector3::unit_z() } else { Vector3::unit_y() };
        }
        let right = forward.cross(up).normalize();
        let true_up = right.cross(forward);
        let basis = Matrix3::from_cols(right, true_up, -forward);
        self.set_local_rotation_quat(Quaternion::from(basis))
    }

    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<Entity>) -> &mut Self {
        self.parent = parent;
        self.stale = true;
        self
    }

    /// `T · R · S` of the local state.
    pub fn local_transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Whether local state changed since the last world update.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Recompute the cached world and normal matrices.
    ///
    /// `parent_world` is the parent's current world matrix, `None` for roots.
    /// Calling this again with unchanged inputs yields the same result.
    pub fn update_world_matrix(&mut self, parent_world: Option<&Matrix4<f32>>) {
        let local = self.local_transform();
        self.world = match parent_world {
            Some(parent) => *parent * local,
            None => local,
        };
        let upper = Matrix3::from_cols(
            self.world.x.truncate(),
            self.world.y.truncate(),
            self.world.z.truncate(),
        );
        self.normal = upper
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix3::identity);
        self.stale = false;
        self.updated_once = true;
    }

    pub fn world_transform(&self) -> &Matrix4<f32> {
        debug_assert!(self.updated_once, "world_transform read before the first update");
        &self.world
    }

    pub fn world_normal_matrix(&self) -> &Matrix3<f32> {
        debug_assert!(self.updated_once, "world_normal_matrix read before the first update");
        &self.normal
    }

    pub fn world_position(&self) -> Point3<f32> {
        Point3::from_vec(self.world_transform().w.truncate())
    }
}
