//! Camera component.
//!
//! The camera only owns projection state. Its view comes from the owning
//! entity's [`Transform`](crate::data_structures::transform::Transform): the
//! view matrix is the inverse of the entity's world matrix.

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3, Vector4};

/// cgmath produces OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::from_cols(
    Vector4::new(1.0, 0.0, 0.0, 0.0),
    Vector4::new(0.0, 1.0, 0.0, 0.0),
    Vector4::new(0.0, 0.0, 0.5, 0.0),
    Vector4::new(0.0, 0.0, 0.5, 1.0),
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

#[derive(Clone, Debug)]
pub struct Camera {
    mode: ProjectionMode,
    fov: Deg<f32>,
    ortho_height: f32,
    aspect: f32,
    near: f32,
    far: f32,
    up: Vector3<f32>,
    target: Option<Vector3<f32>>,
    projection: Matrix4<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        let mut camera = Self {
            mode: ProjectionMode::Perspective,
            fov: Deg(90.0),
            ortho_height: 1.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            up: Vector3::unit_z(),
            target: None,
            projection: Matrix4::identity(),
        };
        camera.recalculate();
        camera
    }

    fn recalculate(&mut self) {
        let projection = match self.mode {
            ProjectionMode::Perspective => cgmath::perspective(self.fov, self.aspect, self.near, self.far),
            ProjectionMode::Orthographic => {
                let half_h = self.ortho_height / 2.0;
                let half_w = half_h * self.aspect;
                cgmath::ortho(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        };
        self.projection = OPENGL_TO_WGPU_MATRIX * projection;
    }

    /// Projection in wgpu clip space.
    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn is_ortho(&self) -> bool {
        self.mode == ProjectionMode::Orthographic
    }

    pub fn toggle_ortho(&mut self) {
        self.mode = match self.mode {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        };
        log::debug!("camera projection switched to {:?}", self.mode);
        self.recalculate();
    }

    pub fn set_fov_degrees(&mut self, fov: f32) {
        self.fov = Deg(fov);
        self.recalculate();
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov.0
    }

    pub fn set_ortho_height(&mut self, height: f32) {
        self.ortho_height = height;
        self.recalculate();
    }

    pub fn ortho_height(&self) -> f32 {
        self.ortho_height
    }

    pub fn set_clipping_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.recalculate();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Zero-sized windows (minimised) keep the previous aspect.
    pub fn resize_window(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.recalculate();
    }

    pub fn set_up(&mut self, up: impl Into<Vector3<f32>>) {
        self.up = up.into();
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Queue a look-at target. [`Registry::aim_cameras`] turns the owning
    /// transform towards it, using [`Camera::up`], on the next update.
    ///
    /// [`Registry::aim_cameras`]: crate::data_structures::registry::Registry::aim_cameras
    pub fn look_at(&mut self, target: impl Into<Vector3<f32>>) {
        self.target = Some(target.into());
    }

    /// The queued target, if it has not been applied yet.
    pub fn target(&self) -> Option<Vector3<f32>> {
        self.target
    }

    pub fn take_target(&mut self) -> Option<Vector3<f32>> {
        self.target.take()
    }
}

/// View matrix for a camera whose entity has the given world matrix.
pub fn view_matrix(camera_world: &Matrix4<f32>) -> Matrix4<f32> {
    camera_world.invert().unwrap_or_else(|| {
        log::warn!("camera world matrix is not invertible, using identity view");
        Matrix4::identity()
    })
}
