use glam::{Mat4, Vec3};

/// Pinhole camera that the progressive renderer reads its matrices from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y: 60.0_f32.to_radians(),
            aspect,
            near: 0.3,
            far: 1000.0,
        }
    }

    /// Get the view matrix (world → camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix (camera → clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Camera → world transform handed to the kernel for ray generation.
    pub fn camera_to_world(&self) -> Mat4 {
        self.view_matrix().inverse()
    }

    /// Clip → camera transform handed to the kernel for ray generation.
    pub fn inverse_projection(&self) -> Mat4 {
        self.projection_matrix().inverse()
    }

    /// Update aspect ratio (e.g., on window resize)
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Rotate the camera position around the world Y axis through `target`.
    pub fn orbit_y(&mut self, angle: f32) {
        let offset = self.position - self.target;
        let rotated = Mat4::from_rotation_y(angle).transform_vector3(offset);
        self.position = self.target + rotated;
    }
}
