// src/render/camera.rs
//! Projection, view and model matrices for the relief.

use glam::{Mat4, Vec3, Vec4};

/// Fixed camera parameters. Only the eye distance is interactive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Eye height above the surface origin
    pub eye_height: f32,
    /// Point the camera looks at
    pub target: Vec3,
    /// Vertical offset applied to the whole surface
    pub model_offset_y: f32,
    /// Horizontal stretch of the normalized surface
    pub model_scale_x: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 10.0,
            eye_height: 0.85,
            target: Vec3::new(0.0, 0.20, -0.8),
            model_offset_y: -0.45,
            model_scale_x: 10.0,
        }
    }
}

/// Matrices for one frame, OpenGL clip-space conventions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
    /// `projection * view * model`
    pub mvp: Mat4,
}

impl CameraTransform {
    /// Build the matrices for a `width` x `height` target with the eye
    /// `zoom_level` units in front of the surface.
    pub fn new(config: &CameraConfig, width: u32, height: u32, zoom_level: f32) -> Self {
        let aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };

        let projection = Mat4::perspective_rh_gl(
            config.fov_y_degrees.to_radians(),
            aspect,
            config.near,
            config.far,
        );
        let eye = Vec3::new(0.0, config.eye_height, zoom_level);
        let view = Mat4::look_at_rh(eye, config.target, Vec3::Y);
        let model = Mat4::from_translation(Vec3::new(0.0, config.model_offset_y, 0.0))
            * Mat4::from_scale(Vec3::new(config.model_scale_x, 1.0, 1.0));

        Self {
            projection,
            view,
            model,
            mvp: projection * view * model,
        }
    }

    /// Column-major MVP, ready for a `mat4` uniform.
    pub fn mvp_array(&self) -> [f32; 16] {
        self.mvp.to_cols_array()
    }

    /// Project a model-space point to normalized device coordinates.
    ///
    /// Returns `None` for points behind the eye.
    pub fn project(&self, position: [f32; 3]) -> Option<[f32; 3]> {
        let [x, y, z] = position;
        let clip = self.mvp * Vec4::new(x, y, z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some([clip.x / clip.w, clip.y / clip.w, clip.z / clip.w])
    }
}
