//! Camera presets: slow drift around the orb or a fixed viewpoint.

use glam::{Mat4, Vec3};

use crate::params::{CameraPreset, DriftCamera, FixedCamera, RenderConfig};

/// Camera system evaluating the active preset over time
pub struct CameraSystem {
    preset: CameraPreset,
}

impl CameraSystem {
    /// Create new camera system with specified preset
    pub fn new(preset: CameraPreset) -> Self {
        Self { preset }
    }

    pub fn preset(&self) -> &CameraPreset {
        &self.preset
    }

    /// Compute camera position and look-at target for given time
    ///
    /// # Returns
    /// Tuple of (eye_position, target_position)
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        match &self.preset {
            CameraPreset::Drift(params) => Self::compute_drift_path(params, time_s),
            CameraPreset::Fixed(params) => Self::compute_fixed_path(params),
        }
    }

    /// Gentle sine sway in front of the orb, always looking at its centre
    fn compute_drift_path(p: &DriftCamera, time_s: f32) -> (Vec3, Vec3) {
        let x = (time_s * p.sway_rate_x).sin() * p.sway;
        let y = (time_s * p.sway_rate_y).cos() * p.sway * p.vertical_ratio;

        (Vec3::new(x, y, p.distance), Vec3::ZERO)
    }

    fn compute_fixed_path(p: &FixedCamera) -> (Vec3, Vec3) {
        (Vec3::from_array(p.position), Vec3::from_array(p.target))
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(
        &self,
        time_s: f32,
        render_config: &RenderConfig,
    ) -> (Mat4, Vec3) {
        let (eye, target) = self.compute_position_and_target(time_s);

        // Camera never rolls
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane,
            render_config.far_plane,
        );

        (proj * view, eye)
    }
}
