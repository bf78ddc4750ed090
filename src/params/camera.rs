//! Camera path configuration and presets.

use glam::Vec3;
use serde::Deserialize;

use crate::error::{OrbError, Result};

/// Smallest eye-to-target distance a camera may use (world units)
const MIN_VIEW_DISTANCE: f32 = 1e-3;

/// Largest |cos| between the view direction and the +Y up vector
const MAX_UP_ALIGNMENT: f32 = 0.999;

/// Reject views `look_at_rh` cannot build: eye on the target, or looking along Y
fn validate_view(eye: Vec3, target: Vec3) -> Result<()> {
    let offset = target - eye;
    if !offset.is_finite() || offset.length() < MIN_VIEW_DISTANCE {
        return Err(OrbError::InvalidConfig(format!(
            "camera at {:?} is too close to its target {:?}",
            eye, target
        )));
    }
    if offset.normalize().dot(Vec3::Y).abs() > MAX_UP_ALIGNMENT {
        return Err(OrbError::InvalidConfig(format!(
            "camera at {:?} looks straight up or down at {:?}",
            eye, target
        )));
    }
    Ok(())
}

/// Slow drifting camera orbiting in front of the orb
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriftCamera {
    /// Distance from the orb centre along +Z (world units)
    pub distance: f32,

    /// Horizontal sway amplitude (world units)
    pub sway: f32,

    /// Vertical sway as a fraction of the horizontal sway
    pub vertical_ratio: f32,

    /// Horizontal sway angular rate (radians per second)
    pub sway_rate_x: f32,

    /// Vertical sway angular rate (radians per second)
    pub sway_rate_y: f32,
}

impl Default for DriftCamera {
    fn default() -> Self {
        Self {
            distance: 8.0,
            sway: 0.8,
            vertical_ratio: 0.6,
            sway_rate_x: 0.05,
            sway_rate_y: 0.04,
        }
    }
}

impl DriftCamera {
    pub fn validate(&self) -> Result<()> {
        if !(self.distance > 0.0 && self.distance.is_finite()) {
            return Err(OrbError::InvalidConfig(format!(
                "drift camera distance must be positive, got {}",
                self.distance
            )));
        }
        if !(self.sway.is_finite() && self.vertical_ratio.is_finite()) {
            return Err(OrbError::InvalidConfig(
                "drift camera sway must be finite".to_string(),
            ));
        }
        // Steepest view: full vertical sway, no horizontal sway
        let peak = Vec3::new(0.0, (self.sway * self.vertical_ratio).abs(), self.distance);
        validate_view(peak, Vec3::ZERO)
    }
}

/// Fixed camera position (for debugging and stills)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FixedCamera {
    /// Camera position (world units)
    pub position: [f32; 3],

    /// Look-at target (world units)
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 8.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Camera preset selection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPreset {
    /// Drift preset: subtle sine sway, always looking at the orb
    Drift(DriftCamera),

    /// Fixed preset: stationary camera
    Fixed(FixedCamera),
}

impl FixedCamera {
    pub fn validate(&self) -> Result<()> {
        validate_view(Vec3::from_array(self.position), Vec3::from_array(self.target))
    }
}

impl CameraPreset {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Drift(drift) => drift.validate(),
            Self::Fixed(fixed) => fixed.validate(),
        }
    }
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Drift(DriftCamera::default())
    }
}
