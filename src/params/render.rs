//! Rendering and recording configuration.

use serde::Deserialize;

use crate::error::{OrbError, Result};

/// Largest accepted output width or height (pixels)
const MAX_OUTPUT_DIMENSION: u32 = 16384;

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width (pixels)
    pub width: u32,

    /// Output height (pixels)
    pub height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,

    /// Clear colour (`#rrggbb`)
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov_degrees: 60.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            background: "#050008".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(OrbError::InvalidConfig(format!(
                "output size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_OUTPUT_DIMENSION || self.height > MAX_OUTPUT_DIMENSION {
            return Err(OrbError::InvalidConfig(format!(
                "output size {}x{} exceeds {} pixels per side",
                self.width, self.height, MAX_OUTPUT_DIMENSION
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(OrbError::InvalidConfig(format!(
                "field of view must be in (0, 180) degrees, got {}",
                self.fov_degrees
            )));
        }
        if !(self.near_plane > 0.0 && self.near_plane < self.far_plane) {
            return Err(OrbError::InvalidConfig(format!(
                "clip planes must satisfy 0 < near < far, got {} / {}",
                self.near_plane, self.far_plane
            )));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames and audio
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32, output_dir: impl Into<String>, fps: u32) -> Self {
        Self {
            duration_secs,
            output_dir: output_dir.into(),
            fps,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Seconds between two captured frames
    pub fn frame_interval_s(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Path of one numbered frame
    pub fn frame_path(&self, index: usize) -> String {
        format!("{}/frame_{:05}.png", self.frames_dir(), index)
    }

    /// Audio file path
    pub fn audio_path(&self) -> String {
        format!("{}/audio.wav", self.output_dir)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(OrbError::InvalidConfig("fps must be > 0".to_string()));
        }
        if !(self.duration_secs > 0.0 && self.duration_secs.is_finite()) {
            return Err(OrbError::InvalidConfig(format!(
                "recording duration must be positive, got {}",
                self.duration_secs
            )));
        }
        Ok(())
    }
}
