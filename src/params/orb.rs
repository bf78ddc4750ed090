//! Orb geometry, motion and palette parameters.

use serde::Deserialize;

use crate::error::{OrbError, Result};

/// Orb mesh parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbGeometry {
    /// Sphere radius (world units)
    pub radius: f32,

    /// Icosphere subdivision level (5 = 10,242 vertices)
    pub subdivisions: u32,

    /// Halo shell radius as a multiple of the orb radius
    pub halo_scale: f32,

    /// Halo shell subdivision level (coarser than the orb)
    pub halo_subdivisions: u32,
}

impl Default for OrbGeometry {
    fn default() -> Self {
        Self {
            radius: 2.8,
            subdivisions: 5,
            halo_scale: 1.15,
            halo_subdivisions: 3,
        }
    }
}

impl OrbGeometry {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(OrbError::InvalidConfig(format!(
                "orb radius must be positive, got {}",
                self.radius
            )));
        }
        // Level 8 is already 655k vertices
        if self.subdivisions > 7 || self.halo_subdivisions > 7 {
            return Err(OrbError::InvalidConfig(format!(
                "subdivision levels above 7 are not supported (orb {}, halo {})",
                self.subdivisions, self.halo_subdivisions
            )));
        }
        Ok(())
    }
}

/// Per-frame motion of the orb, applied by the frame driver
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbMotion {
    /// Rotation about X per playing frame (radians)
    pub rotation_rate_x: f32,

    /// Rotation about Y per playing frame (radians)
    pub rotation_rate_y: f32,

    /// Scale gain from bass: target scale = 1 + bass * this
    pub scale_response: f32,

    /// Exponential smoothing factor toward the target scale, per frame
    pub scale_smoothing: f32,
}

impl Default for OrbMotion {
    fn default() -> Self {
        Self {
            rotation_rate_x: 0.0005,
            rotation_rate_y: 0.001,
            scale_response: 0.1,
            scale_smoothing: 0.08,
        }
    }
}

impl OrbMotion {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.scale_smoothing) {
            return Err(OrbError::InvalidConfig(format!(
                "scale smoothing must be in [0, 1], got {}",
                self.scale_smoothing
            )));
        }
        Ok(())
    }
}

/// Five-colour palette as hex strings (`#rrggbb`), in blend order
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub deep: String,
    pub purple: String,
    pub magenta: String,
    pub cyan: String,
    pub white: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            deep: "#1a0066".to_string(),
            purple: "#6600cc".to_string(),
            magenta: "#cc00ff".to_string(),
            cyan: "#00ccff".to_string(),
            white: "#ffffff".to_string(),
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional) into bytes
pub fn parse_hex_color(text: &str) -> Result<[u8; 3]> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(OrbError::InvalidColor(text.to_string()));
    }

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| OrbError::InvalidColor(text.to_string()))?;
    }
    Ok(rgb)
}
