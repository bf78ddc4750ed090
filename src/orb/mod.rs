//! The reactive orb: mesh, procedural deformation and shading.
//!
//! Deformation and shading are pure functions of a surface point and one
//! frame's [`ShadingParameters`]; [`OrbSystem`] runs them over the mesh.

mod deform;
mod mesh;
mod shade;
mod system;

// Re-export public types
pub use deform::{deform, displacement_intensity, elevation, time_rate, Deformation};
pub use mesh::OrbMesh;
pub use shade::{
    blend_palette, brightness, flow_scalars, fresnel, mix, pulse, shade, shade_halo, smoothstep,
    white_mix, Shade,
};
pub use system::{OrbSystem, OrbTransform};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::audio::SpectralFrame;
use crate::error::Result;
use crate::params::{parse_hex_color, PaletteConfig};

/// Static mesh vertex: undeformed position and unit normal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// The five orb colours, in blend order
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub deep: Vec3,
    pub purple: Vec3,
    pub magenta: Vec3,
    pub cyan: Vec3,
    pub white: Vec3,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            deep: rgb([0x1a, 0x00, 0x66]),
            purple: rgb([0x66, 0x00, 0xcc]),
            magenta: rgb([0xcc, 0x00, 0xff]),
            cyan: rgb([0x00, 0xcc, 0xff]),
            white: rgb([0xff, 0xff, 0xff]),
        }
    }
}

impl Palette {
    pub fn from_config(config: &PaletteConfig) -> Result<Self> {
        Ok(Self {
            deep: rgb(parse_hex_color(&config.deep)?),
            purple: rgb(parse_hex_color(&config.purple)?),
            magenta: rgb(parse_hex_color(&config.magenta)?),
            cyan: rgb(parse_hex_color(&config.cyan)?),
            white: rgb(parse_hex_color(&config.white)?),
        })
    }

    pub fn colors(&self) -> [Vec3; 5] {
        [self.deep, self.purple, self.magenta, self.cyan, self.white]
    }
}

/// Byte colour to linear [0, 1] components
pub fn rgb(bytes: [u8; 3]) -> Vec3 {
    Vec3::new(bytes[0] as f32, bytes[1] as f32, bytes[2] as f32) / 255.0
}

fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Everything the deformation and shading functions read for one frame
///
/// Built fresh each tick and never mutated; band levels are clamped to
/// [0, 1] on construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingParameters {
    elapsed_time_s: f32,
    bass: f32,
    mid: f32,
    treble: f32,
    palette: Palette,
}

impl ShadingParameters {
    pub fn new(elapsed_time_s: f32, bass: f32, mid: f32, treble: f32, palette: Palette) -> Self {
        Self {
            elapsed_time_s: if elapsed_time_s.is_finite() {
                elapsed_time_s
            } else {
                0.0
            },
            bass: unit(bass),
            mid: unit(mid),
            treble: unit(treble),
            palette,
        }
    }

    pub fn from_spectral(elapsed_time_s: f32, frame: &SpectralFrame, palette: Palette) -> Self {
        Self::new(elapsed_time_s, frame.bass, frame.mid, frame.treble, palette)
    }

    pub fn time(&self) -> f32 {
        self.elapsed_time_s
    }

    pub fn bass(&self) -> f32 {
        self.bass
    }

    pub fn mid(&self) -> f32 {
        self.mid
    }

    pub fn treble(&self) -> f32 {
        self.treble
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Flatten into a GPU uniform block
    pub fn uniforms(&self) -> OrbUniforms {
        let colors = self.palette.colors().map(|c| c.extend(1.0).to_array());
        OrbUniforms {
            time: self.elapsed_time_s,
            bass: self.bass,
            mid: self.mid,
            treble: self.treble,
            colors,
        }
    }
}

/// Uniform buffer for an orb shader (time, bands, palette)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OrbUniforms {
    pub time: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    /// deep, purple, magenta, cyan, white (alpha unused)
    pub colors: [[f32; 4]; 5],
}

/// Per-point output handed to the renderer (world space)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ShadedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}
