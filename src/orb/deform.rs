//! Layered-noise displacement along the surface normal.

use glam::Vec3;

use super::{ShadingParameters, SurfacePoint};
use crate::noise::simplex3;

/// Base noise time rate, and how much bass speeds it up
const BASE_RATE: f32 = 0.15;
const BASS_RATE: f32 = 0.1;

/// (spatial scale, weight) of the three noise layers
const LAYER_1: (f32, f32) = (0.8, 0.5);
const LAYER_2: (f32, f32) = (1.2, 0.3);
const LAYER_3: (f32, f32) = (0.5, 0.2);

/// Layer 2 scrolls backwards at this fraction of the rate
const LAYER_2_RATE: f32 = 0.6;

/// Layer 3 drifts at fixed per-axis speeds, independent of audio
const LAYER_3_DRIFT: Vec3 = Vec3::new(0.1, 0.0, 0.08);

const BASE_INTENSITY: f32 = 0.12;
const BASS_INTENSITY: f32 = 0.15;
const MID_INTENSITY: f32 = 0.08;

/// Deformed point plus the values the shading stage needs
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deformation {
    /// Displaced local position
    pub position: Vec3,
    /// Signed offset along the normal
    pub displacement: f32,
    /// Combined noise before intensity scaling, roughly [-1, 1]
    pub elevation: f32,
}

/// Noise animation rate for the given bass level
pub fn time_rate(bass: f32) -> f32 {
    BASE_RATE + bass * BASS_RATE
}

/// Displacement amplitude for the given bass and mid levels
pub fn displacement_intensity(bass: f32, mid: f32) -> f32 {
    BASE_INTENSITY + bass * BASS_INTENSITY + mid * MID_INTENSITY
}

/// Weighted sum of the three noise layers at `position` and time `t`
pub fn elevation(position: Vec3, t: f32, bass: f32) -> f32 {
    let rate = time_rate(bass);

    let noise1 = simplex3(position * LAYER_1.0 + t * rate);
    let noise2 = simplex3(position * LAYER_2.0 - t * rate * LAYER_2_RATE);
    let noise3 = simplex3(position * LAYER_3.0 + LAYER_3_DRIFT * t);

    noise1 * LAYER_1.1 + noise2 * LAYER_2.1 + noise3 * LAYER_3.1
}

/// Push `point` along its normal by the audio-scaled noise
pub fn deform(point: &SurfacePoint, params: &ShadingParameters) -> Deformation {
    let elevation = elevation(point.position, params.time(), params.bass());
    let displacement = elevation * displacement_intensity(params.bass(), params.mid());

    Deformation {
        position: point.position + point.normal * displacement,
        displacement,
        elevation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orb::Palette;

    fn point() -> SurfacePoint {
        let normal = Vec3::new(0.3, 0.8, -0.52).normalize();
        SurfacePoint {
            position: normal * 2.8,
            normal,
        }
    }

    fn params(time: f32, bass: f32, mid: f32) -> ShadingParameters {
        ShadingParameters::new(time, bass, mid, 0.0, Palette::default())
    }

    #[test]
    fn test_rate_and_intensity() {
        assert_eq!(time_rate(0.0), 0.15);
        assert!((time_rate(1.0) - 0.25).abs() < 1e-6);

        assert_eq!(displacement_intensity(0.0, 0.0), 0.12);
        assert!((displacement_intensity(1.0, 1.0) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_displacement_follows_normal() {
        let p = point();
        let d = deform(&p, &params(3.0, 0.4, 0.6));

        let offset = d.position - p.position;
        assert!((offset - p.normal * d.displacement).length() < 1e-6);
        assert!(
            (d.displacement - d.elevation * displacement_intensity(0.4, 0.6)).abs() < 1e-6
        );
    }

    #[test]
    fn test_silence_uses_base_intensity() {
        let p = point();
        let d = deform(&p, &params(7.5, 0.0, 0.0));

        assert!((d.displacement - d.elevation * 0.12).abs() < 1e-6);
        assert_eq!(d.elevation, elevation(p.position, 7.5, 0.0));
    }

    #[test]
    fn test_deformation_is_deterministic() {
        let p = point();
        let a = deform(&p, &params(12.25, 0.7, 0.2));
        let b = deform(&p, &params(12.25, 0.7, 0.2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_elevation_stays_bounded() {
        // Weights sum to 1, so |elevation| is bounded by the noise range
        for i in 0..200 {
            let t = i as f32 * 0.37;
            let dir = Vec3::new((t * 1.3).sin(), (t * 0.7).cos(), (t * 2.1).sin()).normalize_or_zero();
            let e = elevation(dir * 2.8, t, (i % 10) as f32 / 10.0);
            assert!(e.is_finite());
            assert!(e.abs() <= 1.05);
        }
    }

    #[test]
    fn test_bass_changes_the_surface() {
        let p = point();
        let quiet = deform(&p, &params(20.0, 0.0, 0.0));
        let loud = deform(&p, &params(20.0, 1.0, 0.0));
        assert_ne!(quiet.position, loud.position);
    }
}
