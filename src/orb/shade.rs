//! Colour and alpha for a deformed orb point.

use glam::Vec3;

use super::{Palette, ShadingParameters};

const FRESNEL_POWER: f32 = 2.5;
const HALO_RIM_POWER: f32 = 3.0;

/// Maximum blend weight of each colour over the previous result
const PURPLE_WEIGHT: f32 = 0.7;
const MAGENTA_WEIGHT: f32 = 0.5;
const CYAN_WEIGHT: f32 = 0.3;

const WHITE_MIX_MAX: f32 = 0.7;

/// Final colour (may exceed 1.0 for bloom-style highlights) and opacity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shade {
    pub color: Vec3,
    pub alpha: f32,
}

impl Shade {
    pub fn to_array(self) -> [f32; 4] {
        self.color.extend(self.alpha).to_array()
    }
}

/// GLSL `mix`: `a + (b - a) * t`
pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// GLSL `smoothstep`
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rim term: 0 facing the viewer, 1 at grazing angles
pub fn fresnel(view_dir: Vec3, normal: Vec3) -> f32 {
    rim(view_dir, normal).powf(FRESNEL_POWER)
}

fn rim(view_dir: Vec3, normal: Vec3) -> f32 {
    let facing = view_dir.normalize_or_zero().dot(normal.normalize_or_zero());
    (1.0 - facing.abs()).clamp(0.0, 1.0)
}

/// Three slow colour-flow fields in [0, 1] over the unit sphere
pub fn flow_scalars(local_position: Vec3, t: f32) -> [f32; 3] {
    let n = local_position.normalize_or_zero();
    [
        (n.x * 2.0 + n.y * 1.5 + t * 0.2).sin() * 0.5 + 0.5,
        (n.y * 2.0 + n.z * 1.5 + t * 0.15).cos() * 0.5 + 0.5,
        (n.z * 2.0 + n.x * 1.5 + t * 0.18).sin() * 0.5 + 0.5,
    ]
}

/// Blend deep -> purple -> magenta -> cyan, each step over the previous result
pub fn blend_palette(palette: &Palette, flows: [f32; 3]) -> Vec3 {
    let [flow1, flow2, flow3] = flows.map(|f| f.clamp(0.0, 1.0));

    let color = palette.deep;
    let color = mix(color, palette.purple, flow1 * PURPLE_WEIGHT);
    let color = mix(color, palette.magenta, flow2 * MAGENTA_WEIGHT);
    mix(color, palette.cyan, flow3 * CYAN_WEIGHT)
}

/// How far to pull towards white: ridges, rims and bass hits
pub fn white_mix(elevation: f32, fresnel: f32, bass: f32) -> f32 {
    (smoothstep(0.3, 0.8, elevation) * 0.4 + fresnel * 0.5 + bass * 0.2).clamp(0.0, WHITE_MIX_MAX)
}

pub fn brightness(elevation: f32, fresnel: f32, bass: f32, treble: f32) -> f32 {
    0.6 + elevation * 0.3 + fresnel * 0.4 + bass * 0.3 + treble * 0.15
}

/// Slow global breathing, 0.9..1.0
pub fn pulse(t: f32) -> f32 {
    (t * 0.5).sin() * 0.05 + 0.95
}

/// Shade one orb point
///
/// `local_position` is the undeformed mesh position (drives the colour
/// flow); `normal` and `view_dir` must share a space (drive the rim).
pub fn shade(
    local_position: Vec3,
    normal: Vec3,
    view_dir: Vec3,
    elevation: f32,
    params: &ShadingParameters,
) -> Shade {
    let palette = params.palette();
    let t = params.time();
    let fresnel = fresnel(view_dir, normal);

    let color = blend_palette(palette, flow_scalars(local_position, t));
    let color = mix(
        color,
        palette.white,
        white_mix(elevation, fresnel, params.bass()),
    );

    let brightness = brightness(elevation, fresnel, params.bass(), params.treble());

    Shade {
        color: color * brightness * pulse(t),
        alpha: 0.85 + fresnel * 0.15,
    }
}

/// Shade one point of the halo shell (drawn additively behind the orb)
pub fn shade_halo(normal: Vec3, view_dir: Vec3, params: &ShadingParameters) -> Shade {
    let palette = params.palette();
    let rim = rim(view_dir, normal).powf(HALO_RIM_POWER);
    let color_mix = (params.time() * 0.3).sin() * 0.5 + 0.5;
    let intensity = 0.3 + params.bass() * 0.4;

    Shade {
        color: mix(palette.purple, palette.magenta, color_mix) * intensity,
        alpha: rim * 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_palette() -> Palette {
        Palette {
            deep: Vec3::new(0.1, 0.0, 0.4),
            purple: Vec3::new(0.4, 0.0, 0.8),
            ..Palette::default()
        }
    }

    #[test]
    fn test_first_blend_step_is_exact() {
        let palette = spec_palette();
        let color = blend_palette(&palette, [1.0, 0.0, 0.0]);

        let expected = palette.deep + (palette.purple - palette.deep) * 0.7;
        assert_eq!(color, expected);
    }

    #[test]
    fn test_blend_is_sequential_not_weighted_average() {
        let palette = spec_palette();
        let color = blend_palette(&palette, [1.0, 1.0, 1.0]);

        let mut expected = palette.deep + (palette.purple - palette.deep) * 0.7;
        expected = expected + (palette.magenta - expected) * 0.5;
        expected = expected + (palette.cyan - expected) * 0.3;
        assert!((color - expected).abs().max_element() < 1e-6);

        let weights = [1.0, 0.7, 0.5, 0.3];
        let colors = [palette.deep, palette.purple, palette.magenta, palette.cyan];
        let average = colors
            .iter()
            .zip(weights)
            .fold(Vec3::ZERO, |acc, (c, w)| acc + *c * w)
            / weights.iter().sum::<f32>();
        assert!((color - average).abs().max_element() > 1e-3);
    }

    #[test]
    fn test_fresnel_extremes() {
        let normal = Vec3::Z;
        assert_eq!(fresnel(Vec3::Z, normal), 0.0);
        assert_eq!(fresnel(-Vec3::Z, normal), 0.0);
        assert!((fresnel(Vec3::X, normal) - 1.0).abs() < 1e-6);
        // Degenerate vectors give a full rim rather than NaN
        assert_eq!(fresnel(Vec3::ZERO, normal), 1.0);
    }

    #[test]
    fn test_flows_in_unit_range() {
        for i in 0..100 {
            let t = i as f32 * 1.7;
            let p = Vec3::new(t.sin(), (t * 0.3).cos(), (t * 1.1).sin()) * 3.0;
            for f in flow_scalars(p, t) {
                assert!((0.0..=1.0).contains(&f));
            }
        }
        assert!(flow_scalars(Vec3::ZERO, 0.0).iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.3, 0.8, 0.0), 0.0);
        assert_eq!(smoothstep(0.3, 0.8, 1.0), 1.0);
        assert!((smoothstep(0.3, 0.8, 0.55) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_white_mix_is_capped() {
        assert_eq!(white_mix(1.0, 1.0, 1.0), 0.7);
        assert_eq!(white_mix(0.0, 0.0, 0.0), 0.0);
        assert!((white_mix(0.0, 0.0, 0.5) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_silent_brightness_has_no_audio_terms() {
        let params = ShadingParameters::new(4.0, 0.0, 0.0, 0.0, Palette::default());
        let normal = Vec3::new(0.0, 0.6, 0.8);
        let view = Vec3::new(0.0, 0.0, 1.0);
        let elevation = 0.25;

        let shaded = shade(normal * 2.8, normal, view, elevation, &params);

        let f = fresnel(view, normal);
        let expected_brightness = 0.6 + elevation * 0.3 + f * 0.4;
        assert_eq!(brightness(elevation, f, 0.0, 0.0), expected_brightness);

        let base = blend_palette(params.palette(), flow_scalars(normal, 4.0));
        let white = mix(base, Vec3::ONE, white_mix(elevation, f, 0.0));
        let expected = white * expected_brightness * pulse(4.0);
        assert!((shaded.color - expected).abs().max_element() < 1e-6);
        assert!((shaded.alpha - (0.85 + f * 0.15)).abs() < 1e-6);
    }

    #[test]
    fn test_shading_is_pure() {
        let params = ShadingParameters::new(9.0, 0.3, 0.2, 0.9, Palette::default());
        let p = Vec3::new(1.0, 2.0, -0.5);
        let a = shade(p, p.normalize(), Vec3::Z, 0.4, &params);
        let b = shade(p, p.normalize(), Vec3::Z, 0.4, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_extreme_inputs_stay_finite() {
        let params = ShadingParameters::new(1.0e6, 1.0, 1.0, 1.0, Palette::default());
        let shaded = shade(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, 1.0e3, &params);
        assert!(shaded.color.is_finite());
        assert!(shaded.alpha.is_finite());
    }

    #[test]
    fn test_halo_rim() {
        let params = ShadingParameters::new(0.0, 0.0, 0.0, 0.0, Palette::default());

        let facing = shade_halo(Vec3::Z, Vec3::Z, &params);
        assert_eq!(facing.alpha, 0.0);

        let edge = shade_halo(Vec3::X, Vec3::Z, &params);
        assert!((edge.alpha - 0.5).abs() < 1e-6);

        // t = 0: halfway between purple and magenta, at intensity 0.3
        let expected = mix(params.palette().purple, params.palette().magenta, 0.5) * 0.3;
        assert!((edge.color - expected).abs().max_element() < 1e-6);
    }
}
