//! Noise generation for orb deformation.
//!
//! 3D simplex gradient noise with a mod-289 permutation polynomial, the same
//! construction GPU shaders use, so a shader port of the orb produces the
//! same surface as the CPU path. Pure and deterministic: no seed, no state.

use glam::{Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + 1.0) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - r * 0.853_734_7
}

/// GLSL `step(edge, x)`: 1.0 where `x >= edge`, else 0.0
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmpge(edge), Vec3::ONE, Vec3::ZERO)
}

fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmpge(edge), Vec4::ONE, Vec4::ZERO)
}

/// Sample 3D simplex noise at `v`
///
/// Returns a value in approximately [-1, 1]. Continuous everywhere and
/// finite for every finite input.
pub fn simplex3(v: Vec3) -> f32 {
    const C_X: f32 = 1.0 / 6.0;
    const C_Y: f32 = 1.0 / 3.0;

    // Skew into simplex space and find the first corner
    let i = (v + Vec3::splat(v.element_sum() * C_Y)).floor();
    let x0 = v - i + Vec3::splat(i.element_sum() * C_X);

    // Remaining corners, ordered by the magnitude of x0's components
    let g = step3(x0.yzx(), x0);
    let l = Vec3::ONE - g;
    let i1 = g.min(l.zxy());
    let i2 = g.max(l.zxy());

    let x1 = x0 - i1 + C_X;
    let x2 = x0 - i2 + C_Y;
    let x3 = x0 - 0.5;

    // Hash the four corners
    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients: 7x7 points over a square, mapped onto an octahedron
    let n = 1.0 / 7.0;
    let ns = Vec3::new(2.0 * n, 0.5 * n - 1.0, n);

    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + ns.y;
    let y = y_ * ns.x + ns.y;
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
    let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    let norm = taylor_inv_sqrt(Vec4::new(
        p0.length_squared(),
        p1.length_squared(),
        p2.length_squared(),
        p3.length_squared(),
    ));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // Radial falloff and corner contributions
    let m = (Vec4::splat(0.6)
        - Vec4::new(
            x0.length_squared(),
            x1.length_squared(),
            x2.length_squared(),
            x3.length_squared(),
        ))
    .max(Vec4::ZERO);
    let m = m * m;

    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> impl Iterator<Item = Vec3> {
        (0..12).flat_map(|x| {
            (0..12).flat_map(move |y| {
                (0..6).map(move |z| {
                    Vec3::new(x as f32 * 0.37 - 2.0, y as f32 * 0.41 - 2.5, z as f32 * 1.3)
                })
            })
        })
    }

    #[test]
    fn test_noise_is_deterministic() {
        let p = Vec3::new(1.25, -0.5, 3.75);
        let first = simplex3(p);
        for _ in 0..10 {
            assert_eq!(simplex3(p), first);
        }
    }

    #[test]
    fn test_noise_range() {
        for p in sample_grid() {
            let n = simplex3(p);
            assert!(n.is_finite());
            assert!(n.abs() <= 1.05, "noise {} out of range at {:?}", n, p);
        }
    }

    #[test]
    fn test_noise_is_not_constant() {
        let values: Vec<f32> = sample_grid().map(simplex3).collect();
        let min = values.iter().cloned().fold(f32::MAX, f32::min);
        let max = values.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.5, "noise range too narrow: {}..{}", min, max);
    }

    #[test]
    fn test_noise_is_continuous() {
        let step = Vec3::splat(1e-3);
        for p in sample_grid() {
            let delta = (simplex3(p + step) - simplex3(p)).abs();
            assert!(delta < 0.05, "jump of {} at {:?}", delta, p);
        }
    }

    #[test]
    fn test_noise_finite_for_large_inputs() {
        for p in [
            Vec3::new(1.0e6, -2.0e6, 3.0e5),
            Vec3::new(-12345.678, 0.0, 98765.4),
            Vec3::ZERO,
        ] {
            assert!(simplex3(p).is_finite());
        }
    }
}
