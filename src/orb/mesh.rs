//! Icosphere mesh generation.

use std::collections::HashMap;

use glam::Vec3;

use super::SurfacePoint;

/// Indexed sphere mesh; every point's normal is its unit direction
pub struct OrbMesh {
    pub points: Vec<SurfacePoint>,
    /// Counter-clockwise (outward-facing) triangles
    pub indices: Vec<u32>,
}

impl OrbMesh {
    /// Subdivided icosahedron of the given radius
    ///
    /// Level `n` has `10 * 4^n + 2` vertices and `20 * 4^n` triangles.
    pub fn icosphere(radius: f32, subdivisions: u32) -> Self {
        let t = (1.0 + 5.0f32.sqrt()) / 2.0;

        let mut directions: Vec<Vec3> = [
            [-1.0, t, 0.0],
            [1.0, t, 0.0],
            [-1.0, -t, 0.0],
            [1.0, -t, 0.0],
            [0.0, -1.0, t],
            [0.0, 1.0, t],
            [0.0, -1.0, -t],
            [0.0, 1.0, -t],
            [t, 0.0, -1.0],
            [t, 0.0, 1.0],
            [-t, 0.0, -1.0],
            [-t, 0.0, 1.0],
        ]
        .iter()
        .map(|&p| Vec3::from_array(p).normalize())
        .collect();

        let mut indices: Vec<u32> = vec![
            0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, //
            1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8, //
            3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, //
            4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut next = Vec::with_capacity(indices.len() * 4);

            for tri in indices.chunks_exact(3) {
                let (a, b, c) = (tri[0], tri[1], tri[2]);
                let ab = midpoint(&mut directions, &mut midpoints, a, b);
                let bc = midpoint(&mut directions, &mut midpoints, b, c);
                let ca = midpoint(&mut directions, &mut midpoints, c, a);

                next.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
            }

            indices = next;
        }

        let points = directions
            .into_iter()
            .map(|normal| SurfacePoint {
                position: normal * radius,
                normal,
            })
            .collect();

        Self { points, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Index of the unit-sphere midpoint of edge `a`-`b`, shared between both faces
fn midpoint(
    directions: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = (a.min(b), a.max(b));
    *cache.entry(key).or_insert_with(|| {
        let mid = (directions[a as usize] + directions[b as usize]).normalize();
        directions.push(mid);
        (directions.len() - 1) as u32
    })
}
