//! High-level orb system: runs deformation and shading over the meshes.

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::mesh::OrbMesh;
use super::shade::{shade, shade_halo};
use super::{deform, ShadedVertex, ShadingParameters};
use crate::params::OrbGeometry;

/// Rigid motion of the orb driven by the frame loop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbTransform {
    /// Accumulated rotation about X (radians)
    pub rotation_x: f32,
    /// Accumulated rotation about Y (radians)
    pub rotation_y: f32,
    /// Uniform scale, eased toward the bass target
    pub scale: f32,
}

impl Default for OrbTransform {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbTransform {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation_x, self.rotation_y, 0.0)
    }

    /// Local-to-world matrix
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation(), Vec3::ZERO)
    }
}

/// Orb and halo meshes plus the per-frame evaluation over them
pub struct OrbSystem {
    orb: OrbMesh,
    halo: OrbMesh,
}

impl OrbSystem {
    /// Build both meshes; `geometry` must already be validated
    pub fn new(geometry: &OrbGeometry) -> Self {
        let orb = OrbMesh::icosphere(geometry.radius, geometry.subdivisions);
        let halo = OrbMesh::icosphere(
            geometry.radius * geometry.halo_scale,
            geometry.halo_subdivisions,
        );

        log::info!(
            "Orb mesh: {} vertices, {} triangles (halo {} vertices)",
            orb.vertex_count(),
            orb.triangle_count(),
            halo.vertex_count()
        );

        Self { orb, halo }
    }

    pub fn orb_mesh(&self) -> &OrbMesh {
        &self.orb
    }

    pub fn halo_mesh(&self) -> &OrbMesh {
        &self.halo
    }

    /// Deform and shade every orb point into world space
    ///
    /// `out` is resized to the mesh's vertex count and fully overwritten.
    pub fn evaluate(
        &self,
        params: &ShadingParameters,
        transform: &OrbTransform,
        camera_pos: Vec3,
        out: &mut Vec<ShadedVertex>,
    ) {
        let model = transform.model_matrix();
        let rotation = transform.rotation();

        out.clear();
        out.extend(self.orb.points.iter().map(|point| {
            let deformed = deform(point, params);

            let world_position = model.transform_point3(deformed.position);
            let world_normal = rotation * point.normal;
            let view_dir = camera_pos - world_position;

            let shaded = shade(
                point.position,
                world_normal,
                view_dir,
                deformed.elevation,
                params,
            );

            ShadedVertex {
                position: world_position.to_array(),
                normal: world_normal.to_array(),
                color: shaded.to_array(),
            }
        }));
    }

    /// Shade the halo shell into world space (no deformation)
    pub fn evaluate_halo(
        &self,
        params: &ShadingParameters,
        transform: &OrbTransform,
        camera_pos: Vec3,
        out: &mut Vec<ShadedVertex>,
    ) {
        let model = transform.model_matrix();
        let rotation = transform.rotation();

        out.clear();
        out.extend(self.halo.points.iter().map(|point| {
            let world_position = model.transform_point3(point.position);
            let world_normal = rotation * point.normal;
            let shaded = shade_halo(world_normal, camera_pos - world_position, params);

            ShadedVertex {
                position: world_position.to_array(),
                normal: world_normal.to_array(),
                color: shaded.to_array(),
            }
        }));
    }
}
