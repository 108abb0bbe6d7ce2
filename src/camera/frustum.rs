//! View frustum and the visibility predicate
//!
//! Planes are stored as (nx, ny, nz, d) with `n·p + d >= 0` inside.

use crate::constants::culling::FRUSTUM_PLANE_COUNT;
use crate::gpu::CullingUniform;
use cgmath::{InnerSpace, Matrix, Matrix4, Vector3, Vector4};

/// Plane indices, same order as the culling uniform
pub mod planes {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [Vector4<f32>; FRUSTUM_PLANE_COUNT],
}

impl Frustum {
    /// Extract planes from a clip matrix (`projection * view`).
    ///
    /// Uses the OpenGL clip depth range [-w, w], which is what
    /// `cgmath::perspective` and `cgmath::ortho` produce.
    pub fn from_view_projection(view_proj: &Matrix4<f32>) -> Self {
        // cgmath stores columns, the extraction works on rows
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let length = plane.truncate().magnitude();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }

    /// Build from raw plane equations already in inside-positive form
    pub fn from_planes(raw: [[f32; 4]; FRUSTUM_PLANE_COUNT]) -> Self {
        Self {
            planes: raw.map(Vector4::from),
        }
    }

    pub fn to_raw(&self) -> [[f32; 4]; FRUSTUM_PLANE_COUNT] {
        self.planes.map(Into::into)
    }

    /// Uniform block for the GPU kernel
    pub fn to_uniform(&self, box_half_extent: f32) -> CullingUniform {
        CullingUniform::new(self.to_raw(), box_half_extent)
    }

    pub fn is_finite(&self) -> bool {
        self.planes
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite() && p.w.is_finite())
    }

    /// Conservative AABB test against all six planes.
    ///
    /// The box is axis-aligned in world space with the same half-extent on
    /// every axis, so its projected radius on a plane is
    /// `half_extent * (|nx| + |ny| + |nz|)`. Rejects only when the box lies
    /// strictly outside some plane; touching the boundary counts as visible.
    #[inline]
    pub fn intersects_aabb(&self, center: Vector3<f32>, half_extent: f32) -> bool {
        for plane in &self.planes {
            let distance = plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w;
            let radius = half_extent * (plane.x.abs() + plane.y.abs() + plane.z.abs());

            if distance + radius < 0.0 {
                return false;
            }
        }
        true
    }

    /// Signed distance from `point` to plane `index`
    #[inline]
    pub fn signed_distance(&self, index: usize, point: Vector3<f32>) -> f32 {
        let plane = self.planes[index];
        plane.truncate().dot(point) + plane.w
    }
}
