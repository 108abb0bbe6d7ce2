//! Culling uniform layout
//!
//! Frustum planes plus the global box half-extent, uploaded once per frame.

use crate::constants::culling::FRUSTUM_PLANE_COUNT;
use bytemuck::{Pod, Zeroable};

/// Uniform read by the culling kernel
/// Total size: 112 bytes
///
/// Memory layout:
/// - Offset 0-95: 6 plane equations (nx, ny, nz, d), inside is positive
/// - Offset 96-99: box half-extent
/// - Offset 100-111: padding to 16-byte alignment
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CullingUniform {
    /// Plane order: left, right, bottom, top, near, far
    pub frustum_planes: [[f32; 4]; FRUSTUM_PLANE_COUNT],

    /// Conservative half-extent of every instance box
    pub box_half_extent: f32,

    pub _padding0: f32,
    pub _padding1: f32,
    pub _padding2: f32,
}

impl CullingUniform {
    pub fn new(frustum_planes: [[f32; 4]; FRUSTUM_PLANE_COUNT], box_half_extent: f32) -> Self {
        Self {
            frustum_planes,
            box_half_extent,
            _padding0: 0.0,
            _padding1: 0.0,
            _padding2: 0.0,
        }
    }
}
