//! Instance buffer layout definitions
//!
//! Defines the per-instance record read by the culling kernel.

use crate::constants::buffer_layouts::INSTANCE_RECORD_SIZE;
use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, Vector3};

/// Per-instance data consumed by the culling kernel
/// Total size: 80 bytes
///
/// Memory layout:
/// - Offset 0-63: Model matrix, column-major (column 3 = translation)
/// - Offset 64-67: Texture/material index
/// - Offset 68-71: Total instance count (same value in every record)
/// - Offset 72-79: Padding
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    /// Model matrix (world transform)
    pub model_matrix: [[f32; 4]; 4],

    pub texture_index: u32,

    /// Denormalised instance count. The kernel only reads record 0's copy.
    pub total_instances: u32,

    pub _padding: [f32; 2],
}

impl InstanceRecord {
    /// Create a record from a full transform. `total_instances` is stamped later.
    pub fn from_matrix(model_matrix: Matrix4<f32>, texture_index: u32) -> Self {
        Self {
            model_matrix: model_matrix.into(),
            texture_index,
            total_instances: 0,
            _padding: [0.0; 2],
        }
    }

    /// Create a record with position and uniform scale
    pub fn new(position: Vector3<f32>, scale: f32, texture_index: u32) -> Self {
        Self::from_matrix(
            Matrix4::from_translation(position) * Matrix4::from_scale(scale),
            texture_index,
        )
    }

    /// Record placed in an otherwise empty buffer so `instances[0]` stays readable
    pub fn sentinel() -> Self {
        Self::zeroed()
    }

    /// World-space center: translation column of the model matrix
    #[inline]
    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(
            self.model_matrix[3][0],
            self.model_matrix[3][1],
            self.model_matrix[3][2],
        )
    }
}

/// Instance buffer layout information
pub struct InstanceBufferLayout;

impl InstanceBufferLayout {
    /// Size of a buffer holding `capacity` records. Never zero.
    #[inline]
    pub fn buffer_size(capacity: u32) -> u64 {
        capacity.max(1) as u64 * INSTANCE_RECORD_SIZE
    }

    /// Byte offset of record `index`
    #[inline]
    pub fn record_offset(index: u32) -> u64 {
        index as u64 * INSTANCE_RECORD_SIZE
    }
}
