//! Indirect command buffer layout definitions
//!
//! The culling kernel writes its visible counter straight into the
//! `instance_count` field of an indexed indirect draw, so the buffer can be
//! handed to `draw_indexed_indirect` without a CPU round trip.

use crate::constants::buffer_layouts::*;
use bytemuck::{Pod, Zeroable};

/// GPU indirect draw indexed command structure
/// Matches wgpu's DrawIndexedIndirect command layout exactly
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct IndirectDrawIndexedCommand {
    /// Number of indices to draw
    pub index_count: u32,

    /// Number of instances to draw. Used as the atomic visible counter.
    pub instance_count: u32,

    /// Offset into the index buffer
    pub first_index: u32,

    /// Value added to each index before fetching vertex
    pub base_vertex: i32,

    /// Offset into the instance buffer
    pub first_instance: u32,
}

/// Indirect args as seen by the culling kernel
pub type IndirectArgs = IndirectDrawIndexedCommand;

impl IndirectDrawIndexedCommand {
    /// Create a new indexed draw command
    pub fn new(index_count: u32, instance_count: u32) -> Self {
        Self {
            index_count,
            instance_count,
            first_index: 0,
            base_vertex: 0,
            first_instance: 0,
        }
    }

    /// Value the host writes before every dispatch: counter zeroed, index count kept
    pub fn reset(index_count: u32) -> Self {
        Self::new(index_count, 0)
    }

    /// Visible instance count after the kernel has run
    #[inline]
    pub fn visible_count(&self) -> u32 {
        self.instance_count
    }
}

/// Command buffer layout information
pub struct CommandBufferLayout;

impl CommandBufferLayout {
    /// Size of the indirect args buffer
    #[inline]
    pub fn args_buffer_size() -> u64 {
        INDIRECT_INDEXED_COMMAND_SIZE
    }

    /// Size of a visible index buffer holding `capacity` entries
    #[inline]
    pub fn visible_index_buffer_size(capacity: u32) -> u64 {
        capacity.max(1) as u64 * VISIBLE_INDEX_SIZE
    }

    /// Byte range of the visible counter
    #[inline]
    pub fn visible_count_range() -> std::ops::Range<u64> {
        VISIBLE_COUNT_OFFSET..VISIBLE_COUNT_OFFSET + 4
    }
}
