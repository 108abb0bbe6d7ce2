// Instance Culling Constants - SINGLE SOURCE OF TRUTH
//
// This file contains the constants shared by the host code, the CPU kernel
// and the WGSL culling shader. The shader mirrors these values by hand, keep
// them in sync when changing anything here.

/// Dispatch constants
pub mod dispatch {
    /// Threads per workgroup along X. Fixed by `@workgroup_size(64, 1, 1)`.
    pub const WORKGROUP_SIZE: u32 = 64;

    /// Workgroups needed to cover `count` threads
    #[inline]
    pub const fn workgroup_count(count: u32) -> u32 {
        count.div_ceil(WORKGROUP_SIZE)
    }

    /// Threads actually launched for `count` threads (rounded up to a whole workgroup)
    #[inline]
    pub const fn dispatched_threads(count: u32) -> u32 {
        workgroup_count(count) * WORKGROUP_SIZE
    }
}

/// Culling constants
pub mod culling {
    /// Planes in a view frustum (left, right, bottom, top, near, far)
    pub const FRUSTUM_PLANE_COUNT: usize = 6;

    /// Conservative half-extent shared by every instance box.
    /// Equals `DEMO_INSTANCE_SCALE * 0.95`; not derived from per-instance scale.
    pub const DEFAULT_BOX_HALF_EXTENT: f32 = 0.475;

    /// Instance scale used by the ring demo scene
    pub const DEMO_INSTANCE_SCALE: f32 = 0.5;

    /// Indices in a 12-triangle cube
    pub const CUBE_INDEX_COUNT: u32 = 36;

    /// Default capacity of the instance and visible index buffers
    pub const DEFAULT_MAX_INSTANCES: u32 = 65_536;
}

/// GPU buffer layout sizes
pub mod buffer_layouts {
    /// `CullingUniform`: 6 planes + half extent + padding
    pub const CULLING_UNIFORM_SIZE: u64 = 112;

    /// `InstanceRecord`: mat4 + texture index + total count + padding
    pub const INSTANCE_RECORD_SIZE: u64 = 80;

    /// `IndirectDrawIndexedCommand` (wgpu DrawIndexedIndirect layout)
    pub const INDIRECT_INDEXED_COMMAND_SIZE: u64 = 20;

    /// Byte offset of `instance_count` inside the indirect args, doubles as the visible counter
    pub const VISIBLE_COUNT_OFFSET: u64 = 4;

    /// Size of one visible index entry
    pub const VISIBLE_INDEX_SIZE: u64 = 4;

    /// wgpu copy alignment
    pub const COPY_ALIGNMENT: u64 = 4;
}
