//! Centralized GPU buffer layout definitions
//!
//! This module provides a single source of truth for the buffer layouts,
//! sizes and binding indices shared by the culling shader and the host.

pub mod camera;
pub mod commands;
pub mod instance;


pub use camera::CullingUniform;
pub use commands::{CommandBufferLayout, IndirectArgs, IndirectDrawIndexedCommand};
pub use instance::{InstanceBufferLayout, InstanceRecord};

/// Buffer binding indices for consistency with `frustum_cull.wgsl`
pub mod bindings {
    /// Culling pipeline bindings (group 0)
    pub mod culling {
        pub const CULLING_UNIFORM: u32 = 0; // frustum planes + half extent
        pub const INSTANCES: u32 = 1; // instance records
        pub const INDIRECT_ARGS: u32 = 2; // args with atomic instance_count
        pub const VISIBLE_INDICES: u32 = 3; // compacted output
    }
}

/// Helper functions for buffer calculations
pub mod calculations {
    /// Align size to GPU requirements
    #[inline]
    pub fn align_buffer_size(size: u64, alignment: u64) -> u64 {
        (size + alignment - 1) & !(alignment - 1)
    }

    /// Size of a readback buffer for `count` visible indices
    #[inline]
    pub fn readback_size(count: u32) -> u64 {
        align_buffer_size(
            count.max(1) as u64 * crate::constants::buffer_layouts::VISIBLE_INDEX_SIZE,
            crate::constants::buffer_layouts::COPY_ALIGNMENT,
        )
    }
}

/// Buffer usage patterns
pub mod usage {
    use wgpu::BufferUsages;

    /// Standard storage buffer usage
    pub const STORAGE: BufferUsages = BufferUsages::STORAGE.union(BufferUsages::COPY_DST);

    /// Uniform buffer usage
    pub const UNIFORM: BufferUsages = BufferUsages::UNIFORM.union(BufferUsages::COPY_DST);

    /// Indirect args written by compute, consumed by draw, readable for stats
    pub const INDIRECT_ARGS: BufferUsages = BufferUsages::INDIRECT
        .union(BufferUsages::STORAGE)
        .union(BufferUsages::COPY_DST)
        .union(BufferUsages::COPY_SRC);

    /// Compacted index list, bindable as an instance-rate vertex buffer
    pub const VISIBLE_INDICES: BufferUsages = BufferUsages::STORAGE
        .union(BufferUsages::VERTEX)
        .union(BufferUsages::COPY_SRC);

    /// CPU readback staging
    pub const READBACK: BufferUsages = BufferUsages::MAP_READ.union(BufferUsages::COPY_DST);
}

/// Bind group layout descriptors
pub mod layouts {
    use wgpu::{BindGroupLayoutEntry, BindingType, BufferBindingType, ShaderStages};

    /// Create a storage buffer binding entry
    pub fn storage_buffer_entry(
        binding: u32,
        read_only: bool,
        visibility: ShaderStages,
    ) -> BindGroupLayoutEntry {
        BindGroupLayoutEntry {
            binding,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    /// Create a uniform buffer binding entry
    pub fn uniform_buffer_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
        BindGroupLayoutEntry {
            binding,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }
}
