/// GPU Frustum Culling Implementation
///
/// Performs frustum culling entirely on GPU using a compute shader.
/// Visible instances are compacted into an index list and counted in the
/// `instance_count` field of an indexed indirect draw.

use super::{CullOutput, InstanceBuffer};
use crate::camera::Frustum;
use crate::config::CullingConfig;
use crate::constants::dispatch::workgroup_count;
use crate::error::{CullingError, CullingResult};
use crate::gpu::buffer_layouts::{
    bindings, calculations, layouts, usage, CommandBufferLayout, CullingUniform, IndirectArgs,
};
use crate::renderer::error::{buffer_mapping_error, gpu_operation_error};
use wgpu::{BindGroup, BindGroupLayout, Buffer, ComputePipeline, Device};

pub struct FrustumCuller {
    pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,

    // Buffers
    uniform_buffer: Buffer,
    args_buffer: Buffer,
    visible_indices_buffer: Buffer,
    args_readback: Buffer,
    indices_readback: Buffer,

    capacity: u32,
    index_count: u32,
    box_half_extent: f32,
}

impl FrustumCuller {
    pub fn new(device: &Device, config: &CullingConfig) -> CullingResult<Self> {
        config.validate()?;
        let capacity = config.max_instances;

        let max_workgroups = device.limits().max_compute_workgroups_per_dimension;
        if workgroup_count(capacity) > max_workgroups {
            return Err(CullingError::InvalidConfig {
                field: "max_instances",
                reason: format!(
                    "{} instances need {} workgroups, device allows {}",
                    capacity,
                    workgroup_count(capacity),
                    max_workgroups
                ),
            });
        }

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Frustum Cull Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("frustum_cull.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frustum Cull Bind Group Layout"),
            entries: &[
                layouts::uniform_buffer_entry(
                    bindings::culling::CULLING_UNIFORM,
                    wgpu::ShaderStages::COMPUTE,
                ),
                layouts::storage_buffer_entry(
                    bindings::culling::INSTANCES,
                    true,
                    wgpu::ShaderStages::COMPUTE,
                ),
                layouts::storage_buffer_entry(
                    bindings::culling::INDIRECT_ARGS,
                    false,
                    wgpu::ShaderStages::COMPUTE,
                ),
                layouts::storage_buffer_entry(
                    bindings::culling::VISIBLE_INDICES,
                    false,
                    wgpu::ShaderStages::COMPUTE,
                ),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Frustum Cull Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Frustum Cull Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "cull_instances",
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Culling Uniform Buffer"),
            size: std::mem::size_of::<CullingUniform>() as u64,
            usage: usage::UNIFORM,
            mapped_at_creation: false,
        });

        let args_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Culling Indirect Args Buffer"),
            size: CommandBufferLayout::args_buffer_size(),
            usage: usage::INDIRECT_ARGS,
            mapped_at_creation: false,
        });

        let visible_indices_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Visible Indices Buffer"),
            size: CommandBufferLayout::visible_index_buffer_size(capacity),
            usage: usage::VISIBLE_INDICES,
            mapped_at_creation: false,
        });

        let args_readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Culling Args Readback"),
            size: CommandBufferLayout::args_buffer_size(),
            usage: usage::READBACK,
            mapped_at_creation: false,
        });

        let indices_readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Visible Indices Readback"),
            size: calculations::readback_size(capacity),
            usage: usage::READBACK,
            mapped_at_creation: false,
        });

        log::info!(
            "[FrustumCuller] Created culling pipeline for up to {} instances (half extent {})",
            capacity,
            config.box_half_extent
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            args_buffer,
            visible_indices_buffer,
            args_readback,
            indices_readback,
            capacity,
            index_count: config.index_count_per_instance,
            box_half_extent: config.box_half_extent,
        })
    }

    /// Upload this frame's planes. Must not be called while a dispatch reads them.
    pub fn update_frustum(&self, queue: &wgpu::Queue, frustum: &Frustum) -> CullingResult<()> {
        if !frustum.is_finite() {
            return Err(CullingError::InvalidFrustum);
        }
        let uniform = frustum.to_uniform(self.box_half_extent);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
        Ok(())
    }

    /// Zero the visible counter. The kernel never resets it, so call this before every dispatch.
    pub fn reset_args(&self, queue: &wgpu::Queue) {
        let args = IndirectArgs::reset(self.index_count);
        queue.write_buffer(&self.args_buffer, 0, bytemuck::bytes_of(&args));
    }

    pub fn create_bind_group(&self, device: &Device, instances: &InstanceBuffer) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frustum Cull Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: bindings::culling::CULLING_UNIFORM,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::culling::INSTANCES,
                    resource: instances.as_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::culling::INDIRECT_ARGS,
                    resource: self.args_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::culling::VISIBLE_INDICES,
                    resource: self.visible_indices_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Record the culling pass for the instances last uploaded to `instances`
    pub fn cull(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_group: &BindGroup,
        instances: &InstanceBuffer,
    ) -> CullingResult<()> {
        let instance_count = instances.count();
        if instance_count > self.capacity {
            return Err(CullingError::CapacityExceeded {
                requested: instance_count,
                capacity: self.capacity,
            });
        }

        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Frustum Culling Pass"),
            timestamp_writes: None,
        });

        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, bind_group, &[]);

        let workgroups = workgroup_count(instance_count);
        if workgroups > 0 {
            compute_pass.dispatch_workgroups(workgroups, 1, 1);
        }

        log::trace!(
            "[FrustumCuller] Dispatched {} workgroups for {} instances",
            workgroups,
            instance_count
        );
        Ok(())
    }

    /// Copy args and indices into the readback buffers
    pub fn copy_results(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_buffer_to_buffer(
            &self.args_buffer,
            0,
            &self.args_readback,
            0,
            CommandBufferLayout::args_buffer_size(),
        );
        encoder.copy_buffer_to_buffer(
            &self.visible_indices_buffer,
            0,
            &self.indices_readback,
            0,
            CommandBufferLayout::visible_index_buffer_size(self.capacity),
        );
    }

    /// Read back the results of the last `copy_results`
    pub async fn read_results(&self, device: &Device) -> CullingResult<CullOutput> {
        map_for_read(device, &self.args_readback, "Culling Args Readback").await?;
        let args: IndirectArgs = {
            let data = self.args_readback.slice(..).get_mapped_range();
            bytemuck::pod_read_unaligned(&data[..std::mem::size_of::<IndirectArgs>()])
        };
        self.args_readback.unmap();

        let mut visible = args.visible_count();
        if visible > self.capacity {
            log::warn!(
                "[FrustumCuller] Visible count {} exceeds capacity {}, was the counter reset?",
                visible,
                self.capacity
            );
            visible = self.capacity;
        }

        let visible_indices = if visible == 0 {
            Vec::new()
        } else {
            map_for_read(device, &self.indices_readback, "Visible Indices Readback").await?;
            let indices = {
                let data = self.indices_readback.slice(..).get_mapped_range();
                let words: &[u32] = bytemuck::cast_slice::<u8, u32>(&data);
                words[..visible as usize].to_vec()
            };
            self.indices_readback.unmap();
            indices
        };

        Ok(CullOutput {
            args,
            visible_indices,
        })
    }

    /// Args buffer for `draw_indexed_indirect`
    pub fn args_buffer(&self) -> &Buffer {
        &self.args_buffer
    }

    /// Compacted visible indices, bindable as an instance-rate vertex buffer
    pub fn visible_indices_buffer(&self) -> &Buffer {
        &self.visible_indices_buffer
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn box_half_extent(&self) -> f32 {
        self.box_half_extent
    }
}

async fn map_for_read(device: &Device, buffer: &Buffer, label: &str) -> CullingResult<()> {
    let buffer_slice = buffer.slice(..);
    let (sender, receiver) = futures::channel::oneshot::channel();

    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        if sender.send(result).is_err() {
            log::error!("[FrustumCuller] Failed to send map_async result - receiver dropped");
        }
    });

    device.poll(wgpu::Maintain::Wait);

    match receiver.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(gpu_operation_error("map_async", e)),
        Err(_) => Err(buffer_mapping_error(label)),
    }
}
