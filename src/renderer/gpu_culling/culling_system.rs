/// Culling front end
///
/// Runs the compute path when a GPU is present and falls back to the CPU
/// kernel otherwise. Both produce the same `CullOutput` so callers (and tests)
/// never care which one ran.

use super::{CpuCuller, CullOutput, CullingStats, FrustumCuller, InstanceBuffer, InstanceSet};
use crate::camera::Frustum;
use crate::config::{CullingBackend, CullingConfig};
use crate::error::{CullingError, CullingResult};
use crate::renderer::gpu_state::GpuState;

struct GpuCulling {
    gpu: GpuState,
    culler: FrustumCuller,
    instances: InstanceBuffer,
    bind_group: wgpu::BindGroup,
}

impl GpuCulling {
    fn new(gpu: GpuState, config: &CullingConfig) -> CullingResult<Self> {
        let culler = FrustumCuller::new(&gpu.device, config)?;
        let instances = InstanceBuffer::new(&gpu.device, config.max_instances);
        let bind_group = culler.create_bind_group(&gpu.device, &instances);

        Ok(Self {
            gpu,
            culler,
            instances,
            bind_group,
        })
    }

    fn cull(&mut self, frustum: &Frustum, instances: &InstanceSet) -> CullingResult<CullOutput> {
        self.culler.update_frustum(&self.gpu.queue, frustum)?;
        self.instances.upload(&self.gpu.queue, instances)?;
        self.culler.reset_args(&self.gpu.queue);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Culling Encoder"),
            });
        self.culler.cull(&mut encoder, &self.bind_group, &self.instances)?;
        self.culler.copy_results(&mut encoder);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        pollster::block_on(self.culler.read_results(&self.gpu.device))
    }
}

pub struct CullingSystem {
    config: CullingConfig,
    gpu: Option<GpuCulling>,
    cpu: CpuCuller,
    last_stats: CullingStats,
}

impl CullingSystem {
    pub fn new(config: CullingConfig, gpu: Option<GpuState>) -> CullingResult<Self> {
        config.validate()?;

        let gpu = match (config.backend, gpu) {
            (CullingBackend::Cpu, _) => None,
            (_, Some(gpu)) => Some(GpuCulling::new(gpu, &config)?),
            (CullingBackend::Gpu, None) => return Err(CullingError::GpuUnavailable),
            (CullingBackend::Auto, None) => {
                log::warn!("[CullingSystem] No GPU available, falling back to CPU culling");
                None
            }
        };

        let cpu = CpuCuller::new(config.cpu_dispatch, config.worker_threads)?;

        log::info!(
            "[CullingSystem] Using {} culling",
            if gpu.is_some() { "GPU" } else { "CPU" }
        );

        Ok(Self {
            config,
            gpu,
            cpu,
            last_stats: CullingStats::default(),
        })
    }

    /// Cull one frame
    pub fn cull(&mut self, frustum: &Frustum, instances: &InstanceSet) -> CullingResult<CullOutput> {
        let count = instances.count();
        if count > self.config.max_instances {
            return Err(CullingError::CapacityExceeded {
                requested: count,
                capacity: self.config.max_instances,
            });
        }

        let output = match &mut self.gpu {
            Some(gpu) => gpu.cull(frustum, instances)?,
            None => {
                if !frustum.is_finite() {
                    return Err(CullingError::InvalidFrustum);
                }
                self.cpu.cull(
                    frustum,
                    instances,
                    self.config.box_half_extent,
                    self.config.index_count_per_instance,
                )?
            }
        };

        self.last_stats = output.stats(count);
        log::debug!(
            "[CullingSystem] Total: {} Visible: {} Culled: {}",
            self.last_stats.total_instances,
            self.last_stats.visible,
            self.last_stats.culled
        );

        Ok(output)
    }

    pub fn uses_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn last_stats(&self) -> CullingStats {
        self.last_stats
    }

    pub fn config(&self) -> &CullingConfig {
        &self.config
    }

    /// GPU culler, for binding its args and index buffers in a draw
    pub fn frustum_culler(&self) -> Option<&FrustumCuller> {
        self.gpu.as_ref().map(|gpu| &gpu.culler)
    }
}
