/// GPU Frustum Culling
///
/// Per-instance AABB-vs-frustum test with stream compaction into an indirect
/// draw. The compute path lives in `frustum_culler`, the CPU mirror of the same
/// kernel in `cpu_culler`, and `culling_system` picks between them.
///
/// Data flow per frame:
/// - host uploads frustum planes and instance records
/// - host resets the indirect args (visible counter = 0)
/// - one invocation per instance, 64 per workgroup
/// - visible instances claim a slot with an atomic add and write their index
/// - args and index list feed `draw_indexed_indirect`

pub mod cpu_culler;
pub mod culling_system;
pub mod frustum_culler;
pub mod instance_buffer;


pub use cpu_culler::CpuCuller;
pub use culling_system::CullingSystem;
pub use frustum_culler::FrustumCuller;
pub use instance_buffer::{demo_scene, ring_layout, InstanceBuffer, InstanceSet};

use crate::gpu::IndirectArgs;

/// Result of one culling dispatch, as read back from the args and index buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CullOutput {
    pub args: IndirectArgs,

    /// Compacted visible indices. Order depends on thread completion order.
    pub visible_indices: Vec<u32>,
}

impl CullOutput {
    #[inline]
    pub fn visible_count(&self) -> u32 {
        self.args.visible_count()
    }

    /// Visible indices in ascending order, for order-independent comparisons
    pub fn sorted_indices(&self) -> Vec<u32> {
        let mut indices = self.visible_indices.clone();
        indices.sort_unstable();
        indices
    }

    /// List length equals the counter, every index is in bounds, no index repeats
    pub fn is_consistent(&self, total_instances: u32) -> bool {
        if self.visible_indices.len() != self.visible_count() as usize {
            return false;
        }

        let mut seen = vec![false; total_instances as usize];
        for &index in &self.visible_indices {
            match seen.get_mut(index as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    pub fn stats(&self, total_instances: u32) -> CullingStats {
        CullingStats::new(total_instances, self.visible_count())
    }
}

/// Per-frame culling statistics
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CullingStats {
    pub total_instances: u32,
    pub visible: u32,
    pub culled: u32,
}

impl CullingStats {
    pub fn new(total_instances: u32, visible: u32) -> Self {
        Self {
            total_instances,
            visible,
            culled: total_instances.saturating_sub(visible),
        }
    }

    /// Fraction of instances that survived, 0 when there are none
    pub fn visible_ratio(&self) -> f32 {
        if self.total_instances == 0 {
            0.0
        } else {
            self.visible as f32 / self.total_instances as f32
        }
    }
}
