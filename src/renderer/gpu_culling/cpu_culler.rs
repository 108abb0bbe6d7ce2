/// CPU Frustum Culling
///
/// Runs the culling kernel over a simulated dispatch. Each invocation does
/// exactly what `frustum_cull.wgsl` does, so the two paths can be compared
/// instance for instance. Used as the fallback when no GPU is available.

use super::{CullOutput, InstanceSet};
use crate::camera::Frustum;
use crate::config::CpuDispatchMode;
use crate::constants::dispatch::{workgroup_count, WORKGROUP_SIZE};
use crate::error::{CullingError, CullingResult};
use crate::gpu::{IndirectArgs, InstanceRecord};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct CpuCuller {
    mode: CpuDispatchMode,
    thread_pool: Option<rayon::ThreadPool>,
}

impl CpuCuller {
    /// `worker_threads == 0` runs parallel dispatches on the global rayon pool
    pub fn new(mode: CpuDispatchMode, worker_threads: usize) -> CullingResult<Self> {
        let thread_pool = match (mode, worker_threads) {
            (CpuDispatchMode::Parallel, n) if n > 0 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("cull-worker-{}", i))
                    .build()
                    .map_err(|e| CullingError::InvalidConfig {
                        field: "worker_threads",
                        reason: e.to_string(),
                    })?,
            ),
            _ => None,
        };

        Ok(Self { mode, thread_pool })
    }

    pub fn mode(&self) -> CpuDispatchMode {
        self.mode
    }

    /// Cull a whole instance set with the minimal dispatch
    pub fn cull(
        &self,
        frustum: &Frustum,
        instances: &InstanceSet,
        box_half_extent: f32,
        index_count: u32,
    ) -> CullingResult<CullOutput> {
        self.dispatch(
            frustum,
            instances.records(),
            box_half_extent,
            index_count,
            workgroup_count(instances.count()),
        )
    }

    /// Run `workgroups * 64` kernel invocations over raw records.
    ///
    /// The bound comes from `records[0].total_instances`, as on the GPU.
    pub fn dispatch(
        &self,
        frustum: &Frustum,
        records: &[InstanceRecord],
        box_half_extent: f32,
        index_count: u32,
        workgroups: u32,
    ) -> CullingResult<CullOutput> {
        let total = records.first().map_or(0, |r| r.total_instances);
        if total as usize > records.len() {
            return Err(CullingError::InstanceCountMismatch {
                declared: total,
                available: records.len() as u32,
            });
        }

        // Thread indices must stay representable as u32
        let workgroups = workgroups.min(u32::MAX / WORKGROUP_SIZE);
        let dispatched_threads = workgroups * WORKGROUP_SIZE;
        if dispatched_threads < total {
            return Err(CullingError::InsufficientDispatch {
                dispatched_threads,
                required_threads: total,
            });
        }

        let kernel = Kernel {
            frustum,
            records,
            box_half_extent,
            visible_count: AtomicU32::new(0),
            visible_indices: (0..total).map(|_| AtomicU32::new(0)).collect(),
        };

        match self.mode {
            CpuDispatchMode::Serial => {
                for thread_index in 0..dispatched_threads {
                    kernel.invoke(thread_index);
                }
            }
            CpuDispatchMode::Parallel => {
                let run = || {
                    (0..workgroups).into_par_iter().for_each(|group| {
                        let base = group * WORKGROUP_SIZE;
                        for local in 0..WORKGROUP_SIZE {
                            kernel.invoke(base + local);
                        }
                    })
                };
                match &self.thread_pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
        }

        Ok(kernel.finish(index_count))
    }
}

/// Shared state of one dispatch
struct Kernel<'a> {
    frustum: &'a Frustum,
    records: &'a [InstanceRecord],
    box_half_extent: f32,
    visible_count: AtomicU32,
    visible_indices: Vec<AtomicU32>,
}

impl Kernel<'_> {
    #[inline]
    fn invoke(&self, thread_index: u32) {
        let total = self.records.first().map_or(0, |r| r.total_instances);
        if thread_index >= total {
            return;
        }

        let center = self.records[thread_index as usize].position();
        if self.frustum.intersects_aabb(center, self.box_half_extent) {
            let slot = self.visible_count.fetch_add(1, Ordering::Relaxed);
            self.visible_indices[slot as usize].store(thread_index, Ordering::Relaxed);
        }
    }

    fn finish(self, index_count: u32) -> CullOutput {
        let visible = self.visible_count.into_inner();
        let visible_indices = self
            .visible_indices
            .into_iter()
            .take(visible as usize)
            .map(AtomicU32::into_inner)
            .collect();

        CullOutput {
            args: IndirectArgs::new(index_count, visible),
            visible_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix4, Vector3};

    fn box_frustum() -> Frustum {
        Frustum::from_planes([
            [1.0, 0.0, 0.0, 10.0],
            [-1.0, 0.0, 0.0, 10.0],
            [0.0, 1.0, 0.0, 10.0],
            [0.0, -1.0, 0.0, 10.0],
            [0.0, 0.0, -1.0, 10.0],
            [0.0, 0.0, 1.0, 10.0],
        ])
    }

    fn at(positions: &[[f32; 3]]) -> InstanceSet {
        InstanceSet::from_matrices(
            positions
                .iter()
                .map(|p| (Matrix4::from_translation(Vector3::from(*p)), 0)),
        )
    }

    fn serial() -> CpuCuller {
        CpuCuller::new(CpuDispatchMode::Serial, 0).unwrap()
    }

    #[test]
    fn test_three_instance_scenario() {
        let set = at(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1000.0], [0.0, 0.0, -1000.0]]);
        let out = serial().cull(&box_frustum(), &set, 0.475, 36).unwrap();

        assert_eq!(out.visible_count(), 1);
        assert_eq!(out.visible_indices, vec![0]);
        assert_eq!(out.args.index_count, 36);
    }

    #[test]
    fn test_empty_set() {
        let out = serial().cull(&box_frustum(), &InstanceSet::new(), 0.475, 36).unwrap();

        assert_eq!(out.visible_count(), 0);
        assert!(out.visible_indices.is_empty());
    }

    #[test]
    fn test_zero_total_ignores_dispatch_size() {
        let mut sentinel = InstanceRecord::sentinel();
        sentinel.total_instances = 0;

        let out = serial()
            .dispatch(&box_frustum(), &[sentinel], 0.475, 36, 100)
            .unwrap();
        assert_eq!(out.visible_count(), 0);
        assert!(out.visible_indices.is_empty());
    }

    #[test]
    fn test_oversized_dispatch_is_noop_past_bound() {
        let set = at(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        let out = serial()
            .dispatch(&box_frustum(), set.records(), 0.475, 36, 10)
            .unwrap();

        assert_eq!(out.visible_indices, vec![0, 1]);
    }

    #[test]
    fn test_bound_read_from_first_record() {
        // Three records in memory, record 0 declares only two
        let mut records = at(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]])
            .records()
            .to_vec();
        records[0].total_instances = 2;

        let out = serial()
            .dispatch(&box_frustum(), &records, 0.475, 36, 1)
            .unwrap();
        assert_eq!(out.visible_indices, vec![0, 1]);
    }

    #[test]
    fn test_single_record_bound() {
        let set = at(&[[5.0, 5.0, 5.0]]);
        let out = serial().cull(&box_frustum(), &set, 0.475, 36).unwrap();

        assert_eq!(out.visible_indices, vec![0]);
    }

    #[test]
    fn test_declared_count_larger_than_records() {
        let mut records = at(&[[0.0, 0.0, 0.0]]).records().to_vec();
        records[0].total_instances = 5;

        let err = serial()
            .dispatch(&box_frustum(), &records, 0.475, 36, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            CullingError::InstanceCountMismatch { declared: 5, available: 1 }
        ));
    }

    #[test]
    fn test_insufficient_dispatch() {
        let positions: Vec<[f32; 3]> = (0..65).map(|i| [i as f32 * 0.1, 0.0, 0.0]).collect();
        let set = at(&positions);

        let err = serial()
            .dispatch(&box_frustum(), set.records(), 0.475, 36, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            CullingError::InsufficientDispatch { dispatched_threads: 64, required_threads: 65 }
        ));
    }

    #[test]
    fn test_boundary_instance_is_visible() {
        let set = at(&[[0.0, 0.0, -10.5]]);
        let out = serial().cull(&box_frustum(), &set, 0.5, 36).unwrap();

        assert_eq!(out.visible_indices, vec![0]);
    }

    #[test]
    fn test_half_extent_is_configurable() {
        let set = at(&[[0.0, 0.0, 11.0]]);

        let small = serial().cull(&box_frustum(), &set, 0.475, 36).unwrap();
        let large = serial().cull(&box_frustum(), &set, 1.5, 36).unwrap();

        assert_eq!(small.visible_count(), 0);
        assert_eq!(large.visible_count(), 1);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let positions: Vec<[f32; 3]> = (0..5000)
            .map(|i| {
                let f = i as f32;
                [(f * 0.37).sin() * 20.0, (f * 0.11).cos() * 20.0, (f * 0.07).sin() * 20.0]
            })
            .collect();
        let set = at(&positions);
        let frustum = box_frustum();

        let expected = serial().cull(&frustum, &set, 0.475, 36).unwrap();
        let parallel = CpuCuller::new(CpuDispatchMode::Parallel, 4).unwrap();
        let actual = parallel.cull(&frustum, &set, 0.475, 36).unwrap();

        assert!(actual.is_consistent(set.count()));
        assert_eq!(actual.visible_count(), expected.visible_count());
        assert_eq!(actual.sorted_indices(), expected.visible_indices);
        assert!(expected.visible_count() > 0);
        assert!(expected.visible_count() < set.count());
    }

    #[test]
    fn test_parallel_on_global_pool() {
        let set = at(&[[0.0, 0.0, 0.0], [100.0, 0.0, 0.0], [0.0, 9.0, 0.0]]);
        let culler = CpuCuller::new(CpuDispatchMode::Parallel, 0).unwrap();
        let out = culler.cull(&box_frustum(), &set, 0.475, 36).unwrap();

        assert_eq!(out.sorted_indices(), vec![0, 2]);
    }
}
