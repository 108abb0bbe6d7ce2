use crate::constants::culling::DEMO_INSTANCE_SCALE;
use crate::error::{CullingError, CullingResult};
use crate::gpu::buffer_layouts::{usage, InstanceBufferLayout, InstanceRecord};
use cgmath::{Matrix4, Vector3};

/// Host-side instance array.
///
/// Keeps the denormalised `total_instances` field of every record equal to
/// the record count, which is where the kernel reads its bound from.
#[derive(Debug, Clone, Default)]
pub struct InstanceSet {
    records: Vec<InstanceRecord>,
}

impl InstanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = InstanceRecord>) -> Self {
        let mut set = Self {
            records: records.into_iter().collect(),
        };
        set.stamp_count();
        set
    }

    pub fn from_matrices(items: impl IntoIterator<Item = (Matrix4<f32>, u32)>) -> Self {
        Self::from_records(
            items
                .into_iter()
                .map(|(model, texture_index)| InstanceRecord::from_matrix(model, texture_index)),
        )
    }

    pub fn push(&mut self, record: InstanceRecord) {
        self.records.push(record);
        self.stamp_count();
    }

    /// Replace the transform of an existing instance
    pub fn set_transform(&mut self, index: usize, model: Matrix4<f32>) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.model_matrix = model.into();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self) -> u32 {
        self.records.len() as u32
    }

    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    fn stamp_count(&mut self) {
        let total = self.records.len() as u32;
        for record in &mut self.records {
            record.total_instances = total;
        }
    }
}

/// Demo scene: one cube at the origin, 10 on an inner ring and 12 on an outer ring.
pub fn ring_layout(scale: f32) -> InstanceSet {
    const INNER_COUNT: usize = 10;
    const OUTER_COUNT: usize = 12;
    const INNER_RADIUS: f32 = 4.0;
    const OUTER_RADIUS: f32 = 9.5;

    let mut set = InstanceSet::with_capacity(1 + INNER_COUNT + OUTER_COUNT);
    set.push(InstanceRecord::new(Vector3::new(0.0, 0.0, 0.0), scale, 0));

    for (count, radius) in [(INNER_COUNT, INNER_RADIUS), (OUTER_COUNT, OUTER_RADIUS)] {
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            let position = Vector3::new(radius * angle.cos(), 0.0, radius * angle.sin());
            set.push(InstanceRecord::new(position, scale, (i % 2) as u32));
        }
    }

    set
}

/// Ring layout at the default demo scale
pub fn demo_scene() -> InstanceSet {
    ring_layout(DEMO_INSTANCE_SCALE)
}

/// GPU storage buffer holding instance records
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: u32,
    count: u32,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Culling Instance Buffer"),
            size: InstanceBufferLayout::buffer_size(capacity),
            usage: usage::STORAGE,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            capacity: capacity.max(1),
            count: 0,
        }
    }

    /// Upload all records. An empty set uploads a sentinel so record 0 reads a zero bound.
    pub fn upload(&mut self, queue: &wgpu::Queue, instances: &InstanceSet) -> CullingResult<()> {
        let count = instances.count();
        if count > self.capacity {
            return Err(CullingError::CapacityExceeded {
                requested: count,
                capacity: self.capacity,
            });
        }

        if instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&InstanceRecord::sentinel()));
        } else {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances.records()));
        }

        self.count = count;
        log::debug!("[InstanceBuffer] Uploaded {} instance records", count);
        Ok(())
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Records written by the last upload
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn as_binding(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}
