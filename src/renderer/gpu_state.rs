//! Headless GPU device acquisition
//!
//! Culling needs no surface, so the device is requested without one.

use super::error::RendererErrorContext;
use crate::error::{CullingError, CullingResult};
use std::sync::Arc;

/// Device and queue shared by the culling passes
#[derive(Clone)]
pub struct GpuState {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuState {
    pub async fn new_headless() -> CullingResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(CullingError::GpuUnavailable)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "[GpuState] Using adapter '{}' ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Culling Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .renderer_context("request_device")?;

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Blocking variant for binaries and tests
    pub fn new_headless_blocking() -> CullingResult<Self> {
        pollster::block_on(Self::new_headless())
    }
}
