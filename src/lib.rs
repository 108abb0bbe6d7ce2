//! GPU instance frustum culling
//!
//! A compute pass tests each instance's bounding box against the camera
//! frustum and compacts the survivors into an indexed indirect draw. A CPU
//! kernel with identical semantics backs it up when no adapter is available.

pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod renderer;

pub use camera::{CullingCamera, Frustum};
pub use config::{CpuDispatchMode, CullingBackend, CullingConfig};
pub use error::{CullingError, CullingResult};
pub use gpu::{CullingUniform, IndirectArgs, IndirectDrawIndexedCommand, InstanceRecord};
pub use renderer::{
    demo_scene, ring_layout, CpuCuller, CullOutput, CullingStats, CullingSystem, FrustumCuller,
    GpuState, InstanceBuffer, InstanceSet,
};
