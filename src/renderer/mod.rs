pub mod error;
pub mod gpu_culling;
mod gpu_state;

pub use error::{buffer_mapping_error, gpu_operation_error, RendererErrorContext};
pub use gpu_culling::{
    demo_scene, ring_layout, CpuCuller, CullOutput, CullingStats, CullingSystem, FrustumCuller,
    InstanceBuffer, InstanceSet,
};
pub use gpu_state::GpuState;
