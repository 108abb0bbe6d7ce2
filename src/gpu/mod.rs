//! GPU data layouts
//!
//! Host-side mirrors of every struct the culling shader reads or writes.

pub mod buffer_layouts;

pub use buffer_layouts::{CullingUniform, IndirectArgs, IndirectDrawIndexedCommand, InstanceRecord};
