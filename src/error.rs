//! Crate-wide error type
//!
//! The culling kernel itself has no error channel. Everything here is raised by
//! host-side validation before a dispatch, or by device/config plumbing.

use thiserror::Error;

/// Result alias used throughout the crate
pub type CullingResult<T> = Result<T, CullingError>;

#[derive(Debug, Error)]
pub enum CullingError {
    #[error("instance count {requested} exceeds buffer capacity {capacity}")]
    CapacityExceeded { requested: u32, capacity: u32 },

    #[error("dispatch covers {dispatched_threads} threads but {required_threads} instances are declared")]
    InsufficientDispatch {
        dispatched_threads: u32,
        required_threads: u32,
    },

    #[error("record 0 declares {declared} instances but only {available} records are present")]
    InstanceCountMismatch { declared: u32, available: u32 },

    #[error("frustum planes contain non-finite values")]
    InvalidFrustum,

    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("no GPU adapter available")]
    GpuUnavailable,

    #[error("GPU operation '{operation}' failed: {error}")]
    GpuOperationFailed { operation: String, error: String },

    #[error("failed to map GPU buffer: {buffer}")]
    BufferMapping { buffer: String },

    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
