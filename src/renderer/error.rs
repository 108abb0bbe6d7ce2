//! Renderer subsystem error handling
//!
//! Helpers for turning wgpu failures into `CullingError` without unwrap().

use crate::error::{CullingError, CullingResult};

/// Helper trait for renderer error contexts
pub trait RendererErrorContext<T> {
    fn renderer_context(self, operation: &str) -> CullingResult<T>;
}

impl<T, E> RendererErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn renderer_context(self, operation: &str) -> CullingResult<T> {
        self.map_err(|e| gpu_operation_error(operation, e))
    }
}

/// Create a GPU operation error
pub fn gpu_operation_error(operation: &str, error: impl std::fmt::Display) -> CullingError {
    CullingError::GpuOperationFailed {
        operation: operation.to_string(),
        error: error.to_string(),
    }
}

/// Create a buffer mapping error
pub fn buffer_mapping_error(buffer: &str) -> CullingError {
    CullingError::BufferMapping {
        buffer: buffer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_display() {
        let result: Result<(), String> = Err("device lost".to_string());
        let err = result.renderer_context("request_device").unwrap_err();

        assert!(matches!(err, CullingError::GpuOperationFailed { .. }));
        assert_eq!(
            err.to_string(),
            "GPU operation 'request_device' failed: device lost"
        );
    }

    #[test]
    fn test_mapping_error_message() {
        assert_eq!(
            buffer_mapping_error("Args Readback").to_string(),
            "failed to map GPU buffer: Args Readback"
        );
    }
}
