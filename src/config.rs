//! Culling configuration
//!
//! Loaded once at startup from TOML. Every field has a default so a partial
//! (or empty) file is valid.

use crate::constants::culling::{CUBE_INDEX_COUNT, DEFAULT_BOX_HALF_EXTENT, DEFAULT_MAX_INSTANCES};
use crate::error::{CullingError, CullingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which culling path to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullingBackend {
    /// GPU when a device is available, CPU otherwise
    Auto,
    Gpu,
    Cpu,
}

/// How the CPU kernel walks the simulated dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuDispatchMode {
    /// One rayon task per workgroup, slots claimed through a shared atomic
    Parallel,
    /// Single thread, output ordered by instance index
    Serial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Conservative half-extent applied to every instance box
    pub box_half_extent: f32,

    /// Index count written into the indirect args on reset
    pub index_count_per_instance: u32,

    /// Capacity of the instance and visible index buffers
    pub max_instances: u32,

    pub backend: CullingBackend,

    pub cpu_dispatch: CpuDispatchMode,

    /// Rayon worker count for the CPU kernel, 0 uses the global pool
    pub worker_threads: usize,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            box_half_extent: DEFAULT_BOX_HALF_EXTENT,
            index_count_per_instance: CUBE_INDEX_COUNT,
            max_instances: DEFAULT_MAX_INSTANCES,
            backend: CullingBackend::Auto,
            cpu_dispatch: CpuDispatchMode::Parallel,
            worker_threads: 0,
        }
    }
}

impl CullingConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> CullingResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> CullingResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("[CullingConfig] Loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> CullingResult<()> {
        if !self.box_half_extent.is_finite() || self.box_half_extent < 0.0 {
            return Err(CullingError::InvalidConfig {
                field: "box_half_extent",
                reason: format!("must be finite and non-negative, got {}", self.box_half_extent),
            });
        }
        if self.max_instances == 0 {
            return Err(CullingError::InvalidConfig {
                field: "max_instances",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.index_count_per_instance == 0 {
            return Err(CullingError::InvalidConfig {
                field: "index_count_per_instance",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
