// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{
    DEFAULT_DISCONTINUITY_THRESHOLD_M, DEFAULT_MAX_VIEWS, DEFAULT_MESH_COLUMNS, DEFAULT_MESH_ROWS,
};
use crate::errors::DepthResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the session delivers raw depth
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthUsage {
    /// Directly queryable CPU buffers
    #[default]
    CpuOptimized,
    /// Texture handles only; CPU samples require a readback
    GpuOptimized,
}

/// Raw depth element type declared by the session
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthDataFormat {
    /// 16-bit normalized units (luminance-alpha)
    #[default]
    Uint16,
    /// 32-bit float
    Float32,
}

impl DepthDataFormat {
    /// Size of one raw element in bytes
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            DepthDataFormat::Uint16 => 2,
            DepthDataFormat::Float32 => 4,
        }
    }
}

/// Capability descriptor resolved once at session start
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SessionCapabilities {
    /// Session can pause and resume depth sensing
    pub pausable: bool,
    /// Declared depth delivery mode
    pub usage: DepthUsage,
    /// Declared raw element type
    pub data_format: DepthDataFormat,
    /// Platform can read GPU depth textures back into CPU memory
    pub gpu_readback: bool,
}

/// Live depth mesh settings
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DepthMeshConfig {
    /// Rebuild the mesh after view 0 is ingested
    pub enabled: bool,
    /// Grid vertices along u
    pub columns: u32,
    /// Grid vertices along v
    pub rows: u32,
    /// Maximum depth jump (meters) inside a single triangle
    pub discontinuity_threshold: f32,
}

impl Default for DepthMeshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            columns: DEFAULT_MESH_COLUMNS,
            rows: DEFAULT_MESH_ROWS,
            discontinuity_threshold: DEFAULT_DISCONTINUITY_THRESHOLD_M,
        }
    }
}

/// Depth sensing configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Store depth as Float32 meters instead of raw Uint16 units
    pub prefer_float32: bool,
    /// Expose per-view depth textures for occlusion compositing
    pub depth_texture_enabled: bool,
    /// Use the session's depth-camera pose when it provides one
    pub match_depth_view: bool,
    /// Read GPU depth back to the CPU even when no mesh needs it
    pub cpu_readback: bool,
    /// Number of views pre-allocated in each arena
    pub max_views: usize,
    /// Live mesh reconstruction
    pub mesh: DepthMeshConfig,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            prefer_float32: false,
            depth_texture_enabled: true,
            match_depth_view: true,
            cpu_readback: false,
            max_views: DEFAULT_MAX_VIEWS,
            mesh: DepthMeshConfig::default(),
        }
    }
}

impl DepthConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> DepthResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> DepthResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize as pretty JSON
    pub fn to_json_pretty(&self) -> DepthResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether some consumer needs CPU-queryable samples
    pub fn needs_cpu_depth(&self) -> bool {
        self.cpu_readback || self.mesh.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DepthConfig::from_json_str(r#"{ "prefer_float32": true }"#).unwrap();
        assert!(config.prefer_float32);
        assert_eq!(config.max_views, DEFAULT_MAX_VIEWS);
        assert_eq!(config.mesh, DepthMeshConfig::default());
    }

    #[test]
    fn test_usage_kebab_case() {
        let caps: SessionCapabilities =
            serde_json::from_str(r#"{ "usage": "gpu-optimized", "pausable": true }"#).unwrap();
        assert_eq!(caps.usage, DepthUsage::GpuOptimized);
        assert!(caps.pausable);
        assert!(!caps.gpu_readback);
    }

    #[test]
    fn test_mesh_implies_cpu_depth() {
        let mut config = DepthConfig::default();
        assert!(!config.needs_cpu_depth());
        config.mesh.enabled = true;
        assert!(config.needs_cpu_depth());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = DepthConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::errors::DepthError::Config(_)));
    }
}
