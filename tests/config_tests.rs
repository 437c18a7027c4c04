// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use depth_sense::config::{DepthConfig, DepthUsage, SessionCapabilities};
use depth_sense::constants::DEFAULT_MAX_VIEWS;

#[test]
fn test_config_default() {
    let config = DepthConfig::default();

    // Check sensible defaults
    assert!(
        config.depth_texture_enabled,
        "Depth textures should be enabled by default"
    );
    assert!(
        config.match_depth_view,
        "Session depth camera should be preferred by default"
    );
    assert!(!config.mesh.enabled, "Mesh should be opt-in");
    assert_eq!(config.max_views, DEFAULT_MAX_VIEWS);
}

#[test]
fn test_config_json_roundtrip_preserves_fields() {
    let mut config = DepthConfig::default();
    config.prefer_float32 = true;
    config.mesh.enabled = true;
    config.mesh.columns = 12;

    let json = config.to_json_pretty().unwrap();
    let parsed = DepthConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_config_load_from_file() {
    let path = std::env::temp_dir().join(format!("depth-sense-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "depth_texture_enabled": false, "mesh": { "enabled": true } }"#)
        .unwrap();

    let config = DepthConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(!config.depth_texture_enabled);
    assert!(config.mesh.enabled);
    assert!(config.needs_cpu_depth());
}

#[test]
fn test_config_load_missing_file() {
    let err = DepthConfig::load(std::path::Path::new("/nonexistent/depth-sense.json")).unwrap_err();
    assert!(matches!(err, depth_sense::DepthError::Io(_)));
}

#[test]
fn test_capabilities_default_cpu() {
    let caps = SessionCapabilities::default();
    assert_eq!(caps.usage, DepthUsage::CpuOptimized);
    assert!(!caps.pausable);
}
