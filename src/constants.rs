// SPDX-License-Identifier: GPL-3.0-only

//! Depth sensing constants

/// Views pre-allocated per arena (stereo plus headroom)
pub const DEFAULT_MAX_VIEWS: usize = 4;

/// Index of the primary view used by queries and mesh reconstruction
pub const PRIMARY_VIEW: usize = 0;

/// Default live mesh grid resolution (vertices per axis)
pub const DEFAULT_MESH_COLUMNS: u32 = 40;
pub const DEFAULT_MESH_ROWS: u32 = 30;
/// Largest mesh grid side; keeps vertex indices within u32
pub const MAX_MESH_GRID_SIDE: u32 = 1024;

/// Depth jump (meters) between neighbouring mesh vertices that breaks a triangle
pub const DEFAULT_DISCONTINUITY_THRESHOLD_M: f32 = 0.1;

/// Visualization range limits (meters)
pub const VISUALIZATION_MIN_M: f32 = 0.2;
pub const VISUALIZATION_MAX_M: f32 = 8.0;

/// Number of quantization bands for depth colormap visualization
pub const DEPTH_COLORMAP_BANDS: f32 = 32.0;

/// Depth value treated as "no measurement"
pub const DEPTH_INVALID_M: f32 = 0.0;

/// Tolerance used when comparing reconstructed matrices
pub const MATRIX_EPSILON: f32 = 1e-4;
