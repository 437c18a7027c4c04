// SPDX-License-Identifier: GPL-3.0-only

//! Live depth mesh
//!
//! Grid-based triangulation of the primary view's depth with depth
//! discontinuity handling. Vertices are in depth-camera space.

use super::array::DepthArray;
use super::query::unproject_uv;
use crate::config::DepthMeshConfig;
use crate::constants::{DEPTH_INVALID_M, MAX_MESH_GRID_SIDE};
use glam::{Mat4, Vec3};
use tracing::{debug, warn};

/// CPU mesh rebuilt from depth once per frame timestamp
#[derive(Debug, Clone)]
pub struct DepthMesh {
    columns: u32,
    rows: u32,
    discontinuity_threshold: f32,
    vertices: Vec<Vec3>,
    depths: Vec<f32>,
    indices: Vec<u32>,
    last_timestamp: Option<f64>,
    rebuilds: u64,
}

impl DepthMesh {
    /// Grid sides are clamped to `2..=MAX_MESH_GRID_SIDE`
    pub fn new(config: &DepthMeshConfig) -> Self {
        let columns = config.columns.clamp(2, MAX_MESH_GRID_SIDE);
        let rows = config.rows.clamp(2, MAX_MESH_GRID_SIDE);
        if (columns, rows) != (config.columns, config.rows) {
            warn!(
                requested_columns = config.columns,
                requested_rows = config.rows,
                columns,
                rows,
                "Depth mesh grid clamped"
            );
        }
        let vertex_count = columns as usize * rows as usize;
        let index_count = (columns as usize - 1) * (rows as usize - 1) * 6;
        Self {
            columns,
            rows,
            discontinuity_threshold: config.discontinuity_threshold,
            vertices: Vec::with_capacity(vertex_count),
            depths: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(index_count),
            last_timestamp: None,
            rebuilds: 0,
        }
    }

    /// Rebuild from `array`; returns false if `timestamp` was already applied
    pub fn update(
        &mut self,
        timestamp: f64,
        array: &DepthArray,
        inverse_projection: &Mat4,
    ) -> bool {
        if self.last_timestamp == Some(timestamp) {
            return false;
        }

        self.vertices.clear();
        self.depths.clear();
        for row in 0..self.rows {
            let v = row as f32 / (self.rows - 1) as f32;
            for column in 0..self.columns {
                let u = column as f32 / (self.columns - 1) as f32;
                let depth = array.sample_uv(u, v);
                self.depths.push(depth);
                self.vertices.push(unproject_uv(inverse_projection, u, v, depth));
            }
        }

        self.indices.clear();
        for row in 0..self.rows - 1 {
            for column in 0..self.columns - 1 {
                let a = row * self.columns + column;
                let b = a + 1;
                let c = a + self.columns;
                let d = c + 1;
                for triangle in [[a, c, b], [b, c, d]] {
                    if self.is_connected(triangle) {
                        self.indices.extend_from_slice(&triangle);
                    }
                }
            }
        }

        self.last_timestamp = Some(timestamp);
        self.rebuilds += 1;
        debug!(
            timestamp,
            triangles = self.triangle_count(),
            "Depth mesh rebuilt"
        );
        true
    }

    fn is_connected(&self, triangle: [u32; 3]) -> bool {
        let depths = triangle.map(|i| self.depths[i as usize]);
        if depths.iter().any(|&d| d <= DEPTH_INVALID_M || !d.is_finite()) {
            return false;
        }
        let near = depths.iter().copied().fold(f32::INFINITY, f32::min);
        let far = depths.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        far - near <= self.discontinuity_threshold
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Vertex positions as bytes for buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices.as_slice())
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Number of rebuilds performed
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn grid_size(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::DepthData;

    fn flat_array(width: u32, height: u32, meters: f32) -> DepthArray {
        DepthArray {
            width,
            height,
            raw_value_to_meters: 1.0,
            near_plane: None,
            data: DepthData::Float32(vec![meters; (width * height) as usize]),
            timestamp: 0.0,
        }
    }

    fn mesh(columns: u32, rows: u32) -> DepthMesh {
        DepthMesh::new(&DepthMeshConfig {
            enabled: true,
            columns,
            rows,
            discontinuity_threshold: 0.1,
        })
    }

    #[test]
    fn test_flat_surface_fully_triangulated() {
        let mut mesh = mesh(4, 3);
        let inverse = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 10.0).inverse();
        assert!(mesh.update(1.0, &flat_array(8, 8, 2.0), &inverse));
        assert_eq!(mesh.vertices().len(), 12);
        assert_eq!(mesh.triangle_count(), 3 * 2 * 2);
        assert!(mesh.vertices().iter().all(|v| (v.z + 2.0).abs() < 1e-4));
        assert_eq!(mesh.vertex_bytes().len(), 12 * 12);
    }

    #[test]
    fn test_same_timestamp_skipped() {
        let mut mesh = mesh(3, 3);
        let inverse = Mat4::IDENTITY;
        let array = flat_array(4, 4, 1.0);
        assert!(mesh.update(5.0, &array, &inverse));
        assert!(!mesh.update(5.0, &array, &inverse));
        assert!(mesh.update(6.0, &array, &inverse));
        assert_eq!(mesh.rebuild_count(), 2);
    }

    #[test]
    fn test_discontinuity_and_invalid_break_triangles() {
        let mut mesh = mesh(2, 2);
        let inverse = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 10.0).inverse();

        let mut array = flat_array(2, 2, 1.0);
        if let DepthData::Float32(data) = &mut array.data {
            // Top-right corner jumps far away
            data[3] = 3.0;
        }
        mesh.update(1.0, &array, &inverse);
        assert!(mesh.triangle_count() < 2);

        let empty = flat_array(2, 2, 0.0);
        mesh.update(2.0, &empty, &inverse);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_grid_size_clamped() {
        let mesh = mesh(0, 1);
        assert_eq!(mesh.grid_size(), (2, 2));
    }

    #[test]
    fn test_oversized_grid_clamped() {
        let mesh = mesh(70_000, 70_000);
        assert_eq!(mesh.grid_size(), (MAX_MESH_GRID_SIDE, MAX_MESH_GRID_SIDE));

        let side = MAX_MESH_GRID_SIDE as u64;
        assert!(side * side <= u32::MAX as u64);
    }
}
