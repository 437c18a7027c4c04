// SPDX-License-Identifier: GPL-3.0-only

//! Read access to the current depth state
//!
//! An empty state (no depth stored yet) is valid: sampling returns 0 and the
//! unprojections return `None`.

use super::array::DepthArray;
use super::state::DepthState;
use super::transforms::ViewTransformState;
use crate::constants::PRIMARY_VIEW;
use glam::{Mat4, Vec3};

/// Reconstruct a depth-camera-space point for `(u, v)` at `depth` meters
///
/// The clip-space point `(2u-1, 2v-1, -1)` is taken through the inverse
/// projection, then scaled so its z equals `-depth`.
pub fn unproject_uv(inverse_projection: &Mat4, u: f32, v: f32, depth: f32) -> Vec3 {
    let clip = Vec3::new(2.0 * u - 1.0, 2.0 * v - 1.0, -1.0);
    let direction = inverse_projection.project_point3(clip);
    if direction.z == 0.0 {
        return Vec3::ZERO;
    }
    direction * (-depth / direction.z)
}

/// Depth lookups for one view
#[derive(Debug, Clone, Copy)]
pub struct DepthQuery<'a> {
    state: &'a DepthState,
    view: usize,
}

impl<'a> DepthQuery<'a> {
    /// Query the primary view
    pub fn new(state: &'a DepthState) -> Self {
        Self::for_view(state, PRIMARY_VIEW)
    }

    /// Query any view
    pub fn for_view(state: &'a DepthState, view: usize) -> Self {
        Self { state, view }
    }

    fn array(&self) -> Option<&'a DepthArray> {
        self.state.depth_array(self.view)
    }

    fn transform(&self) -> Option<&'a ViewTransformState> {
        self.state.transforms.get(self.view)
    }

    /// Depth in meters at normalized `(u, v)`, `v` from the top
    pub fn sample_depth(&self, u: f32, v: f32) -> f32 {
        self.array().map_or(0.0, |array| array.sample_uv(u, v))
    }

    /// Depth-camera-space point seen at `(u, v)`
    pub fn unproject_to_view_space(&self, u: f32, v: f32) -> Option<Vec3> {
        let array = self.array()?;
        let transform = self.transform()?;
        Some(unproject_uv(
            &transform.inverse_projection,
            u,
            v,
            array.sample_uv(u, v),
        ))
    }

    /// Normalized `(u, v)` at which `world` appears in this view
    pub fn world_to_uv(&self, world: Vec3) -> Option<(f32, f32)> {
        let transform = self.transform()?;
        let clip = transform
            .projection
            .project_point3(transform.view.transform_point3(world));
        Some(((clip.x + 1.0) * 0.5, (clip.y + 1.0) * 0.5))
    }

    /// Depth-camera-space point of the real surface behind `world`
    pub fn project_world_position_to_view_space(&self, world: Vec3) -> Option<Vec3> {
        let (u, v) = self.world_to_uv(world)?;
        self.unproject_to_view_space(u, v)
    }

    /// World-space point seen at `(u, v)`
    pub fn unproject_to_world(&self, u: f32, v: f32) -> Option<Vec3> {
        let local = self.unproject_to_view_space(u, v)?;
        let transform = self.transform()?;
        Some(transform.camera_rotation * local + transform.camera_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = DepthState::new(2);
        let query = DepthQuery::new(&state);
        assert_eq!(query.sample_depth(0.5, 0.5), 0.0);
        assert_eq!(query.unproject_to_view_space(0.5, 0.5), None);
        assert_eq!(query.project_world_position_to_view_space(Vec3::NEG_Z), None);
    }

    #[test]
    fn test_unproject_center_ray() {
        let projection = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 10.0);
        let point = unproject_uv(&projection.inverse(), 0.5, 0.5, 2.5);
        assert!((point - Vec3::new(0.0, 0.0, -2.5)).length() < 1e-4);
    }

    #[test]
    fn test_unproject_zero_depth() {
        let projection = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 10.0);
        let point = unproject_uv(&projection.inverse(), 0.2, 0.7, 0.0);
        assert!(point.length() < 1e-6);
    }
}
