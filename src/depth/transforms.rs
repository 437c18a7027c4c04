// SPDX-License-Identifier: GPL-3.0-only

//! Per-view transform bookkeeping
//!
//! Holds the matrices that map world space to depth-camera view space and on
//! to clip space. Composed matrices are recomputed on every update so they can
//! never go stale relative to `projection` and `view`.

use super::arena::ViewArena;
use crate::constants::MATRIX_EPSILON;
use crate::session::{DepthCameraPose, RenderCamera};
use glam::{Mat4, Quat, Vec3};

/// Transform state for one view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransformState {
    /// World to depth-camera matrix
    pub view: Mat4,
    pub projection: Mat4,
    pub inverse_projection: Mat4,
    /// `projection * view`
    pub view_projection: Mat4,
    /// Depth camera position in world space
    pub camera_position: Vec3,
    /// Depth camera rotation in world space
    pub camera_rotation: Quat,
}

impl Default for ViewTransformState {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            camera_rotation: Quat::IDENTITY,
        }
    }
}

/// Where the matrices of an update came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSource {
    /// Session-provided depth camera projection and pose
    DepthCamera,
    /// Render camera substituted for the depth camera
    RenderCamera,
}

impl ViewTransformState {
    /// Copy the session-provided depth camera
    pub fn set_from_depth_camera(&mut self, depth_camera: &DepthCameraPose) {
        let (_, rotation, position) = depth_camera.transform.to_scale_rotation_translation();
        self.projection = depth_camera.projection;
        self.view = depth_camera.transform.inverse();
        self.camera_position = position;
        self.camera_rotation = rotation;
        self.recompute();
    }

    /// Substitute the render camera, assuming depth and color cameras coincide
    pub fn set_from_render_camera(&mut self, camera: &RenderCamera) {
        self.projection = camera.projection;
        self.view = camera.world_inverse;
        self.camera_position = camera.position;
        self.camera_rotation = camera.rotation;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.inverse_projection = self.projection.inverse();
        self.view_projection = self.projection * self.view;
    }

    /// Check the composed matrices against `projection` and `view`
    pub fn is_consistent(&self) -> bool {
        let round_trip = self.inverse_projection * self.projection;
        self.view_projection == self.projection * self.view
            && round_trip.abs_diff_eq(Mat4::IDENTITY, MATRIX_EPSILON)
    }
}

/// Transform states for all views discovered so far
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransforms {
    views: ViewArena<ViewTransformState>,
}

impl ViewTransforms {
    pub fn new(max_views: usize) -> Self {
        Self {
            views: ViewArena::with_capacity(max_views),
        }
    }

    /// Make sure `view` has an entry (identity until first update)
    pub fn ensure_capacity(&mut self, view: usize) -> &mut ViewTransformState {
        self.views.ensure(view)
    }

    /// Update one view, preferring the depth camera when allowed and present
    pub fn update(
        &mut self,
        view: usize,
        depth_camera: Option<&DepthCameraPose>,
        render_camera: &RenderCamera,
        match_depth_view: bool,
    ) -> TransformSource {
        let state = self.views.ensure(view);
        match depth_camera.filter(|_| match_depth_view) {
            Some(depth_camera) => {
                state.set_from_depth_camera(depth_camera);
                TransformSource::DepthCamera
            }
            None => {
                state.set_from_render_camera(render_camera);
                TransformSource::RenderCamera
            }
        }
    }

    pub fn get(&self, view: usize) -> Option<&ViewTransformState> {
        self.views.get(view)
    }

    /// Number of views tracked
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
