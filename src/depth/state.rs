// SPDX-License-Identifier: GPL-3.0-only

//! Depth state owned by the ingestor and read by queries and the handoff

use super::arena::ViewArena;
use super::array::DepthArray;
use super::transforms::ViewTransforms;
use crate::session::GpuDepthTexture;

/// Latest GPU depth texture delivered for a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewDepthTexture {
    pub texture: GpuDepthTexture,
    pub width: u32,
    pub height: u32,
    pub raw_value_to_meters: f32,
    pub near_plane: Option<f32>,
    pub timestamp: f64,
}

/// Per-view depth arrays, textures and transforms
#[derive(Debug, Clone, PartialEq)]
pub struct DepthState {
    pub(crate) transforms: ViewTransforms,
    pub(crate) arrays: ViewArena<Option<DepthArray>>,
    pub(crate) textures: ViewArena<Option<ViewDepthTexture>>,
}

impl DepthState {
    pub fn new(max_views: usize) -> Self {
        Self {
            transforms: ViewTransforms::new(max_views),
            arrays: ViewArena::with_capacity(max_views),
            textures: ViewArena::with_capacity(max_views),
        }
    }

    pub fn transforms(&self) -> &ViewTransforms {
        &self.transforms
    }

    /// CPU-queryable depth for `view`, if any has been stored
    pub fn depth_array(&self, view: usize) -> Option<&DepthArray> {
        self.arrays.get(view).and_then(Option::as_ref)
    }

    /// Latest GPU texture for `view`, if any has been delivered
    pub fn depth_texture(&self, view: usize) -> Option<&ViewDepthTexture> {
        self.textures.get(view).and_then(Option::as_ref)
    }

    /// Number of views seen so far
    pub fn view_count(&self) -> usize {
        self.transforms.len()
    }
}
