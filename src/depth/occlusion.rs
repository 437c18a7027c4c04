// SPDX-License-Identifier: GPL-3.0-only

//! Depth handoff for an external occlusion compositor
//!
//! Records borrow the depth state, so they stay valid and unaliased for as
//! long as the compositor holds them and end before the next update.

use super::array::DepthArray;
use super::state::DepthState;
use crate::config::DepthUsage;
use crate::session::TextureHandle;

/// Depth texture for one view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthTextureRef<'a> {
    /// Session-owned GPU texture
    Gpu(TextureHandle),
    /// CPU depth array to be uploaded by the compositor
    Cpu(&'a DepthArray),
}

/// Per-view depth texture and metadata for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionHandoffRecord<'a> {
    pub view: usize,
    pub texture: DepthTextureRef<'a>,
    /// Multiplier that turns texels of `texture` into meters
    pub raw_value_to_meters: f32,
    /// Hardware near-plane distance (meters), if reported
    pub near_plane: Option<f32>,
    pub width: u32,
    pub height: u32,
}

/// Uniform block layout for compositor shaders
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OcclusionUniforms {
    pub raw_value_to_meters: f32,
    /// 0.0 when no near plane was reported
    pub near_plane: f32,
    pub has_near_plane: u32,
    pub view_index: u32,
    pub width: u32,
    pub height: u32,
    pub _padding: [u32; 2],
}

impl OcclusionHandoffRecord<'_> {
    /// Pack the metadata for upload
    pub fn uniforms(&self) -> OcclusionUniforms {
        OcclusionUniforms {
            raw_value_to_meters: self.raw_value_to_meters,
            near_plane: self.near_plane.unwrap_or(0.0),
            has_near_plane: self.near_plane.is_some() as u32,
            view_index: self.view as u32,
            width: self.width,
            height: self.height,
            _padding: [0; 2],
        }
    }
}

/// Read-only view of depth textures for compositing
#[derive(Debug, Clone, Copy)]
pub struct OcclusionHandoff<'a> {
    state: &'a DepthState,
    enabled: bool,
    usage: DepthUsage,
}

impl<'a> OcclusionHandoff<'a> {
    pub fn new(state: &'a DepthState, enabled: bool, usage: DepthUsage) -> Self {
        Self {
            state,
            enabled,
            usage,
        }
    }

    /// Depth texture and metadata for `view`
    ///
    /// `None` when depth textures are disabled or nothing has been delivered
    /// for the view yet.
    pub fn handoff_for(&self, view: usize) -> Option<OcclusionHandoffRecord<'a>> {
        if !self.enabled {
            return None;
        }

        match self.usage {
            DepthUsage::GpuOptimized => {
                let texture = self.state.depth_texture(view)?;
                Some(OcclusionHandoffRecord {
                    view,
                    texture: DepthTextureRef::Gpu(texture.texture.handle),
                    raw_value_to_meters: texture.raw_value_to_meters,
                    near_plane: texture.near_plane,
                    width: texture.width,
                    height: texture.height,
                })
            }
            DepthUsage::CpuOptimized => {
                let array = self.state.depth_array(view)?;
                Some(OcclusionHandoffRecord {
                    view,
                    texture: DepthTextureRef::Cpu(array),
                    raw_value_to_meters: array.texel_scale(),
                    near_plane: array.near_plane,
                    width: array.width,
                    height: array.height,
                })
            }
        }
    }
}
