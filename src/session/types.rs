// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame data delivered by the immersive session
//!
//! Everything here is borrowed for the duration of one update call.

use glam::{Mat4, Quat, Vec3};

/// Opaque GPU texture identity owned by the session/renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Depth texture delivered in GPU-optimized mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuDepthTexture {
    /// Texture holding raw depth
    pub handle: TextureHandle,
}

/// Directly queryable raw depth
#[derive(Debug, Clone, Copy)]
pub enum CpuDepthBuffer<'a> {
    /// 16-bit normalized units; meters = raw * raw_value_to_meters
    Uint16(&'a [u16]),
    /// 32-bit float; meters = raw * raw_value_to_meters
    Float32(&'a [f32]),
}

impl CpuDepthBuffer<'_> {
    /// Number of samples in the buffer
    pub fn len(&self) -> usize {
        match self {
            CpuDepthBuffer::Uint16(data) => data.len(),
            CpuDepthBuffer::Float32(data) => data.len(),
        }
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw depth in one of the two delivery forms
#[derive(Debug, Clone, Copy)]
pub enum RawDepthData<'a> {
    Cpu(CpuDepthBuffer<'a>),
    Gpu(GpuDepthTexture),
}

/// Projection and pose of the depth camera, when the session exposes them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthCameraPose {
    /// Depth camera projection matrix
    pub projection: Mat4,
    /// Depth camera to world transform
    pub transform: Mat4,
}

/// One view's raw range data for one frame
#[derive(Debug, Clone, Copy)]
pub struct RawDepthSample<'a> {
    pub width: u32,
    pub height: u32,
    /// Scale from raw units to meters
    pub raw_value_to_meters: f32,
    /// Hardware near-plane distance (meters), if reported
    pub near_plane: Option<f32>,
    /// Session-provided depth camera, if any
    pub depth_camera: Option<DepthCameraPose>,
    pub data: RawDepthData<'a>,
}

impl RawDepthSample<'_> {
    /// Number of samples implied by the declared size
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Color/render camera for one view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCamera {
    pub projection: Mat4,
    /// World to camera (view) matrix
    pub world_inverse: Mat4,
    /// Camera position in world space
    pub position: Vec3,
    /// Camera rotation in world space
    pub rotation: Quat,
}

impl RenderCamera {
    /// Build a render camera from its projection and camera-to-world transform
    pub fn from_world(projection: Mat4, world: Mat4) -> Self {
        let (_, rotation, position) = world.to_scale_rotation_translation();
        Self {
            projection,
            world_inverse: world.inverse(),
            position,
            rotation,
        }
    }
}

impl Default for RenderCamera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            world_inverse: Mat4::IDENTITY,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Inputs for one view of one frame
#[derive(Debug, Clone, Copy)]
pub struct ViewInput<'a> {
    pub camera: RenderCamera,
    /// Raw depth; `None` when the session had nothing for this view
    pub depth: Option<RawDepthSample<'a>>,
}

/// Viewer pose resolved against the reference space
#[derive(Debug, Clone, Copy)]
pub struct ViewerPose<'a> {
    /// Views in index order
    pub views: &'a [ViewInput<'a>],
}

/// Everything the session supplies for one frame
#[derive(Debug, Clone, Copy)]
pub struct DepthFrame<'a> {
    /// Frame timestamp (milliseconds)
    pub timestamp: f64,
    /// `None` when the pose could not be resolved
    pub pose: Option<ViewerPose<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_camera_from_world() {
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let camera = RenderCamera::from_world(Mat4::IDENTITY, world);
        assert!((camera.position - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
        let origin = camera.world_inverse.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!(origin.length() < 1e-6);
    }

    #[test]
    fn test_cpu_buffer_len() {
        let data = [1u16, 2, 3];
        assert_eq!(CpuDepthBuffer::Uint16(&data).len(), 3);
        assert!(CpuDepthBuffer::Float32(&[]).is_empty());
    }
}
