// SPDX-License-Identifier: GPL-3.0-only

//! Shared builders for integration tests

#![allow(dead_code)]

use depth_sense::config::DepthDataFormat;
use depth_sense::errors::{DepthError, DepthResult};
use depth_sense::session::{
    CpuDepthBuffer, DepthReadback, DepthTexels, GpuDepthTexture, RawDepthData, RawDepthSample,
    RenderCamera, SensingControl, TextureHandle,
};
use glam::{Mat4, Vec3};
use std::cell::Cell;
use std::rc::Rc;

pub fn perspective() -> Mat4 {
    Mat4::perspective_rh_gl(1.2, 4.0 / 3.0, 0.1, 20.0)
}

/// Render camera at `position` looking down -Z
pub fn camera_at(position: Vec3) -> RenderCamera {
    RenderCamera::from_world(perspective(), Mat4::from_translation(position))
}

pub fn cpu_sample(
    width: u32,
    height: u32,
    raw_value_to_meters: f32,
    data: &[u16],
) -> RawDepthSample<'_> {
    RawDepthSample {
        width,
        height,
        raw_value_to_meters,
        near_plane: None,
        depth_camera: None,
        data: RawDepthData::Cpu(CpuDepthBuffer::Uint16(data)),
    }
}

pub fn gpu_sample(width: u32, height: u32, handle: u64) -> RawDepthSample<'static> {
    RawDepthSample {
        width,
        height,
        raw_value_to_meters: 0.001,
        near_plane: Some(0.2),
        depth_camera: None,
        data: RawDepthData::Gpu(GpuDepthTexture {
            handle: TextureHandle(handle),
        }),
    }
}

/// Session that records pause/resume calls
#[derive(Debug, Default)]
pub struct RecordingSession {
    pub pauses: u32,
    pub resumes: u32,
}

impl SensingControl for RecordingSession {
    fn pause_depth_sensing(&mut self) {
        self.pauses += 1;
    }

    fn resume_depth_sensing(&mut self) {
        self.resumes += 1;
    }
}

/// Readback that fills every texel with `raw` and counts calls
pub struct CountingReadback {
    pub calls: Rc<Cell<usize>>,
    pub raw: u16,
    pub unsupported: bool,
    /// 1-based call numbers that fail with a transient error
    pub failing_calls: Vec<usize>,
}

impl CountingReadback {
    pub fn new(raw: u16) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                calls: Rc::clone(&calls),
                raw,
                unsupported: false,
                failing_calls: Vec::new(),
            },
            calls,
        )
    }
}

impl DepthReadback for CountingReadback {
    fn read_depth(
        &mut self,
        _texture: &GpuDepthTexture,
        width: u32,
        height: u32,
    ) -> DepthResult<DepthTexels> {
        self.calls.set(self.calls.get() + 1);
        if self.unsupported {
            return Err(DepthError::UnsupportedConversion("no readback".to_string()));
        }
        if self.failing_calls.contains(&self.calls.get()) {
            return Err(DepthError::Io("readback timed out".to_string()));
        }
        let samples = vec![self.raw; (width * height) as usize];
        Ok(DepthTexels {
            format: DepthDataFormat::Uint16,
            bytes: bytemuck::cast_slice::<u16, u8>(&samples).to_vec(),
        })
    }
}

pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
