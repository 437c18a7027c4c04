// SPDX-License-Identifier: GPL-3.0-only

//! Session collaborator interface
//!
//! The immersive session owns the sensing hardware and the GPU. This module
//! describes what the depth core consumes from it:
//!
//! ```text
//! ┌──────────────────────┐
//! │   Immersive session  │
//! └──────────┬───────────┘
//!            │ DepthFrame (pose + per-view raw depth)
//!            ▼
//! ┌──────────────────────┐     SensingControl (pause / resume)
//! │  DepthFrameIngestor  │ ──► DepthReadback  (GPU → CPU texels)
//! └──────────────────────┘
//! ```

pub mod types;

pub use types::*;

use crate::config::DepthDataFormat;
use crate::errors::DepthResult;

/// Pause/resume control over power-hungry depth sensing
pub trait SensingControl {
    /// Stop producing depth until resumed
    fn pause_depth_sensing(&mut self);

    /// Resume producing depth
    fn resume_depth_sensing(&mut self);
}

/// Sensing control for sessions that cannot pause
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOn;

impl SensingControl for AlwaysOn {
    fn pause_depth_sensing(&mut self) {}

    fn resume_depth_sensing(&mut self) {}
}

/// Raw texels read back from a GPU depth texture
#[derive(Debug, Clone, PartialEq)]
pub struct DepthTexels {
    /// Element type of `bytes`
    pub format: DepthDataFormat,
    /// Tightly packed row-major texels
    pub bytes: Vec<u8>,
}

/// GPU → CPU depth conversion provided by the platform
pub trait DepthReadback {
    /// Read a depth texture back into CPU memory
    ///
    /// # Returns
    /// * `Ok(DepthTexels)` - `width * height` raw texels
    /// * `Err(DepthError::UnsupportedConversion)` - readback not possible on this platform
    fn read_depth(
        &mut self,
        texture: &GpuDepthTexture,
        width: u32,
        height: u32,
    ) -> DepthResult<DepthTexels>;
}
