// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame depth ingestion
//!
//! One call to [`DepthFrameIngestor::update`] per frame:
//!
//! ```text
//! gate on clients ─► pose? ─► for each view in order:
//!                               raw sample ─► convert (GPU only, lazy)
//!                               ─► store array ─► update transforms
//!                               ─► view 0: rebuild mesh
//! ```
//!
//! Failures never propagate. Missing data aborts the remaining views of the
//! frame; views not reached keep the previous frame's state.

use super::arena::ViewArena;
use super::array::DepthArray;
use super::clients::DepthClientRegistry;
use super::convert::ConvertedDepth;
use super::mesh::DepthMesh;
use super::state::{DepthState, ViewDepthTexture};
use crate::config::{DepthConfig, DepthUsage, SessionCapabilities};
use crate::constants::PRIMARY_VIEW;
use crate::errors::{DepthError, DepthResult};
use crate::session::{
    DepthFrame, DepthReadback, GpuDepthTexture, RawDepthData, RawDepthSample, SensingControl,
    ViewInput,
};
use tracing::{debug, info, warn};

/// What an update call did
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Every view delivered by the pose was ingested
    Updated { views: usize },
    /// No client needs depth; sensing is paused and nothing was touched
    Paused,
    /// The whole frame was skipped
    Skipped(DepthError),
    /// Ingestion stopped at a view; earlier views were committed
    Aborted {
        views_updated: usize,
        error: DepthError,
    },
}

impl FrameOutcome {
    /// Whether any state was written
    pub fn wrote_state(&self) -> bool {
        match self {
            FrameOutcome::Updated { views } => *views > 0,
            FrameOutcome::Aborted { views_updated, .. } => *views_updated > 0,
            FrameOutcome::Paused | FrameOutcome::Skipped(_) => false,
        }
    }
}

/// Owns and mutates the per-view depth state
pub struct DepthFrameIngestor {
    config: DepthConfig,
    capabilities: SessionCapabilities,
    state: DepthState,
    mesh: Option<DepthMesh>,
    readback: Option<Box<dyn DepthReadback>>,
    readback_supported: bool,
    /// Timestamp of the last successful readback per view
    readback_stamps: ViewArena<Option<f64>>,
    conversions: u64,
    sensing_paused: bool,
}

impl DepthFrameIngestor {
    pub fn new(config: DepthConfig, capabilities: SessionCapabilities) -> Self {
        info!(
            usage = ?capabilities.usage,
            data_format = ?capabilities.data_format,
            pausable = capabilities.pausable,
            mesh = config.mesh.enabled,
            "Creating depth frame ingestor"
        );

        let needs_readback =
            capabilities.usage == DepthUsage::GpuOptimized && config.needs_cpu_depth();
        if needs_readback && !capabilities.gpu_readback {
            warn!("GPU depth readback unavailable, CPU depth queries will stay empty");
        }

        let mesh = config.mesh.enabled.then(|| DepthMesh::new(&config.mesh));
        Self {
            state: DepthState::new(config.max_views),
            readback_stamps: ViewArena::with_capacity(config.max_views),
            readback_supported: capabilities.gpu_readback,
            readback: None,
            conversions: 0,
            sensing_paused: false,
            mesh,
            config,
            capabilities,
        }
    }

    /// Install the platform's GPU → CPU depth conversion
    pub fn set_readback(&mut self, readback: Box<dyn DepthReadback>) {
        self.readback = Some(readback);
    }

    pub fn config(&self) -> &DepthConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &SessionCapabilities {
        &self.capabilities
    }

    pub fn state(&self) -> &DepthState {
        &self.state
    }

    pub fn mesh(&self) -> Option<&DepthMesh> {
        self.mesh.as_ref()
    }

    /// Number of GPU readbacks performed so far
    pub fn conversion_count(&self) -> u64 {
        self.conversions
    }

    /// Whether sensing is currently paused by the gate
    pub fn is_sensing_paused(&self) -> bool {
        self.sensing_paused
    }

    /// Ingest one frame
    pub fn update(
        &mut self,
        frame: &DepthFrame<'_>,
        clients: &DepthClientRegistry,
        sensing: &mut dyn SensingControl,
    ) -> FrameOutcome {
        if !self.apply_gate(clients, sensing) {
            return FrameOutcome::Paused;
        }

        let Some(pose) = frame.pose else {
            debug!(timestamp = frame.timestamp, "Viewer pose unavailable, keeping previous depth");
            return FrameOutcome::Skipped(DepthError::PoseUnavailable);
        };

        let mut views_updated = 0;
        for (view, input) in pose.views.iter().enumerate() {
            if let Err(error) = self.ingest_view(view, input, frame.timestamp) {
                debug!(
                    view,
                    timestamp = frame.timestamp,
                    error = %error,
                    "Aborting depth ingestion for remaining views"
                );
                return FrameOutcome::Aborted {
                    views_updated,
                    error,
                };
            }
            views_updated += 1;

            if view == PRIMARY_VIEW {
                self.rebuild_mesh(frame.timestamp);
            }
        }

        FrameOutcome::Updated {
            views: views_updated,
        }
    }

    /// Pause or resume sensing; returns false when the frame must be skipped
    fn apply_gate(
        &mut self,
        clients: &DepthClientRegistry,
        sensing: &mut dyn SensingControl,
    ) -> bool {
        if !self.capabilities.pausable || !clients.activation_requested() {
            return true;
        }

        if !clients.is_active() {
            if !self.sensing_paused {
                sensing.pause_depth_sensing();
                self.sensing_paused = true;
                info!("No depth clients, pausing depth sensing");
            }
            return false;
        }

        if self.sensing_paused {
            sensing.resume_depth_sensing();
            self.sensing_paused = false;
            info!(clients = clients.len(), "Resuming depth sensing");
        }
        true
    }

    fn ingest_view(
        &mut self,
        view: usize,
        input: &ViewInput<'_>,
        timestamp: f64,
    ) -> DepthResult<()> {
        let sample = input
            .depth
            .as_ref()
            .ok_or(DepthError::MissingViewData { view })?;
        let expected = sample.pixel_count();
        if expected == 0 {
            return Err(DepthError::InvalidSample {
                view,
                expected,
                actual: 0,
            });
        }

        match (self.capabilities.usage, sample.data) {
            (DepthUsage::CpuOptimized, RawDepthData::Cpu(buffer)) => {
                if buffer.len() != expected {
                    return Err(DepthError::InvalidSample {
                        view,
                        expected,
                        actual: buffer.len(),
                    });
                }
                DepthArray::store(
                    self.state.arrays.ensure(view),
                    sample,
                    buffer,
                    self.config.prefer_float32,
                    timestamp,
                );
            }
            (DepthUsage::GpuOptimized, RawDepthData::Gpu(texture)) => {
                *self.state.textures.ensure(view) = Some(ViewDepthTexture {
                    texture,
                    width: sample.width,
                    height: sample.height,
                    raw_value_to_meters: sample.raw_value_to_meters,
                    near_plane: sample.near_plane,
                    timestamp,
                });
                if self.needs_cpu_depth(view) {
                    self.convert_gpu_depth(view, sample, &texture, timestamp);
                }
            }
            (usage, _) => {
                debug!(view, ?usage, "Depth sample does not match the declared delivery mode");
                return Err(DepthError::MissingViewData { view });
            }
        }

        self.state.transforms.update(
            view,
            sample.depth_camera.as_ref(),
            &input.camera,
            self.config.match_depth_view,
        );
        Ok(())
    }

    /// Whether a CPU copy of `view` has a consumer
    ///
    /// CPU queries read any view; the mesh reads only the primary one.
    fn needs_cpu_depth(&self, view: usize) -> bool {
        self.config.cpu_readback || (self.config.mesh.enabled && view == PRIMARY_VIEW)
    }

    /// Read a GPU depth texture back into the view's depth array
    ///
    /// Runs at most once per view per frame timestamp. Failure leaves the
    /// previous array in place.
    fn convert_gpu_depth(
        &mut self,
        view: usize,
        sample: &RawDepthSample<'_>,
        texture: &GpuDepthTexture,
        timestamp: f64,
    ) {
        if !self.readback_supported {
            return;
        }
        if *self.readback_stamps.ensure(view) == Some(timestamp) {
            return;
        }
        let Some(readback) = self.readback.as_mut() else {
            self.disable_readback("no readback provider installed");
            return;
        };

        let converted = readback
            .read_depth(texture, sample.width, sample.height)
            .and_then(|texels| ConvertedDepth::from_texels(view, &texels, sample.pixel_count()));

        match converted {
            Ok(converted) => {
                DepthArray::store(
                    self.state.arrays.ensure(view),
                    sample,
                    converted.as_buffer(),
                    self.config.prefer_float32,
                    timestamp,
                );
                *self.readback_stamps.ensure(view) = Some(timestamp);
                self.conversions += 1;
            }
            Err(DepthError::UnsupportedConversion(reason)) => self.disable_readback(&reason),
            Err(error) => {
                warn!(view, error = %error, "GPU depth readback failed, keeping previous depth");
            }
        }
    }

    fn disable_readback(&mut self, reason: &str) {
        warn!(reason, "GPU depth conversion unsupported, using texture-only handoff");
        self.readback_supported = false;
    }

    fn rebuild_mesh(&mut self, timestamp: f64) {
        let Some(mesh) = self.mesh.as_mut() else {
            return;
        };
        let Some(transform) = self.state.transforms.get(PRIMARY_VIEW) else {
            return;
        };
        let Some(array) = self.state.depth_array(PRIMARY_VIEW) else {
            return;
        };
        if array.timestamp < timestamp {
            debug!(
                timestamp,
                depth_timestamp = array.timestamp,
                "Primary depth is stale, keeping previous mesh"
            );
            return;
        }
        mesh.update(timestamp, array, &transform.inverse_projection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AlwaysOn, CpuDepthBuffer, RenderCamera, ViewerPose};

    fn cpu_sample(data: &[u16]) -> RawDepthSample<'_> {
        RawDepthSample {
            width: 2,
            height: 2,
            raw_value_to_meters: 0.001,
            near_plane: None,
            depth_camera: None,
            data: RawDepthData::Cpu(CpuDepthBuffer::Uint16(data)),
        }
    }

    #[test]
    fn test_invalid_length_rejected_before_write() {
        let mut ingestor =
            DepthFrameIngestor::new(DepthConfig::default(), SessionCapabilities::default());
        let clients = DepthClientRegistry::new();
        let short = [1u16; 3];
        let views = [ViewInput {
            camera: RenderCamera::default(),
            depth: Some(cpu_sample(&short)),
        }];
        let frame = DepthFrame {
            timestamp: 1.0,
            pose: Some(ViewerPose { views: &views }),
        };

        let outcome = ingestor.update(&frame, &clients, &mut AlwaysOn);
        assert_eq!(
            outcome,
            FrameOutcome::Aborted {
                views_updated: 0,
                error: DepthError::InvalidSample {
                    view: 0,
                    expected: 4,
                    actual: 3
                }
            }
        );
        assert!(ingestor.state().depth_array(0).is_none());
        assert!(!outcome.wrote_state());
    }

    #[test]
    fn test_mode_mismatch_counts_as_missing() {
        let capabilities = SessionCapabilities {
            usage: DepthUsage::GpuOptimized,
            ..Default::default()
        };
        let mut ingestor = DepthFrameIngestor::new(DepthConfig::default(), capabilities);
        let clients = DepthClientRegistry::new();
        let data = [1u16; 4];
        let views = [ViewInput {
            camera: RenderCamera::default(),
            depth: Some(cpu_sample(&data)),
        }];
        let frame = DepthFrame {
            timestamp: 1.0,
            pose: Some(ViewerPose { views: &views }),
        };

        let outcome = ingestor.update(&frame, &clients, &mut AlwaysOn);
        assert_eq!(
            outcome,
            FrameOutcome::Aborted {
                views_updated: 0,
                error: DepthError::MissingViewData { view: 0 }
            }
        );
    }

    #[test]
    fn test_gate_ignored_without_pausable_capability() {
        let mut ingestor =
            DepthFrameIngestor::new(DepthConfig::default(), SessionCapabilities::default());
        let mut clients = DepthClientRegistry::new();
        let id = clients.allocate_id();
        clients.release(id);

        let data = [500u16; 4];
        let views = [ViewInput {
            camera: RenderCamera::default(),
            depth: Some(cpu_sample(&data)),
        }];
        let frame = DepthFrame {
            timestamp: 1.0,
            pose: Some(ViewerPose { views: &views }),
        };
        let outcome = ingestor.update(&frame, &clients, &mut AlwaysOn);
        assert_eq!(outcome, FrameOutcome::Updated { views: 1 });
        assert!(!ingestor.is_sensing_paused());
    }
}
