// SPDX-License-Identifier: GPL-3.0-only

//! Depth sensing core
//!
//! ```text
//! ┌──────────────────────┐
//! │     DepthSensing     │  ← explicitly owned, composes the parts below
//! └──────────┬───────────┘
//!            │
//!     ┌──────┴───────┬──────────────────┐
//!     ▼              ▼                  ▼
//! DepthClient   DepthFrameIngestor   DepthQuery / OcclusionHandoff
//! Registry      (owns DepthState)    (read-only views of DepthState)
//! ```

mod arena;
mod array;
mod clients;
mod convert;
mod ingestor;
mod mesh;
mod occlusion;
mod query;
mod state;
mod transforms;
pub mod visualization;

pub use arena::ViewArena;
pub use array::{DepthArray, DepthData};
pub use clients::{ClientId, DepthClientRegistry};
pub use convert::ConvertedDepth;
pub use ingestor::{DepthFrameIngestor, FrameOutcome};
pub use mesh::DepthMesh;
pub use occlusion::{DepthTextureRef, OcclusionHandoff, OcclusionHandoffRecord, OcclusionUniforms};
pub use query::{DepthQuery, unproject_uv};
pub use state::{DepthState, ViewDepthTexture};
pub use transforms::{TransformSource, ViewTransformState, ViewTransforms};

use crate::config::{DepthConfig, SessionCapabilities};
use crate::session::{DepthFrame, DepthReadback, SensingControl};

/// Depth sensing for one immersive session
///
/// Created when the session starts and passed by reference to whatever
/// drives the frame loop.
pub struct DepthSensing {
    clients: DepthClientRegistry,
    ingestor: DepthFrameIngestor,
}

impl DepthSensing {
    pub fn new(config: DepthConfig, capabilities: SessionCapabilities) -> Self {
        Self {
            clients: DepthClientRegistry::new(),
            ingestor: DepthFrameIngestor::new(config, capabilities),
        }
    }

    /// Install the platform's GPU → CPU depth conversion
    pub fn with_readback(mut self, readback: Box<dyn DepthReadback>) -> Self {
        self.ingestor.set_readback(readback);
        self
    }

    /// Ingest one frame
    pub fn update(
        &mut self,
        frame: &DepthFrame<'_>,
        sensing: &mut dyn SensingControl,
    ) -> FrameOutcome {
        self.ingestor.update(frame, &self.clients, sensing)
    }

    /// New client identity
    pub fn allocate_client(&mut self) -> ClientId {
        self.clients.allocate_id()
    }

    /// Register a consumer that needs depth sensing active
    pub fn acquire(&mut self, client: ClientId) -> bool {
        self.clients.acquire(client)
    }

    /// Unregister a consumer
    pub fn release(&mut self, client: ClientId) -> bool {
        self.clients.release(client)
    }

    pub fn clients(&self) -> &DepthClientRegistry {
        &self.clients
    }

    pub fn ingestor(&self) -> &DepthFrameIngestor {
        &self.ingestor
    }

    pub fn state(&self) -> &DepthState {
        self.ingestor.state()
    }

    /// Queries against the primary view
    pub fn query(&self) -> DepthQuery<'_> {
        DepthQuery::new(self.ingestor.state())
    }

    /// Queries against any view
    pub fn query_view(&self, view: usize) -> DepthQuery<'_> {
        DepthQuery::for_view(self.ingestor.state(), view)
    }

    /// Occlusion handoff for the current frame
    pub fn occlusion(&self) -> OcclusionHandoff<'_> {
        OcclusionHandoff::new(
            self.ingestor.state(),
            self.ingestor.config().depth_texture_enabled,
            self.ingestor.capabilities().usage,
        )
    }

    /// Depth texture and metadata for `view`, if textures are enabled
    pub fn handoff_for(&self, view: usize) -> Option<OcclusionHandoffRecord<'_>> {
        self.occlusion().handoff_for(view)
    }

    pub fn mesh(&self) -> Option<&DepthMesh> {
        self.ingestor.mesh()
    }
}
