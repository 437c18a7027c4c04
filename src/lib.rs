// SPDX-License-Identifier: GPL-3.0-only

//! Depth sensing for immersive sessions
//!
//! Turns per-frame raw range samples into queryable depth, keeps the
//! view/projection state needed to interpret them, reconciles CPU buffers and
//! GPU textures, and gates sensing hardware on registered consumers.
//!
//! # Architecture
//!
//! - [`session`]: what the immersive session supplies each frame
//! - [`depth`]: ingestion, transforms, queries, client gating, occlusion handoff
//! - [`config`]: configuration and the session capability descriptor
//! - [`errors`]: error types
//!
//! # Example
//!
//! ```ignore
//! let mut depth = DepthSensing::new(DepthConfig::default(), capabilities);
//! let client = depth.allocate_client();
//! depth.acquire(client);
//! // once per frame
//! depth.update(&frame, &mut session);
//! let meters = depth.query().sample_depth(0.5, 0.5);
//! ```

pub mod config;
pub mod constants;
pub mod depth;
pub mod errors;
pub mod session;

// Re-export commonly used types
pub use config::{DepthConfig, DepthDataFormat, DepthUsage, SessionCapabilities};
pub use depth::{ClientId, DepthQuery, DepthSensing, FrameOutcome, OcclusionHandoffRecord};
pub use errors::{DepthError, DepthResult};
