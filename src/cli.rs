// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Running a synthetic session through the depth core
//! - Printing the effective configuration

use depth_sense::config::{DepthConfig, DepthDataFormat, DepthUsage, SessionCapabilities};
use depth_sense::constants::{VISUALIZATION_MAX_M, VISUALIZATION_MIN_M};
use depth_sense::depth::visualization::{VisualizationRange, save_depth_png};
use depth_sense::depth::{DepthTextureRef, FrameOutcome};
use depth_sense::errors::{DepthError, DepthResult};
use depth_sense::session::{
    CpuDepthBuffer, DepthFrame, DepthReadback, DepthTexels, GpuDepthTexture, RawDepthData,
    RawDepthSample, RenderCamera, SensingControl, TextureHandle, ViewInput, ViewerPose,
};
use depth_sense::DepthSensing;
use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};
use tracing::info;

const DEPTH_WIDTH: u32 = 160;
const DEPTH_HEIGHT: u32 = 120;
/// Raw units are millimeters
const RAW_VALUE_TO_METERS: f32 = 0.001;
const EYE_SEPARATION_M: f32 = 0.064;
const NEAR_PLANE_M: f32 = 0.1;
const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;
/// Every Nth frame loses tracking
const POSE_DROPOUT_INTERVAL: u32 = 15;

/// Options for the `simulate` command
pub struct SimulationOptions {
    pub frames: u32,
    pub views: usize,
    pub gpu: bool,
    pub mesh: bool,
    pub png: Option<PathBuf>,
    pub grayscale: bool,
}

/// Load the configuration file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> DepthResult<DepthConfig> {
    match path {
        Some(path) => DepthConfig::load(path),
        None => Ok(DepthConfig::default()),
    }
}

/// Print the effective configuration as JSON
pub fn print_config(config: &DepthConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

/// Synthetic room: a floor-to-wall ramp from 1 m (bottom rows) to 4 m (top rows)
fn synthetic_depth_mm(row: u32, frame: u32) -> u16 {
    let t = row as f32 / (DEPTH_HEIGHT - 1) as f32;
    let sway = (frame as f32 * 0.1).sin() * 20.0;
    (1000.0 + t * 3000.0 + sway) as u16
}

fn synthetic_frame_mm(frame: u32) -> Vec<u16> {
    (0..DEPTH_HEIGHT)
        .flat_map(|row| std::iter::repeat_n(synthetic_depth_mm(row, frame), DEPTH_WIDTH as usize))
        .collect()
}

/// Session stand-in that records pause/resume requests
#[derive(Default)]
struct SyntheticSession {
    paused: bool,
    pauses: u32,
    resumes: u32,
}

impl SensingControl for SyntheticSession {
    fn pause_depth_sensing(&mut self) {
        self.paused = true;
        self.pauses += 1;
    }

    fn resume_depth_sensing(&mut self) {
        self.paused = false;
        self.resumes += 1;
    }
}

/// Reads "GPU" textures back by regenerating the synthetic room
struct SyntheticReadback;

impl DepthReadback for SyntheticReadback {
    fn read_depth(
        &mut self,
        texture: &GpuDepthTexture,
        width: u32,
        height: u32,
    ) -> DepthResult<DepthTexels> {
        if (width, height) != (DEPTH_WIDTH, DEPTH_HEIGHT) {
            return Err(DepthError::UnsupportedConversion(format!(
                "unexpected texture size {}x{}",
                width, height
            )));
        }
        // The texture handle carries the frame number
        let frame = (texture.handle.0 >> 8) as u32;
        Ok(DepthTexels {
            format: DepthDataFormat::Uint16,
            bytes: bytemuck::cast_slice::<u16, u8>(&synthetic_frame_mm(frame)).to_vec(),
        })
    }
}

fn eye_camera(view: usize, views: usize) -> RenderCamera {
    let aspect = DEPTH_WIDTH as f32 / DEPTH_HEIGHT as f32;
    let projection = Mat4::perspective_rh_gl(1.2, aspect, NEAR_PLANE_M, 20.0);
    let offset = if views > 1 {
        (view as f32 - 0.5) * EYE_SEPARATION_M
    } else {
        0.0
    };
    RenderCamera::from_world(projection, Mat4::from_translation(Vec3::new(offset, 1.6, 0.0)))
}

#[derive(Default)]
struct OutcomeCounts {
    updated: u32,
    paused: u32,
    skipped: u32,
    aborted: u32,
    /// Frames that committed at least one view
    written: u32,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: &FrameOutcome) {
        if outcome.wrote_state() {
            self.written += 1;
        }
        match outcome {
            FrameOutcome::Updated { .. } => self.updated += 1,
            FrameOutcome::Paused => self.paused += 1,
            FrameOutcome::Skipped(_) => self.skipped += 1,
            FrameOutcome::Aborted { .. } => self.aborted += 1,
        }
    }
}

/// Run the depth core against a synthetic session
pub fn simulate(
    mut config: DepthConfig,
    options: SimulationOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if options.mesh {
        config.mesh.enabled = true;
    }
    let capabilities = SessionCapabilities {
        pausable: true,
        usage: if options.gpu {
            DepthUsage::GpuOptimized
        } else {
            DepthUsage::CpuOptimized
        },
        data_format: DepthDataFormat::Uint16,
        gpu_readback: true,
    };

    let mut depth =
        DepthSensing::new(config, capabilities).with_readback(Box::new(SyntheticReadback));
    let mut session = SyntheticSession::default();
    let client = depth.allocate_client();
    depth.acquire(client);

    // The client steps away for a stretch in the middle of the run
    let release_at = options.frames / 2;
    let reacquire_at = options.frames * 3 / 4;

    let cameras: Vec<RenderCamera> = (0..options.views)
        .map(|view| eye_camera(view, options.views))
        .collect();
    let mut counts = OutcomeCounts::default();

    info!(frames = options.frames, views = options.views, gpu = options.gpu, "Starting simulation");

    for frame in 0..options.frames {
        if frame == release_at {
            depth.release(client);
        }
        if frame == reacquire_at {
            depth.acquire(client);
        }

        let raw = synthetic_frame_mm(frame);
        let views: Vec<ViewInput<'_>> = cameras
            .iter()
            .enumerate()
            .map(|(view, camera)| ViewInput {
                camera: *camera,
                depth: Some(RawDepthSample {
                    width: DEPTH_WIDTH,
                    height: DEPTH_HEIGHT,
                    raw_value_to_meters: RAW_VALUE_TO_METERS,
                    near_plane: Some(NEAR_PLANE_M),
                    depth_camera: None,
                    data: if options.gpu {
                        RawDepthData::Gpu(GpuDepthTexture {
                            handle: TextureHandle(((frame as u64) << 8) | view as u64),
                        })
                    } else {
                        RawDepthData::Cpu(CpuDepthBuffer::Uint16(&raw))
                    },
                }),
            })
            .collect();

        let tracking_lost = frame > 0 && frame % POSE_DROPOUT_INTERVAL == 0;
        let depth_frame = DepthFrame {
            timestamp: frame as f64 * FRAME_INTERVAL_MS,
            pose: (!tracking_lost).then_some(ViewerPose { views: &views }),
        };

        let outcome = depth.update(&depth_frame, &mut session);
        counts.record(&outcome);
    }

    println!("Frames:   {}", options.frames);
    println!(
        "Outcomes: {} updated, {} paused, {} skipped, {} aborted ({} wrote depth)",
        counts.updated, counts.paused, counts.skipped, counts.aborted, counts.written
    );
    println!(
        "Sensing:  {} pause(s), {} resume(s), currently {}",
        session.pauses,
        session.resumes,
        if session.paused { "paused" } else { "active" }
    );
    println!(
        "Views:    {} tracked, {} GPU readback(s)",
        depth.state().view_count(),
        depth.ingestor().conversion_count()
    );

    let query = depth.query();
    println!("Depth at center:   {:.3} m", query.sample_depth(0.5, 0.5));
    if let Some(point) = query.unproject_to_view_space(0.5, 0.5) {
        println!("View-space center: {:.3} {:.3} {:.3}", point.x, point.y, point.z);
    }
    if let Some(point) = query.unproject_to_world(0.5, 0.5) {
        println!("World-space center: {:.3} {:.3} {:.3}", point.x, point.y, point.z);
    }
    let probe = Vec3::new(0.2, 1.4, -2.0);
    if let Some(surface) = query.project_world_position_to_view_space(probe) {
        println!(
            "Surface behind {:?}: {:.3} {:.3} {:.3}",
            probe, surface.x, surface.y, surface.z
        );
    }

    for view in 0..depth.state().view_count() {
        match depth.handoff_for(view) {
            Some(record) => {
                let source = match record.texture {
                    DepthTextureRef::Gpu(handle) => format!("gpu texture {:#x}", handle.0),
                    DepthTextureRef::Cpu(array) => {
                        format!("cpu array {}x{}", array.width, array.height)
                    }
                };
                println!(
                    "Handoff view {}: {}, scale {}, near plane {:?}",
                    view, source, record.raw_value_to_meters, record.near_plane
                );
            }
            None => println!("Handoff view {}: none", view),
        }
    }

    if let Some(mesh) = depth.mesh() {
        let (columns, rows) = mesh.grid_size();
        println!(
            "Mesh:     {}x{} grid, {} vertices, {} triangles, {} rebuild(s)",
            columns,
            rows,
            mesh.vertices().len(),
            mesh.triangle_count(),
            mesh.rebuild_count()
        );
    }

    if let Some(path) = options.png {
        let array = depth
            .state()
            .depth_array(0)
            .ok_or_else(|| DepthError::Io("no CPU depth to visualize".to_string()))?;
        save_depth_png(
            &path,
            array,
            VisualizationRange {
                min_m: VISUALIZATION_MIN_M,
                max_m: VISUALIZATION_MAX_M,
                quantize: true,
                grayscale: options.grayscale,
            },
        )?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
