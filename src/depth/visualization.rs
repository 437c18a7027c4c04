// SPDX-License-Identifier: GPL-3.0-only

//! Depth visualization helpers
//!
//! Renders a depth array as RGBA for debugging:
//! - Turbo colormap (blue=near, red=far)
//! - Grayscale (bright=near, dark=far)
//!
//! Output rows run top-to-bottom, so the bottom-up depth rows are flipped.

use super::array::DepthArray;
use crate::constants::{DEPTH_COLORMAP_BANDS, DEPTH_INVALID_M};
use crate::errors::{DepthError, DepthResult};
use std::path::Path;

/// Turbo colormap: perceptually uniform rainbow (blue=near, red=far)
///
/// Based on: https://ai.googleblog.com/2019/08/turbo-improved-rainbow-colormap-for.html
/// Simplified version with polynomial approximation.
#[inline]
fn turbo(t: f32) -> [u8; 4] {
    let r = (0.13572138
        + t * (4.6153926 + t * (-42.66032 + t * (132.13108 + t * (-152.54825 + t * 59.28144)))))
        .clamp(0.0, 1.0);
    let g = (0.09140261
        + t * (2.19418 + t * (4.84296 + t * (-14.18503 + t * (4.27805 + t * 2.53377)))))
        .clamp(0.0, 1.0);
    let b = (0.1066733
        + t * (12.64194 + t * (-60.58204 + t * (109.99648 + t * (-82.52904 + t * 20.43388)))))
        .clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255]
}

/// Visualization options
#[derive(Debug, Clone, Copy)]
pub struct VisualizationRange {
    /// Depth mapped to the near end of the colormap (meters)
    pub min_m: f32,
    /// Depth mapped to the far end of the colormap (meters)
    pub max_m: f32,
    /// Quantize to bands for smoother visualization
    pub quantize: bool,
    /// Grayscale instead of colormap
    pub grayscale: bool,
}

/// Convert a depth array to RGBA (4 bytes per pixel, top row first)
pub fn depth_to_rgba(array: &DepthArray, range: VisualizationRange) -> Vec<u8> {
    let width = array.width as usize;
    let height = array.height as usize;
    let mut rgba = Vec::with_capacity(array.pixel_count() * 4);
    if array.data.len() < array.pixel_count() {
        return rgba;
    }
    let span = (range.max_m - range.min_m).max(f32::EPSILON);

    for row in (0..height).rev() {
        for column in 0..width {
            let depth = array.meters_at(row * width + column);
            if depth <= DEPTH_INVALID_M || !depth.is_finite() {
                // Invalid depth - black
                rgba.extend_from_slice(&[0, 0, 0, 255]);
                continue;
            }

            let mut t = ((depth - range.min_m) / span).clamp(0.0, 1.0);
            if range.quantize {
                t = (t * DEPTH_COLORMAP_BANDS).floor() / DEPTH_COLORMAP_BANDS;
            }

            if range.grayscale {
                let gray = ((1.0 - t) * 255.0) as u8;
                rgba.extend_from_slice(&[gray, gray, gray, 255]);
            } else {
                rgba.extend_from_slice(&turbo(t));
            }
        }
    }
    rgba
}

/// Write a depth visualization as PNG
pub fn save_depth_png(
    path: &Path,
    array: &DepthArray,
    range: VisualizationRange,
) -> DepthResult<()> {
    let rgba = depth_to_rgba(array, range);
    let image = image::RgbaImage::from_raw(array.width, array.height, rgba).ok_or_else(|| {
        DepthError::Io(format!(
            "depth buffer too small for {}x{} image",
            array.width, array.height
        ))
    })?;
    image.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::DepthData;

    fn range(grayscale: bool) -> VisualizationRange {
        VisualizationRange {
            min_m: 0.5,
            max_m: 4.0,
            quantize: false,
            grayscale,
        }
    }

    #[test]
    fn test_depth_invalid() {
        let array = DepthArray {
            width: 2,
            height: 2,
            raw_value_to_meters: 0.001,
            near_plane: None,
            data: DepthData::Uint16(vec![0; 4]),
            timestamp: 0.0,
        };
        let rgba = depth_to_rgba(&array, range(false));
        // All invalid pixels should be black
        for chunk in rgba.chunks(4) {
            assert_eq!(chunk, &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_depth_grayscale_flipped() {
        // Bottom row near, top row far
        let array = DepthArray {
            width: 1,
            height: 2,
            raw_value_to_meters: 1.0,
            near_plane: None,
            data: DepthData::Float32(vec![0.5, 4.0]),
            timestamp: 0.0,
        };
        let rgba = depth_to_rgba(&array, range(true));
        // First output row is the top (far, dark)
        assert!(rgba[0] < 50);
        // Second output row is the bottom (near, bright)
        assert!(rgba[4] > 200);
    }
}
