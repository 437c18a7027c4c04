// SPDX-License-Identifier: GPL-3.0-only

//! Normalized per-view depth buffers
//!
//! Rows are stored bottom-to-top. Uint16 arrays keep raw units and are scaled
//! on read; Float32 arrays already hold meters. In both cases a single f32
//! multiply `raw * raw_value_to_meters` produces the meter value.

use crate::session::{CpuDepthBuffer, RawDepthSample};

/// Depth element storage
#[derive(Debug, Clone, PartialEq)]
pub enum DepthData {
    /// Raw 16-bit units
    Uint16(Vec<u16>),
    /// Meters
    Float32(Vec<f32>),
}

impl DepthData {
    pub fn len(&self) -> usize {
        match self {
            DepthData::Uint16(data) => data.len(),
            DepthData::Float32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The depth buffer actually queried for one view
#[derive(Debug, Clone, PartialEq)]
pub struct DepthArray {
    pub width: u32,
    pub height: u32,
    /// Scale from raw units to meters as delivered by the session
    pub raw_value_to_meters: f32,
    /// Hardware near-plane distance (meters), if reported
    pub near_plane: Option<f32>,
    pub data: DepthData,
    /// Timestamp of the frame that produced this data
    pub timestamp: f64,
}

impl DepthArray {
    /// Replace `slot` with the contents of `buffer`
    ///
    /// Size, scale and near plane come from `sample`. The buffer length must
    /// already be validated against `width * height`; this never fails, so a
    /// view is either fully overwritten or untouched. The previous allocation
    /// is reused when the representation matches.
    pub fn store(
        slot: &mut Option<DepthArray>,
        sample: &RawDepthSample<'_>,
        buffer: CpuDepthBuffer<'_>,
        prefer_float32: bool,
        timestamp: f64,
    ) {
        let raw_value_to_meters = sample.raw_value_to_meters;
        let previous = slot.take().map(|array| array.data);
        let data = match (buffer, prefer_float32) {
            (CpuDepthBuffer::Uint16(src), false) => {
                let mut dst = match previous {
                    Some(DepthData::Uint16(v)) => v,
                    _ => Vec::with_capacity(src.len()),
                };
                dst.clear();
                dst.extend_from_slice(src);
                DepthData::Uint16(dst)
            }
            (CpuDepthBuffer::Uint16(src), true) => fill_meters(
                previous,
                src.iter().map(|&raw| raw as f32 * raw_value_to_meters),
            ),
            (CpuDepthBuffer::Float32(src), _) => fill_meters(
                previous,
                src.iter().map(|&raw| raw * raw_value_to_meters),
            ),
        };

        *slot = Some(DepthArray {
            width: sample.width,
            height: sample.height,
            raw_value_to_meters,
            near_plane: sample.near_plane,
            data,
            timestamp,
        });
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Scale that turns stored texels into meters
    pub fn texel_scale(&self) -> f32 {
        match self.data {
            DepthData::Uint16(_) => self.raw_value_to_meters,
            DepthData::Float32(_) => 1.0,
        }
    }

    /// Depth in meters at a linear index
    pub fn meters_at(&self, index: usize) -> f32 {
        match &self.data {
            DepthData::Uint16(data) => data[index] as f32 * self.raw_value_to_meters,
            DepthData::Float32(data) => data[index],
        }
    }

    /// Nearest pixel for normalized `(u, v)`, `v` measured from the top
    ///
    /// Inputs are clamped, so the result is always below `pixel_count()` for a
    /// non-empty array.
    pub fn index_for_uv(&self, u: f32, v: f32) -> usize {
        let max_x = self.width.saturating_sub(1) as f32;
        let max_y = self.height.saturating_sub(1) as f32;
        let x = (u * self.width as f32).clamp(0.0, max_x).round() as usize;
        let y = ((1.0 - v) * self.height as f32).clamp(0.0, max_y).round() as usize;
        y * self.width as usize + x
    }

    /// Depth in meters at normalized `(u, v)`; 0 for an empty array
    pub fn sample_uv(&self, u: f32, v: f32) -> f32 {
        if self.pixel_count() == 0 || self.data.len() < self.pixel_count() {
            return 0.0;
        }
        self.meters_at(self.index_for_uv(u, v))
    }
}

fn fill_meters(
    previous: Option<DepthData>,
    values: impl ExactSizeIterator<Item = f32>,
) -> DepthData {
    let mut dst = match previous {
        Some(DepthData::Float32(v)) => v,
        _ => Vec::with_capacity(values.len()),
    };
    dst.clear();
    dst.extend(values);
    DepthData::Float32(dst)
}
