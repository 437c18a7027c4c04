// SPDX-License-Identifier: GPL-3.0-only

//! GPU texel readback to CPU-queryable depth

use crate::config::DepthDataFormat;
use crate::errors::{DepthError, DepthResult};
use crate::session::{CpuDepthBuffer, DepthTexels};

/// Texels reinterpreted as typed samples
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedDepth {
    Uint16(Vec<u16>),
    Float32(Vec<f32>),
}

impl ConvertedDepth {
    /// Reinterpret raw texel bytes, checking the sample count
    ///
    /// The byte vector has no alignment guarantee, so the samples are copied
    /// out rather than cast in place.
    pub fn from_texels(view: usize, texels: &DepthTexels, expected: usize) -> DepthResult<Self> {
        let bytes_per_sample = texels.format.bytes_per_sample();
        if texels.bytes.len() != expected * bytes_per_sample {
            return Err(DepthError::InvalidSample {
                view,
                expected,
                actual: texels.bytes.len() / bytes_per_sample,
            });
        }

        Ok(match texels.format {
            DepthDataFormat::Uint16 => {
                ConvertedDepth::Uint16(bytemuck::pod_collect_to_vec(texels.bytes.as_slice()))
            }
            DepthDataFormat::Float32 => {
                ConvertedDepth::Float32(bytemuck::pod_collect_to_vec(texels.bytes.as_slice()))
            }
        })
    }

    /// Borrow as a CPU depth buffer
    pub fn as_buffer(&self) -> CpuDepthBuffer<'_> {
        match self {
            ConvertedDepth::Uint16(data) => CpuDepthBuffer::Uint16(data),
            ConvertedDepth::Float32(data) => CpuDepthBuffer::Float32(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint16_texels() {
        let samples = [1000u16, 2000, 3000, 4000];
        let texels = DepthTexels {
            format: DepthDataFormat::Uint16,
            bytes: bytemuck::cast_slice::<u16, u8>(&samples).to_vec(),
        };
        let converted = ConvertedDepth::from_texels(0, &texels, 4).unwrap();
        assert_eq!(converted, ConvertedDepth::Uint16(samples.to_vec()));
        assert_eq!(converted.as_buffer().len(), 4);
    }

    #[test]
    fn test_float32_texels() {
        let samples = [0.5f32, 1.25];
        let texels = DepthTexels {
            format: DepthDataFormat::Float32,
            bytes: bytemuck::cast_slice::<f32, u8>(&samples).to_vec(),
        };
        let converted = ConvertedDepth::from_texels(0, &texels, 2).unwrap();
        assert_eq!(converted, ConvertedDepth::Float32(samples.to_vec()));
    }

    #[test]
    fn test_size_mismatch() {
        let texels = DepthTexels {
            format: DepthDataFormat::Float32,
            bytes: vec![0; 12],
        };
        let err = ConvertedDepth::from_texels(1, &texels, 4).unwrap_err();
        assert_eq!(
            err,
            DepthError::InvalidSample {
                view: 1,
                expected: 4,
                actual: 3
            }
        );
    }
}
