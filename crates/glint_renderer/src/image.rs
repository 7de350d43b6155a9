//! Floating-point image buffers and the running-mean blend.

use glint_math::Vec4;
use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};

/// RGBA colour, linear, one `f32` per channel.
pub type Rgba = Vec4;

/// Pixels per rayon work item in the blend.
const BLEND_CHUNK: usize = 4096;

/// Linear RGBA float image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl ImageBuffer {
    /// Allocate a buffer filled with transparent black.
    ///
    /// Fails with [`RenderError::Allocation`] instead of aborting when the
    /// pixel storage cannot be reserved.
    pub fn try_new(width: u32, height: u32) -> RenderResult<Self> {
        let alloc_error = || RenderError::Allocation { width, height };

        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(alloc_error)?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| alloc_error())?;
        pixels.resize(len, Rgba::ZERO);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A 0x0 buffer, used before the first allocation.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Fold `sample` into this buffer as the `(sample_count + 1)`th term of
    /// a running mean:
    ///
    /// `self = self * n/(n+1) + sample * 1/(n+1)`
    ///
    /// With `sample_count == 0` the buffer becomes a copy of `sample`.
    /// Stale contents are overwritten, not scaled, so a NaN or infinity left
    /// by an earlier frame does not survive a reset.
    pub fn blend_running_mean(&mut self, sample: &ImageBuffer, sample_count: u32) {
        debug_assert_eq!(self.size(), sample.size());

        if sample_count == 0 {
            self.pixels.copy_from_slice(&sample.pixels);
            return;
        }

        let n = sample_count as f32;
        let keep = n / (n + 1.0);
        let add = 1.0 / (n + 1.0);

        self.pixels
            .par_chunks_mut(BLEND_CHUNK)
            .zip(sample.pixels.par_chunks(BLEND_CHUNK))
            .for_each(|(acc, new)| {
                for (a, s) in acc.iter_mut().zip(new) {
                    *a = *a * keep + *s * add;
                }
            });
    }

    /// Convert to gamma-corrected RGBA bytes (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear colour to 8-bit RGBA. Alpha is forced opaque.
pub fn color_to_rgba(color: Rgba) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_size() {
        let image = ImageBuffer::try_new(8, 4).unwrap();
        assert_eq!(image.pixels.len(), 32);
        assert!(image.pixels.iter().all(|p| *p == Rgba::ZERO));
    }

    #[test]
    fn test_try_new_huge_fails() {
        let result = ImageBuffer::try_new(u32::MAX, u32::MAX);
        assert!(matches!(
            result,
            Err(RenderError::Allocation { width: u32::MAX, height: u32::MAX })
        ));
    }

    #[test]
    fn test_first_blend_copies_sample() {
        let mut acc = ImageBuffer::try_new(3, 3).unwrap();
        acc.fill(Rgba::splat(9.0));
        let mut sample = ImageBuffer::try_new(3, 3).unwrap();
        sample.fill(Rgba::new(0.2, 0.4, 0.6, 1.0));

        acc.blend_running_mean(&sample, 0);
        assert_eq!(acc, sample);
    }

    #[test]
    fn test_first_blend_discards_non_finite() {
        let mut acc = ImageBuffer::try_new(2, 2).unwrap();
        acc.fill(Rgba::new(f32::NAN, f32::INFINITY, f32::NEG_INFINITY, f32::NAN));
        let mut sample = ImageBuffer::try_new(2, 2).unwrap();
        sample.fill(Rgba::splat(0.5));

        acc.blend_running_mean(&sample, 0);
        assert_eq!(acc, sample);
    }

    #[test]
    fn test_running_mean_equals_arithmetic_mean() {
        let values = [0.1_f32, 0.9, 0.4, 0.25, 0.7];
        let mut acc = ImageBuffer::try_new(2, 2).unwrap();
        let mut sample = ImageBuffer::try_new(2, 2).unwrap();

        for (n, v) in values.iter().enumerate() {
            sample.fill(Rgba::splat(*v));
            acc.blend_running_mean(&sample, n as u32);
        }

        let mean = values.iter().sum::<f32>() / values.len() as f32;
        for pixel in &acc.pixels {
            assert!((pixel.x - mean).abs() < 1e-5);
        }
    }

    #[test]
    fn test_blend_spans_multiple_chunks() {
        let mut acc = ImageBuffer::try_new(100, 100).unwrap();
        let mut sample = ImageBuffer::try_new(100, 100).unwrap();
        sample.fill(Rgba::ONE);
        acc.blend_running_mean(&sample, 0);
        sample.fill(Rgba::ZERO);
        acc.blend_running_mean(&sample, 1);

        assert!(acc.pixels.iter().all(|p| (p.x - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Rgba::new(4.0, -1.0, 0.25, 0.0)), [255, 0, 127, 255]);
    }
}
