//! Height map derivation.
//!
//! A color image is collapsed to one channel with fixed weights and the result
//! is stretched so the darkest raw value becomes 0 and the brightest 255.
//! Both stages truncate toward zero when going from `f64` back to `u8`; they
//! never round.

use image::{GrayImage, RgbImage};
use rayon::prelude::*;

pub const RED_WEIGHT: f64 = 0.7;
pub const GREEN_WEIGHT: f64 = 0.2;
pub const BLUE_WEIGHT: f64 = 0.0;

/// Summary of one derivation, used for logging and the result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightmapStats {
    pub width: u32,
    pub height: u32,
    pub raw_min: u8,
    pub raw_max: u8,
}

impl HeightmapStats {
    /// True when the raw buffer had no range to stretch and the height map is all zero.
    pub fn is_uniform(&self) -> bool {
        self.raw_min == self.raw_max
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Raw weighted value of a single pixel.
#[inline]
pub fn raw_height(r: u8, g: u8, b: u8) -> u8 {
    // Sum is at most 229.5, so the cast only truncates.
    (RED_WEIGHT * f64::from(r) + GREEN_WEIGHT * f64::from(g) + BLUE_WEIGHT * f64::from(b)) as u8
}

/// Collapses `image` into the raw (unstretched) weighted buffer.
pub fn weighted_raw(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut raw = GrayImage::new(width, height);

    let dst: &mut [u8] = &mut raw;
    dst.par_iter_mut()
        .zip(image.as_raw().par_chunks_exact(3))
        .for_each(|(out, px)| *out = raw_height(px[0], px[1], px[2]));

    raw
}

/// Smallest and largest value in the buffer, `None` for an empty buffer.
pub fn value_range(buffer: &GrayImage) -> Option<(u8, u8)> {
    let values = buffer.as_raw();
    let lo = values.par_iter().copied().min()?;
    let hi = values.par_iter().copied().max()?;
    Some((lo, hi))
}

/// Stretches `buffer` to the full 0..=255 range.
///
/// A uniform buffer has nothing to stretch and maps to all zeros.
pub fn normalize(buffer: &GrayImage) -> GrayImage {
    let (width, height) = buffer.dimensions();
    match value_range(buffer) {
        Some((lo, hi)) if hi != lo => stretch(buffer, lo, hi),
        _ => GrayImage::new(width, height),
    }
}

fn stretch(buffer: &GrayImage, lo: u8, hi: u8) -> GrayImage {
    let (width, height) = buffer.dimensions();
    let span = f64::from(hi - lo);
    let mut out = GrayImage::new(width, height);

    let dst: &mut [u8] = &mut out;
    dst.par_iter_mut()
        .zip(buffer.as_raw().par_iter())
        .for_each(|(px, &v)| *px = (f64::from(v - lo) / span * 255.0) as u8);

    out
}

/// Derives the normalized height map of `image`.
pub fn derive(image: &RgbImage) -> GrayImage {
    derive_with_stats(image).0
}

pub fn derive_with_stats(image: &RgbImage) -> (GrayImage, HeightmapStats) {
    let raw = weighted_raw(image);
    let (raw_min, raw_max) = value_range(&raw).unwrap_or((0, 0));
    let stats = HeightmapStats {
        width: raw.width(),
        height: raw.height(),
        raw_min,
        raw_max,
    };

    let heightmap = if stats.is_uniform() {
        GrayImage::new(stats.width, stats.height)
    } else {
        stretch(&raw, raw_min, raw_max)
    };

    tracing::debug!(
        width = stats.width,
        height = stats.height,
        raw_min,
        raw_max,
        uniform = stats.is_uniform(),
        "derived height map"
    );
    (heightmap, stats)
}
