//! Point sampling for the connected-lines field.
//!
//! This module defines the [`Point`] produced by a sampling pass, the seedable [`Lcg`]
//! generator that drives it, the [`BrightnessField`] seam through which images feed
//! density, and the [`PointFieldSampler`] itself.
use glam::Vec2;
use image::RgbaImage;
use rand::RngCore;

use crate::source::luma;

pub mod point_field;

pub use point_field::PointFieldSampler;

/// A sampled point with the brightness of the pixel it was drawn from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Jittered position in region px.
    pub position: Vec2,
    /// Brightness in [0, 1] of the grid position before jitter.
    pub brightness: f32,
}

impl Point {
    pub fn new(position: Vec2, brightness: f32) -> Self {
        Self {
            position,
            brightness,
        }
    }
}

/// Brightness lookup in region pixel coordinates.
pub trait BrightnessField {
    /// Brightness in [0, 1] at integer region position `(x, y)`.
    fn brightness(&self, x: u32, y: u32) -> f64;
}

/// A field with the same brightness everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformField(pub f64);

impl UniformField {
    /// The neutral midpoint used when no image is available.
    pub const NEUTRAL: UniformField = UniformField(0.5);
}

impl Default for UniformField {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl BrightnessField for UniformField {
    #[inline]
    fn brightness(&self, _x: u32, _y: u32) -> f64 {
        self.0
    }
}

/// A cover-fitted frame. Pixels outside the frame and fully transparent pixels read as
/// black; any other pixel reads its straight colour, as a canvas read-back does.
impl BrightnessField for RgbaImage {
    #[inline]
    fn brightness(&self, x: u32, y: u32) -> f64 {
        match self.get_pixel_checked(x, y) {
            Some(p) if p.0[3] > 0 => luma([p.0[0], p.0[1], p.0[2]]),
            _ => 0.0,
        }
    }
}

/// Linear congruential generator (`s = 1664525 * s + 1013904223 mod 2^32`).
///
/// Fast and reproducible for a given seed; not suitable for anything but visual noise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub const MULTIPLIER: u32 = 1_664_525;
    pub const INCREMENT: u32 = 1_013_904_223;

    /// Creates a generator. A zero seed is replaced by `1`.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Next uniform value in [0, 1).
    #[inline]
    pub fn next_unit(&mut self) -> f64 {
        unit(self)
    }
}

impl RngCore for Lcg {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Generate a random value in [0, 1) from the next 32 bits of `rng`.
///
/// Computed in `f64` so the largest draw stays strictly below `1.0`.
#[inline]
pub(crate) fn unit(rng: &mut dyn RngCore) -> f64 {
    rng.next_u32() as f64 / 4_294_967_296.0
}
