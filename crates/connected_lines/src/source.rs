//! Source images and cover-fit rasterisation.
//!
//! A [`SourceImage`] is decoded once per attach and fitted to the current region on every
//! pass with [`CoverFit`], which fills the region while preserving the aspect ratio and
//! cropping the overflow symmetrically.
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Perceptual brightness of an sRGB pixel, normalised to [0, 1].
#[inline]
pub fn luma(rgb: [u8; 3]) -> f64 {
    (0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64) / 255.0
}

/// Rounds half-way cases toward positive infinity, like canvas coordinate math.
#[inline]
fn round_half_up(v: f32) -> i64 {
    (v + 0.5).floor() as i64
}

/// A decoded RGBA image used to drive sampling density.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Wraps an already decoded RGBA buffer (`width * height * 4` bytes, row-major).
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(|pixels| Self { pixels })
            .ok_or(Error::ImageBuffer { width, height, len })
    }

    /// Decodes an encoded image (PNG or JPEG) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let pixels = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self { pixels })
    }

    /// Reads and decodes an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Placement of this image when covering a `width × height` region.
    ///
    /// Returns `None` when either the image or the region is empty.
    pub fn cover_fit(&self, width: u32, height: u32) -> Option<CoverFit> {
        CoverFit::new((self.width(), self.height()), (width, height))
    }

    /// Renders the image cover-fitted into a `width × height` frame.
    ///
    /// Only the part of the image that lands inside the region is cropped and scaled.
    /// Region pixels the scaled image does not reach stay fully transparent black.
    pub fn fit_to(&self, width: u32, height: u32) -> Option<RgbaImage> {
        let fit = self.cover_fit(width, height)?;
        let x = visible_span(self.width(), fit.size.0, fit.offset.0, width);
        let y = visible_span(self.height(), fit.size.1, fit.offset.1, height);
        let crop = imageops::crop_imm(&self.pixels, x.src.0, y.src.0, x.src_len(), y.src_len())
            .to_image();
        let scaled = imageops::resize(&crop, x.dst_len(), y.dst_len(), FilterType::Triangle);
        let mut frame = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        imageops::replace(&mut frame, &scaled, x.dst.0, y.dst.0);
        Some(frame)
    }
}

/// Source pixels along one axis that are visible in the region, and where they land.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Span {
    /// Half-open source pixel range.
    src: (u32, u32),
    /// Half-open region pixel range; may overhang the region by up to one scaled pixel.
    dst: (i64, i64),
}

impl Span {
    fn src_len(&self) -> u32 {
        self.src.1 - self.src.0
    }

    fn dst_len(&self) -> u32 {
        (self.dst.1 - self.dst.0).max(1) as u32
    }
}

/// Visible span of an axis `src` px long, scaled to `scaled` px and placed at `offset`
/// inside a region `region` px long. `src` and `scaled` must be non-zero.
fn visible_span(src: u32, scaled: u32, offset: i64, region: u32) -> Span {
    let k = scaled as f64 / src as f64;
    let first = ((-offset).max(0) as f64 / k).floor() as u32;
    let last = ((region as i64 - offset).min(scaled as i64) as f64 / k).ceil() as u32;
    let first = first.min(src - 1);
    let last = last.clamp(first + 1, src);
    let place = |i: u32| offset + (i as f64 * k).round() as i64;
    Span {
        src: (first, last),
        dst: (place(first), place(last)),
    }
}

/// Aspect-preserving "cover" placement of an image inside a region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the image.
    pub scale: f32,
    /// Scaled image size in whole px.
    pub size: (u32, u32),
    /// Top-left corner of the scaled image relative to the region; non-positive on the
    /// cropped axis.
    pub offset: (i64, i64),
}

impl CoverFit {
    pub fn new(image: (u32, u32), region: (u32, u32)) -> Option<Self> {
        let (iw, ih) = image;
        let (w, h) = region;
        if iw == 0 || ih == 0 || w == 0 || h == 0 {
            return None;
        }
        let scale = (w as f32 / iw as f32).max(h as f32 / ih as f32);
        let dw = round_half_up(iw as f32 * scale).max(1);
        let dh = round_half_up(ih as f32 * scale).max(1);
        let dx = round_half_up((w as f32 - dw as f32) / 2.0);
        let dy = round_half_up((h as f32 - dh as f32) / 2.0);
        Some(Self {
            scale,
            size: (dw as u32, dh as u32),
            offset: (dx, dy),
        })
    }
}
