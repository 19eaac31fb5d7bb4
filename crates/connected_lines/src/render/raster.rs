//! Software surface backed by an [`RgbaImage`].
//!
//! Lines and circles are rasterised with a one-pixel coverage ramp at their edges and
//! composited source-over with straight alpha.
use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::error::Result;
use crate::render::surface::Surface;
use crate::source::SourceImage;

/// Raster surface drawing into an in-memory RGBA image.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    canvas: RgbaImage,
    scale: f32,
    background: Rgba<u8>,
    detached: bool,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface {
    /// Creates an empty, transparent surface. Size it with [`Surface::resize`].
    pub fn new() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            scale: 1.0,
            background: Rgba([0, 0, 0, 0]),
            detached: false,
        }
    }

    /// Uses an opaque colour instead of transparency when clearing.
    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Writes the current content as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.canvas
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, rgb: [u8; 3], alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let dst = self.canvas.get_pixel_mut(x, y);
        let sa = alpha.min(1.0);
        let da = dst.0[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let sc = rgb[c] as f32;
            let dc = dst.0[c] as f32;
            dst.0[c] = ((sc * sa + dc * da * (1.0 - sa)) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Device pixel rows and columns touched by a shape with the given logical bounds.
    fn device_span(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.canvas.dimensions();
        if w == 0 || h == 0 || self.detached {
            return None;
        }
        let lo = (min * self.scale).floor();
        let hi = (max * self.scale).ceil();
        if hi.x < 0.0 || hi.y < 0.0 || lo.x >= w as f32 || lo.y >= h as f32 {
            return None;
        }
        let x0 = lo.x.max(0.0) as u32;
        let y0 = lo.y.max(0.0) as u32;
        let x1 = (hi.x as u32).min(w - 1);
        let y1 = (hi.y as u32).min(h - 1);
        Some((x0, y0, x1, y1))
    }

    /// Composites a coverage function over the device pixels of a shape's bounds.
    fn cover<F>(&mut self, min: Vec2, max: Vec2, color: Color, coverage: F)
    where
        F: Fn(Vec2) -> f32,
    {
        let Some((x0, y0, x1, y1)) = self.device_span(min, max) else {
            return;
        };
        let rgb = color.channels();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let c = coverage(center);
                if c > 0.0 {
                    self.blend(x, y, rgb, color.a * c);
                }
            }
        }
    }
}

/// Distance from `p` to the segment `a`–`b`.
#[inline]
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for RasterSurface {
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.scale = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let dw = (width as f32 * self.scale).floor() as u32;
        let dh = (height as f32 * self.scale).floor() as u32;
        self.canvas = RgbaImage::from_pixel(dw, dh, self.background);
    }

    fn clear(&mut self) {
        let background = self.background;
        self.canvas.pixels_mut().for_each(|p| *p = background);
    }

    fn draw_backdrop(&mut self, image: &SourceImage, _region: (u32, u32), alpha: f32) {
        let (w, h) = self.canvas.dimensions();
        if alpha <= 0.0 || self.detached {
            return;
        }
        let Some(frame) = image.fit_to(w, h) else {
            return;
        };
        for (x, y, px) in frame.enumerate_pixels() {
            let a = alpha * px.0[3] as f32 / 255.0;
            self.blend(x, y, [px.0[0], px.0[1], px.0[2]], a);
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        if width <= 0.0 {
            return;
        }
        let scale = self.scale;
        let half = width * 0.5;
        let pad = Vec2::splat(half + 1.0);
        let (a, b) = (from * scale, to * scale);
        let half_device = half * scale;
        self.cover(from.min(to) - pad, from.max(to) + pad, color, |p| {
            (half_device + 0.5 - segment_distance(p, a, b)).clamp(0.0, 1.0)
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let scale = self.scale;
        let pad = Vec2::splat(radius + 1.0);
        let c = center * scale;
        let r = radius * scale;
        self.cover(center - pad, center + pad, color, |p| {
            (r + 0.5 - p.distance(c)).clamp(0.0, 1.0)
        });
    }

    fn detach(&mut self) {
        self.detached = true;
        self.canvas = RgbaImage::new(0, 0);
    }
}
