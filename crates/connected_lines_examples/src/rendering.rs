use std::path::Path;

use connected_lines::prelude::*;
use glam::Vec2;
use image::{Rgba, RgbaImage};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default: `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Output settings for [`render_to_png`].
#[derive(Clone, Debug)]
pub struct PngConfig {
    /// Logical region size in px.
    pub size: (u32, u32),
    /// Device pixel ratio; the PNG is `size * ratio` pixels.
    pub pixel_ratio: f32,
    /// Opaque colour under the drawing.
    pub background: [u8; 3],
}

impl PngConfig {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size,
            pixel_ratio: 1.0,
            background: [12, 14, 22],
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }
}

/// Renders one pass onto a raster surface and writes it to `out_path`.
pub fn render_to_png(
    png: &PngConfig,
    config: &Config,
    image: Option<&SourceImage>,
    out_path: impl AsRef<Path>,
) -> anyhow::Result<FrameStats> {
    let mut surface = RasterSurface::new().with_background(png.background);
    let viewport =
        Viewport::new(png.size.0 as f32, png.size.1 as f32).with_pixel_ratio(png.pixel_ratio);
    let stats = render_frame(&mut surface, viewport, config, image, None);
    surface.save_png(out_path.as_ref())?;
    info!(
        "Wrote {} ({} points, {} links).",
        out_path.as_ref().display(),
        stats.points,
        stats.links
    );
    Ok(stats)
}

/// A head-and-shoulders silhouette: dark figure on a bright backdrop.
pub fn synthetic_portrait(width: u32, height: u32) -> anyhow::Result<SourceImage> {
    let size = Vec2::new(width as f32, height as f32);
    let head = Vec2::new(0.5, 0.38) * size;
    let head_radius = 0.2 * size.x.min(size.y);
    let shoulders = Vec2::new(0.5, 1.05) * size;
    let shoulder_radius = Vec2::new(0.42 * size.x, 0.35 * size.y);

    let image = RgbaImage::from_fn(width, height, |x, y| {
        let p = Vec2::new(x as f32, y as f32);
        let in_head = p.distance(head) / head_radius;
        let in_body = ((p - shoulders) / shoulder_radius).length();
        let d = in_head.min(in_body);
        let v = if d < 1.0 {
            (40.0 + 60.0 * d) as u8
        } else {
            (200.0 + 40.0 * (p.y / size.y)).min(255.0) as u8
        };
        Rgba([v, v, v.saturating_add(10), 255])
    });
    Ok(SourceImage::from_rgba(width, height, image.into_raw())?)
}

/// Horizontal gradient from black (left) to white (right).
pub fn linear_gradient(width: u32, height: u32) -> anyhow::Result<SourceImage> {
    let span = width.saturating_sub(1).max(1) as f32;
    let image = RgbaImage::from_fn(width, height, |x, _| {
        let v = (255.0 * x as f32 / span) as u8;
        Rgba([v, v, v, 255])
    });
    Ok(SourceImage::from_rgba(width, height, image.into_raw())?)
}

/// Container with fixed size, attributes and theme, standing in for a page element.
#[derive(Clone, Debug, Default)]
pub struct StaticContainer {
    pub size: Vec2,
    pub pixel_ratio: f32,
    pub attributes: Vec<(String, String)>,
    pub theme: Vec<(String, String)>,
}

impl StaticContainer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            pixel_ratio: 1.0,
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_theme(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.theme.push((property.into(), value.into()));
        self
    }
}

impl Container for StaticContainer {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn data_attributes(&self) -> Vec<(String, String)> {
        self.attributes.clone()
    }

    fn style_property(&self, name: &str) -> Option<String> {
        self.theme
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}
