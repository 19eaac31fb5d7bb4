//! One full render pass: sample, index, link, draw.
use glam::Vec2;
use tracing::{debug, trace};

use crate::color::Color;
use crate::config::Config;
use crate::events::{EventSink, RenderEvent};
use crate::links::LinkPlanner;
use crate::render::surface::Surface;
use crate::sampling::{BrightnessField, Lcg, PointFieldSampler, UniformField};
use crate::source::SourceImage;
use crate::spatial::SpatialIndex;

/// Fill colour of node markers.
pub const NODE_COLOR: Color = Color::rgba(232, 237, 246, 0.8);

/// Upper bound applied to device pixel ratios.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Layout size of the region being rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical width in px (fractional layout sizes allowed).
    pub width: f32,
    /// Logical height in px.
    pub height: f32,
    /// Device px per logical px.
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Region size in whole px.
    pub fn region(&self) -> (u32, u32) {
        let whole = |v: f32| {
            if v.is_finite() && v > 0.0 {
                v.floor().min(u32::MAX as f32) as u32
            } else {
                0
            }
        };
        (whole(self.width), whole(self.height))
    }

    /// Pixel ratio clamped to [1, 2].
    pub fn clamped_pixel_ratio(&self) -> f32 {
        if self.pixel_ratio.is_finite() {
            self.pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO)
        } else {
            1.0
        }
    }
}

/// Summary of a finished pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub width: u32,
    pub height: u32,
    /// Generator seed the pass ran with.
    pub seed: u32,
    pub points: usize,
    /// Whether sampling stopped at the point cap.
    pub capped: bool,
    pub links: usize,
    pub nodes: usize,
    /// Whether a source image shaped the density.
    pub used_image: bool,
}

/// Runs a pass onto `surface`.
///
/// The surface is resized and cleared first. With an image, the cover-fitted frame is
/// drawn as a backdrop (when `background_alpha > 0`) and drives sampling density;
/// otherwise every grid position has neutral brightness. A pinned `config.seed` makes the
/// pass reproducible; without one a fresh seed is drawn.
pub fn render_frame(
    surface: &mut dyn Surface,
    viewport: Viewport,
    config: &Config,
    image: Option<&SourceImage>,
    sink: Option<&mut dyn EventSink>,
) -> FrameStats {
    match sink {
        Some(s) => render_frame_internal(surface, viewport, config, image, s),
        None => render_frame_internal(surface, viewport, config, image, &mut ()),
    }
}

fn render_frame_internal(
    surface: &mut dyn Surface,
    viewport: Viewport,
    config: &Config,
    image: Option<&SourceImage>,
    sink: &mut dyn EventSink,
) -> FrameStats {
    let cfg = config.sanitized();
    let (width, height) = viewport.region();
    let pixel_ratio = viewport.clamped_pixel_ratio();
    let seed = cfg.seed.unwrap_or_else(rand::random::<u32>);

    debug!(
        "Render pass {}x{} @{} (seed {}).",
        width, height, pixel_ratio, seed
    );
    sink.send(RenderEvent::PassStarted {
        width,
        height,
        seed,
    });

    surface.resize(width, height, pixel_ratio);
    surface.clear();

    let frame = image.and_then(|img| img.fit_to(width, height));
    if let (Some(img), Some(_)) = (image, frame.as_ref()) {
        if cfg.background_alpha > 0.0 {
            surface.draw_backdrop(img, (width, height), cfg.background_alpha);
        }
    }

    let field: &dyn BrightnessField = match frame.as_ref() {
        Some(frame) => frame,
        None => &UniformField::NEUTRAL,
    };
    let sampler = PointFieldSampler::from_config(&cfg);
    let mut rng = Lcg::new(seed);
    let points = sampler.sample(width, height, field, &mut rng);
    let capped = cfg.max_points > 0 && points.len() >= cfg.max_points;
    trace!("Sampled {} points (capped: {}).", points.len(), capped);
    sink.send(RenderEvent::PointsSampled {
        count: points.len(),
        capped,
    });

    let index = SpatialIndex::build(
        points.iter().map(|p| p.position),
        Vec2::new(width as f32, height as f32),
        cfg.cell_size(),
    );
    let (cols, rows) = index.dims();
    sink.send(RenderEvent::IndexBuilt {
        cols,
        rows,
        cell_size: index.cell_size(),
    });

    let planner = LinkPlanner::from_config(&cfg);
    let mut links = 0usize;
    planner.for_each_link(&points, &index, |link| {
        surface.stroke_line(link.from, link.to, link.color, cfg.line_width);
        links += 1;
    });

    let mut nodes = 0usize;
    if cfg.node_radius > 0.0 {
        for p in &points {
            surface.fill_circle(p.position, cfg.node_radius, NODE_COLOR);
        }
        nodes = points.len();
    }

    let stats = FrameStats {
        width,
        height,
        seed,
        points: points.len(),
        capped,
        links,
        nodes,
        used_image: frame.is_some(),
    };
    debug!(
        "Render pass done: {} points, {} links, {} nodes.",
        stats.points, stats.links, stats.nodes
    );
    sink.send(RenderEvent::PassFinished {
        stats: stats.clone(),
    });
    stats
}
