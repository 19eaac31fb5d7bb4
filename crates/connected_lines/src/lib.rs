#![forbid(unsafe_code)]
//! connected_lines: Image-driven point fields joined by short, fading links.
//!
//! Modules:
//! - sampling: dark-biased grid sampling with jitter and a seedable generator
//! - spatial: uniform-grid binning for fixed-radius neighbour queries
//! - links: nearest-neighbour selection, distance fade and link colours
//! - render: drawing surfaces (recording, raster) and the full render pass
//! - host: containers, image loading, configuration merge and the redraw/destroy handle
//! - config, color, source, events, error: supporting types
//!
//! For a quick start, see the `connected_lines_examples` crate.
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod links;
pub mod render;
pub mod sampling;
pub mod source;
pub mod spatial;

/// Convenient re-exports for common types. Import with `use connected_lines::prelude::*;`.
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::config::{Config, ACCENT_PROPERTY, ACCENT_SECONDARY_PROPERTY};
    pub use crate::error::{Error, Result};
    pub use crate::events::{EventSink, FnSink, RenderEvent, VecSink};
    pub use crate::host::{
        attach_all, resolve_config, ConnectedLines, Container, FsImageLoader, ImageLoader,
        DEFAULT_SELECTOR,
    };
    pub use crate::links::{Link, LinkPlanner};
    pub use crate::render::{
        render_frame, DrawOp, FrameStats, RasterSurface, RecordingSurface, Surface, Viewport,
    };
    pub use crate::sampling::{BrightnessField, Lcg, Point, PointFieldSampler, UniformField};
    pub use crate::source::{CoverFit, SourceImage};
    pub use crate::spatial::SpatialIndex;
}
