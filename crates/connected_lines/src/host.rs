//! Attaching the renderer to a host container.
//!
//! A [`Container`] supplies layout size, `data-*` style attributes, an optional image
//! source and theme properties. [`ConnectedLines::attach`] merges the configuration,
//! loads the image once, renders the first pass and returns a handle exposing
//! [`ConnectedLines::redraw`], [`ConnectedLines::notify_resize`] and
//! [`ConnectedLines::destroy`].
use std::path::PathBuf;

use glam::Vec2;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::events::{EventSink, RenderEvent};
use crate::render::{render_frame, FrameStats, Surface, Viewport};
use crate::source::SourceImage;

/// Conventional selector for containers the auto-initialiser attaches to.
pub const DEFAULT_SELECTOR: &str = ".bio .photo";

/// Attribute naming the source image.
pub const IMAGE_ATTRIBUTE: &str = "image";

/// An element the effect renders into.
pub trait Container {
    /// Current layout size in logical px.
    fn size(&self) -> Vec2;

    /// Device px per logical px.
    fn pixel_ratio(&self) -> f32 {
        1.0
    }

    /// `data-*` attributes without the `data-` prefix, e.g. `("max-dist", "42")`.
    fn data_attributes(&self) -> Vec<(String, String)>;

    /// Computed style property, e.g. `--accent`.
    fn style_property(&self, name: &str) -> Option<String>;

    /// Source image reference, by default the `data-image` attribute.
    fn image_source(&self) -> Option<String> {
        self.data_attributes()
            .into_iter()
            .find(|(k, _)| k == IMAGE_ATTRIBUTE)
            .map(|(_, v)| v)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Resolves an image source into decoded pixels.
pub trait ImageLoader {
    fn load(&self, source: &str) -> Result<SourceImage>;
}

impl<F> ImageLoader for F
where
    F: Fn(&str) -> Result<SourceImage>,
{
    fn load(&self, source: &str) -> Result<SourceImage> {
        self(source)
    }
}

/// Loads images from the file system, optionally relative to a base directory.
#[derive(Clone, Debug, Default)]
pub struct FsImageLoader {
    pub base_dir: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &str) -> Result<SourceImage> {
        let path = match &self.base_dir {
            Some(base) => base.join(source),
            None => PathBuf::from(source),
        };
        SourceImage::open(path)
    }
}

/// Builds the effective configuration for a container.
///
/// Layers `base` (defaults plus caller overrides), then the container's `data-*`
/// attributes, then its theme accents. Rejected attributes are reported to `sink`.
pub fn resolve_config<C: Container + ?Sized>(
    container: &C,
    base: &Config,
    sink: &mut dyn EventSink,
) -> Config {
    let mut config = base.clone();
    let attributes = container.data_attributes();
    for (key, value) in &attributes {
        if let Err(e) = config.apply_override(key, value) {
            warn!("Ignoring data-{}: {}.", key, e);
            sink.send(RenderEvent::Warning {
                context: format!("data-{key}"),
                message: e.to_string(),
            });
        }
    }
    config.apply_theme(|name| container.style_property(name));
    config
}

/// Loads the container's image, degrading to `None` on failure.
pub fn load_image<C: Container + ?Sized>(
    container: &C,
    loader: &dyn ImageLoader,
    sink: &mut dyn EventSink,
) -> Option<SourceImage> {
    let source = container.image_source()?;
    match loader.load(&source) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Image '{}' unavailable ({}); using a uniform field.", source, e);
            sink.send(RenderEvent::ImageFallback {
                source,
                message: e.to_string(),
            });
            None
        }
    }
}

/// A renderer attached to one container.
///
/// Owns the surface it draws on. Every trigger recomputes the whole frame.
pub struct ConnectedLines<C: Container, S: Surface> {
    container: C,
    surface: Option<S>,
    config: Config,
    image: Option<SourceImage>,
    observing: bool,
    last_frame: Option<FrameStats>,
    sink: Option<Box<dyn EventSink>>,
}

impl<C: Container, S: Surface> ConnectedLines<C, S> {
    /// Attaches to `container`, loading its image through `loader`, and renders once.
    pub fn attach(container: C, surface: S, base: &Config, loader: &dyn ImageLoader) -> Self {
        Self::attach_inner(container, surface, base, loader, None)
    }

    /// Like [`Self::attach`], reporting events of this and every later pass to `sink`.
    pub fn attach_with_events(
        container: C,
        surface: S,
        base: &Config,
        loader: &dyn ImageLoader,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self::attach_inner(container, surface, base, loader, Some(sink))
    }

    fn attach_inner(
        container: C,
        surface: S,
        base: &Config,
        loader: &dyn ImageLoader,
        mut sink: Option<Box<dyn EventSink>>,
    ) -> Self {
        let (config, image) = match sink.as_mut() {
            Some(s) => (
                resolve_config(&container, base, s.as_mut()),
                load_image(&container, loader, s.as_mut()),
            ),
            None => (
                resolve_config(&container, base, &mut ()),
                load_image(&container, loader, &mut ()),
            ),
        };
        let mut handle = Self::from_parts(container, surface, config, image);
        handle.sink = sink;
        handle.redraw();
        handle
    }

    /// Assembles a handle from an already resolved configuration and image without
    /// rendering. Used by hosts that load images asynchronously.
    pub fn from_parts(container: C, surface: S, config: Config, image: Option<SourceImage>) -> Self {
        info!(
            "Connected lines attached (image: {}).",
            if image.is_some() { "yes" } else { "no" }
        );
        Self {
            container,
            surface: Some(surface),
            config,
            image,
            observing: true,
            last_frame: None,
            sink: None,
        }
    }

    /// Re-runs the full pass synchronously. Returns `None` once destroyed.
    pub fn redraw(&mut self) -> Option<FrameStats> {
        let surface = self.surface.as_mut()?;
        let viewport = Viewport::new(self.container.size().x, self.container.size().y)
            .with_pixel_ratio(self.container.pixel_ratio());
        let sink: Option<&mut dyn EventSink> = match self.sink.as_mut() {
            Some(s) => Some(s.as_mut()),
            None => None,
        };
        let stats = render_frame(surface, viewport, &self.config, self.image.as_ref(), sink);
        self.last_frame = Some(stats.clone());
        Some(stats)
    }

    /// Resize notification: recomputes the frame while the handle is observing.
    pub fn notify_resize(&mut self) -> Option<FrameStats> {
        if !self.observing {
            return None;
        }
        self.redraw()
    }

    /// Stops observing resizes and detaches the surface. Idempotent.
    pub fn destroy(&mut self) {
        self.observing = false;
        if let Some(mut surface) = self.surface.take() {
            surface.detach();
            info!("Connected lines destroyed.");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Statistics of the most recent pass.
    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.last_frame.as_ref()
    }
}

/// Attaches a renderer to every `(container, surface)` pair.
pub fn attach_all<C, S, I>(targets: I, base: &Config, loader: &dyn ImageLoader) -> Vec<ConnectedLines<C, S>>
where
    C: Container,
    S: Surface,
    I: IntoIterator<Item = (C, S)>,
{
    let handles: Vec<_> = targets
        .into_iter()
        .map(|(container, surface)| ConnectedLines::attach(container, surface, base, loader))
        .collect();
    info!("Attached connected lines to {} container(s).", handles.len());
    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::Error;
    use crate::events::VecSink;
    use crate::render::RecordingSurface;

    struct Panel {
        size: Vec2,
        attributes: Vec<(String, String)>,
        accent: Option<String>,
    }

    impl Panel {
        fn new(w: f32, h: f32) -> Self {
            Self {
                size: Vec2::new(w, h),
                attributes: Vec::new(),
                accent: None,
            }
        }

        fn attr(mut self, key: &str, value: &str) -> Self {
            self.attributes.push((key.into(), value.into()));
            self
        }
    }

    impl Container for Panel {
        fn size(&self) -> Vec2 {
            self.size
        }

        fn data_attributes(&self) -> Vec<(String, String)> {
            self.attributes.clone()
        }

        fn style_property(&self, name: &str) -> Option<String> {
            (name == crate::config::ACCENT_PROPERTY)
                .then(|| self.accent.clone())
                .flatten()
        }
    }

    fn no_images(_: &str) -> Result<SourceImage> {
        Err(Error::Other("offline".into()))
    }

    #[test]
    fn attributes_then_theme_layer_over_base() {
        let mut panel = Panel::new(10.0, 10.0)
            .attr("max-dist", "42")
            .attr("max-neighbors", "lots")
            .attr("image", "face.png");
        panel.accent = Some("#000000".into());
        let mut sink = VecSink::new();
        let config = resolve_config(&panel, &Config::default().with_seed(3), &mut sink);
        assert_eq!(config.max_link_distance, 42.0);
        assert_eq!(config.max_neighbors, 5);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.accent, Color::rgb(0, 0, 0));
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            &sink.as_slice()[0],
            RenderEvent::Warning { context, .. } if context == "data-max-neighbors"
        ));
    }

    #[test]
    fn image_source_ignores_blank_attribute() {
        assert_eq!(Panel::new(1.0, 1.0).attr("image", "  ").image_source(), None);
        assert_eq!(
            Panel::new(1.0, 1.0).attr("image", "a.png").image_source(),
            Some("a.png".into())
        );
    }

    #[test]
    fn failed_image_load_falls_back() {
        let panel = Panel::new(30.0, 30.0).attr("image", "missing.png");
        let mut sink = VecSink::new();
        assert!(load_image(&panel, &no_images, &mut sink).is_none());
        assert!(matches!(
            &sink.as_slice()[0],
            RenderEvent::ImageFallback { source, .. } if source == "missing.png"
        ));
    }

    #[test]
    fn attach_renders_and_destroy_detaches() {
        let panel = Panel::new(60.0, 40.0).attr("seed", "9");
        let mut handle = ConnectedLines::attach(
            panel,
            RecordingSurface::new(),
            &Config::default(),
            &no_images,
        );
        let first = handle.last_frame().cloned().unwrap();
        assert_eq!(first.seed, 9);
        assert_eq!((first.width, first.height), (60, 40));
        assert_eq!(handle.redraw(), Some(first.clone()));
        assert_eq!(handle.notify_resize(), Some(first));

        handle.destroy();
        assert!(!handle.is_attached());
        assert!(!handle.is_observing());
        assert_eq!(handle.redraw(), None);
        assert_eq!(handle.notify_resize(), None);
        handle.destroy();
    }

    #[test]
    fn fs_loader_joins_base_dir() {
        let loader = FsImageLoader::with_base_dir("/nonexistent-dir");
        assert!(matches!(loader.load("x.png"), Err(Error::Image(_)) | Err(Error::Io(_))));
    }
}
