use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;

use connected_lines::prelude::*;
use glam::Vec2;
use image::{ImageFormat, Rgba, RgbaImage};

#[derive(Clone)]
struct Panel {
    size: Rc<Cell<Vec2>>,
    ratio: f32,
    attributes: Vec<(String, String)>,
    accent_secondary: Option<String>,
}

impl Panel {
    fn new(width: f32, height: f32) -> Self {
        Self {
            size: Rc::new(Cell::new(Vec2::new(width, height))),
            ratio: 1.0,
            attributes: Vec::new(),
            accent_secondary: None,
        }
    }

    fn attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_owned(), value.to_owned()));
        self
    }
}

impl Container for Panel {
    fn size(&self) -> Vec2 {
        self.size.get()
    }

    fn pixel_ratio(&self) -> f32 {
        self.ratio
    }

    fn data_attributes(&self) -> Vec<(String, String)> {
        self.attributes.clone()
    }

    fn style_property(&self, name: &str) -> Option<String> {
        match name {
            ACCENT_SECONDARY_PROPERTY => self.accent_secondary.clone(),
            _ => None,
        }
    }
}

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Left half black, right half white.
fn split_portrait() -> Vec<u8> {
    let image = RgbaImage::from_fn(64, 64, |x, _| {
        if x < 32 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    png_bytes(&image)
}

fn offline(_: &str) -> Result<SourceImage> {
    Err(Error::Other("network unavailable".into()))
}

#[test]
fn pinned_seed_makes_redraw_idempotent() {
    let panel = Panel::new(160.0, 120.0).attr("seed", "77");
    let mut handle =
        ConnectedLines::attach(panel, RecordingSurface::new(), &Config::default(), &offline);

    let first: Vec<DrawOp> = handle.surface().unwrap().last_frame().to_vec();
    let stats = handle.redraw().unwrap();
    let second: Vec<DrawOp> = handle.surface().unwrap().last_frame().to_vec();

    assert!(stats.points > 0);
    assert_eq!(first, second);
    assert_eq!(handle.last_frame(), Some(&stats));
}

#[test]
fn links_respect_neighbor_cap_and_radius() {
    let panel = Panel::new(200.0, 150.0)
        .attr("seed", "5")
        .attr("max-neighbors", "3")
        .attr("maxDist", "30");
    let handle =
        ConnectedLines::attach(panel, RecordingSurface::new(), &Config::default(), &offline);
    let surface = handle.surface().unwrap();

    let mut per_source: Vec<(Vec2, usize)> = Vec::new();
    for op in surface.lines() {
        let DrawOp::Line { from, to, .. } = op else {
            unreachable!();
        };
        assert!(from.distance(*to) <= 30.0 + 1e-3);
        match per_source.last_mut() {
            Some((p, n)) if *p == *from => *n += 1,
            _ => per_source.push((*from, 1)),
        }
    }
    assert!(!per_source.is_empty());
    assert!(per_source.iter().all(|(_, n)| *n <= 3));
}

#[test]
fn resize_triggers_a_new_pass_until_destroyed() {
    let panel = Panel::new(100.0, 100.0).attr("seed", "1");
    let size = panel.size.clone();
    let mut handle =
        ConnectedLines::attach(panel, RecordingSurface::new(), &Config::default(), &offline);
    assert_eq!(handle.last_frame().map(|s| s.width), Some(100));

    size.set(Vec2::new(240.5, 90.0));
    let stats = handle.notify_resize().unwrap();
    assert_eq!((stats.width, stats.height), (240, 90));

    handle.destroy();
    size.set(Vec2::new(50.0, 50.0));
    assert_eq!(handle.notify_resize(), None);
    assert_eq!(handle.redraw(), None);
    assert_eq!(handle.last_frame().map(|s| s.width), Some(240));
}

#[test]
fn destroy_detaches_the_surface() {
    let mut handle = ConnectedLines::attach(
        Panel::new(40.0, 40.0),
        RasterSurface::new(),
        &Config::default().with_seed(8),
        &offline,
    );
    assert_eq!(handle.surface().unwrap().image().dimensions(), (40, 40));
    handle.destroy();
    assert!(handle.surface().is_none());
    assert!(!handle.is_attached());
}

#[test]
fn image_concentrates_points_in_dark_areas() {
    let bytes = split_portrait();
    let loader = move |_: &str| SourceImage::decode(&bytes);
    let panel = Panel::new(128.0, 128.0)
        .attr("image", "portrait.png")
        .attr("seed", "11")
        .attr("keep-probability", "0.2")
        .attr("sample-step", "4");
    let handle = ConnectedLines::attach(panel, RecordingSurface::new(), &Config::default(), &loader);

    assert!(handle.has_image());
    let stats = handle.last_frame().unwrap();
    assert!(stats.used_image);

    let surface = handle.surface().unwrap();
    assert!(surface
        .ops()
        .iter()
        .any(|op| matches!(op, DrawOp::Backdrop { size: (128, 128), .. })));
    let (left, right) = surface.circles().fold((0, 0), |(l, r), op| match op {
        DrawOp::Circle { center, .. } if center.x < 64.0 => (l + 1, r),
        _ => (l, r + 1),
    });
    assert!(left > right * 2, "left {left}, right {right}");
}

#[test]
fn failed_image_falls_back_to_uniform_field() {
    let panel = Panel::new(90.0, 90.0)
        .attr("image", "https://example.invalid/me.jpg")
        .attr("seed", "4");
    let events = Rc::new(Cell::new(0usize));
    let fallbacks = events.clone();
    let sink = FnSink::new(move |event| {
        if matches!(event, RenderEvent::ImageFallback { .. }) {
            fallbacks.set(fallbacks.get() + 1);
        }
    });
    let handle = ConnectedLines::attach_with_events(
        panel,
        RecordingSurface::new(),
        &Config::default(),
        &offline,
        Box::new(sink),
    );
    assert!(!handle.has_image());
    assert_eq!(events.get(), 1);
    let stats = handle.last_frame().unwrap();
    assert!(!stats.used_image);
    assert!(stats.points > 0);
    assert!(handle
        .surface()
        .unwrap()
        .ops()
        .iter()
        .all(|op| !matches!(op, DrawOp::Backdrop { .. })));
}

#[test]
fn theme_and_attributes_shape_the_config() {
    let mut panel = Panel::new(10.0, 10.0)
        .attr("max-points", "12")
        .attr("line_width", "2.5")
        .attr("unknown-thing", "1");
    panel.accent_secondary = Some("#00ff00".into());
    let base = Config::default().with_max_neighbors(2);
    let handle = ConnectedLines::attach(panel, RecordingSurface::new(), &base, &offline);

    let config = handle.config();
    assert_eq!(config.max_points, 12);
    assert_eq!(config.line_width, 2.5);
    assert_eq!(config.max_neighbors, 2);
    assert_eq!(config.accent_secondary, Color::rgb(0, 255, 0));
    assert_eq!(config.accent, Config::default().accent);
}

#[test]
fn attach_all_handles_every_container() {
    let targets = (0..3).map(|i| {
        (
            Panel::new(30.0 + i as f32 * 10.0, 30.0).attr("seed", "2"),
            RecordingSurface::new(),
        )
    });
    let handles = attach_all(targets, &Config::default(), &offline);
    assert_eq!(handles.len(), 3);
    let widths: Vec<u32> = handles
        .iter()
        .filter_map(|h| h.last_frame().map(|s| s.width))
        .collect();
    assert_eq!(widths, vec![30, 40, 50]);
}

#[test]
fn pixel_ratio_reaches_the_surface_clamped() {
    let mut panel = Panel::new(20.0, 20.0);
    panel.ratio = 3.0;
    let handle = ConnectedLines::attach(
        panel,
        RasterSurface::new(),
        &Config::default().with_seed(1),
        &offline,
    );
    assert_eq!(handle.surface().unwrap().image().dimensions(), (40, 40));
}
