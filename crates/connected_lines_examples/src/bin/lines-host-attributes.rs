use connected_lines::prelude::*;
use connected_lines_examples::{init_tracing, StaticContainer};

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Arguments of the form `key=value` become data attributes, e.g.
    //   lines-host-attributes max-dist=50 neonA=#ffcc00 image=portrait.png
    let mut container = StaticContainer::new(480.0, 320.0)
        .with_attribute("seed", "2024")
        .with_theme(ACCENT_SECONDARY_PROPERTY, "#7cff6b");
    container.pixel_ratio = 2.0;
    for arg in std::env::args().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            container = container.with_attribute(key, value);
        }
    }

    let surface = RasterSurface::new().with_background([12, 14, 22]);
    let mut handle = ConnectedLines::attach_with_events(
        container,
        surface,
        &Config::default(),
        &FsImageLoader::new(),
        Box::new(FnSink::new(|event| tracing::debug!("{:?}", event))),
    );

    // A pinned seed makes every redraw identical.
    let first = handle.last_frame().cloned();
    let again = handle.redraw();
    assert_eq!(first, again);

    if let Some(surface) = handle.surface() {
        surface.save_png("lines-host-attributes.png")?;
    }
    handle.destroy();

    Ok(())
}
