use connected_lines::prelude::*;
use connected_lines_examples::{init_tracing, render_to_png, PngConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Without an image every grid position has neutral brightness, so density is even.
    let config = Config::default().with_seed(42);
    let png = PngConfig::new((640, 400)).with_pixel_ratio(2.0);

    let stats = render_to_png(&png, &config, None, "lines-uniform-field.png")?;
    assert!(!stats.used_image);

    Ok(())
}
