use connected_lines::prelude::*;
use connected_lines_examples::{init_tracing, render_to_png, synthetic_portrait, PngConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Optional first argument: path to a PNG or JPEG portrait.
    let image = match std::env::args().nth(1) {
        Some(path) => SourceImage::open(&path)?,
        None => synthetic_portrait(480, 600)?,
    };

    let config = Config::default()
        .with_seed(7)
        .with_background_alpha(0.12)
        .with_max_link_distance(32.0);
    let png = PngConfig::new((400, 500)).with_pixel_ratio(2.0);

    render_to_png(&png, &config, Some(&image), "lines-portrait.png")?;

    // Same frame without the backdrop.
    let bare = config.with_background_alpha(0.0);
    render_to_png(&png, &bare, Some(&image), "lines-portrait-bare.png")?;

    Ok(())
}
