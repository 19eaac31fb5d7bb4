use connected_lines::prelude::*;
use connected_lines_examples::{init_tracing, linear_gradient, render_to_png, PngConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    // A black-to-white gradient makes the dark bias visible from left to right.
    let gradient = linear_gradient(600, 200)?;
    let png = PngConfig::new((600, 200)).with_background([250, 250, 252]);

    for boost in [0.0, 0.5, 1.0] {
        let config = Config::default()
            .with_seed(3)
            .with_keep_probability(0.1)
            .with_dark_boost(boost)
            .with_background_alpha(0.0);
        let out = format!("lines-dark-boost-{boost:.1}.png");
        render_to_png(&png, &config, Some(&gradient), out)?;
    }

    Ok(())
}
