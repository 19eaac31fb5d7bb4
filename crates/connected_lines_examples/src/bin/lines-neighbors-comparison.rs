use connected_lines::prelude::*;
use connected_lines_examples::{init_tracing, render_to_png, PngConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Same points, different neighbour caps: the seed pins the sampled field.
    let png = PngConfig::new((400, 300));

    for neighbors in [1usize, 3, 8] {
        let config = Config::default()
            .with_seed(99)
            .with_sample_step(8.0)
            .with_max_neighbors(neighbors);
        let out = format!("lines-neighbors-{neighbors}.png");
        let stats = render_to_png(&png, &config, None, out)?;
        tracing::info!("max_neighbors {}: {} links", neighbors, stats.links);
    }

    Ok(())
}
