//! Renders every visible layer of a map into a PNG.
//!
//! `cargo run --example map_to_png -- assets/map.tmj out.png`

use anyhow::Context;
use tiled_compositor::{Compositor, Map};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "assets/map.tmj".to_owned());
    let output = args.next().unwrap_or_else(|| "map.png".to_owned());

    let map = Map::load_from_file(&input).with_context(|| format!("Loading map {input}"))?;
    let mut compositor = Compositor::new(&map)?;
    compositor.render_visible()?;

    let raster = compositor.into_result();
    raster
        .save(&output)
        .with_context(|| format!("Writing {output}"))?;
    println!("wrote {output} ({}x{})", raster.width(), raster.height());
    Ok(())
}
