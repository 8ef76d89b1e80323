// tests/render_tests.rs

use image::{ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tiled_compositor::{Compositor, Map, MapError, RenderEngine};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tiled_compositor_{tag}_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// 8x4 atlas: a red 4x4 tile then a blue one.
fn write_atlas(path: &Path) {
    let mut img = RgbaImage::new(8, 4);
    for (x, _, px) in img.enumerate_pixels_mut() {
        *px = if x < 4 { RED } else { BLUE };
    }
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

#[test]
fn renders_an_orthogonal_map_from_disk() -> anyhow::Result<()> {
    let dir = temp_dir("ortho");
    write_atlas(&dir.join("atlas.png"));
    fs::write(
        dir.join("tiles.json"),
        r#"{"tilewidth":4,"tileheight":4,"image":"atlas.png","imagewidth":8,"imageheight":4}"#,
    )?;
    fs::write(
        dir.join("map.json"),
        r#"{"width":3,"height":2,"tilewidth":4,"tileheight":4,
            "tilesets":[{"firstgid":1,"source":"tiles.json"}],
            "layers":[
              {"name":"ground","encoding":"csv","data":"1,2,0,\n0,0,1"},
              {"name":"hidden","visible":false,"data":[2,2,2,2,2,2]},
              {"type":"objectgroup","name":"props","objects":[
                {"id":1,"gid":2,"x":8,"y":4,"width":4,"height":4}
              ]}
            ]}"#,
    )?;

    let map = Map::load_from_file(dir.join("map.json"))?;
    let mut c = Compositor::new(&map)?;
    c.render_visible()?;
    let out = c.into_result();

    assert_eq!(out.dimensions(), (12, 8));
    assert_eq!(out.get_pixel(1, 1), &RED);
    assert_eq!(out.get_pixel(5, 1), &BLUE);
    assert_eq!(out.get_pixel(9, 1)[3], 0);
    assert_eq!(out.get_pixel(1, 5)[3], 0);
    assert_eq!(out.get_pixel(9, 5), &BLUE);

    out.save(dir.join("out.png"))?;
    assert!(dir.join("out.png").exists());
    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn renders_a_hexagonal_map() -> anyhow::Result<()> {
    let dir = temp_dir("hex");
    write_atlas(&dir.join("atlas.png"));
    fs::write(
        dir.join("map.json"),
        r#"{"width":2,"height":1,"tilewidth":4,"tileheight":4,
            "orientation":"hexagonal","staggeraxis":"x","staggerindex":"odd","hexsidelength":2,
            "tilesets":[{"firstgid":1,"tilewidth":4,"tileheight":4,"image":"atlas.png"}],
            "layers":[{"name":"cells","data":[1,2]}]}"#,
    )?;

    let map = Map::load_from_file(dir.join("map.json"))?;
    let mut c = Compositor::new(&map)?;
    assert!(matches!(c.engine(), RenderEngine::Hexagonal(_)));
    c.render_layer(0)?;
    let out = c.result();

    assert_eq!(out.dimensions(), (8, 6));
    assert_eq!(out.get_pixel(0, 0), &RED);
    assert_eq!(out.get_pixel(3, 1), &RED);
    // second column starts at x = 3 and is pushed down by half a tile
    assert_eq!(out.get_pixel(6, 0)[3], 0);
    assert_eq!(out.get_pixel(3, 3), &BLUE);
    assert_eq!(out.get_pixel(6, 5), &BLUE);
    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn unsupported_orientations_fail_at_compositor_creation() {
    let map = Map::load_from_str(
        ".",
        r#"{"width":1,"height":1,"tilewidth":4,"tileheight":4,"orientation":"staggered"}"#,
    )
    .unwrap();
    assert!(matches!(
        Compositor::new(&map),
        Err(MapError::UnsupportedOrientation(o)) if o == "staggered"
    ));
}
