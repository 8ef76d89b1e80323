use anyhow::Context;
use macroquad::prelude::*;
use tiled_compositor::{Compositor, Map};

fn window_conf() -> Conf {
    Conf {
        window_title: "Tiled map".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn compose(path: &str) -> anyhow::Result<Texture2D> {
    let map = Map::load_from_file(path).with_context(|| format!("Loading map {path}"))?;
    let mut compositor = Compositor::new(&map)?;
    compositor.render_visible()?;
    Ok(compositor.upload_texture()?)
}

#[macroquad::main(window_conf)]
async fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/map.tmj".to_owned());
    let texture = match compose(&path) {
        Ok(texture) => texture,
        Err(err) => {
            eprintln!("{err:#}");
            return;
        }
    };

    let mut zoom = 1.0f32;
    let mut origin = Vec2::ZERO;

    loop {
        clear_background(BLACK);

        if is_key_pressed(KeyCode::Equal) {
            zoom *= 2.0;
        }
        if is_key_pressed(KeyCode::Minus) {
            zoom = (zoom / 2.0).max(0.25);
        }
        let speed = 400.0 * get_frame_time();
        if is_key_down(KeyCode::Left) {
            origin.x += speed;
        }
        if is_key_down(KeyCode::Right) {
            origin.x -= speed;
        }
        if is_key_down(KeyCode::Up) {
            origin.y += speed;
        }
        if is_key_down(KeyCode::Down) {
            origin.y -= speed;
        }

        draw_texture_ex(
            &texture,
            origin.x,
            origin.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(texture.size() * zoom),
                ..Default::default()
            },
        );

        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
