//! Pixel level helpers shared by the compositor.

use crate::color::HexColor;
use crate::error::MapError;
use crate::loader::resource::ResourceLoader;
use image::{imageops, Rgba, RgbaImage};
use std::path::Path;

/// Reads and decodes an image, keying out `trans` if given.
pub(super) fn load_image(
    resources: &dyn ResourceLoader,
    path: &Path,
    trans: Option<HexColor>,
) -> Result<RgbaImage, MapError> {
    let bytes = resources.read(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut img = image::load_from_memory(&bytes)
        .map_err(|source| MapError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    if let Some(key) = trans {
        for px in img.pixels_mut() {
            if px[0] == key.r && px[1] == key.g && px[2] == key.b {
                px[3] = 0;
            }
        }
    }
    Ok(img)
}

/// Uniform alpha mask value for a layer opacity.
pub(super) fn mask_value(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0) as u8
}

/// Source-over composite of `src` at `(x, y)`, through a uniform mask when
/// `opacity < 1`. Parts outside the canvas are dropped.
pub(super) fn composite(canvas: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64, opacity: f32) {
    if opacity >= 1.0 {
        imageops::overlay(canvas, src, x, y);
        return;
    }
    let mask = mask_value(opacity) as u32;
    if mask == 0 {
        return;
    }
    let mut faded = src.clone();
    for px in faded.pixels_mut() {
        px[3] = (px[3] as u32 * mask / 255) as u8;
    }
    imageops::overlay(canvas, &faded, x, y);
}

/// Nearest-neighbor resize; returns `None` when the size already matches.
pub(super) fn resize_nearest(src: &RgbaImage, width: u32, height: u32) -> Option<RgbaImage> {
    if width == 0 || height == 0 || src.dimensions() == (width, height) {
        return None;
    }
    Some(imageops::resize(src, width, height, imageops::FilterType::Nearest))
}

/// Rotates clockwise by `degrees` about the image center into the smallest
/// bounding box.
///
/// Also returns where the unrotated top-left corner ends up relative to the
/// top-left of the new box, negated: adding it to an anchor position gives
/// the box's destination.
pub(super) fn rotate(src: &RgbaImage, degrees: f32) -> (RgbaImage, (i64, i64)) {
    let turns = degrees.rem_euclid(360.0);
    let (w, h) = (src.width() as i64, src.height() as i64);
    // exact quarter turns keep every pixel
    if turns == 0.0 {
        return (src.clone(), (0, 0));
    } else if turns == 90.0 {
        return (imageops::rotate90(src), (-h, 0));
    } else if turns == 180.0 {
        return (imageops::rotate180(src), (-w, -h));
    } else if turns == 270.0 {
        return (imageops::rotate270(src), (0, -w));
    }

    let (sin, cos) = turns.to_radians().sin_cos();
    let corners = [(0.0, 0.0), (w as f32, 0.0), (w as f32, h as f32), (0.0, h as f32)];
    let rotated = corners.map(|(x, y)| (x * cos - y * sin, x * sin + y * cos));

    let min_x = rotated.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
    let min_y = rotated.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let max_x = rotated.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
    let max_y = rotated.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

    let out_w = (max_x - min_x).ceil().max(1.0) as u32;
    let out_h = (max_y - min_y).ceil().max(1.0) as u32;
    let mut out = RgbaImage::from_pixel(out_w, out_h, Rgba([0, 0, 0, 0]));

    for (dx, dy, px) in out.enumerate_pixels_mut() {
        let qx = dx as f32 + 0.5 + min_x;
        let qy = dy as f32 + 0.5 + min_y;
        let sx = (qx * cos + qy * sin).floor();
        let sy = (-qx * sin + qy * cos).floor();
        if sx >= 0.0 && sy >= 0.0 && (sx as i64) < w && (sy as i64) < h {
            *px = *src.get_pixel(sx as u32, sy as u32);
        }
    }
    (out, (min_x.floor() as i64, min_y.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::resource::MemoryLoader;
    use crate::render::test_util::*;
    use std::io::Cursor;

    #[test]
    fn opacity_scales_alpha() {
        let mut canvas = RgbaImage::new(2, 1);
        composite(&mut canvas, &pair(), 0, 0, 0.5);
        let alpha = canvas.get_pixel(0, 0)[3];
        assert!((126..=127).contains(&alpha), "alpha {alpha}");
        assert_eq!(mask_value(1.0), 255);
        assert_eq!(mask_value(0.25), 63);
    }

    #[test]
    fn composite_clips_to_canvas() {
        let mut canvas = RgbaImage::new(2, 2);
        composite(&mut canvas, &pair(), 1, 1, 1.0);
        assert_eq!(canvas.get_pixel(1, 1), &RED);
        assert_eq!(canvas.get_pixel(0, 1)[3], 0);

        composite(&mut canvas, &pair(), -1, 0, 1.0);
        assert_eq!(canvas.get_pixel(0, 0), &GREEN);
    }

    #[test]
    fn quarter_turn_anchors_top_left() {
        let (out, shift) = rotate(&pair(), 90.0);
        assert_eq!(out.dimensions(), (1, 2));
        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(0, 1), &GREEN);
        assert_eq!(shift, (-1, 0));
    }

    #[test]
    fn arbitrary_angle_grows_the_box() {
        let src = RgbaImage::from_pixel(10, 10, BLUE);
        let (out, (sx, sy)) = rotate(&src, 45.0);
        assert!(out.width() >= 14 && out.width() <= 15);
        assert_eq!(out.dimensions().0, out.dimensions().1);
        assert!(sx < 0 && sy == 0);
        // center stays covered, corners of the box are empty
        let c = out.width() / 2;
        assert_eq!(out.get_pixel(c, c), &BLUE);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn nearest_resize_only_when_needed() {
        assert!(resize_nearest(&pair(), 2, 1).is_none());
        assert!(resize_nearest(&pair(), 0, 4).is_none());
        let big = resize_nearest(&pair(), 4, 2).unwrap();
        assert_eq!(big.get_pixel(1, 1), &RED);
        assert_eq!(big.get_pixel(2, 0), &GREEN);
    }

    #[test]
    fn transparent_color_is_keyed_out() {
        let mut bytes = Vec::new();
        pair()
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let loader = MemoryLoader::new().with("a.png", bytes);
        let img = load_image(&loader, Path::new("a.png"), Some(HexColor::new(0, 255, 0, 255))).unwrap();
        assert_eq!(img.get_pixel(0, 0), &RED);
        assert_eq!(img.get_pixel(1, 0)[3], 0);

        let err = load_image(&loader, Path::new("b.png"), None).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }
}
