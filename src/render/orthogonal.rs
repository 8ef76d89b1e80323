use super::{canvas_size, PixelRect};
use crate::error::MapError;
use crate::map::{Map, RenderOrder};
use image::{imageops, RgbaImage};

/// Geometry of a square grid map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orthogonal {
    tile_width: u32,
    tile_height: u32,
    size: (u32, u32),
}

impl Orthogonal {
    /// Only right-down render order is supported, and the canvas must fit
    /// in pixel coordinates.
    pub fn new(map: &Map) -> Result<Self, MapError> {
        if map.render_order != RenderOrder::RightDown {
            return Err(MapError::UnsupportedRenderOrder(map.render_order.as_str().to_owned()));
        }
        let size = canvas_size(
            map.width.checked_mul(map.tile_width),
            map.height.checked_mul(map.tile_height),
        )?;
        Ok(Orthogonal {
            tile_width: map.tile_width,
            tile_height: map.tile_height,
            size,
        })
    }

    /// Cells times tile size.
    pub fn final_image_size(&self) -> (u32, u32) {
        self.size
    }

    /// Top-left of cell `(x, y)`, one tile in size.
    pub fn tile_position(&self, x: u32, y: u32) -> PixelRect {
        PixelRect {
            x: (u64::from(x) * u64::from(self.tile_width)) as i32,
            y: (u64::from(y) * u64::from(self.tile_height)) as i32,
            width: self.tile_width,
            height: self.tile_height,
        }
    }
}

/// Anti-diagonal mirror: a quarter turn clockwise, then a horizontal flip.
pub(super) fn flip_diagonal(image: &RgbaImage) -> RgbaImage {
    imageops::flip_horizontal(&imageops::rotate90(image))
}
