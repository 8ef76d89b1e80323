use super::{canvas_size, PixelRect};
use crate::error::MapError;
use crate::map::{Map, StaggerAxis, StaggerIndex};
use image::{imageops, RgbaImage};

/// Geometry of a staggered hexagonal map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hexagonal {
    tile_width: u32,
    tile_height: u32,
    axis: StaggerAxis,
    index: StaggerIndex,
    size: (u32, u32),
}

impl Hexagonal {
    /// Fails when the canvas would not fit in pixel coordinates.
    pub fn new(map: &Map) -> Result<Self, MapError> {
        Self::with_cells(
            (map.width, map.height),
            (map.tile_width, map.tile_height),
            map.stagger_axis,
            map.stagger_index,
        )
    }

    fn with_cells(
        (width, height): (u32, u32),
        (tile_width, tile_height): (u32, u32),
        axis: StaggerAxis,
        index: StaggerIndex,
    ) -> Result<Self, MapError> {
        let size = match axis {
            StaggerAxis::X => canvas_size(
                width.checked_mul(tile_width),
                height
                    .checked_mul(tile_height)
                    .and_then(|h| h.checked_add(tile_height / 2)),
            ),
            StaggerAxis::Y => canvas_size(
                width
                    .checked_mul(tile_width)
                    .and_then(|w| w.checked_add(tile_width / 2)),
                height
                    .checked_add(1)
                    .and_then(|h| h.checked_mul(tile_height))
                    .and_then(|h| h.checked_mul(3))
                    .map(|h| h / 4),
            ),
        }?;
        Ok(Hexagonal {
            tile_width,
            tile_height,
            axis,
            index,
            size,
        })
    }

    /// Canvas size in pixels, including the half-cell stagger overhang.
    pub fn final_image_size(&self) -> (u32, u32) {
        self.size
    }

    fn staggered(&self, i: u64) -> bool {
        match self.index {
            StaggerIndex::Odd => i % 2 == 1,
            StaggerIndex::Even => i % 2 == 0,
        }
    }

    /// Where cell `(x, y)` lands; staggered cells are shifted by half a tile.
    pub fn tile_position(&self, x: u32, y: u32) -> PixelRect {
        let (x, y) = (u64::from(x), u64::from(y));
        let (tw, th) = (u64::from(self.tile_width), u64::from(self.tile_height));
        let (px, py) = match self.axis {
            StaggerAxis::X => {
                let shift = if self.staggered(x) { th / 2 } else { 0 };
                (x * (tw * 3 / 4), y * th + shift)
            }
            StaggerAxis::Y => {
                let shift = if self.staggered(y) { tw / 2 } else { 0 };
                (x * tw + shift, y * (th * 3 / 4))
            }
        };
        PixelRect {
            x: px as i32,
            y: py as i32,
            width: self.tile_width,
            height: self.tile_height,
        }
    }
}

/// Diagonal flip for hexagons: three quarter turns clockwise, then a horizontal flip.
pub(super) fn flip_diagonal(image: &RgbaImage) -> RgbaImage {
    imageops::flip_horizontal(&imageops::rotate270(image))
}
