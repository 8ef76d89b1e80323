//! Map geometry and raster compositing.

mod blit;
mod compositor;
mod hexagonal;
mod orthogonal;
mod texture;

pub use compositor::Compositor;
pub use hexagonal::Hexagonal;
pub use orthogonal::Orthogonal;

use crate::error::MapError;
use crate::gid::Flip;
use crate::map::{Map, Orientation};
use image::{imageops, RgbaImage};
use std::borrow::Cow;

/// Destination rectangle of one cell on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Checked canvas dimensions; `None` marks an overflowed extent.
///
/// Both extents must also fit the `i32` pixel coordinates of [`PixelRect`].
fn canvas_size(width: Option<u32>, height: Option<u32>) -> Result<(u32, u32), MapError> {
    let limit = i32::MAX as u32;
    match (width, height) {
        (Some(w), Some(h)) if w <= limit && h <= limit => Ok((w, h)),
        (w, h) => Err(MapError::RasterTooLarge {
            width: w.unwrap_or(u32::MAX),
            height: h.unwrap_or(u32::MAX),
        }),
    }
}

/// Orientation specific geometry.
///
/// A new orientation is one more variant; the compositor only talks to this type.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEngine {
    /// Square grid.
    Orthogonal(Orthogonal),
    /// Staggered hexagons.
    Hexagonal(Hexagonal),
}

impl RenderEngine {
    /// Picks the engine for the map's orientation.
    pub fn new(map: &Map) -> Result<Self, MapError> {
        match map.orientation {
            Orientation::Orthogonal => Orthogonal::new(map).map(RenderEngine::Orthogonal),
            Orientation::Hexagonal => Hexagonal::new(map).map(RenderEngine::Hexagonal),
            other => Err(MapError::UnsupportedOrientation(other.to_string())),
        }
    }

    /// Canvas size in pixels.
    pub fn final_image_size(&self) -> (u32, u32) {
        match self {
            RenderEngine::Orthogonal(e) => e.final_image_size(),
            RenderEngine::Hexagonal(e) => e.final_image_size(),
        }
    }

    /// Where cell `(x, y)` lands on the canvas.
    pub fn tile_position(&self, x: u32, y: u32) -> PixelRect {
        match self {
            RenderEngine::Orthogonal(e) => e.tile_position(x, y),
            RenderEngine::Hexagonal(e) => e.tile_position(x, y),
        }
    }

    /// Order in which the cells of a row are drawn.
    ///
    /// Hexagonal maps draw even columns first and odd columns on top of them.
    pub fn column_order(&self, width: u32) -> impl Iterator<Item = u32> {
        let (step, second) = match self {
            RenderEngine::Orthogonal(_) => (1, 0..0),
            RenderEngine::Hexagonal(_) => (2, 1..width),
        };
        (0..width).step_by(step).chain(second.step_by(2))
    }

    /// Applies tile flips: horizontal, then vertical, then diagonal.
    ///
    /// Returns the input untouched when no flag is set.
    pub fn apply_flip<'a>(&self, flip: Flip, image: &'a RgbaImage) -> Cow<'a, RgbaImage> {
        if flip == Flip::default() {
            return Cow::Borrowed(image);
        }
        let mut out = image.clone();
        if flip.horizontal {
            imageops::flip_horizontal_in_place(&mut out);
        }
        if flip.vertical {
            imageops::flip_vertical_in_place(&mut out);
        }
        if flip.diagonal {
            out = match self {
                RenderEngine::Orthogonal(_) => orthogonal::flip_diagonal(&out),
                RenderEngine::Hexagonal(_) => hexagonal::flip_diagonal(&out),
            };
        }
        Cow::Owned(out)
    }
}
