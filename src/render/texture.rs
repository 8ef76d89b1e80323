//! Hands the raster over to macroquad.

use super::Compositor;
use crate::error::MapError;
use macroquad::texture::{FilterMode, Image, Texture2D};

impl Compositor<'_> {
    /// Copies the raster into a macroquad CPU image.
    pub fn to_macroquad_image(&self) -> Result<Image, MapError> {
        let raster = self.result();
        let (w, h) = raster.dimensions();
        let too_large = || MapError::RasterTooLarge { width: w, height: h };
        Ok(Image {
            bytes: raster.as_raw().clone(),
            width: u16::try_from(w).map_err(|_| too_large())?,
            height: u16::try_from(h).map_err(|_| too_large())?,
        })
    }

    /// Uploads the raster as a pixel-art friendly texture.
    ///
    /// Needs a live macroquad context.
    pub fn upload_texture(&self) -> Result<Texture2D, MapError> {
        let image = self.to_macroquad_image()?;
        let texture = Texture2D::from_image(&image);
        texture.set_filter(FilterMode::Nearest);
        Ok(texture)
    }
}
