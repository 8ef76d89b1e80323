use crate::error::MapError;
use image::Rgba;
use std::fmt;

/// A color written as `#RRGGBB` or `#AARRGGBB`. Alpha comes first, unlike CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HexColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl HexColor {
    /// Opaque black, the default text color.
    pub const BLACK: HexColor = HexColor { r: 0, g: 0, b: 0, a: 255 };

    /// Builds a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        HexColor { r, g, b, a }
    }

    /// Parses `#RRGGBB` or `#AARRGGBB`; the `#` is optional.
    pub fn parse(s: &str) -> Result<Self, MapError> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || MapError::InvalidMap(format!("invalid color {s:?}"));
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(HexColor::new(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(HexColor::new(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => Err(invalid()),
        }
    }

    /// Same color as an `image` pixel.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}
