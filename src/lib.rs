#![warn(missing_docs)]

//! Tiled JSON map decoder and raster compositor, with a Macroquad texture bridge.
//!
//! ```no_run
//! use tiled_compositor::{Compositor, Map};
//!
//! # fn main() -> Result<(), tiled_compositor::MapError> {
//! let map = Map::load_from_file("assets/level.tmj")?;
//! let mut compositor = Compositor::new(&map)?;
//! compositor.render_visible()?;
//! let raster = compositor.into_result();
//! # let _ = raster;
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod color;
mod error;
pub mod gid;
mod layer;
/// Document decoding and resource access.
pub mod loader {
    pub(crate) mod json_loader;
    pub mod resource;
}
mod map;
mod object;
mod properties;
pub mod render;
pub mod scene;
mod tileset;
pub mod wang;

pub use color::HexColor;
pub use error::MapError;
pub use gid::{Flip, LayerTile, TileId, TileRef};
pub use layer::{Group, ImageLayer, Layer, LayerNode};
pub use loader::resource::{FsLoader, MemoryLoader, ResourceLoader};
pub use map::{Loader, Map, Orientation, RenderOrder, StaggerAxis, StaggerIndex};
pub use object::{DrawOrder, Object, ObjectGroup, ObjectShape, Text};
pub use properties::{Properties, PropertyValue};
pub use render::{Compositor, PixelRect, RenderEngine};
pub use scene::{SceneItem, SceneWalker};
pub use tileset::{Frame, Image, TileOffset, Tileset, TilesetData, TilesetTile};
pub use wang::{wang_colors, WangColor, WangColors, WangId, WangMode, WangSet, WangTile};
