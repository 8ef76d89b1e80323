use crate::color::HexColor;
use crate::error::MapError;
use crate::gid::{resolve, LayerTile, TileId};
use crate::layer::{nth, Group, ImageLayer, Layer, LayerNode};
use crate::loader::json_loader::{decode_map_bytes, decode_map_file};
use crate::loader::resource::{FsLoader, ResourceLoader};
use crate::object::ObjectGroup;
use crate::properties::Properties;
use crate::tileset::{Tileset, TilesetData};
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Map projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Square grid.
    Orthogonal,
    /// Diamond projection.
    Isometric,
    /// Staggered isometric.
    Staggered,
    /// Staggered hexagons.
    Hexagonal,
}

impl Orientation {
    pub(crate) fn parse(s: &str) -> Result<Self, MapError> {
        match s {
            "orthogonal" => Ok(Orientation::Orthogonal),
            "isometric" => Ok(Orientation::Isometric),
            "staggered" => Ok(Orientation::Staggered),
            "hexagonal" => Ok(Orientation::Hexagonal),
            other => Err(MapError::UnsupportedOrientation(other.to_owned())),
        }
    }

    /// Name as written in map documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Orthogonal => "orthogonal",
            Orientation::Isometric => "isometric",
            Orientation::Staggered => "staggered",
            Orientation::Hexagonal => "hexagonal",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which tiles are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderOrder {
    /// Rows top to bottom, cells left to right.
    #[default]
    RightDown,
    /// Rows bottom to top, cells left to right.
    RightUp,
    /// Rows top to bottom, cells right to left.
    LeftDown,
    /// Rows bottom to top, cells right to left.
    LeftUp,
}

impl RenderOrder {
    pub(crate) fn parse(s: &str) -> Result<Self, MapError> {
        match s {
            "right-down" => Ok(RenderOrder::RightDown),
            "right-up" => Ok(RenderOrder::RightUp),
            "left-down" => Ok(RenderOrder::LeftDown),
            "left-up" => Ok(RenderOrder::LeftUp),
            other => Err(MapError::UnsupportedRenderOrder(other.to_owned())),
        }
    }

    /// Name as written in map documents.
    pub fn as_str(self) -> &'static str {
        match self {
            RenderOrder::RightDown => "right-down",
            RenderOrder::RightUp => "right-up",
            RenderOrder::LeftDown => "left-down",
            RenderOrder::LeftUp => "left-up",
        }
    }
}

/// Axis along which hexagonal rows or columns are staggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaggerAxis {
    /// Every other column is shifted down.
    #[default]
    X,
    /// Every other row is shifted right.
    Y,
}

/// Which rows or columns are shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaggerIndex {
    /// Odd rows or columns.
    #[default]
    Odd,
    /// Even rows or columns.
    Even,
}

/// A fully decoded map.
///
/// Construction is all-or-nothing: either every layer decoded and every gid
/// resolved, or an error is returned.
pub struct Map {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// Projection.
    pub orientation: Orientation,
    /// Tile render order.
    pub render_order: RenderOrder,
    /// Hexagonal stagger axis.
    pub stagger_axis: StaggerAxis,
    /// Hexagonal stagger index.
    pub stagger_index: StaggerIndex,
    /// Length of the flat hexagon side, in pixels.
    pub hex_side_length: u32,
    /// Background color, if any.
    pub background_color: Option<HexColor>,
    /// Custom properties.
    pub properties: Properties,
    /// Tilesets, sorted by first gid.
    pub tilesets: Vec<Tileset>,
    /// Top-level layers in document order.
    pub layers: Vec<LayerNode>,
    pub(crate) base_dir: PathBuf,
    pub(crate) loader: Arc<dyn ResourceLoader>,
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tile_width", &self.tile_width)
            .field("tile_height", &self.tile_height)
            .field("orientation", &self.orientation)
            .field("tilesets", &self.tilesets.len())
            .field("layers", &self.layers.len())
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}

impl Map {
    /// Loads a `.json` / `.tmj` map from disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Map, MapError> {
        Loader::new().load_from_file(path)
    }

    /// Decodes map text; relative references resolve against `base_dir`.
    pub fn load_from_str(base_dir: impl AsRef<Path>, text: &str) -> Result<Map, MapError> {
        Loader::new().load_from_str(base_dir, text)
    }

    /// The `index`-th top-level tile layer.
    pub fn tile_layer(&self, index: usize) -> Result<&Layer, MapError> {
        nth(&self.layers, index, "layer", LayerNode::as_tiles)
    }

    /// The `index`-th top-level object group.
    pub fn object_group(&self, index: usize) -> Result<&ObjectGroup, MapError> {
        nth(&self.layers, index, "object group", LayerNode::as_objects)
    }

    /// The `index`-th top-level image layer.
    pub fn image_layer(&self, index: usize) -> Result<&ImageLayer, MapError> {
        nth(&self.layers, index, "image layer", LayerNode::as_image)
    }

    /// The `index`-th top-level group.
    pub fn group(&self, index: usize) -> Result<&Group, MapError> {
        nth(&self.layers, index, "group", LayerNode::as_group)
    }

    /// Resolves a raw gid against this map's tilesets.
    pub fn resolve(&self, gid: TileId) -> Result<LayerTile, MapError> {
        resolve(&self.tilesets, self.loader.as_ref(), gid)
    }

    /// Definition of the tileset at `index`, loading it on first use.
    pub fn tileset_data(&self, index: usize) -> Result<&TilesetData, MapError> {
        let tileset = self.tilesets.get(index).ok_or(MapError::IndexOutOfBounds {
            kind: "tileset",
            index,
            len: self.tilesets.len(),
        })?;
        tileset.data(self.loader.as_ref())
    }

    /// Directory relative references resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where map, tileset and image bytes come from.
    pub fn resources(&self) -> &dyn ResourceLoader {
        self.loader.as_ref()
    }

    /// Map size in pixels for orthogonal maps, `None` when it overflows `u32`.
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        Some((
            self.width.checked_mul(self.tile_width)?,
            self.height.checked_mul(self.tile_height)?,
        ))
    }
}

/// Map loading options.
///
/// ```no_run
/// use tiled_compositor::{Loader, MapError};
///
/// let map = Loader::new().eager_tilesets(true).load_from_file("assets/map.tmj")?;
/// # Ok::<(), MapError>(())
/// ```
#[derive(Clone)]
pub struct Loader {
    resources: Arc<dyn ResourceLoader>,
    eager: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Loader {
            resources: Arc::new(FsLoader),
            eager: false,
        }
    }
}

impl Loader {
    /// Filesystem loader, tilesets loaded on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every resource through `resources` instead of the filesystem.
    pub fn with_resources(mut self, resources: impl ResourceLoader + 'static) -> Self {
        self.resources = Arc::new(resources);
        self
    }

    /// Loads every external tileset while decoding, even unreferenced ones.
    pub fn eager_tilesets(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// Loads a `.json` / `.tmj` map file.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Map, MapError> {
        let path = path.as_ref();
        let map = decode_map_file(path, self.resources.clone())?;
        self.finish(map, path)
    }

    /// Decodes map text; relative references resolve against `base_dir`.
    pub fn load_from_str(&self, base_dir: impl AsRef<Path>, text: &str) -> Result<Map, MapError> {
        let base_dir = base_dir.as_ref();
        let map = decode_map_bytes(
            text.as_bytes(),
            Path::new("<memory>"),
            base_dir,
            self.resources.clone(),
        )?;
        self.finish(map, base_dir)
    }

    fn finish(&self, map: Map, origin: &Path) -> Result<Map, MapError> {
        if self.eager {
            for tileset in &map.tilesets {
                tileset.data(map.loader.as_ref())?;
            }
        }
        info!(
            "loaded map {} ({}x{} {}, {} tilesets)",
            origin.display(),
            map.width,
            map.height,
            map.orientation,
            map.tilesets.len()
        );
        Ok(map)
    }
}
