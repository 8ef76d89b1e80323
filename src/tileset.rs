use crate::color::HexColor;
use crate::error::MapError;
use crate::loader::json_loader::decode_tileset_bytes;
use crate::loader::resource::ResourceLoader;
use crate::object::ObjectGroup;
use crate::properties::Properties;
use crate::wang::WangSet;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A tileset reference held by a map.
///
/// External tilesets start as a stub (first gid + source path) and are parsed
/// on first use; the parsed definition is kept for the lifetime of the map.
#[derive(Debug)]
pub struct Tileset {
    first_gid: u32,
    source: Option<String>,
    base_dir: PathBuf,
    data: OnceLock<TilesetData>,
}

impl Tileset {
    /// A tileset defined inline in the map document.
    pub fn embedded(first_gid: u32, data: TilesetData) -> Self {
        Tileset {
            first_gid,
            source: None,
            base_dir: data.base_dir.clone(),
            data: OnceLock::from(data),
        }
    }

    /// A stub pointing at an external tileset file, relative to `base_dir`.
    pub fn external(first_gid: u32, source: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Tileset {
            first_gid,
            source: Some(source.into()),
            base_dir: base_dir.into(),
            data: OnceLock::new(),
        }
    }

    /// Smallest gid mapped into this tileset.
    pub fn first_gid(&self) -> u32 {
        self.first_gid
    }

    /// External source path as written in the map, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// `true` once the definition is available without I/O.
    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    /// The definition if it has already been loaded.
    pub fn loaded(&self) -> Option<&TilesetData> {
        self.data.get()
    }

    /// The tileset definition, reading the external file on first call.
    ///
    /// Failures are returned as-is and nothing is cached, so a later call
    /// reads the file again.
    pub fn data(&self, loader: &dyn ResourceLoader) -> Result<&TilesetData, MapError> {
        if let Some(data) = self.data.get() {
            return Ok(data);
        }
        let Some(source) = self.source.as_deref() else {
            return Err(MapError::InvalidMap(format!(
                "tileset with first gid {} has neither data nor source",
                self.first_gid
            )));
        };

        let path = self.base_dir.join(source);
        debug!("loading external tileset {} (first gid {})", path.display(), self.first_gid);
        let bytes = loader.read(&path).map_err(|source| MapError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = decode_tileset_bytes(&bytes, &path)?;

        Ok(self.data.get_or_init(|| parsed))
    }
}

/// Pixel offset applied when drawing tiles of a tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileOffset {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset, positive is down.
    pub y: i32,
}

/// An image reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
    /// Path relative to the declaring document.
    pub source: String,
    /// Declared width, 0 when unknown.
    pub width: u32,
    /// Declared height, 0 when unknown.
    pub height: u32,
    /// Color treated as fully transparent.
    pub trans: Option<HexColor>,
}

/// One animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Local tile id shown during this frame.
    pub tile_id: u32,
    /// Frame duration in milliseconds.
    pub duration: u32,
}

/// Per-tile data of a tileset.
#[derive(Debug, Clone, Default)]
pub struct TilesetTile {
    /// Local tile id.
    pub id: u32,
    /// Class (formerly "type").
    pub class: String,
    /// Terrain tool weight.
    pub probability: f32,
    /// Custom properties.
    pub properties: Properties,
    /// Image of a collection tileset tile.
    pub image: Option<Image>,
    /// Collision shapes and other per-tile objects.
    pub object_group: Option<ObjectGroup>,
    /// Animation frames, empty when static.
    pub animation: Vec<Frame>,
}

/// Parsed tileset definition.
#[derive(Debug, Clone, Default)]
pub struct TilesetData {
    /// Tileset name.
    pub name: String,
    /// User-defined class.
    pub class: String,
    /// Width of one tile in pixels.
    pub tile_width: u32,
    /// Height of one tile in pixels.
    pub tile_height: u32,
    /// Pixels between neighbouring tiles in the atlas.
    pub spacing: u32,
    /// Pixels around the atlas border.
    pub margin: u32,
    /// 0 means "derive from the image width".
    pub columns: u32,
    /// 0 means "derive from the image height".
    pub tile_count: u32,
    /// Added to every tile's draw position.
    pub tile_offset: TileOffset,
    /// Shared atlas image; `None` for image collection tilesets.
    pub image: Option<Image>,
    /// Tiles carrying extra data; not every tile has an entry.
    pub tiles: Vec<TilesetTile>,
    /// Terrain rule sets.
    pub wang_sets: Vec<WangSet>,
    /// Custom properties.
    pub properties: Properties,
    /// Directory relative image sources resolve against.
    pub base_dir: PathBuf,
}

impl TilesetData {
    /// Per-tile data for a local id.
    pub fn tile(&self, id: u32) -> Option<&TilesetTile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// Full path of an image declared by this tileset.
    pub fn image_path(&self, image: &Image) -> PathBuf {
        self.base_dir.join(&image.source)
    }

    /// `(columns, tile count)` of an atlas of the given pixel size.
    ///
    /// Declared values win; zero values are derived from the image, taking
    /// margin and spacing into account.
    pub fn grid(&self, image_width: u32, image_height: u32) -> (u32, u32) {
        let fit = |extent: u32, tile: u32| {
            let usable = extent.saturating_sub(self.margin.saturating_mul(2));
            if tile == 0 || usable < tile {
                return 0;
            }
            (usable - tile) / tile.saturating_add(self.spacing) + 1
        };

        let columns = match self.columns {
            0 => fit(image_width, self.tile_width),
            c => c,
        };
        let count = match self.tile_count {
            0 => fit(image_height, self.tile_height).saturating_mul(columns),
            c => c,
        };
        (columns, count)
    }

    /// Top-left pixel of a tile inside the atlas, `None` past `u32` range.
    pub fn tile_origin(&self, id: u32, columns: u32) -> Option<(u32, u32)> {
        let columns = columns.max(1);
        let (col, row) = (id % columns, id / columns);
        let along = |index: u32, tile: u32| {
            tile.checked_add(self.spacing)?
                .checked_mul(index)?
                .checked_add(self.margin)
        };
        Some((along(col, self.tile_width)?, along(row, self.tile_height)?))
    }
}

/// Directory of a document path, `./` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::resource::MemoryLoader;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn atlas(margin: u32, spacing: u32) -> TilesetData {
        TilesetData {
            tile_width: 16,
            tile_height: 16,
            margin,
            spacing,
            ..Default::default()
        }
    }

    #[test]
    fn grid_derives_from_image_when_unset() {
        assert_eq!(atlas(0, 0).grid(64, 32), (4, 8));
        // 1px margin, 2px spacing: 1 + 16 + 2 + 16 + 2 + 16 + 1 = 54
        assert_eq!(atlas(1, 2).grid(54, 54), (3, 9));
    }

    #[test]
    fn grid_keeps_declared_values() {
        let mut ts = atlas(0, 0);
        ts.columns = 2;
        ts.tile_count = 3;
        assert_eq!(ts.grid(64, 64), (2, 3));
    }

    #[test]
    fn tile_origin_honors_margin_and_spacing() {
        let ts = atlas(1, 2);
        assert_eq!(ts.tile_origin(0, 3), Some((1, 1)));
        assert_eq!(ts.tile_origin(4, 3), Some((19, 19)));
    }

    #[test]
    fn huge_declared_sizes_do_not_overflow() {
        let mut ts = atlas(u32::MAX, u32::MAX);
        assert_eq!(ts.grid(64, 64), (0, 0));
        assert_eq!(ts.tile_origin(5, 2), None);

        ts = atlas(0, 0);
        ts.tile_width = u32::MAX / 2;
        assert_eq!(ts.tile_origin(1, 5), Some((u32::MAX / 2, 0)));
        assert_eq!(ts.tile_origin(4, 5), None);
    }

    struct Counting {
        inner: MemoryLoader,
        reads: AtomicUsize,
    }

    impl ResourceLoader for Counting {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(path)
        }
    }

    #[test]
    fn external_tileset_is_loaded_once() {
        let loader = Counting {
            inner: MemoryLoader::new().with(
                "maps/ts/terrain.json",
                r#"{"name":"terrain","tilewidth":8,"tileheight":8,"tilecount":4,"columns":2,"image":"terrain.png"}"#,
            ),
            reads: AtomicUsize::new(0),
        };
        let ts = Tileset::external(5, "ts/terrain.json", "maps");
        assert!(!ts.is_loaded());

        let data = ts.data(&loader).unwrap();
        assert_eq!(data.name, "terrain");
        assert_eq!(data.base_dir, PathBuf::from("maps/ts"));
        ts.data(&loader).unwrap();

        assert_eq!(loader.reads.load(Ordering::SeqCst), 1);
        assert_eq!(ts.first_gid(), 5);
        assert_eq!(ts.source(), Some("ts/terrain.json"));
    }

    #[test]
    fn missing_external_tileset_is_an_io_error() {
        let ts = Tileset::external(1, "gone.json", ".");
        let err = ts.data(&MemoryLoader::new()).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
        assert!(!ts.is_loaded());
    }
}
