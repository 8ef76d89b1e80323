use crate::error::MapError;
use crate::loader::resource::ResourceLoader;
use crate::tileset::Tileset;

/// Horizontal flip flag, bit 31.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip flag, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip flag, bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// Lower 29 bits: the bare gid.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

/// A raw global tile id as stored in layer data, flip flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileId(pub u32);

impl TileId {
    /// The stored value, flags included.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// The bare gid, flags removed.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// Horizontal flip flag.
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Vertical flip flag.
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Diagonal flip flag.
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
    /// `true` for a raw 0.
    #[inline] pub fn is_empty(self) -> bool { self.0 == 0 }

    /// The three flip flags of this id.
    pub fn flip(self) -> Flip {
        Flip {
            horizontal: self.flip_h(),
            vertical: self.flip_v(),
            diagonal: self.flip_d(),
        }
    }
}

/// Independent flip flags carried by a gid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flip {
    /// Mirror around the vertical axis.
    pub horizontal: bool,
    /// Mirror around the horizontal axis.
    pub vertical: bool,
    /// Swap x and y (anti-diagonal mirror).
    pub diagonal: bool,
}

/// A gid resolved against the map's tilesets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRef {
    /// Index of the owning tileset in [`Map::tilesets`](crate::Map::tilesets).
    pub tileset: usize,
    /// Tile id local to that tileset.
    pub id: u32,
    /// Flip flags taken from the gid.
    pub flip: Flip,
}

/// One cell of a tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayerTile {
    /// Gid 0, nothing is drawn.
    #[default]
    Nil,
    /// A tile from one of the map's tilesets.
    Tile(TileRef),
}

impl LayerTile {
    /// `true` for the empty cell.
    pub fn is_nil(&self) -> bool {
        matches!(self, LayerTile::Nil)
    }

    /// The resolved tile, if any.
    pub fn tile(&self) -> Option<&TileRef> {
        match self {
            LayerTile::Nil => None,
            LayerTile::Tile(t) => Some(t),
        }
    }
}

/// Index of the tileset owning `bare`, given tilesets sorted by first gid.
pub fn tileset_index_for(tilesets: &[Tileset], bare: u32) -> Option<usize> {
    tilesets
        .partition_point(|ts| ts.first_gid() <= bare)
        .checked_sub(1)
}

/// Maps a gid to a tile, lazily loading the owning tileset if it is external.
///
/// `tilesets` must be sorted by first gid.
pub fn resolve(
    tilesets: &[Tileset],
    loader: &dyn ResourceLoader,
    gid: TileId,
) -> Result<LayerTile, MapError> {
    let bare = gid.clean();
    if bare == 0 {
        return Ok(LayerTile::Nil);
    }

    let index = tileset_index_for(tilesets, bare).ok_or(MapError::InvalidTileGid { gid: bare })?;
    let tileset = &tilesets[index];
    tileset.data(loader)?;

    Ok(LayerTile::Tile(TileRef {
        tileset: index,
        id: bare - tileset.first_gid(),
        flip: gid.flip(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::resource::MemoryLoader;
    use crate::tileset::TilesetData;
    use proptest::prelude::*;

    fn embedded(first_gid: u32) -> Tileset {
        Tileset::embedded(first_gid, TilesetData::default())
    }

    #[test]
    fn flags_and_mask() {
        let id = TileId(FLIP_H | FLIP_D | 7);
        assert_eq!(id.clean(), 7);
        assert!(id.flip_h());
        assert!(!id.flip_v());
        assert!(id.flip_d());
    }

    #[test]
    fn two_tilesets_boundary() {
        let tilesets = vec![embedded(1), embedded(51)];
        let loader = MemoryLoader::new();

        let t = resolve(&tilesets, &loader, TileId(50)).unwrap();
        assert_eq!(t.tile().map(|t| (t.tileset, t.id)), Some((0, 49)));

        let t = resolve(&tilesets, &loader, TileId(51)).unwrap();
        assert_eq!(t.tile().map(|t| (t.tileset, t.id)), Some((1, 0)));

        assert_eq!(resolve(&tilesets, &loader, TileId(0)).unwrap(), LayerTile::Nil);
    }

    #[test]
    fn gid_zero_ignores_flip_bits() {
        let tilesets = vec![embedded(1)];
        let loader = MemoryLoader::new();
        assert_eq!(resolve(&tilesets, &loader, TileId(FLIP_H)).unwrap(), LayerTile::Nil);
        assert_eq!(
            resolve(&tilesets, &loader, TileId(FLIP_H | FLIP_V | FLIP_D)).unwrap(),
            LayerTile::Nil
        );
        assert_eq!(resolve(&[], &loader, TileId(0)).unwrap(), LayerTile::Nil);
    }

    #[test]
    fn gid_below_first_tileset_is_invalid() {
        let tilesets = vec![embedded(10)];
        let err = resolve(&tilesets, &MemoryLoader::new(), TileId(3)).unwrap_err();
        assert!(matches!(err, MapError::InvalidTileGid { gid: 3 }));
        let err = resolve(&[], &MemoryLoader::new(), TileId(3)).unwrap_err();
        assert!(matches!(err, MapError::InvalidTileGid { gid: 3 }));
    }

    proptest! {
        #[test]
        fn first_gid_maps_to_local_zero(firsts in prop::collection::btree_set(1u32..10_000, 1..8)) {
            let tilesets: Vec<_> = firsts.iter().map(|&f| embedded(f)).collect();
            let loader = MemoryLoader::new();
            for (i, f) in firsts.into_iter().enumerate() {
                let t = resolve(&tilesets, &loader, TileId(f)).unwrap();
                prop_assert_eq!(t.tile().map(|t| (t.tileset, t.id)), Some((i, 0)));
            }
        }

        #[test]
        fn flip_bits_do_not_change_resolution(bare in 1u32..=GID_MASK, flags in 0u32..8) {
            let tilesets = vec![embedded(1), embedded(51), embedded(4000)];
            let loader = MemoryLoader::new();
            let plain = resolve(&tilesets, &loader, TileId(bare)).unwrap();
            let flipped = resolve(&tilesets, &loader, TileId(bare | (flags << 29))).unwrap();

            let (p, f) = (plain.tile().unwrap(), flipped.tile().unwrap());
            prop_assert_eq!((p.tileset, p.id), (f.tileset, f.id));
            prop_assert_eq!(f.flip, TileId(flags << 29).flip());
        }
    }
}
