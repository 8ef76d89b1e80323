//! Wang set color lookup, used by terrain tooling rather than by rendering.

use crate::color::HexColor;
use crate::error::MapError;
use crate::properties::Properties;

/// A terrain-transition rule set.
#[derive(Debug, Clone, Default)]
pub struct WangSet {
    /// Set name.
    pub name: String,
    /// "corner", "edge" or "mixed".
    pub kind: String,
    /// Local id of the tile representing this set.
    pub tile: Option<u32>,
    /// Colors, referenced 1-based by wang ids.
    pub colors: Vec<WangColor>,
    /// Tiles taking part in the set.
    pub tiles: Vec<WangTile>,
    /// Custom properties.
    pub properties: Properties,
}

/// One terrain color.
#[derive(Debug, Clone, PartialEq)]
pub struct WangColor {
    /// Color name.
    pub name: String,
    /// Editor display color.
    pub color: HexColor,
    /// Local id of the representative tile.
    pub tile: Option<u32>,
    /// Relative weight when painting.
    pub probability: f32,
}

/// How a wang id was written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WangId {
    /// Comma separated text such as `"1,0,2,0,1,0,2,0"`.
    Text(String),
    /// An integer array.
    Indices(Vec<u32>),
}

/// Color indices of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WangTile {
    /// Local tile id.
    pub tile_id: u32,
    /// Color index per position.
    pub wang_id: WangId,
}

impl WangId {
    fn indices(&self) -> Result<Vec<u32>, MapError> {
        match self {
            WangId::Indices(v) => Ok(v.clone()),
            WangId::Text(s) => s
                .split(',')
                .map(|tok| {
                    tok.trim().parse::<u32>().map_err(|e| {
                        MapError::InternalError(format!("bad wang id entry {tok:?}: {e}"))
                    })
                })
                .collect(),
        }
    }
}

/// Which wang id layout to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WangMode {
    /// Eight entries: top, top-right, right, bottom-right, bottom, bottom-left, left, top-left.
    #[default]
    Full,
    /// Four corner entries in the old terrain order: top-left, top-right,
    /// bottom-left, bottom-right. Edge positions are always absent.
    LegacyCorners,
}

/// Colors at the eight compass positions of a tile. `None` means unassigned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WangColors<'a> {
    /// Top edge.
    pub top: Option<&'a WangColor>,
    /// Top-right corner.
    pub top_right: Option<&'a WangColor>,
    /// Right edge.
    pub right: Option<&'a WangColor>,
    /// Bottom-right corner.
    pub bottom_right: Option<&'a WangColor>,
    /// Bottom edge.
    pub bottom: Option<&'a WangColor>,
    /// Bottom-left corner.
    pub bottom_left: Option<&'a WangColor>,
    /// Left edge.
    pub left: Option<&'a WangColor>,
    /// Top-left corner.
    pub top_left: Option<&'a WangColor>,
}

impl<'a> WangColors<'a> {
    /// Positions in wang id order, starting at the top.
    pub fn positions(&self) -> [Option<&'a WangColor>; 8] {
        [
            self.top,
            self.top_right,
            self.right,
            self.bottom_right,
            self.bottom,
            self.bottom_left,
            self.left,
            self.top_left,
        ]
    }
}

impl WangSet {
    /// Colors of a tile using the 8-position layout.
    pub fn colors_for(&self, tile_id: u32) -> Result<WangColors<'_>, MapError> {
        wang_colors(self, tile_id, WangMode::Full)
    }
}

/// Resolves the colors assigned to `tile_id` in `set`.
pub fn wang_colors(set: &WangSet, tile_id: u32, mode: WangMode) -> Result<WangColors<'_>, MapError> {
    if set.colors.is_empty() {
        return Err(MapError::NoWangColors(set.name.clone()));
    }
    let tile = set
        .tiles
        .iter()
        .find(|t| t.tile_id == tile_id)
        .ok_or(MapError::NoWangTileMatch { tile_id })?;

    let indices = tile.wang_id.indices()?;
    let lookup = |index: u32| color_at(set, index);

    match (mode, indices.as_slice()) {
        (WangMode::Full, &[t, tr, r, br, b, bl, l, tl]) => Ok(WangColors {
            top: lookup(t)?,
            top_right: lookup(tr)?,
            right: lookup(r)?,
            bottom_right: lookup(br)?,
            bottom: lookup(b)?,
            bottom_left: lookup(bl)?,
            left: lookup(l)?,
            top_left: lookup(tl)?,
        }),
        (WangMode::LegacyCorners, &[tl, tr, bl, br]) => Ok(WangColors {
            top_left: lookup(tl)?,
            top_right: lookup(tr)?,
            bottom_left: lookup(bl)?,
            bottom_right: lookup(br)?,
            ..Default::default()
        }),
        (mode, other) => Err(MapError::InternalError(format!(
            "wang id of tile {tile_id} has {} entries, {mode:?} layout expects {}",
            other.len(),
            if mode == WangMode::Full { 8 } else { 4 }
        ))),
    }
}

fn color_at(set: &WangSet, index: u32) -> Result<Option<&WangColor>, MapError> {
    match index {
        0 => Ok(None),
        n => set.colors.get(n as usize - 1).map(Some).ok_or_else(|| {
            MapError::InternalError(format!(
                "wang color {n} out of range ({} colors)",
                set.colors.len()
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(name: &str) -> WangColor {
        WangColor {
            name: name.into(),
            color: HexColor::BLACK,
            tile: None,
            probability: 1.0,
        }
    }

    fn set(tiles: Vec<WangTile>) -> WangSet {
        WangSet {
            name: "terrain".into(),
            kind: "mixed".into(),
            colors: vec![color("grass"), color("sand")],
            tiles,
            ..Default::default()
        }
    }

    fn text(tile_id: u32, id: &str) -> WangTile {
        WangTile {
            tile_id,
            wang_id: WangId::Text(id.into()),
        }
    }

    #[test]
    fn zero_entries_are_absent_and_others_resolve() {
        let set = set(vec![text(3, "1,0,2,0,1,0,2,0")]);
        let colors = set.colors_for(3).unwrap();

        for (i, pos) in colors.positions().iter().enumerate() {
            if i % 2 == 1 {
                assert!(pos.is_none(), "position {i} should be unassigned");
            } else {
                assert!(pos.is_some(), "position {i} should be assigned");
            }
        }
        assert_eq!(colors.top.unwrap().name, "grass");
        assert_eq!(colors.right.unwrap().name, "sand");
    }

    #[test]
    fn integer_array_wang_ids_work_too() {
        let set = set(vec![WangTile {
            tile_id: 0,
            wang_id: WangId::Indices(vec![0, 2, 0, 2, 0, 2, 0, 2]),
        }]);
        let colors = set.colors_for(0).unwrap();
        assert_eq!(colors.top_left.unwrap().name, "sand");
        assert!(colors.top.is_none());
    }

    #[test]
    fn errors() {
        let empty = WangSet::default();
        assert!(matches!(empty.colors_for(0), Err(MapError::NoWangColors(_))));

        let s = set(vec![text(1, "1,1,1,1,1,1,1,1")]);
        assert!(matches!(
            s.colors_for(9),
            Err(MapError::NoWangTileMatch { tile_id: 9 })
        ));

        let s = set(vec![text(1, "1,x,1,1,1,1,1,1")]);
        assert!(matches!(s.colors_for(1), Err(MapError::InternalError(_))));

        let s = set(vec![text(1, "1,1,1")]);
        assert!(matches!(s.colors_for(1), Err(MapError::InternalError(_))));

        let s = set(vec![text(1, "1,1,1,1,1,1,1,3")]);
        assert!(matches!(s.colors_for(1), Err(MapError::InternalError(_))));
    }

    #[test]
    fn legacy_corner_mode_requires_opt_in() {
        let s = set(vec![text(2, "1,2,0,1")]);
        assert!(s.colors_for(2).is_err());

        let colors = wang_colors(&s, 2, WangMode::LegacyCorners).unwrap();
        assert_eq!(colors.top_left.unwrap().name, "grass");
        assert_eq!(colors.top_right.unwrap().name, "sand");
        assert!(colors.bottom_left.is_none());
        assert_eq!(colors.bottom_right.unwrap().name, "grass");
        assert!(colors.top.is_none() && colors.left.is_none());
    }
}
