use crate::error::MapError;
use crate::gid::LayerTile;
use crate::object::ObjectGroup;
use crate::properties::Properties;
use crate::tileset::Image;
use macroquad::math::Vec2;

/// A decoded tile layer. `tiles` is row-major, one entry per map cell.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique layer id inside the map.
    pub id: u32,
    /// Layer name, may be empty.
    pub name: String,
    /// User-defined class.
    pub class: String,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// 0.0 to 1.0.
    pub opacity: f32,
    /// Hidden layers are skipped by the walkers.
    pub visible: bool,
    /// Pixel offset applied when drawing.
    pub offset: Vec2,
    /// Custom properties.
    pub properties: Properties,
    /// Resolved cells.
    pub tiles: Vec<LayerTile>,
    tileset: Option<usize>,
    empty: bool,
}

impl Layer {
    /// Builds a layer and computes its emptiness / single-tileset hints.
    pub(crate) fn new(header: LayerHeader, width: u32, height: u32, tiles: Vec<LayerTile>) -> Self {
        let mut used = tiles.iter().filter_map(LayerTile::tile).map(|t| t.tileset);
        let first = used.next();
        let homogeneous = match first {
            Some(ts) => used.all(|other| other == ts),
            None => false,
        };

        Layer {
            id: header.id,
            name: header.name,
            class: header.class,
            width,
            height,
            opacity: header.opacity,
            visible: header.visible,
            offset: header.offset,
            properties: header.properties,
            tiles,
            tileset: if homogeneous { first } else { None },
            empty: first.is_none(),
        }
    }

    /// Cell at `(x, y)`, `None` outside the layer.
    pub fn tile_at(&self, x: u32, y: u32) -> Option<&LayerTile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y as usize * self.width as usize + x as usize)
    }

    /// `true` when every cell is nil.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The only tileset used by this layer, if it uses exactly one.
    pub fn tileset(&self) -> Option<usize> {
        self.tileset
    }
}

/// Attributes shared by every layer kind.
#[derive(Debug, Clone)]
pub(crate) struct LayerHeader {
    pub id: u32,
    pub name: String,
    pub class: String,
    pub opacity: f32,
    pub visible: bool,
    pub offset: Vec2,
    pub properties: Properties,
}

/// A layer showing a single image.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    /// Unique layer id inside the map.
    pub id: u32,
    /// Layer name.
    pub name: String,
    /// User-defined class.
    pub class: String,
    /// 0.0 to 1.0.
    pub opacity: f32,
    /// Visibility flag.
    pub visible: bool,
    /// Where the image's top-left corner is drawn.
    pub offset: Vec2,
    /// Tile the image across the canvas horizontally.
    pub repeat_x: bool,
    /// Tile the image across the canvas vertically.
    pub repeat_y: bool,
    /// Path relative to the map file.
    pub image: Option<Image>,
    /// Custom properties.
    pub properties: Properties,
}

/// A group layer.
#[derive(Debug, Clone)]
pub struct Group {
    /// Unique layer id inside the map.
    pub id: u32,
    /// Group name.
    pub name: String,
    /// User-defined class.
    pub class: String,
    /// Multiplied into every child's opacity.
    pub opacity: f32,
    /// A hidden group hides its whole subtree.
    pub visible: bool,
    /// Added to every child's offset.
    pub offset: Vec2,
    /// Custom properties.
    pub properties: Properties,
    /// Children in document order.
    pub layers: Vec<LayerNode>,
}

impl Group {
    /// The `index`-th tile layer directly inside this group.
    pub fn tile_layer(&self, index: usize) -> Result<&Layer, MapError> {
        nth(&self.layers, index, "group layer", LayerNode::as_tiles)
    }

    /// The `index`-th object group directly inside this group.
    pub fn object_group(&self, index: usize) -> Result<&ObjectGroup, MapError> {
        nth(&self.layers, index, "group object group", LayerNode::as_objects)
    }
}

/// Any entry of a layer list.
#[derive(Debug, Clone)]
pub enum LayerNode {
    /// A tile layer.
    Tiles(Layer),
    /// An object group.
    Objects(ObjectGroup),
    /// An image layer.
    Image(ImageLayer),
    /// A nested group.
    Group(Group),
}

impl LayerNode {
    /// Name of the node.
    pub fn name(&self) -> &str {
        match self {
            LayerNode::Tiles(l) => &l.name,
            LayerNode::Objects(o) => &o.name,
            LayerNode::Image(i) => &i.name,
            LayerNode::Group(g) => &g.name,
        }
    }

    /// Own visibility flag, ignoring ancestors.
    pub fn visible(&self) -> bool {
        match self {
            LayerNode::Tiles(l) => l.visible,
            LayerNode::Objects(o) => o.visible,
            LayerNode::Image(i) => i.visible,
            LayerNode::Group(g) => g.visible,
        }
    }

    /// Own opacity, ignoring ancestors.
    pub fn opacity(&self) -> f32 {
        match self {
            LayerNode::Tiles(l) => l.opacity,
            LayerNode::Objects(o) => o.opacity,
            LayerNode::Image(i) => i.opacity,
            LayerNode::Group(g) => g.opacity,
        }
    }

    /// Own offset, ignoring ancestors.
    pub fn offset(&self) -> Vec2 {
        match self {
            LayerNode::Tiles(l) => l.offset,
            LayerNode::Objects(o) => o.offset,
            LayerNode::Image(i) => i.offset,
            LayerNode::Group(g) => g.offset,
        }
    }

    /// The tile layer, if this is one.
    pub fn as_tiles(&self) -> Option<&Layer> {
        match self {
            LayerNode::Tiles(l) => Some(l),
            _ => None,
        }
    }

    /// The object group, if this is one.
    pub fn as_objects(&self) -> Option<&ObjectGroup> {
        match self {
            LayerNode::Objects(o) => Some(o),
            _ => None,
        }
    }

    /// The image layer, if this is one.
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            LayerNode::Image(i) => Some(i),
            _ => None,
        }
    }

    /// The group, if this is one.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            LayerNode::Group(g) => Some(g),
            _ => None,
        }
    }
}

/// The `index`-th node of one kind, counting only nodes of that kind.
pub(crate) fn nth<'a, T>(
    nodes: &'a [LayerNode],
    index: usize,
    kind: &'static str,
    pick: fn(&LayerNode) -> Option<&T>,
) -> Result<&'a T, MapError> {
    let mut matching = nodes.iter().filter_map(pick);
    match matching.nth(index) {
        Some(found) => Ok(found),
        None => Err(MapError::IndexOutOfBounds {
            kind,
            index,
            len: nodes.iter().filter_map(pick).count(),
        }),
    }
}
