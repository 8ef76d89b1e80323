use crate::color::HexColor;
use crate::gid::TileId;
use crate::properties::Properties;
use macroquad::math::Vec2;
use std::cmp::Ordering;

/// Text attached to an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// The string shown.
    pub text: String,
    /// Defaults to `sans-serif`.
    pub font_family: String,
    /// Font size in pixels, 16 by default.
    pub pixel_size: u32,
    /// Word wrap inside the object bounds.
    pub wrap: bool,
    /// Black unless set.
    pub color: HexColor,
    /// Bold face.
    pub bold: bool,
    /// Italic face.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
    /// Struck out.
    pub strikeout: bool,
    /// On by default.
    pub kerning: bool,
    /// `left`, `center`, `right` or `justify`.
    pub halign: String,
    /// `top`, `center` or `bottom`.
    pub valign: String,
}

impl Default for Text {
    fn default() -> Self {
        Text {
            text: String::new(),
            font_family: "sans-serif".into(),
            pixel_size: 16,
            wrap: false,
            color: HexColor::BLACK,
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            kerning: true,
            halign: "left".into(),
            valign: "top".into(),
        }
    }
}

/// Geometry of an object that is not drawn as a tile.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ObjectShape {
    /// Plain rectangle (also used by tile objects).
    #[default]
    Rectangle,
    /// Ellipse inscribed in the object bounds.
    Ellipse,
    /// A single point at the object position.
    Point,
    /// Closed polygon, points relative to the object position.
    Polygon(Vec<Vec2>),
    /// Open polyline, points relative to the object position.
    Polyline(Vec<Vec2>),
    /// A text box.
    Text(Text),
}

/// A freely placed entity of an object group.
#[derive(Debug, Clone, Default)]
pub struct Object {
    /// Unique object id inside the map.
    pub id: u32,
    /// Object name.
    pub name: String,
    /// `class`, falling back to the legacy `type` attribute.
    pub class_name: String,
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels; 0 keeps the tile's own width.
    pub width: f32,
    /// Height in pixels; 0 keeps the tile's own height.
    pub height: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    /// Hidden objects are never drawn.
    pub visible: bool,
    /// Tile drawn for this object; 0 for shapes and text.
    pub gid: TileId,
    /// Shape for non-tile objects.
    pub shape: ObjectShape,
    /// Custom properties.
    pub properties: Properties,
}

/// `draworder` of an object group. Rendering always sorts top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawOrder {
    /// Sorted by y.
    #[default]
    TopDown,
    /// Document order.
    Index,
}

/// An object layer.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    /// Unique layer id inside the map.
    pub id: u32,
    /// Layer name.
    pub name: String,
    /// User-defined class.
    pub class: String,
    /// Editor display color.
    pub color: Option<HexColor>,
    /// 0.0 to 1.0.
    pub opacity: f32,
    /// Visibility flag.
    pub visible: bool,
    /// Added to every object position.
    pub offset: Vec2,
    /// Declared draw order.
    pub draw_order: DrawOrder,
    /// Custom properties.
    pub properties: Properties,
    /// Objects in document order.
    pub objects: Vec<Object>,
}

impl Default for ObjectGroup {
    fn default() -> Self {
        ObjectGroup {
            id: 0,
            name: String::new(),
            class: String::new(),
            color: None,
            opacity: 1.0,
            visible: true,
            offset: Vec2::ZERO,
            draw_order: DrawOrder::TopDown,
            properties: Properties::new(),
            objects: Vec::new(),
        }
    }
}

impl ObjectGroup {
    /// Objects in render order: ascending y, then ascending x.
    ///
    /// `draw_order` is deliberately ignored; equal positions keep document order.
    pub fn sorted_objects(&self) -> Vec<&Object> {
        let mut objects: Vec<&Object> = self.objects.iter().collect();
        objects.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });
        objects
    }
}
