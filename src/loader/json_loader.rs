// src/loader/json_loader.rs
use crate::codec::{decode_gids, LayerData, Payload};
use crate::color::HexColor;
use crate::error::MapError;
use crate::gid::{resolve, TileId};
use crate::layer::{Group, ImageLayer, Layer, LayerHeader, LayerNode};
use crate::loader::resource::ResourceLoader;
use crate::map::{Map, Orientation, RenderOrder, StaggerAxis, StaggerIndex};
use crate::object::{DrawOrder, Object, ObjectGroup, ObjectShape, Text};
use crate::properties::{Properties, PropertyValue};
use crate::tileset::{parent_dir, Frame, Image, TileOffset, Tileset, TilesetData, TilesetTile};
use crate::wang::{WangColor, WangId, WangSet, WangTile};
use log::debug;
use macroquad::math::vec2;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    orientation: Option<String>,
    #[serde(default)]
    renderorder: Option<String>,
    #[serde(default)]
    staggeraxis: Option<String>,
    #[serde(default)]
    staggerindex: Option<String>,
    #[serde(default)]
    hexsidelength: u32,
    #[serde(default)]
    backgroundcolor: Option<String>,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonMapTileset>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" when absent
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    class: String,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    // tile layers
    #[serde(default)]
    data: Option<Payload>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    compression: Option<String>,
    // object groups
    #[serde(default)]
    objects: Vec<JsonObject>,
    #[serde(default)]
    draworder: Option<String>,
    #[serde(default)]
    color: Option<String>,
    // image layers
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    transparentcolor: Option<String>,
    #[serde(default)]
    repeatx: bool,
    #[serde(default)]
    repeaty: bool,
    // groups
    #[serde(default)]
    layers: Vec<JsonLayer>,
}

#[derive(Deserialize)]
struct JsonMapTileset {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: JsonTileset,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonTileset {
    name: String,
    class: String,
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    columns: u32,
    spacing: u32,
    margin: u32,
    image: Option<String>,
    imagewidth: u32,
    imageheight: u32,
    transparentcolor: Option<String>,
    tileoffset: Option<JsonTileOffset>,
    properties: Vec<JsonProperty>,
    tiles: Vec<JsonTile>,
    wangsets: Vec<JsonWangSet>,
}

#[derive(Deserialize)]
struct JsonTileOffset {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default = "one")]
    probability: f32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    objectgroup: Option<JsonLayer>,
    #[serde(default)]
    animation: Vec<JsonFrame>,
}

#[derive(Deserialize)]
struct JsonFrame {
    tileid: u32,
    duration: u32,
}

#[derive(Deserialize)]
struct JsonWangSet {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    tile: i64,
    #[serde(default)]
    colors: Vec<JsonWangColor>,
    #[serde(default)]
    wangtiles: Vec<JsonWangTile>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonWangColor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    tile: i64,
    #[serde(default = "one")]
    probability: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonWangId {
    Indices(Vec<u32>),
    Text(String),
}

#[derive(Deserialize)]
struct JsonWangTile {
    tileid: u32,
    wangid: JsonWangId,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    ellipse: bool,
    #[serde(default)]
    point: bool,
    #[serde(default)]
    polygon: Vec<JsonObjectPoint>,
    #[serde(default)]
    polyline: Vec<JsonObjectPoint>,
    #[serde(default)]
    text: Option<JsonText>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct JsonText {
    #[serde(default)]
    text: String,
    #[serde(default)]
    fontfamily: Option<String>,
    #[serde(default)]
    pixelsize: Option<u32>,
    #[serde(default)]
    wrap: bool,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underline: bool,
    #[serde(default)]
    strikeout: bool,
    #[serde(default = "default_true")]
    kerning: bool,
    #[serde(default)]
    halign: Option<String>,
    #[serde(default)]
    valign: Option<String>,
}

fn json_property_to_ir(prop: JsonProperty) -> Result<Option<(String, PropertyValue)>, MapError> {
    let JsonProperty { name, kind, value } = prop;

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::I64),
        Some("float") => value.as_f64().map(|n| PropertyValue::F32(n as f32)),
        Some("string") | Some("class") => value.as_str().map(|s| PropertyValue::String(s.to_owned())),
        Some("file") => value.as_str().map(|s| PropertyValue::File(s.to_owned())),
        Some("color") => match value.as_str() {
            Some("") | None => None,
            Some(s) => Some(PropertyValue::Color(HexColor::parse(s)?)),
        },
        Some(other) => {
            return Err(MapError::UnsupportedPropertyType {
                name,
                kind: other.to_owned(),
            });
        }
        None => {
            if let Some(v) = value.as_bool() {
                Some(PropertyValue::Bool(v))
            } else if let Some(v) = value.as_i64() {
                Some(PropertyValue::I64(v))
            } else if let Some(v) = value.as_f64() {
                Some(PropertyValue::F32(v as f32))
            } else {
                value.as_str().map(|s| PropertyValue::String(s.to_owned()))
            }
        }
    };

    Ok(parsed.map(|value| (name, value)))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    for p in props {
        if let Some((name, value)) = json_property_to_ir(p)? {
            out.insert(name, value);
        }
    }
    Ok(out)
}

fn optional_color(value: Option<&str>) -> Result<Option<HexColor>, MapError> {
    match value {
        None | Some("") => Ok(None),
        Some(s) => HexColor::parse(s).map(Some),
    }
}

fn optional_tile(id: i64) -> Option<u32> {
    u32::try_from(id).ok()
}

fn text_to_ir(t: JsonText) -> Result<Text, MapError> {
    let defaults = Text::default();
    Ok(Text {
        text: t.text,
        font_family: t.fontfamily.unwrap_or(defaults.font_family),
        pixel_size: t.pixelsize.unwrap_or(defaults.pixel_size),
        wrap: t.wrap,
        color: optional_color(t.color.as_deref())?.unwrap_or(defaults.color),
        bold: t.bold,
        italic: t.italic,
        underline: t.underline,
        strikeout: t.strikeout,
        kerning: t.kerning,
        halign: t.halign.unwrap_or(defaults.halign),
        valign: t.valign.unwrap_or(defaults.valign),
    })
}

fn object_to_ir(obj: JsonObject) -> Result<Object, MapError> {
    let shape = if let Some(text) = obj.text {
        ObjectShape::Text(text_to_ir(text)?)
    } else if obj.point {
        ObjectShape::Point
    } else if obj.ellipse {
        ObjectShape::Ellipse
    } else if !obj.polygon.is_empty() {
        ObjectShape::Polygon(obj.polygon.into_iter().map(|p| vec2(p.x, p.y)).collect())
    } else if !obj.polyline.is_empty() {
        ObjectShape::Polyline(obj.polyline.into_iter().map(|p| vec2(p.x, p.y)).collect())
    } else {
        ObjectShape::Rectangle
    };

    let class_name = if !obj.class.is_empty() {
        obj.class
    } else {
        obj.kind
    };

    Ok(Object {
        id: obj.id,
        name: obj.name,
        class_name,
        x: obj.x,
        y: obj.y,
        width: obj.width,
        height: obj.height,
        rotation: obj.rotation,
        visible: obj.visible,
        gid: TileId(obj.gid.unwrap_or(0)),
        shape,
        properties: properties_from_json(obj.properties)?,
    })
}

fn header(l: &mut JsonLayer) -> Result<LayerHeader, MapError> {
    Ok(LayerHeader {
        id: l.id,
        name: std::mem::take(&mut l.name),
        class: std::mem::take(&mut l.class),
        opacity: l.opacity,
        visible: l.visible,
        offset: vec2(l.offsetx, l.offsety),
        properties: properties_from_json(std::mem::take(&mut l.properties))?,
    })
}

fn object_group_to_ir(mut l: JsonLayer) -> Result<ObjectGroup, MapError> {
    let h = header(&mut l)?;
    let draw_order = match l.draworder.as_deref() {
        Some("index") => DrawOrder::Index,
        _ => DrawOrder::TopDown,
    };
    Ok(ObjectGroup {
        id: h.id,
        name: h.name,
        class: h.class,
        color: optional_color(l.color.as_deref())?,
        opacity: h.opacity,
        visible: h.visible,
        offset: h.offset,
        draw_order,
        properties: h.properties,
        objects: l
            .objects
            .into_iter()
            .map(object_to_ir)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn tileset_to_ir(ts: JsonTileset, base_dir: PathBuf) -> Result<TilesetData, MapError> {
    let trans = optional_color(ts.transparentcolor.as_deref())?;
    let image = ts.image.map(|source| Image {
        source,
        width: ts.imagewidth,
        height: ts.imageheight,
        trans,
    });

    let tiles = ts
        .tiles
        .into_iter()
        .map(|tile| -> Result<TilesetTile, MapError> {
            Ok(TilesetTile {
                id: tile.id,
                class: if tile.class.is_empty() { tile.kind } else { tile.class },
                probability: tile.probability,
                properties: properties_from_json(tile.properties)?,
                image: tile.image.map(|source| Image {
                    source,
                    width: tile.imagewidth,
                    height: tile.imageheight,
                    trans,
                }),
                object_group: tile.objectgroup.map(object_group_to_ir).transpose()?,
                animation: tile
                    .animation
                    .into_iter()
                    .map(|f| Frame {
                        tile_id: f.tileid,
                        duration: f.duration,
                    })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let wang_sets = ts
        .wangsets
        .into_iter()
        .map(|set| -> Result<WangSet, MapError> {
            Ok(WangSet {
                name: set.name,
                kind: set.kind,
                tile: optional_tile(set.tile),
                colors: set
                    .colors
                    .into_iter()
                    .map(|c| -> Result<WangColor, MapError> {
                        Ok(WangColor {
                            name: c.name,
                            color: optional_color(c.color.as_deref())?.unwrap_or_default(),
                            tile: optional_tile(c.tile),
                            probability: c.probability,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                tiles: set
                    .wangtiles
                    .into_iter()
                    .map(|t| WangTile {
                        tile_id: t.tileid,
                        wang_id: match t.wangid {
                            JsonWangId::Indices(v) => WangId::Indices(v),
                            JsonWangId::Text(s) => WangId::Text(s),
                        },
                    })
                    .collect(),
                properties: properties_from_json(set.properties)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TilesetData {
        name: ts.name,
        class: ts.class,
        tile_width: ts.tilewidth,
        tile_height: ts.tileheight,
        spacing: ts.spacing,
        margin: ts.margin,
        columns: ts.columns,
        tile_count: ts.tilecount,
        tile_offset: ts
            .tileoffset
            .map(|o| TileOffset { x: o.x, y: o.y })
            .unwrap_or_default(),
        image,
        tiles,
        wang_sets,
        properties: properties_from_json(ts.properties)?,
        base_dir,
    })
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| allowed.contains(&e))
}

/// Parses an external tileset document; images resolve against its directory.
pub fn decode_tileset_bytes(bytes: &[u8], path: &Path) -> Result<TilesetData, MapError> {
    if !has_extension(path, &["json", "tsj"]) {
        return Err(MapError::UnsupportedFormat(format!(
            "External tileset must be JSON: {}",
            path.display()
        )));
    }
    let ext: JsonTileset = serde_json::from_slice(bytes).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tileset_to_ir(ext, parent_dir(path))
}

/// Everything layer conversion needs besides the layer itself.
struct LayerCtx<'a> {
    width: u32,
    height: u32,
    tilesets: &'a [Tileset],
    loader: &'a dyn ResourceLoader,
}

fn layer_to_ir(mut l: JsonLayer, ctx: &LayerCtx<'_>) -> Result<LayerNode, MapError> {
    let kind = l.kind.take().unwrap_or_else(|| "tilelayer".to_owned());
    match kind.as_str() {
        "tilelayer" => {
            let h = header(&mut l)?;
            let gids = decode_gids(
                LayerData {
                    encoding: l.encoding.as_deref(),
                    compression: l.compression.as_deref(),
                    payload: l.data.as_ref(),
                },
                &h.name,
                ctx.width,
                ctx.height,
            )?;
            let tiles = gids
                .into_iter()
                .map(|gid| resolve(ctx.tilesets, ctx.loader, TileId(gid)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(LayerNode::Tiles(Layer::new(h, ctx.width, ctx.height, tiles)))
        }
        "objectgroup" => {
            let group = object_group_to_ir(l)?;
            for obj in &group.objects {
                if !obj.gid.is_empty() {
                    resolve(ctx.tilesets, ctx.loader, obj.gid)?;
                }
            }
            Ok(LayerNode::Objects(group))
        }
        "imagelayer" => {
            let h = header(&mut l)?;
            let trans = optional_color(l.transparentcolor.as_deref())?;
            Ok(LayerNode::Image(ImageLayer {
                id: h.id,
                name: h.name,
                class: h.class,
                opacity: h.opacity,
                visible: h.visible,
                offset: h.offset,
                repeat_x: l.repeatx,
                repeat_y: l.repeaty,
                image: l.image.filter(|s| !s.is_empty()).map(|source| Image {
                    source,
                    width: 0,
                    height: 0,
                    trans,
                }),
                properties: h.properties,
            }))
        }
        "group" => {
            let h = header(&mut l)?;
            let layers = l
                .layers
                .into_iter()
                .map(|child| layer_to_ir(child, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(LayerNode::Group(Group {
                id: h.id,
                name: h.name,
                class: h.class,
                opacity: h.opacity,
                visible: h.visible,
                offset: h.offset,
                properties: h.properties,
                layers,
            }))
        }
        other => Err(MapError::InvalidMap(format!(
            "layer '{}' has unknown type '{other}'",
            l.name
        ))),
    }
}

/// Decodes a map document whose relative references resolve against `base_dir`.
///
/// `path` is only used in error messages.
pub fn decode_map_bytes(
    bytes: &[u8],
    path: &Path,
    base_dir: &Path,
    loader: Arc<dyn ResourceLoader>,
) -> Result<Map, MapError> {
    let j: JsonMap = serde_json::from_slice(bytes).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if j.infinite {
        return Err(MapError::InvalidMap("infinite maps are not supported".into()));
    }

    let orientation = Orientation::parse(j.orientation.as_deref().unwrap_or("orthogonal"))?;
    let render_order = RenderOrder::parse(j.renderorder.as_deref().unwrap_or("right-down"))?;
    let stagger_axis = match j.staggeraxis.as_deref() {
        None | Some("x") => StaggerAxis::X,
        Some("y") => StaggerAxis::Y,
        Some(other) => return Err(MapError::InvalidMap(format!("invalid stagger axis '{other}'"))),
    };
    let stagger_index = match j.staggerindex.as_deref() {
        None | Some("odd") => StaggerIndex::Odd,
        Some("even") => StaggerIndex::Even,
        Some(other) => return Err(MapError::InvalidMap(format!("invalid stagger index '{other}'"))),
    };

    let mut tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        match ts.source {
            Some(source) => tilesets.push(Tileset::external(ts.firstgid, source, base_dir)),
            None => {
                let data = tileset_to_ir(ts.inline, base_dir.to_path_buf())?;
                tilesets.push(Tileset::embedded(ts.firstgid, data));
            }
        }
    }
    // Sort by first_gid so gid lookup is a binary search
    tilesets.sort_by_key(|t| t.first_gid());

    let ctx = LayerCtx {
        width: j.width,
        height: j.height,
        tilesets: &tilesets,
        loader: loader.as_ref(),
    };
    let layers = j
        .layers
        .into_iter()
        .map(|l| layer_to_ir(l, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "decoded map {} ({}x{} cells, {} tilesets, {} top-level layers)",
        path.display(),
        j.width,
        j.height,
        tilesets.len(),
        layers.len()
    );

    Ok(Map {
        width: j.width,
        height: j.height,
        tile_width: j.tilewidth,
        tile_height: j.tileheight,
        orientation,
        render_order,
        stagger_axis,
        stagger_index,
        hex_side_length: j.hexsidelength,
        background_color: optional_color(j.backgroundcolor.as_deref())?,
        properties: properties_from_json(j.properties)?,
        tilesets,
        layers,
        base_dir: base_dir.to_path_buf(),
        loader,
    })
}

/// Reads and decodes a map file through `loader`.
pub fn decode_map_file(path: &Path, loader: Arc<dyn ResourceLoader>) -> Result<Map, MapError> {
    if !has_extension(path, &["json", "tmj"]) {
        return Err(MapError::UnsupportedFormat(path.display().to_string()));
    }
    let bytes = loader.read(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_map_bytes(&bytes, path, &parent_dir(path), loader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gid::LayerTile;
    use crate::loader::resource::MemoryLoader;

    fn decode(map_json: &str, loader: MemoryLoader) -> Result<Map, MapError> {
        decode_map_bytes(
            map_json.as_bytes(),
            Path::new("map.json"),
            Path::new("."),
            Arc::new(loader),
        )
    }

    const TILESET: &str = r#"{
      "tilewidth":16, "tileheight":16, "tilecount":4, "columns":2, "image":"tiles.png",
      "properties":[{"name":"biome","type":"string","value":"forest"}],
      "tiles":[
        {"id":0, "properties":[{"name":"damage","type":"int","value":10}],
         "objectgroup":{"objects":[{"id":1,"name":"hitbox","properties":[{"name":"sensor","type":"bool","value":false}]}]},
         "animation":[{"tileid":0,"duration":100},{"tileid":1,"duration":100}]}
      ]
    }"#;

    #[test]
    fn parses_properties_for_map_layer_object_tileset_and_tile() {
        let map_json = r##"{
          "width": 2, "height": 2, "tilewidth": 16, "tileheight": 16,
          "properties": [
            {"name":"is_night","type":"bool","value":true},
            {"name":"gravity","type":"float","value":9.8},
            {"name":"tint","type":"color","value":"#80ff0000"}
          ],
          "layers": [
            {"type":"tilelayer","name":"ground","data":[1,0,0,0],
             "properties":[{"name":"difficulty","type":"int","value":3}]},
            {"type":"objectgroup","name":"spawns",
             "objects":[{"id":7,"name":"spawn_1","type":"spawn",
                         "properties":[{"name":"kind","type":"string","value":"player"}]}]}
          ],
          "tilesets":[{"firstgid":1,"source":"tileset.json"}]
        }"##;

        let map = decode(map_json, MemoryLoader::new().with("tileset.json", TILESET)).unwrap();

        assert_eq!(map.properties.get_bool("is_night"), Some(true));
        assert_eq!(map.properties.get_f32("gravity"), Some(9.8));
        assert_eq!(map.properties.get_color("tint"), Some(HexColor::new(255, 0, 0, 128)));

        let ground = map.tile_layer(0).unwrap();
        assert_eq!(ground.properties.get_i32("difficulty"), Some(3));
        let spawns = map.object_group(0).unwrap();
        assert_eq!(spawns.objects[0].properties.get_string("kind"), Some("player"));
        assert_eq!(spawns.objects[0].class_name, "spawn");

        let ts = map.tilesets[0].loaded().expect("tileset loaded while resolving gid 1");
        assert_eq!(ts.properties.get_string("biome"), Some("forest"));
        let tile = ts.tile(0).unwrap();
        assert_eq!(tile.properties.get_i32("damage"), Some(10));
        assert_eq!(tile.animation.len(), 2);
        let hitbox = &tile.object_group.as_ref().unwrap().objects[0];
        assert_eq!(hitbox.properties.get_bool("sensor"), Some(false));
    }

    #[test]
    fn keeps_document_order_and_nests_groups() {
        let map_json = r##"{
          "width":1,"height":1,"tilewidth":8,"tileheight":8,
          "layers":[
            {"type":"objectgroup","name":"first"},
            {"type":"group","name":"g","opacity":0.5,"layers":[
              {"type":"tilelayer","name":"inner","data":[0]},
              {"type":"imagelayer","name":"sky","image":"sky.png","transparentcolor":"#ff00ff"}
            ]},
            {"type":"tilelayer","name":"last","data":[0]}
          ]
        }"##;
        let map = decode(map_json, MemoryLoader::new()).unwrap();
        let names: Vec<&str> = map.layers.iter().map(LayerNode::name).collect();
        assert_eq!(names, vec!["first", "g", "last"]);

        let group = map.group(0).unwrap();
        assert_eq!(group.opacity, 0.5);
        assert_eq!(group.tile_layer(0).unwrap().name, "inner");
        let sky = group.layers[1].as_image().unwrap();
        assert_eq!(sky.image.as_ref().unwrap().trans, Some(HexColor::new(255, 0, 255, 255)));
    }

    #[test]
    fn embedded_tileset_and_flipped_gids() {
        let map_json = r#"{
          "width":2,"height":1,"tilewidth":8,"tileheight":8,
          "tilesets":[{"firstgid":1,"name":"inline","tilewidth":8,"tileheight":8,"image":"a.png"}],
          "layers":[{"type":"tilelayer","name":"l","encoding":"csv","data":"2147483650,0"}]
        }"#;
        let map = decode(map_json, MemoryLoader::new()).unwrap();
        let layer = map.tile_layer(0).unwrap();
        match layer.tiles[0] {
            LayerTile::Tile(t) => {
                assert_eq!(t.id, 1);
                assert!(t.flip.horizontal && !t.flip.vertical && !t.flip.diagonal);
            }
            LayerTile::Nil => panic!("expected a tile"),
        }
        assert!(layer.tiles[1].is_nil());
        assert_eq!(map.tilesets[0].loaded().unwrap().name, "inline");
    }

    #[test]
    fn text_objects_get_defaults() {
        let map_json = r#"{
          "width":1,"height":1,"tilewidth":8,"tileheight":8,
          "layers":[{"type":"objectgroup","objects":[
            {"id":1,"text":{"text":"hello"}},
            {"id":2,"polygon":[{"x":0,"y":0},{"x":4,"y":2}]},
            {"id":3,"visible":false,"ellipse":true}
          ]}]
        }"#;
        let map = decode(map_json, MemoryLoader::new()).unwrap();
        let objects = &map.object_group(0).unwrap().objects;
        match &objects[0].shape {
            ObjectShape::Text(t) => {
                assert_eq!(t.text, "hello");
                assert_eq!(t.font_family, "sans-serif");
                assert_eq!(t.pixel_size, 16);
                assert_eq!(t.color, HexColor::BLACK);
            }
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(objects[1].shape, ObjectShape::Polygon(vec![vec2(0.0, 0.0), vec2(4.0, 2.0)]));
        assert!(!objects[2].visible);
        assert_eq!(objects[2].shape, ObjectShape::Ellipse);
    }

    #[test]
    fn defaults_for_opacity_visibility_and_render_order() {
        let map_json = r#"{"width":1,"height":1,"tilewidth":8,"tileheight":8,
          "layers":[{"name":"l","data":[0]}]}"#;
        let map = decode(map_json, MemoryLoader::new()).unwrap();
        let layer = map.tile_layer(0).unwrap();
        assert_eq!(layer.opacity, 1.0);
        assert!(layer.visible);
        assert_eq!(map.render_order, RenderOrder::RightDown);
        assert_eq!(map.orientation, Orientation::Orthogonal);
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        let err = decode("{ not json", MemoryLoader::new()).unwrap_err();
        assert!(matches!(err, MapError::Json { .. }));
    }

    #[test]
    fn returns_typed_error_for_missing_tileset_file() {
        let map_json = r#"{"width":1,"height":1,"tilewidth":16,"tileheight":16,
          "layers":[{"name":"l","data":[1]}],
          "tilesets":[{"firstgid":1,"source":"missing_tileset.json"}]}"#;
        let err = decode(map_json, MemoryLoader::new()).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }

    #[test]
    fn returns_typed_error_for_invalid_object_gid() {
        let map_json = r#"{"width":1,"height":1,"tilewidth":16,"tileheight":16,
          "layers":[{"type":"objectgroup","objects":[{"id":1,"gid":4}]}],
          "tilesets":[{"firstgid":10,"tilewidth":16,"tileheight":16}]}"#;
        let err = decode(map_json, MemoryLoader::new()).unwrap_err();
        assert!(matches!(err, MapError::InvalidTileGid { gid: 4 }));
    }

    #[test]
    fn returns_typed_error_for_unknown_property_type() {
        let map_json = r#"{"width":1,"height":1,"tilewidth":16,"tileheight":16,
          "properties":[{"name":"mystery","type":"not_supported","value":"x"}]}"#;
        let err = decode(map_json, MemoryLoader::new()).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedPropertyType { .. }));
    }

    #[test]
    fn unknown_orientation_and_render_order() {
        let err = decode(
            r#"{"width":1,"height":1,"tilewidth":8,"tileheight":8,"orientation":"spherical"}"#,
            MemoryLoader::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::UnsupportedOrientation(o) if o == "spherical"));

        let err = decode(
            r#"{"width":1,"height":1,"tilewidth":8,"tileheight":8,"renderorder":"diagonal"}"#,
            MemoryLoader::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::UnsupportedRenderOrder(_)));
    }

    #[test]
    fn external_tileset_must_be_json() {
        let err = decode_tileset_bytes(b"<tileset/>", Path::new("tiles.tsx")).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedFormat(_)));
    }

    #[test]
    fn wang_sets_decode_both_id_forms() {
        let ts = r##"{"tilewidth":8,"tileheight":8,"wangsets":[{"name":"w","type":"mixed","tile":-1,
          "colors":[{"name":"grass","color":"#00ff00","tile":-1,"probability":1}],
          "wangtiles":[{"tileid":0,"wangid":[1,0,1,0,1,0,1,0]},{"tileid":1,"wangid":"0,1,0,1,0,1,0,1"}]}]}"##;
        let data = decode_tileset_bytes(ts.as_bytes(), Path::new("t.json")).unwrap();
        let set = &data.wang_sets[0];
        assert_eq!(set.tile, None);
        assert_eq!(set.colors_for(0).unwrap().top.unwrap().name, "grass");
        assert!(set.colors_for(1).unwrap().top.is_none());
    }
}
