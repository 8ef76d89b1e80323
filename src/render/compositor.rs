use super::blit::{composite, load_image, resize_nearest, rotate};
use super::RenderEngine;
use crate::error::MapError;
use crate::gid::{LayerTile, TileRef};
use crate::layer::{ImageLayer, Layer, LayerNode};
use crate::map::Map;
use crate::object::{Object, ObjectGroup};
use crate::scene::{SceneItem, SceneWalker};
use image::RgbaImage;
use log::{debug, trace, warn};
use macroquad::math::Vec2;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Decoded tile images, keyed by (tileset index, local id).
#[derive(Default)]
struct TileCache {
    tiles: HashMap<(usize, u32), RgbaImage>,
    sliced: HashSet<usize>,
    layer_images: HashMap<PathBuf, RgbaImage>,
}

impl TileCache {
    fn tile(&mut self, map: &Map, tile: &TileRef) -> Result<&RgbaImage, MapError> {
        let key = (tile.tileset, tile.id);
        if !self.tiles.contains_key(&key) {
            self.fill(map, tile)?;
        }
        self.tiles.get(&key).ok_or(MapError::MissingTileImage {
            tileset: tile.tileset,
            id: tile.id,
        })
    }

    fn fill(&mut self, map: &Map, tile: &TileRef) -> Result<(), MapError> {
        let data = map.tileset_data(tile.tileset)?;

        // Collection tilesets: only the requested tile is decoded
        if let Some(image) = data.tile(tile.id).and_then(|t| t.image.as_ref()) {
            let path = data.image_path(image);
            debug!("decoding tile image {} for tile {}", path.display(), tile.id);
            let img = load_image(map.resources(), &path, image.trans)?;
            self.tiles.insert((tile.tileset, tile.id), img);
            return Ok(());
        }

        let Some(image) = data.image.as_ref() else {
            return Err(MapError::MissingTileImage {
                tileset: tile.tileset,
                id: tile.id,
            });
        };
        if self.sliced.contains(&tile.tileset) {
            return Ok(());
        }

        let path = data.image_path(image);
        let sheet = load_image(map.resources(), &path, image.trans)?;
        self.sliced.insert(tile.tileset);
        let (columns, count) = data.grid(sheet.width(), sheet.height());
        let (tw, th) = (data.tile_width, data.tile_height);
        let fits = |origin: u32, extent: u32, limit: u32| origin.checked_add(extent).is_some_and(|end| end <= limit);
        for id in 0..count {
            let inside = data
                .tile_origin(id, columns)
                .filter(|&(x, y)| fits(x, tw, sheet.width()) && fits(y, th, sheet.height()));
            let Some((x, y)) = inside else {
                warn!("tile {id} lies outside {}, skipped", path.display());
                continue;
            };
            let sub = image::imageops::crop_imm(&sheet, x, y, tw, th).to_image();
            self.tiles.insert((tile.tileset, id), sub);
        }
        debug!(
            "sliced {} into {count} tiles ({columns} columns)",
            path.display()
        );
        Ok(())
    }

    fn layer_image(&mut self, map: &Map, layer: &ImageLayer) -> Result<Option<&RgbaImage>, MapError> {
        let Some(image) = layer.image.as_ref() else {
            return Ok(None);
        };
        let path = map.base_dir().join(&image.source);
        if !self.layer_images.contains_key(&path) {
            let img = load_image(map.resources(), &path, image.trans)?;
            self.layer_images.insert(path.clone(), img);
        }
        Ok(self.layer_images.get(&path))
    }
}

/// Owns the output raster and the tile image cache for one map.
///
/// Every render call draws on top of what is already there; call
/// [`Compositor::clear`] to start over. When a render call fails the raster
/// is left partially drawn.
///
/// ```no_run
/// use tiled_compositor::{Compositor, Map, MapError};
///
/// let map = Map::load_from_file("assets/level.tmj")?;
/// let mut compositor = Compositor::new(&map)?;
/// compositor.render_visible()?;
/// compositor.result().save("level.png").ok();
/// # Ok::<(), MapError>(())
/// ```
pub struct Compositor<'m> {
    map: &'m Map,
    engine: RenderEngine,
    canvas: RgbaImage,
    cache: TileCache,
}

impl<'m> Compositor<'m> {
    /// Fails for orientations or render orders no engine handles, and for
    /// canvases whose pixel buffer cannot be addressed.
    pub fn new(map: &'m Map) -> Result<Self, MapError> {
        let engine = RenderEngine::new(map)?;
        let (w, h) = engine.final_image_size();
        if (w as usize).checked_mul(h as usize).and_then(|n| n.checked_mul(4)).is_none() {
            return Err(MapError::RasterTooLarge { width: w, height: h });
        }
        Ok(Compositor {
            map,
            engine,
            canvas: RgbaImage::new(w, h),
            cache: TileCache::default(),
        })
    }

    /// Geometry in use.
    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    /// Replaces the raster with a fresh transparent one. The cache is kept.
    pub fn clear(&mut self) {
        let (w, h) = self.engine.final_image_size();
        self.canvas = RgbaImage::new(w, h);
    }

    /// The raster drawn so far.
    pub fn result(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Consumes the compositor, keeping the raster.
    pub fn into_result(self) -> RgbaImage {
        self.canvas
    }

    /// Renders the `index`-th top-level tile layer, visible or not.
    pub fn render_layer(&mut self, index: usize) -> Result<(), MapError> {
        let map = self.map;
        let layer = map.tile_layer(index)?;
        self.draw_layer(layer, layer.opacity, layer.offset)
    }

    /// Renders every visible top-level tile layer.
    pub fn render_visible_layers(&mut self) -> Result<(), MapError> {
        let map = self.map;
        for layer in map.layers.iter().filter_map(LayerNode::as_tiles) {
            if layer.visible {
                self.draw_layer(layer, layer.opacity, layer.offset)?;
            }
        }
        Ok(())
    }

    /// Renders the `index`-th top-level object group, visible or not.
    pub fn render_object_group(&mut self, index: usize) -> Result<(), MapError> {
        let map = self.map;
        let group = map.object_group(index)?;
        self.draw_object_group(group, group.opacity, group.offset)
    }

    /// Renders every visible top-level object group.
    pub fn render_visible_object_groups(&mut self) -> Result<(), MapError> {
        let map = self.map;
        for group in map.layers.iter().filter_map(LayerNode::as_objects) {
            if group.visible {
                self.draw_object_group(group, group.opacity, group.offset)?;
            }
        }
        Ok(())
    }

    /// Renders the `index`-th top-level image layer, visible or not.
    pub fn render_image_layer(&mut self, index: usize) -> Result<(), MapError> {
        let map = self.map;
        let layer = map.image_layer(index)?;
        self.draw_image_layer(layer, layer.opacity, layer.offset)
    }

    /// Renders the visible content of the `index`-th top-level group, recursively.
    pub fn render_group(&mut self, index: usize) -> Result<(), MapError> {
        let map = self.map;
        let group = map.group(index)?;
        for item in SceneWalker::group(group) {
            self.draw_item(item)?;
        }
        Ok(())
    }

    /// Renders every visible top-level group.
    pub fn render_visible_groups(&mut self) -> Result<(), MapError> {
        let map = self.map;
        for (index, node) in map.layers.iter().filter(|n| n.as_group().is_some()).enumerate() {
            if node.visible() {
                self.render_group(index)?;
            }
        }
        Ok(())
    }

    /// Renders tile layer `layer` of top-level group `group`.
    pub fn render_group_layer(&mut self, group: usize, layer: usize) -> Result<(), MapError> {
        let map = self.map;
        let g = map.group(group)?;
        let l = g.tile_layer(layer)?;
        self.draw_layer(l, g.opacity * l.opacity, g.offset + l.offset)
    }

    /// Renders object group `object_group` of top-level group `group`.
    pub fn render_group_object_group(&mut self, group: usize, object_group: usize) -> Result<(), MapError> {
        let map = self.map;
        let g = map.group(group)?;
        let o = g.object_group(object_group)?;
        self.draw_object_group(o, g.opacity * o.opacity, g.offset + o.offset)
    }

    /// Visible top-level tile layers, then visible top-level object groups.
    ///
    /// Best effort only: object groups always end up above every tile layer
    /// and groups are not drawn. Use [`Compositor::render_visible`] for
    /// document order.
    pub fn render_visible_layers_and_object_groups(&mut self) -> Result<(), MapError> {
        self.render_visible_layers()?;
        self.render_visible_object_groups()
    }

    /// Renders everything visible in document order, groups included.
    pub fn render_visible(&mut self) -> Result<(), MapError> {
        let map = self.map;
        for item in map.walk() {
            self.draw_item(item)?;
        }
        Ok(())
    }

    fn draw_item(&mut self, item: SceneItem<'m>) -> Result<(), MapError> {
        match item.node {
            LayerNode::Tiles(l) => self.draw_layer(l, item.opacity, item.offset),
            LayerNode::Objects(o) => self.draw_object_group(o, item.opacity, item.offset),
            LayerNode::Image(i) => self.draw_image_layer(i, item.opacity, item.offset),
            LayerNode::Group(_) => Ok(()),
        }
    }

    fn draw_layer(&mut self, layer: &Layer, opacity: f32, offset: Vec2) -> Result<(), MapError> {
        if layer.is_empty() {
            trace!("layer '{}' is empty", layer.name);
            return Ok(());
        }
        trace!("rendering layer '{}' (opacity {opacity})", layer.name);

        for y in 0..layer.height {
            for x in self.engine.column_order(layer.width) {
                if let Some(LayerTile::Tile(tile)) = layer.tile_at(x, y) {
                    self.draw_tile(tile, x, y, opacity, offset)?;
                }
            }
        }
        Ok(())
    }

    fn draw_tile(&mut self, tile: &TileRef, x: u32, y: u32, opacity: f32, offset: Vec2) -> Result<(), MapError> {
        let tile_offset = self.map.tileset_data(tile.tileset)?.tile_offset;
        let img = self.cache.tile(self.map, tile)?;
        let img = self.engine.apply_flip(tile.flip, img);

        let rect = self.engine.tile_position(x, y);
        let clipped;
        let src = if img.width() > rect.width || img.height() > rect.height {
            clipped = image::imageops::crop_imm(
                &*img,
                0,
                0,
                img.width().min(rect.width),
                img.height().min(rect.height),
            )
            .to_image();
            &clipped
        } else {
            &*img
        };

        let dx = rect.x as i64 + offset.x as i64 + tile_offset.x as i64;
        let dy = rect.y as i64 + offset.y as i64 + tile_offset.y as i64;
        composite(&mut self.canvas, src, dx, dy, opacity);
        Ok(())
    }

    fn draw_object_group(&mut self, group: &ObjectGroup, opacity: f32, offset: Vec2) -> Result<(), MapError> {
        trace!("rendering object group '{}' ({} objects)", group.name, group.objects.len());
        for object in group.sorted_objects() {
            self.draw_object(object, opacity, offset)?;
        }
        Ok(())
    }

    fn draw_object(&mut self, object: &Object, opacity: f32, offset: Vec2) -> Result<(), MapError> {
        if !object.visible || object.gid.is_empty() {
            return Ok(());
        }
        let LayerTile::Tile(tile) = self.map.resolve(object.gid)? else {
            return Ok(());
        };
        let tile_offset = self.map.tileset_data(tile.tileset)?.tile_offset;
        let img = self.cache.tile(self.map, &tile)?;
        let flipped = self.engine.apply_flip(tile.flip, img);

        let (w, h) = (object.width.round() as u32, object.height.round() as u32);
        let resized = resize_nearest(&flipped, w, h);
        let sized = resized.as_ref().unwrap_or(&*flipped);
        let (rotated, (sx, sy)) = rotate(sized, object.rotation);

        let dx = (object.x + offset.x) as i64 + tile_offset.x as i64 + sx;
        let dy = (object.y + offset.y) as i64 + tile_offset.y as i64 + sy;
        composite(&mut self.canvas, &rotated, dx, dy, opacity);
        Ok(())
    }

    fn draw_image_layer(&mut self, layer: &ImageLayer, opacity: f32, offset: Vec2) -> Result<(), MapError> {
        let Some(img) = self.cache.layer_image(self.map, layer)? else {
            warn!("image layer '{}' has no image", layer.name);
            return Ok(());
        };
        let (cw, ch) = (self.canvas.width() as i64, self.canvas.height() as i64);
        let (iw, ih) = (img.width() as i64, img.height() as i64);
        if iw == 0 || ih == 0 {
            return Ok(());
        }

        let (ox, oy) = (offset.x as i64, offset.y as i64);
        let xs: Vec<i64> = if layer.repeat_x {
            (ox.rem_euclid(iw) - iw..cw).step_by(iw as usize).collect()
        } else {
            vec![ox]
        };
        let ys: Vec<i64> = if layer.repeat_y {
            (oy.rem_euclid(ih) - ih..ch).step_by(ih as usize).collect()
        } else {
            vec![oy]
        };
        for &y in &ys {
            for &x in &xs {
                composite(&mut self.canvas, img, x, y, opacity);
            }
        }
        Ok(())
    }
}
