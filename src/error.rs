use std::{io, path::PathBuf};
use thiserror::Error;

/// Everything that can go wrong while decoding or compositing a map.
#[derive(Debug, Error)]
pub enum MapError {
    /// The map orientation is unknown, or cannot be composited.
    #[error("unsupported orientation: {0}")]
    UnsupportedOrientation(String),

    /// The tile render order is unknown, or cannot be composited.
    #[error("unsupported render order: {0}")]
    UnsupportedRenderOrder(String),

    /// Layer data uses an encoding other than csv, base64 or none.
    #[error("unsupported layer data encoding: {0}")]
    UnsupportedEncoding(String),

    /// Layer data uses a compression other than gzip, zlib or none.
    #[error("unsupported layer data compression: {0}")]
    UnsupportedCompression(String),

    /// Decoded layer data does not hold exactly width * height tiles.
    #[error("layer '{layer}' decoded to {actual} tiles, expected {expected}")]
    TileCountMismatch {
        /// Name of the offending layer.
        layer: String,
        /// width * height of the map.
        expected: usize,
        /// Number of tiles actually decoded.
        actual: usize,
    },

    /// A CSV token is not an unsigned 32-bit integer.
    #[error("malformed tile id {token:?}")]
    MalformedTileId {
        /// The token that failed to parse.
        token: String,
    },

    /// The bare GID is not covered by any tileset.
    #[error("gid {gid} is not covered by any tileset")]
    InvalidTileGid {
        /// Bare GID, flip flags removed.
        gid: u32,
    },

    /// The Wang set declares no colors.
    #[error("wang set '{0}' has no colors")]
    NoWangColors(String),

    /// No Wang tile entry exists for the requested tile.
    #[error("no wang tile matches tile id {tile_id}")]
    NoWangTileMatch {
        /// Local tile id that was looked up.
        tile_id: u32,
    },

    /// A Wang id could not be interpreted.
    #[error("internal error: {0}")]
    InternalError(String),

    /// A layer, group or object group index is past the end of its collection.
    #[error("{kind} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// Which collection was indexed.
        kind: &'static str,
        /// Requested index.
        index: usize,
        /// Collection length.
        len: usize,
    },

    /// A resource could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Resource path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A map or tileset document is not valid JSON for its schema.
    #[error("failed to parse {path}: {source}")]
    Json {
        /// Document path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// An image resource could not be decoded.
    #[error("failed to decode image {path}: {source}")]
    Image {
        /// Image path.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// Base64 layer data is not valid base64.
    #[error("invalid base64 layer data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Structurally invalid map content.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// The file is not a JSON map or tileset.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A custom property declares an unknown type.
    #[error("property '{name}' has unsupported type '{kind}'")]
    UnsupportedPropertyType {
        /// Property name.
        name: String,
        /// Declared type.
        kind: String,
    },

    /// A tile has no image to draw.
    #[error("tileset {tileset} has no image for tile {id}")]
    MissingTileImage {
        /// Tileset index inside the map.
        tileset: usize,
        /// Local tile id.
        id: u32,
    },

    /// The raster does not fit the target image type.
    #[error("raster {width}x{height} is too large")]
    RasterTooLarge {
        /// Raster width.
        width: u32,
        /// Raster height.
        height: u32,
    },
}
