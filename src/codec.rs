//! Tile layer payload decoding: CSV text, base64 (optionally gzip/zlib
//! compressed) little-endian words, or an inline list of tile elements.

use crate::error::MapError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use serde::Deserialize;
use std::io::{Read, Write};

/// Raw `data` value of a tile layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// `[1, 2, 0, ...]`
    Gids(Vec<u32>),
    /// `[{"gid": 1}, {}, ...]`
    Elements(Vec<DataTile>),
    /// CSV or base64 text.
    Text(String),
}

/// One inline tile element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DataTile {
    /// Raw gid; a missing value is an empty cell.
    #[serde(default)]
    pub gid: u32,
}

/// Everything needed to decode one layer's tiles.
#[derive(Debug, Clone, Copy)]
pub struct LayerData<'a> {
    /// `csv`, `base64`, or `None` for inline arrays.
    pub encoding: Option<&'a str>,
    /// `gzip`, `zlib`, or `None`. Only read for base64.
    pub compression: Option<&'a str>,
    /// The `data` value, if the layer has one.
    pub payload: Option<&'a Payload>,
}

/// Decodes a layer payload into exactly `width * height` raw gids.
pub fn decode_gids(data: LayerData<'_>, layer: &str, width: u32, height: u32) -> Result<Vec<u32>, MapError> {
    let expected = width as usize * height as usize;
    let payload = data
        .payload
        .ok_or_else(|| MapError::InvalidMap(format!("layer '{layer}' has no data")))?;

    let gids = match (data.encoding.unwrap_or(""), payload) {
        ("csv", Payload::Text(text)) => decode_csv(text)?,
        ("base64", Payload::Text(text)) => {
            let bytes = decode_base64(text, data.compression, layer)?;
            if bytes.len() != expected * 4 {
                return Err(MapError::TileCountMismatch {
                    layer: layer.to_owned(),
                    expected,
                    actual: bytes.len() / 4,
                });
            }
            bytes
                .chunks_exact(4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        }
        ("" | "csv", Payload::Gids(gids)) => gids.clone(),
        ("", Payload::Elements(tiles)) => tiles.iter().map(|t| t.gid).collect(),
        ("csv" | "base64" | "", _) => {
            return Err(MapError::InvalidMap(format!(
                "layer '{layer}': data shape does not match encoding {:?}",
                data.encoding.unwrap_or("none")
            )))
        }
        (other, _) => return Err(MapError::UnsupportedEncoding(other.to_owned())),
    };

    if gids.len() != expected {
        return Err(MapError::TileCountMismatch {
            layer: layer.to_owned(),
            expected,
            actual: gids.len(),
        });
    }
    Ok(gids)
}

fn decode_csv(text: &str) -> Result<Vec<u32>, MapError> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    cleaned
        .split(',')
        .map(|tok| {
            tok.parse::<u32>().map_err(|_| MapError::MalformedTileId {
                token: tok.to_owned(),
            })
        })
        .collect()
}

fn decode_base64(text: &str, compression: Option<&str>, layer: &str) -> Result<Vec<u8>, MapError> {
    let cleaned: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let raw = STANDARD.decode(cleaned)?;

    let corrupt = |e: std::io::Error| {
        MapError::InvalidMap(format!("layer '{layer}': corrupt compressed data: {e}"))
    };
    let mut out = Vec::with_capacity(raw.len() * 4);
    match compression.unwrap_or("") {
        "" => return Ok(raw),
        "gzip" => {
            GzDecoder::new(raw.as_slice()).read_to_end(&mut out).map_err(corrupt)?;
        }
        "zlib" => {
            ZlibDecoder::new(raw.as_slice()).read_to_end(&mut out).map_err(corrupt)?;
        }
        other => return Err(MapError::UnsupportedCompression(other.to_owned())),
    }
    Ok(out)
}

/// Encodes gids the way Tiled writes base64 layer data.
pub fn encode_base64(gids: &[u32], compression: Option<&str>) -> Result<String, MapError> {
    let raw: Vec<u8> = gids.iter().flat_map(|g| g.to_le_bytes()).collect();
    let write_err = |e: std::io::Error| MapError::InternalError(format!("compression failed: {e}"));

    let bytes = match compression.unwrap_or("") {
        "" => raw,
        "gzip" => {
            let mut enc = GzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(&raw).map_err(write_err)?;
            enc.finish().map_err(write_err)?
        }
        "zlib" => {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
            enc.write_all(&raw).map_err(write_err)?;
            enc.finish().map_err(write_err)?
        }
        other => return Err(MapError::UnsupportedCompression(other.to_owned())),
    };
    Ok(STANDARD.encode(bytes))
}
