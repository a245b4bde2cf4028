//! Slippy-map tile addressing.
//!
//! Mask files are named `<source>-<x>-<y>-<zoom>.<ext>`. The tile triple
//! locates the mask on the globe; pixel coordinates inside the mask are mapped
//! linearly onto the tile's bounding box in degrees.

use std::f64::consts::PI;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::error::{PolygonizeError, Result};

/// A tile in the standard XYZ pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

/// Geographic extent of a tile in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl TileId {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Parse the tile from a mask path, ignoring directory and extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| PolygonizeError::TileName(path.display().to_string()))?;
        stem.parse()
    }

    /// Bounding box of the tile in degrees.
    pub fn bounds(&self) -> TileBounds {
        let (west, north) = tile_corner(f64::from(self.x), f64::from(self.y), self.zoom);
        let (east, south) = tile_corner(f64::from(self.x) + 1.0, f64::from(self.y) + 1.0, self.zoom);
        TileBounds { west, south, east, north }
    }
}

impl FromStr for TileId {
    type Err = PolygonizeError;

    /// The last three `-`-separated fields are x, y and zoom; whatever comes
    /// before them names the imagery source and may itself contain dashes.
    fn from_str(stem: &str) -> Result<Self> {
        let invalid = || PolygonizeError::TileName(stem.to_string());

        let mut fields = stem.rsplitn(4, '-');
        let zoom = fields.next().ok_or_else(invalid)?;
        let y = fields.next().ok_or_else(invalid)?;
        let x = fields.next().ok_or_else(invalid)?;
        match fields.next() {
            Some(source) if !source.is_empty() => {}
            _ => return Err(invalid()),
        }

        let tile = Self {
            x: x.parse().map_err(|_| invalid())?,
            y: y.parse().map_err(|_| invalid())?,
            zoom: zoom.parse().map_err(|_| invalid())?,
        };

        let tiles_per_axis = 1u64 << u32::from(tile.zoom.min(32));
        if tile.zoom > 32 || u64::from(tile.x) >= tiles_per_axis || u64::from(tile.y) >= tiles_per_axis {
            return Err(invalid());
        }
        Ok(tile)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Longitude/latitude of the upper-left corner of tile (x, y).
fn tile_corner(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let n = 2f64.powi(i32::from(zoom));
    let lon = x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    (lon, lat)
}

impl TileBounds {
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Map a pixel position of a `width` x `height` mask into degrees.
    ///
    /// Pixel (0, 0) lands on the north-west corner and pixel (width, height)
    /// on the south-east corner; rows grow southwards.
    pub fn pixel_to_geo(&self, px: f64, py: f64, width: u32, height: u32) -> Coord<f64> {
        Coord {
            x: self.west + px / f64::from(width) * self.width(),
            y: self.north - py / f64::from(height) * self.height(),
        }
    }
}
