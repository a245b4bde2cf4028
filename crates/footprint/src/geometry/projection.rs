//! WGS84 longitude/latitude <-> World Mercator (EPSG:3395).
//!
//! Buffer distances are physical lengths, so shapes are moved into a conformal
//! planar system before dilation and erosion and moved back afterwards.
//! EPSG:3395 is Mercator on the WGS84 ellipsoid (not the spherical variant used
//! by web tiles).

use geo::MapCoords;
use geo_types::{Coord, Polygon};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::{PolygonizeError, Result};

/// EPSG:4326, WGS84 longitude/latitude.
const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// EPSG:3395, World Mercator on the WGS84 ellipsoid.
const WORLD_MERCATOR_PROJ: &str = "+proj=merc +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs";

/// Reusable pair of projections between degrees and World Mercator meters.
pub struct Reprojector {
    geographic: Proj,
    planar: Proj,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("geographic", &"EPSG:4326")
            .field("planar", &"EPSG:3395")
            .finish_non_exhaustive()
    }
}

fn init(definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition)
        .map_err(|e| PolygonizeError::Projection(format!("invalid projection {definition}: {e:?}")))
}

impl Reprojector {
    pub fn world_mercator() -> Result<Self> {
        Ok(Self {
            geographic: init(WGS84_PROJ)?,
            planar: init(WORLD_MERCATOR_PROJ)?,
        })
    }

    /// Project a longitude/latitude pair in degrees to meters.
    pub fn forward(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.geographic, &self.planar, &mut point)
            .map_err(|e| PolygonizeError::Projection(format!("({}, {}): {e:?}", coord.x, coord.y)))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Inverse of [`forward`](Self::forward).
    pub fn inverse(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x, coord.y, 0.0);
        transform(&self.planar, &self.geographic, &mut point)
            .map_err(|e| PolygonizeError::Projection(format!("({}, {}): {e:?}", coord.x, coord.y)))?;
        Ok(Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    }

    /// Move a geographic polygon into World Mercator meters.
    pub fn to_planar(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
        polygon.try_map_coords(|coord| self.forward(coord))
    }

    /// Move a World Mercator polygon back to degrees.
    pub fn to_geographic(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
        polygon.try_map_coords(|coord| self.inverse(coord))
    }
}
