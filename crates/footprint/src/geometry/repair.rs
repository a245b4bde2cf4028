//! Geometry repair.
//!
//! Traced rings can touch or cross themselves (one-pixel necks, diagonal
//! contacts) and can collapse to zero area after simplification. Each polygon
//! is run through a boolean union against nothing, which resolves its
//! crossings into proper rings. The resolved pieces are then unioned together
//! so overlapping parts fuse, and only parts that enclose area are kept.

use geo::{Area, BooleanOps};
use geo_types::{LineString, MultiPolygon, Polygon};

use crate::error::{PolygonizeError, Result};

/// Decompose `geometry` into valid polygons with positive area.
///
/// Fails with [`PolygonizeError::DegenerateGeometry`] when nothing with area
/// survives the decomposition.
pub fn make_valid(geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
    let nothing = MultiPolygon::new(Vec::new());
    let resolved: Vec<Polygon<f64>> = geometry
        .iter()
        .flat_map(|polygon| polygon.union(&nothing).0)
        .collect();
    let parts = positive_parts(geo::unary_union(&resolved));
    if parts.is_empty() {
        return Err(PolygonizeError::DegenerateGeometry);
    }
    Ok(MultiPolygon::new(parts))
}

/// [`make_valid`] for a single polygon.
pub fn repair_polygon(polygon: &Polygon<f64>) -> Result<MultiPolygon<f64>> {
    make_valid(&MultiPolygon::new(vec![polygon.clone()]))
}

/// Repair a single ring and keep one polygon of the decomposition.
///
/// When the ring splits into several parts the first one holding at least half
/// of the ring's original area wins; see [`dominant_part`].
pub fn repair_ring(ring: &LineString<f64>) -> Result<Polygon<f64>> {
    let polygon = Polygon::new(ring.clone(), vec![]);
    let original_area = polygon.unsigned_area();

    let mut parts = repair_polygon(&polygon)?.0;
    if parts.len() == 1 {
        return Ok(parts.remove(0));
    }
    dominant_part(original_area, &parts)
        .cloned()
        .ok_or(PolygonizeError::DegenerateGeometry)
}

/// First part, in decomposition order, whose area is at least half of
/// `original_area`.
///
/// This is a heuristic: two equal halves of a figure-eight both qualify and the
/// first one encountered is kept, the other is dropped.
pub fn dominant_part(original_area: f64, parts: &[Polygon<f64>]) -> Option<&Polygon<f64>> {
    let half = original_area / 2.0;
    parts.iter().find(|part| part.unsigned_area() >= half)
}

/// Flatten into the simple polygons that enclose some area.
pub fn positive_parts(geometry: MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    geometry
        .into_iter()
        .filter(|polygon| polygon.unsigned_area() > 0.0)
        .collect()
}
