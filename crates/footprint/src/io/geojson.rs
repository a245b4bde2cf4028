use std::path::Path;

use geo_types::{Coord, LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use tracing::warn;

use crate::error::Result;

fn ring_to_positions(ring: &LineString<f64>) -> Vec<Vec<f64>> {
    ring.coords().map(|c| vec![c.x, c.y]).collect()
}

fn positions_to_ring(positions: &[Vec<f64>]) -> LineString<f64> {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect()
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    Some(Polygon::new(
        positions_to_ring(exterior),
        holes.iter().map(|hole| positions_to_ring(hole)).collect(),
    ))
}

/// Build a FeatureCollection with one Feature per polygon
///
/// Each feature carries its position in `features` as an integer `id`.
pub fn to_feature_collection(features: &[Polygon<f64>]) -> FeatureCollection {
    let features = features
        .iter()
        .enumerate()
        .map(|(i, polygon)| {
            let mut coordinates = vec![ring_to_positions(polygon.exterior())];
            coordinates.extend(polygon.interiors().iter().map(ring_to_positions));

            let mut properties = serde_json::Map::new();
            properties.insert("id".to_string(), serde_json::Value::Number(serde_json::Number::from(i)));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Polygon(coordinates))),
                id: Some(geojson::feature::Id::Number(serde_json::Number::from(i))),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Flatten a FeatureCollection into polygons
///
/// MultiPolygons contribute each of their parts. Features with any other
/// geometry type, or none at all, are skipped with a warning.
pub fn from_feature_collection(collection: &FeatureCollection) -> Vec<Polygon<f64>> {
    let mut polygons = Vec::new();
    for (i, feature) in collection.features.iter().enumerate() {
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(rings)) => polygons.extend(rings_to_polygon(rings)),
            Some(Value::MultiPolygon(parts)) => {
                polygons.extend(parts.iter().filter_map(|rings| rings_to_polygon(rings)));
            }
            Some(_) => warn!("feature {i}: skipping non-polygonal geometry"),
            None => warn!("feature {i}: skipping feature without geometry"),
        }
    }
    polygons
}

/// Serialize polygons to a pretty-printed GeoJSON string
pub fn features_to_geojson_string(features: &[Polygon<f64>]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_feature_collection(features))?)
}

/// Parse polygons from a GeoJSON FeatureCollection string
pub fn features_from_geojson_string(geojson_str: &str) -> Result<Vec<Polygon<f64>>> {
    let collection: FeatureCollection = geojson_str.parse()?;
    Ok(from_feature_collection(&collection))
}

/// Save polygons as a GeoJSON FeatureCollection
pub fn write_features(path: impl AsRef<Path>, features: &[Polygon<f64>]) -> Result<()> {
    std::fs::write(path, features_to_geojson_string(features)?)?;
    Ok(())
}

/// Load polygons from a GeoJSON FeatureCollection file
pub fn read_features(path: impl AsRef<Path>) -> Result<Vec<Polygon<f64>>> {
    let geojson_str = std::fs::read_to_string(path)?;
    features_from_geojson_string(&geojson_str)
}
