//! Fusing building parts that were cut apart by tile edges.
//!
//! Features from neighbouring tiles that lie within `distance_threshold`
//! meters of each other end up in one connected component. Each component is
//! closed morphologically: its members are dilated, unioned, and eroded back
//! by the same distance. Isolated features go through the same closing so
//! every output polygon has been treated the same way.

use geo::{BoundingRect, Buffer, Intersects};
use geo_types::{MultiPolygon, Polygon};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    algorithms::simplify_polygons,
    config::PolygonizeConfig,
    error::{PolygonizeError, Result},
    geometry::{make_valid, Reprojector},
    graph::ComponentGraph,
    index::SpatialIndex,
};

/// Result of a merge run.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub features: Vec<Polygon<f64>>,
    /// Number of connected components that were closed.
    pub component_count: usize,
}

#[derive(Debug, Clone)]
pub struct TileMerger {
    /// Gap bridged between features, in meters.
    pub distance_threshold: f64,
    /// Douglas-Peucker tolerance applied to the output, in degrees.
    pub output_tolerance: f64,
}

impl Default for TileMerger {
    fn default() -> Self {
        Self::from_config(&PolygonizeConfig::default())
    }
}

impl TileMerger {
    pub fn from_config(config: &PolygonizeConfig) -> Self {
        Self {
            distance_threshold: config.distance_threshold,
            output_tolerance: config.output_tolerance,
        }
    }

    /// Merge features given in degrees (EPSG:4326).
    ///
    /// Work happens in World Mercator meters; the output is projected back and
    /// simplified with `output_tolerance`.
    pub fn merge(&self, features: &[Polygon<f64>]) -> Result<MergeOutcome> {
        let reprojector = Reprojector::world_mercator()?;
        let planar = features
            .iter()
            .map(|feature| reprojector.to_planar(feature))
            .collect::<Result<Vec<_>>>()?;
        let merged = self.merge_planar(&planar)?;

        let geographic = merged
            .features
            .iter()
            .map(|feature| reprojector.to_geographic(feature))
            .collect::<Result<Vec<_>>>()?;
        Ok(MergeOutcome {
            features: simplify_polygons(geographic, self.output_tolerance),
            component_count: merged.component_count,
        })
    }

    /// Merge features that are already in a metric planar system.
    pub fn merge_planar(&self, shapes: &[Polygon<f64>]) -> Result<MergeOutcome> {
        if shapes.is_empty() {
            return Ok(MergeOutcome::default());
        }
        let distance = self.distance_threshold;

        let dilated: Vec<MultiPolygon<f64>> = shapes.par_iter().map(|shape| shape.buffer(distance)).collect();
        let index = SpatialIndex::build(shapes);

        let edges: Vec<(usize, usize)> = dilated
            .par_iter()
            .enumerate()
            .flat_map_iter(|(i, grown)| {
                let candidates = match grown.bounding_rect() {
                    Some(rect) => index.query(&rect),
                    None => Vec::new(),
                };
                std::iter::once((i, i)).chain(
                    candidates
                        .into_iter()
                        .filter(move |&j| j != i && grown.intersects(&shapes[j]))
                        .map(move |j| (i, j)),
                )
            })
            .collect();

        let mut graph = ComponentGraph::new(shapes.len());
        for &(u, v) in &edges {
            graph.add_edge(u, v);
        }
        let components: Vec<Vec<usize>> = graph.components().collect();

        let covered: usize = components.iter().map(Vec::len).sum();
        if covered != shapes.len() {
            return Err(PolygonizeError::ComponentCoverage {
                covered,
                expected: shapes.len(),
            });
        }
        debug!(
            "{} features, {} adjacency edges, {} components",
            shapes.len(),
            edges.len(),
            components.len()
        );

        let closed: Vec<Vec<Polygon<f64>>> = components
            .par_iter()
            .map(|members| {
                let grown: Vec<Polygon<f64>> = members
                    .iter()
                    .flat_map(|&i| dilated[i].0.iter().cloned())
                    .collect();
                let eroded = geo::unary_union(&grown).buffer(-distance);
                match make_valid(&eroded) {
                    Ok(parts) => parts.0,
                    Err(e) => {
                        warn!("dropping component of {} features: {e}", members.len());
                        Vec::new()
                    }
                }
            })
            .collect();

        Ok(MergeOutcome {
            features: closed.into_iter().flatten().collect(),
            component_count: components.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, polygon};
    use geo_types::Point;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
    }

    fn merger(distance: f64) -> TileMerger {
        TileMerger {
            distance_threshold: distance,
            output_tolerance: 0.0,
        }
    }

    #[test]
    fn test_empty_input() {
        let outcome = merger(0.6).merge_planar(&[]).unwrap();
        assert!(outcome.features.is_empty());
        assert_eq!(outcome.component_count, 0);

        assert!(TileMerger::default().merge(&[]).unwrap().features.is_empty());
    }

    #[test]
    fn test_abutting_halves_fuse() {
        let left = rect(0.0, 0.0, 10.0, 10.0);
        let right = rect(10.0, 0.0, 20.0, 10.0);

        let outcome = merger(0.6).merge_planar(&[left, right]).unwrap();
        assert_eq!(outcome.component_count, 1);
        assert_eq!(outcome.features.len(), 1);
        assert!((outcome.features[0].unsigned_area() - 200.0).abs() < 1.0);
    }

    #[test]
    fn test_small_gap_is_bridged() {
        let left = rect(0.0, 0.0, 10.0, 10.0);
        let right = rect(10.5, 0.0, 20.0, 10.0);

        let outcome = merger(0.6).merge_planar(&[left, right]).unwrap();
        assert_eq!(outcome.features.len(), 1);
        assert!(outcome.features[0].contains(&Point::new(10.25, 5.0)));
    }

    #[test]
    fn test_distant_features_stay_apart() {
        let shapes = [rect(0.0, 0.0, 10.0, 10.0), rect(50.0, 0.0, 60.0, 10.0)];

        let outcome = merger(0.6).merge_planar(&shapes).unwrap();
        assert_eq!(outcome.component_count, 2);
        assert_eq!(outcome.features.len(), 2);
        // Output follows the smallest member of each component
        assert!(outcome.features[0].contains(&Point::new(5.0, 5.0)));
        assert!(outcome.features[1].contains(&Point::new(55.0, 5.0)));
    }

    #[test]
    fn test_chain_forms_single_component() {
        let shapes = [
            rect(0.0, 0.0, 10.0, 10.0),
            rect(30.0, 0.0, 40.0, 10.0),
            rect(10.2, 0.0, 29.8, 10.0),
        ];

        let outcome = merger(0.6).merge_planar(&shapes).unwrap();
        assert_eq!(outcome.component_count, 1);
        assert_eq!(outcome.features.len(), 1);
    }

    #[test]
    fn test_merge_is_stable_on_its_output() {
        let shapes = [rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 0.0, 20.0, 10.0)];
        let once = merger(0.6).merge_planar(&shapes).unwrap();
        let twice = merger(0.6).merge_planar(&once.features).unwrap();

        assert_eq!(once.features.len(), twice.features.len());
        let a: f64 = once.features.iter().map(|p| p.unsigned_area()).sum();
        let b: f64 = twice.features.iter().map(|p| p.unsigned_area()).sum();
        assert!((a - b).abs() < 1.0);
    }

    #[test]
    fn test_courtyard_survives_closing() {
        let outer = rect(0.0, 0.0, 20.0, 20.0);
        let courtyard = rect(5.0, 5.0, 15.0, 15.0);
        let building = Polygon::new(outer.exterior().clone(), vec![courtyard.exterior().clone()]);

        let outcome = merger(0.6).merge_planar(&[building]).unwrap();
        assert_eq!(outcome.features.len(), 1);
        assert_eq!(outcome.features[0].interiors().len(), 1);
        let area = outcome.features[0].unsigned_area();
        assert!((area - 300.0).abs() < 1.0, "area {area}");
    }

    #[test]
    fn test_geographic_merge_is_stable_on_its_output() {
        let shapes = [
            rect(10.0, 45.0, 10.0002, 45.0002),
            rect(10.0002, 45.0, 10.0004, 45.0002),
        ];
        let merger = TileMerger::default();
        let once = merger.merge(&shapes).unwrap();
        let twice = merger.merge(&once.features).unwrap();

        assert_eq!(once.features.len(), 1);
        assert_eq!(once.features.len(), twice.features.len());
        let a: f64 = once.features.iter().map(|p| p.unsigned_area()).sum();
        let b: f64 = twice.features.iter().map(|p| p.unsigned_area()).sum();
        assert!((a - b).abs() / a < 0.01, "{a} vs {b}");
    }

    #[test]
    fn test_geographic_round_trip_fuses_neighbours() {
        // Two ~10 m wide halves meeting at longitude 10.0001
        let left = rect(10.0, 45.0, 10.0001, 45.0001);
        let right = rect(10.0001, 45.0, 10.0002, 45.0001);

        let outcome = TileMerger::default().merge(&[left, right]).unwrap();
        assert_eq!(outcome.features.len(), 1);
        let area = outcome.features[0].unsigned_area();
        assert!((area - 2e-8).abs() < 2e-9, "area {area}");
    }
}
