use geo::BooleanOps;
use geo_types::{LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PolygonizeError, Result},
    geometry::repair,
    tile::{TileBounds, TileId},
};

/// A traced border in pixel space together with its place in the nesting tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Border points as an open ring (the first point is not repeated).
    pub points: Vec<[f64; 2]>,
    /// Index of the immediately enclosing contour.
    pub parent: Option<usize>,
}

impl Contour {
    /// A ring needs at least three points to bound any area.
    pub fn is_polygonal(&self) -> bool {
        self.points.len() >= 3
    }
}

/// Arena of contours whose parent links form the nesting forest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourForest {
    contours: Vec<Contour>,
}

impl ContourForest {
    /// Zip traced rings with their hierarchy entries.
    ///
    /// Both sides must describe the same contours, and every parent must point
    /// at one of them.
    pub fn new(rings: Vec<Vec<[f64; 2]>>, hierarchy: Vec<Option<usize>>) -> Result<Self> {
        if rings.len() != hierarchy.len() {
            return Err(PolygonizeError::HierarchyMismatch {
                contours: rings.len(),
                hierarchy: hierarchy.len(),
            });
        }
        let dangling = hierarchy
            .iter()
            .enumerate()
            .find_map(|(index, parent)| parent.filter(|&p| p >= rings.len()).map(|p| (index, p)));
        if let Some((index, parent)) = dangling {
            return Err(PolygonizeError::InvalidParent {
                index,
                parent,
                contours: rings.len(),
            });
        }

        let contours = rings
            .into_iter()
            .zip(hierarchy)
            .map(|(points, parent)| Contour { points, parent })
            .collect();
        Ok(Self { contours })
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contour> {
        self.contours.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contour> {
        self.contours.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Contour> {
        self.contours.iter_mut()
    }

    /// Enclosing contours of `index`, innermost first.
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            forest: self,
            current: self.contours.get(index).and_then(|c| c.parent),
            remaining: self.contours.len(),
        }
    }

    /// Number of enclosing contours; 0 for an outermost border.
    pub fn depth(&self, index: usize) -> usize {
        self.ancestors(index).count()
    }
}

/// Walks parent links towards the root of a contour's tree.
pub struct Ancestors<'a> {
    forest: &'a ContourForest,
    current: Option<usize>,
    // Bounds the walk so a malformed cycle cannot loop forever.
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.current?;
        self.remaining -= 1;
        self.current = self.forest.contours.get(index).and_then(|c| c.parent);
        Some(index)
    }
}

/// An outer ring with its holes, still in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexShape {
    /// The exterior boundary of the shape (outer contour)
    pub exterior: Vec<[f64; 2]>,
    /// Interior boundaries (holes within the shape)
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl ComplexShape {
    /// Check if this shape contains holes
    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Turn the shape into valid geographic polygons.
    ///
    /// The outer ring and each hole are repaired, the union of the holes is cut
    /// out of the repaired outer geometry, and the result is flattened into
    /// positive-area polygons. A pinched outer ring (two regions touching at a
    /// single pixel) yields one polygon per region.
    pub fn to_geo_polygons(&self, bounds: &TileBounds, width: u32, height: u32) -> Result<Vec<Polygon<f64>>> {
        let to_ring = |points: &[[f64; 2]]| -> LineString<f64> {
            points
                .iter()
                .map(|&[px, py]| bounds.pixel_to_geo(px, py, width, height))
                .collect()
        };

        let outer = repair::repair_polygon(&Polygon::new(to_ring(&self.exterior), vec![]))?;
        if !self.has_holes() {
            return Ok(outer.0);
        }

        let holes: Vec<Polygon<f64>> = self
            .holes
            .iter()
            .filter_map(|hole| repair::repair_polygon(&Polygon::new(to_ring(hole), vec![])).ok())
            .flat_map(|parts| parts.0)
            .collect();
        let holes = geo::unary_union(&holes);

        let parts = repair::positive_parts(outer.difference(&holes));
        if parts.is_empty() {
            return Err(PolygonizeError::DegenerateGeometry);
        }
        Ok(parts)
    }
}

/// Features extracted from a single tile.
#[derive(Debug, Clone)]
pub struct TileFeatures {
    pub tile: TileId,
    pub features: Vec<Polygon<f64>>,
    /// Mask dimensions
    pub mask_width: u32,
    pub mask_height: u32,
}

impl TileFeatures {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn square(min: f64, max: f64) -> Vec<[f64; 2]> {
        vec![[min, min], [max, min], [max, max], [min, max]]
    }

    #[test]
    fn test_forest_rejects_mismatched_hierarchy() {
        let result = ContourForest::new(vec![square(0.0, 1.0), square(2.0, 3.0)], vec![None]);
        assert!(matches!(
            result,
            Err(PolygonizeError::HierarchyMismatch { contours: 2, hierarchy: 1 })
        ));
    }

    #[test]
    fn test_forest_rejects_dangling_parent() {
        let result = ContourForest::new(vec![square(0.0, 1.0), square(2.0, 3.0)], vec![None, Some(4)]);
        assert!(matches!(
            result,
            Err(PolygonizeError::InvalidParent { index: 1, parent: 4, contours: 2 })
        ));
    }

    #[test]
    fn test_ancestor_chain() {
        let forest = ContourForest::new(
            vec![square(0.0, 10.0), square(2.0, 8.0), square(4.0, 6.0), square(20.0, 30.0)],
            vec![None, Some(0), Some(1), None],
        )
        .unwrap();

        assert_eq!(forest.ancestors(0).collect::<Vec<_>>(), Vec::<usize>::new());
        assert_eq!(forest.ancestors(1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(forest.ancestors(2).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(forest.depth(2), 2);
        assert_eq!(forest.depth(3), 0);
    }

    #[test]
    fn test_ancestor_walk_terminates_on_cycle() {
        let forest = ContourForest::new(vec![square(0.0, 1.0), square(0.0, 1.0)], vec![Some(1), Some(0)]).unwrap();
        assert_eq!(forest.ancestors(0).count(), 2);
    }

    #[test]
    fn test_shape_with_hole_to_geo_polygon() {
        let bounds = TileBounds { west: 0.0, south: 0.0, east: 100.0, north: 100.0 };
        let shape = ComplexShape {
            exterior: square(10.0, 90.0),
            holes: vec![square(40.0, 60.0)],
        };

        let polygons = shape.to_geo_polygons(&bounds, 100, 100).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].interiors().len(), 1);
        assert!((polygons[0].unsigned_area() - (6400.0 - 400.0)).abs() < 1e-6);
    }

    #[test]
    fn test_pinched_outer_ring_keeps_both_regions() {
        let bounds = TileBounds { west: 0.0, south: 0.0, east: 100.0, north: 100.0 };
        // Two squares sharing only the corner (40, 40)
        let shape = ComplexShape {
            exterior: vec![
                [10.0, 10.0], [40.0, 10.0], [40.0, 40.0],
                [60.0, 40.0], [60.0, 50.0], [40.0, 50.0],
                [40.0, 40.0], [10.0, 40.0],
            ],
            holes: vec![],
        };

        let polygons = shape.to_geo_polygons(&bounds, 100, 100).unwrap();
        assert_eq!(polygons.len(), 2);
        let total: f64 = polygons.iter().map(|p| p.unsigned_area()).sum();
        assert!((total - (900.0 + 200.0)).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_outer_ring_is_rejected() {
        let bounds = TileBounds { west: 0.0, south: 0.0, east: 1.0, north: 1.0 };
        let shape = ComplexShape {
            exterior: vec![[0.0, 0.0], [5.0, 5.0], [10.0, 10.0]],
            holes: vec![],
        };
        assert!(matches!(
            shape.to_geo_polygons(&bounds, 16, 16),
            Err(PolygonizeError::DegenerateGeometry)
        ));
    }
}
