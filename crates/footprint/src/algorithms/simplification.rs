use geo::Simplify;
use geo_types::{Coord, LineString, Polygon};
use crate::{error::Result, traits::ContourSimplifier, types::ContourForest};

/// Douglas-Peucker simplifier whose tolerance scales with each contour
///
/// The tolerance is `threshold` times the contour's closed perimeter, so the
/// same setting gives comparable results at every zoom level.
#[derive(Debug, Clone)]
pub struct PerimeterDouglasPeucker {
    pub threshold: f64,
}

impl Default for PerimeterDouglasPeucker {
    fn default() -> Self {
        Self { threshold: 0.01 }
    }
}

impl ContourSimplifier for PerimeterDouglasPeucker {
    fn simplify(&self, forest: &mut ContourForest) -> Result<()> {
        for contour in forest.iter_mut() {
            if contour.points.len() < 3 {
                continue;
            }

            let epsilon = self.threshold * closed_perimeter(&contour.points);

            let mut coords: Vec<Coord<f64>> = contour
                .points
                .iter()
                .map(|&[x, y]| Coord { x, y })
                .collect();
            coords.push(coords[0]);
            let simplified = LineString::new(coords).simplify(epsilon);

            let mut points: Vec<[f64; 2]> = simplified.coords().map(|c| [c.x, c.y]).collect();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            contour.points = points;
        }

        Ok(())
    }
}

/// Length of the ring including the closing segment
fn closed_perimeter(points: &[[f64; 2]]) -> f64 {
    let segment = |a: &[f64; 2], b: &[f64; 2]| {
        let dx = b[0] - a[0];
        let dy = b[1] - a[1];
        (dx * dx + dy * dy).sqrt()
    };

    let open: f64 = points.windows(2).map(|w| segment(&w[0], &w[1])).sum();
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => open + segment(last, first),
        _ => open,
    }
}

/// Douglas-Peucker with an absolute tolerance, applied to finished polygons
///
/// Rings that collapse below four coordinates are left as they were so the
/// polygon stays well formed.
pub fn simplify_polygons(polygons: Vec<Polygon<f64>>, tolerance: f64) -> Vec<Polygon<f64>> {
    if tolerance <= 0.0 {
        return polygons;
    }

    polygons
        .into_iter()
        .map(|polygon| {
            let simplified = polygon.simplify(tolerance);
            if simplified.exterior().0.len() < 4 {
                return polygon;
            }
            let interiors = simplified
                .interiors()
                .iter()
                .filter(|ring| ring.0.len() >= 4)
                .cloned()
                .collect();
            Polygon::new(simplified.exterior().clone(), interiors)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    /// Square outline sampled at every pixel, as a border tracer would emit it.
    fn dense_square(size: i32) -> Vec<[f64; 2]> {
        let mut points = Vec::new();
        for x in 0..size {
            points.push([f64::from(x), 0.0]);
        }
        for y in 0..size {
            points.push([f64::from(size), f64::from(y)]);
        }
        for x in (1..=size).rev() {
            points.push([f64::from(x), f64::from(size)]);
        }
        for y in (1..=size).rev() {
            points.push([0.0, f64::from(y)]);
        }
        points
    }

    #[test]
    fn test_perimeter_includes_closing_segment() {
        let square = vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        assert!((closed_perimeter(&square) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_dense_square_collapses_to_corners() {
        let mut forest = ContourForest::new(vec![dense_square(40)], vec![None]).unwrap();
        PerimeterDouglasPeucker { threshold: 0.01 }.simplify(&mut forest).unwrap();

        let contour = forest.get(0).unwrap();
        assert_eq!(contour.points.len(), 4);
        for corner in [[0.0, 0.0], [40.0, 0.0], [40.0, 40.0], [0.0, 40.0]] {
            assert!(contour.points.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn test_short_contours_are_left_alone() {
        let mut forest = ContourForest::new(vec![vec![[1.0, 1.0], [2.0, 2.0]]], vec![None]).unwrap();
        PerimeterDouglasPeucker::default().simplify(&mut forest).unwrap();
        assert_eq!(forest.get(0).unwrap().points.len(), 2);
    }

    #[test]
    fn test_large_threshold_degenerates_ring() {
        let mut forest = ContourForest::new(vec![dense_square(10)], vec![None]).unwrap();
        PerimeterDouglasPeucker { threshold: 1.0 }.simplify(&mut forest).unwrap();
        assert!(!forest.get(0).unwrap().is_polygonal());
    }

    #[test]
    fn test_simplify_polygons_drops_near_collinear_vertices() {
        let polygon = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.000_000_1),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        let simplified = simplify_polygons(vec![polygon], 1e-6);
        assert_eq!(simplified[0].exterior().0.len(), 5);
        assert!((simplified[0].unsigned_area() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_tolerance_is_identity() {
        let polygon = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(simplify_polygons(vec![polygon.clone()], 0.0), vec![polygon]);
    }
}
