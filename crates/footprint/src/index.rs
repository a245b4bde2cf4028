//! Bounding-box index over a fixed set of polygons.

use geo::BoundingRect;
use geo_types::{Polygon, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// R-tree entry: a polygon's bounding box tagged with its position in the
/// input slice.
type IndexedBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Answers "which shapes might touch this box" for a batch of polygons.
///
/// Built once and never mutated. Results are candidates only: callers must
/// confirm with an exact geometric test.
pub struct SpatialIndex {
    tree: RTree<IndexedBox>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-load the bounding boxes of `shapes`. Empty shapes are left out.
    pub fn build(shapes: &[Polygon<f64>]) -> Self {
        let entries: Vec<IndexedBox> = shapes
            .iter()
            .enumerate()
            .filter_map(|(index, shape)| {
                let rect = shape.bounding_rect()?;
                let (min, max) = (rect.min(), rect.max());
                Some(GeomWithData::new(
                    Rectangle::from_corners([min.x, min.y], [max.x, max.y]),
                    index,
                ))
            })
            .collect();

        Self {
            len: shapes.len(),
            tree: RTree::bulk_load(entries),
        }
    }

    /// Indices of shapes whose bounding box intersects `query`, ascending.
    pub fn query(&self, query: &Rect<f64>) -> Vec<usize> {
        let (min, max) = (query.min(), query.max());
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Number of shapes the index was built from, including empty ones.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
