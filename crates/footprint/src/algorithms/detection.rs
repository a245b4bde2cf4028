use std::collections::BTreeMap;

use crate::{error::Result, traits::HoleDetector, types::{ComplexShape, ContourForest}};

/// Hierarchy-based hole detector that keeps a single level of holes
///
/// Outermost contours become shapes and their direct children become holes.
/// Anything nested deeper (islands inside holes and their own holes) is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct OneLevelHoleDetector;

impl HoleDetector for OneLevelHoleDetector {
    fn detect_holes(&self, forest: &ContourForest) -> Result<Vec<ComplexShape>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

        for index in 0..forest.len() {
            let mut ancestors = forest.ancestors(index);
            match (ancestors.next(), ancestors.next()) {
                (None, _) => {
                    groups.entry(index).or_default();
                }
                (Some(root), None) => {
                    groups.entry(root).or_default().push(index);
                }
                _ => {}
            }
        }

        let shapes = groups
            .into_iter()
            .filter_map(|(root, holes)| {
                let exterior = forest.get(root).filter(|c| c.is_polygonal())?;
                let holes = holes
                    .into_iter()
                    .filter_map(|i| forest.get(i))
                    .filter(|c| c.is_polygonal())
                    .map(|c| c.points.clone())
                    .collect();
                Some(ComplexShape {
                    exterior: exterior.points.clone(),
                    holes,
                })
            })
            .collect();

        Ok(shapes)
    }
}

/// Treats every outermost contour as a solid shape and ignores holes
#[derive(Debug, Clone, Default)]
pub struct NoHoleDetector;

impl HoleDetector for NoHoleDetector {
    fn detect_holes(&self, forest: &ContourForest) -> Result<Vec<ComplexShape>> {
        let shapes = forest
            .iter()
            .filter(|c| c.parent.is_none() && c.is_polygonal())
            .map(|c| ComplexShape {
                exterior: c.points.clone(),
                holes: Vec::new(),
            })
            .collect();

        Ok(shapes)
    }
}
