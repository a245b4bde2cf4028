use image::GrayImage;
use crate::{error::Result, traits::ContourExtractor, types::ContourForest};

/// Suzuki-Abe border following as implemented by imageproc
///
/// Every non-zero pixel is foreground. Each traced border records the border
/// that immediately encloses it, so outer borders of regions nested inside a
/// hole point at that hole.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor;

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, binary_image: &GrayImage) -> Result<ContourForest> {
        let contours = imageproc::contours::find_contours::<i32>(binary_image);

        let (rings, hierarchy): (Vec<Vec<[f64; 2]>>, Vec<Option<usize>>) = contours
            .into_iter()
            .map(|contour| {
                let ring = contour
                    .points
                    .iter()
                    .map(|p| [f64::from(p.x), f64::from(p.y)])
                    .collect();
                (ring, contour.parent)
            })
            .unzip();

        ContourForest::new(rings, hierarchy)
    }
}
