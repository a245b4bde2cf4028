pub mod builder;

use image::GrayImage;
use tracing::{debug, warn};

use crate::{
    error::{PolygonizeError, Result},
    tile::TileId,
    traits::{ContourExtractor, ContourSimplifier, HoleDetector, ImagePreprocessor},
    types::TileFeatures,
};

/// Turns one tile mask into geographic building footprints
pub struct TileExtractor {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Box<dyn ContourExtractor>,
    simplifier: Box<dyn ContourSimplifier>,
    hole_detector: Box<dyn HoleDetector>,
}

impl TileExtractor {
    /// Create a new extractor builder
    pub fn builder() -> builder::TileExtractorBuilder {
        builder::TileExtractorBuilder::new()
    }

    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        contour_extractor: Box<dyn ContourExtractor>,
        simplifier: Box<dyn ContourSimplifier>,
        hole_detector: Box<dyn HoleDetector>,
    ) -> Self {
        Self {
            preprocessors,
            contour_extractor,
            simplifier,
            hole_detector,
        }
    }

    /// Process a mask through the entire pipeline
    ///
    /// A mask without foreground yields no features. Shapes whose outer ring
    /// repairs to nothing are dropped with a warning; every other error is
    /// returned to the caller.
    pub fn extract(&self, tile: TileId, mask: &GrayImage) -> Result<TileFeatures> {
        let mut processed = mask.clone();
        for preprocessor in &self.preprocessors {
            processed = preprocessor.preprocess(&processed)?;
        }

        let mut forest = self.contour_extractor.extract_contours(&processed)?;
        let (width, height) = mask.dimensions();
        if forest.is_empty() {
            debug!("tile {tile}: no contours");
            return Ok(TileFeatures {
                tile,
                features: Vec::new(),
                mask_width: width,
                mask_height: height,
            });
        }

        self.simplifier.simplify(&mut forest)?;
        let shapes = self.hole_detector.detect_holes(&forest)?;

        let bounds = tile.bounds();
        let mut features = Vec::new();
        for shape in &shapes {
            match shape.to_geo_polygons(&bounds, width, height) {
                Ok(polygons) => features.extend(polygons),
                Err(PolygonizeError::DegenerateGeometry) => {
                    warn!("tile {tile}: dropping shape with a degenerate outer ring");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "tile {tile}: {} contours, {} shapes, {} features",
            forest.len(),
            shapes.len(),
            features.len()
        );

        Ok(TileFeatures {
            tile,
            features,
            mask_width: width,
            mask_height: height,
        })
    }

    /// Get information about the extractor configuration
    pub fn info(&self) -> String {
        format!(
            "TileExtractor: {} preprocessors, 1 contour extractor, 1 simplifier, 1 hole detector",
            self.preprocessors.len()
        )
    }
}
