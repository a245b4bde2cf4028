use image::GrayImage;
use crate::{error::Result, types::{ComplexShape, ContourForest}};

/// Trait for mask preprocessing algorithms
pub trait ImagePreprocessor: Send + Sync {
    /// Clean up the raw mask before tracing (e.g. remove speckle noise)
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Trace the borders of all foreground regions together with their nesting
    fn extract_contours(&self, image: &GrayImage) -> Result<ContourForest>;
}

/// Trait for contour simplification algorithms
pub trait ContourSimplifier: Send + Sync {
    /// Reduce the point count of every contour in place, keeping the forest's
    /// indices stable
    fn simplify(&self, forest: &mut ContourForest) -> Result<()>;
}

/// Trait for hole detection algorithms
pub trait HoleDetector: Send + Sync {
    /// Group contours into outer rings and their holes
    fn detect_holes(&self, forest: &ContourForest) -> Result<Vec<ComplexShape>>;
}
