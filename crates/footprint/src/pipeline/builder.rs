use crate::{
    algorithms::{
        ForegroundPreprocessor, ImageprocContourExtractor, OneLevelHoleDetector, OpeningPreprocessor,
        PerimeterDouglasPeucker,
    },
    config::PolygonizeConfig,
    pipeline::TileExtractor,
    traits::{ContourExtractor, ContourSimplifier, HoleDetector, ImagePreprocessor},
};

/// Builder for creating tile extractors with a fluent API
pub struct TileExtractorBuilder {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    simplifier: Option<Box<dyn ContourSimplifier>>,
    hole_detector: Option<Box<dyn HoleDetector>>,
}

impl TileExtractorBuilder {
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            contour_extractor: None,
            simplifier: None,
            hole_detector: None,
        }
    }

    /// Add a preprocessor; preprocessors run in the order they were added
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the contour simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: ContourSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Set the hole detector (replaces any existing one)
    pub fn set_hole_detector<H>(mut self, detector: H) -> Self
    where
        H: HoleDetector + 'static,
    {
        self.hole_detector = Some(Box::new(detector));
        self
    }

    /// Morphological opening with the given kernel size in pixels
    pub fn with_opening(self, kernel_size: u32) -> Self {
        self.add_preprocessor(OpeningPreprocessor::from_kernel_size(kernel_size))
    }

    /// Perimeter-relative Douglas-Peucker with the given fraction
    pub fn with_simplify_threshold(self, threshold: f64) -> Self {
        self.set_simplifier(PerimeterDouglasPeucker { threshold })
    }

    /// Build the extractor with default components where none were set
    pub fn build(self) -> TileExtractor {
        let contour_extractor = self
            .contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor));

        let simplifier = self
            .simplifier
            .unwrap_or_else(|| Box::new(PerimeterDouglasPeucker::default()));

        let hole_detector = self
            .hole_detector
            .unwrap_or_else(|| Box::new(OneLevelHoleDetector));

        TileExtractor::new(self.preprocessors, contour_extractor, simplifier, hole_detector)
    }

    /// Standard building-mask extractor for the given settings
    pub fn from_config(config: &PolygonizeConfig) -> TileExtractor {
        Self::new()
            .add_preprocessor(ForegroundPreprocessor)
            .with_opening(config.kernel_opening)
            .with_simplify_threshold(config.simplify_threshold)
            .build()
    }
}

impl Default for TileExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
