use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolygonizeError {
    #[error("Failed to load mask: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Geometry has no positive-area part after repair")]
    DegenerateGeometry,

    #[error("Contour hierarchy out of sync: {contours} contours, {hierarchy} hierarchy entries")]
    HierarchyMismatch { contours: usize, hierarchy: usize },

    #[error("Contour {index} names parent {parent}, but only {contours} contours exist")]
    InvalidParent { index: usize, parent: usize, contours: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Components cover {covered} features, expected {expected}")]
    ComponentCoverage { covered: usize, expected: usize },

    #[error("Reprojection failed: {0}")]
    Projection(String),

    #[error("Filename does not encode a tile: {0}")]
    TileName(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

impl PolygonizeError {
    /// Whether a batch may skip the failing item and keep going.
    ///
    /// Structural invariant violations and configuration errors are not
    /// recoverable; everything tied to a single tile or feature is.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::HierarchyMismatch { .. }
                | Self::InvalidParent { .. }
                | Self::ComponentCoverage { .. }
                | Self::InvalidConfiguration(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PolygonizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_violations_are_fatal() {
        assert!(!PolygonizeError::HierarchyMismatch { contours: 2, hierarchy: 1 }.is_recoverable());
        assert!(!PolygonizeError::InvalidParent { index: 1, parent: 7, contours: 2 }.is_recoverable());
        assert!(!PolygonizeError::ComponentCoverage { covered: 3, expected: 4 }.is_recoverable());
        assert!(!PolygonizeError::InvalidConfiguration("bad".into()).is_recoverable());
    }

    #[test]
    fn test_per_item_errors_are_recoverable() {
        assert!(PolygonizeError::DegenerateGeometry.is_recoverable());
        assert!(PolygonizeError::TileName("x.png".into()).is_recoverable());
        assert!(PolygonizeError::Projection("(0, 91)".into()).is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(PolygonizeError::from(io).is_recoverable());
    }
}
