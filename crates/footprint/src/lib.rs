//! # Building Footprint Polygonization Library
//!
//! Turns per-tile building segmentation masks into one GeoJSON layer of
//! building footprints. Each mask is traced into geographic polygons, then
//! polygons that were cut apart at tile edges are fused back together.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: Swap preprocessing, tracing, simplification and hole grouping stages
//! - **Tile Addressing**: Mask filenames `<source>-<x>-<y>-<zoom>` place each mask on the globe
//! - **Geometry Repair**: Self-touching traced rings are resolved into valid polygons
//! - **Edge Merging**: Spatial index plus union-find groups nearby features, which are closed morphologically
//! - **GeoJSON Support**: Read and write feature collections
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use footprint::{polygonize, PolygonizeConfig};
//! use std::path::Path;
//!
//! let report = polygonize(
//!     Path::new("masks/"),
//!     Path::new("out/buildings.geojson"),
//!     &PolygonizeConfig::default(),
//!     false,
//! )?;
//! println!("{} buildings", report.features_written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Extractor
//!
//! ```rust,no_run
//! use footprint::{TileExtractor, TileId, algorithms::*};
//!
//! let extractor = TileExtractor::builder()
//!     .add_preprocessor(ForegroundPreprocessor)
//!     .with_opening(3)
//!     .set_hole_detector(NoHoleDetector)
//!     .build();
//!
//! let mask = image::open("OAM-137000-95000-18.png")?.to_luma8();
//! let tile = TileId::new(137_000, 95_000, 18);
//! let features = extractor.extract(tile, &mask)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod config;
pub mod tile;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod geometry;
pub mod index;
pub mod graph;
pub mod merge;
pub mod io;
pub mod batch;

// Re-exports for convenience
pub use error::{PolygonizeError, Result};
pub use config::PolygonizeConfig;
pub use tile::{TileBounds, TileId};
pub use types::{ComplexShape, Contour, ContourForest, TileFeatures};
pub use traits::*;
pub use pipeline::{TileExtractor, builder::TileExtractorBuilder};
pub use merge::{MergeOutcome, TileMerger};
pub use io::{features_from_geojson_string, features_to_geojson_string, read_features, write_features};
pub use batch::{BatchReport, extract_directory, polygonize};

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use geo_types::Polygon;
    use image::{GrayImage, Luma};

    const TILE: TileId = TileId { x: 137_000, y: 95_000, zoom: 18 };

    fn extractor() -> TileExtractor {
        let config = PolygonizeConfig { kernel_opening: 0, ..Default::default() };
        TileExtractorBuilder::from_config(&config)
    }

    fn fill(img: &mut GrayImage, from: u32, to: u32, value: u8) {
        for y in from..to {
            for x in from..to {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }

    fn extract(mask: &GrayImage) -> Vec<Polygon<f64>> {
        extractor().extract(TILE, mask).expect("Should extract successfully").features
    }

    #[test]
    fn test_background_only_mask() {
        assert!(extract(&GrayImage::new(256, 256)).is_empty());
    }

    #[test]
    fn test_square_with_hole() {
        let mut mask = GrayImage::new(256, 256);
        fill(&mut mask, 40, 200, 1);
        fill(&mut mask, 100, 140, 0);

        let features = extract(&mask);
        assert_eq!(features.len(), 1, "Should find one building");
        assert_eq!(features[0].interiors().len(), 1, "Should keep the courtyard");
    }

    #[test]
    fn test_island_inside_hole_is_dropped() {
        let mut mask = GrayImage::new(256, 256);
        fill(&mut mask, 20, 236, 1);
        fill(&mut mask, 60, 196, 0);
        fill(&mut mask, 100, 156, 1);

        let features = extract(&mask);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].interiors().len(), 1);

        // The outer ring minus the hole; the island would add area back
        let bounds = TILE.bounds();
        let pixel_area = bounds.width() / 256.0 * bounds.height() / 256.0;
        let expected = (215.0 * 215.0 - 137.0 * 137.0) * pixel_area;
        let area = features[0].unsigned_area();
        assert!((area - expected).abs() / expected < 0.05, "area {area}, expected {expected}");
    }

    #[test]
    fn test_corner_touching_buildings_are_both_kept() {
        let mut mask = GrayImage::new(256, 256);
        fill(&mut mask, 20, 100, 1);
        fill(&mut mask, 100, 130, 1);

        let mut features = extract(&mask);
        assert_eq!(features.len(), 2, "Both buildings should survive tracing");

        features.sort_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()));
        let bounds = TILE.bounds();
        let pixel_area = bounds.width() / 256.0 * bounds.height() / 256.0;
        let expected = 29.0 * 29.0 * pixel_area;
        let area = features[0].unsigned_area();
        assert!((area - expected).abs() / expected < 0.1, "area {area}, expected {expected}");
    }

    #[test]
    fn test_separate_buildings_stay_separate_after_merge() {
        let mut mask = GrayImage::new(256, 256);
        fill(&mut mask, 20, 60, 1);
        fill(&mut mask, 150, 220, 1);

        let features = extract(&mask);
        assert_eq!(features.len(), 2);

        let merged = TileMerger::default().merge(&features).unwrap();
        assert_eq!(merged.component_count, 2);
        assert_eq!(merged.features.len(), 2);
    }

    #[test]
    fn test_extract_then_merge_through_geojson() {
        let mut mask = GrayImage::new(256, 256);
        fill(&mut mask, 30, 90, 1);

        let features = extract(&mask);
        let text = features_to_geojson_string(&features).unwrap();
        let reloaded = features_from_geojson_string(&text).unwrap();
        assert_eq!(reloaded, features);

        let merged = TileMerger::default().merge(&reloaded).unwrap();
        assert_eq!(merged.features.len(), 1);
        let ratio = merged.features[0].unsigned_area() / features[0].unsigned_area();
        assert!((ratio - 1.0).abs() < 0.02, "ratio {ratio}");
    }
}
