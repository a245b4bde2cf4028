//! Directory-level drivers: extract every mask in a folder, merge, write.

use std::fs;
use std::path::{Path, PathBuf};

use geo_types::Polygon;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    config::PolygonizeConfig,
    error::{PolygonizeError, Result},
    io::write_features,
    merge::TileMerger,
    pipeline::{builder::TileExtractorBuilder, TileExtractor},
    tile::TileId,
    types::TileFeatures,
};

const MASK_EXTENSIONS: [&str; 3] = ["png", "tif", "tiff"];

/// Counters gathered over one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub tiles_read: usize,
    pub tiles_skipped: usize,
    pub features_extracted: usize,
    pub components: usize,
    pub features_written: usize,
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Mask files directly inside `dir`, sorted by path.
pub fn mask_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, &MASK_EXTENSIONS) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn extract_file(path: &Path, extractor: &TileExtractor) -> Result<TileFeatures> {
    let tile = TileId::from_path(path)?;
    let mask = image::open(path)?.to_luma8();
    extractor.extract(tile, &mask)
}

/// Extract features from every mask in `dir`.
///
/// Tiles are processed in parallel and their features concatenated in path
/// order. A tile that fails with a recoverable error is skipped; any other
/// error aborts the whole batch.
pub fn extract_directory(dir: &Path, extractor: &TileExtractor) -> Result<(Vec<Polygon<f64>>, BatchReport)> {
    let paths = mask_paths(dir)?;
    info!("extracting {} masks from {}", paths.len(), dir.display());

    let results: Vec<Result<TileFeatures>> = paths.par_iter().map(|path| extract_file(path, extractor)).collect();

    let mut report = BatchReport::default();
    let mut features = Vec::new();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(tile) => {
                debug!("{}: {} features", path.display(), tile.features.len());
                report.tiles_read += 1;
                features.extend(tile.features);
            }
            Err(e) if e.is_recoverable() => {
                warn!("skipping {}: {e}", path.display());
                report.tiles_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    report.features_extracted = features.len();

    info!(
        "read {} tiles ({} skipped), {} features",
        report.tiles_read, report.tiles_skipped, report.features_extracted
    );
    Ok((features, report))
}

/// Prepare `output` for writing: drop a stale file and create its directory.
pub fn prepare_output(output: &Path) -> Result<()> {
    if output.exists() {
        fs::remove_file(output)?;
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Delete the `.tif`/`.tiff` masks of `dir`.
pub fn remove_tiff_masks(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for path in mask_paths(dir)? {
        if has_extension(&path, &["tif", "tiff"]) {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Extract all masks in `input_dir`, merge across tile edges and write the
/// result to `output` as GeoJSON.
pub fn polygonize(
    input_dir: &Path,
    output: &Path,
    config: &PolygonizeConfig,
    remove_inputs: bool,
) -> Result<BatchReport> {
    config.validate()?;
    if !input_dir.is_dir() {
        return Err(PolygonizeError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input directory {} does not exist", input_dir.display()),
        )));
    }
    prepare_output(output)?;

    let extractor = TileExtractorBuilder::from_config(config);
    debug!("{}", extractor.info());
    let (features, mut report) = extract_directory(input_dir, &extractor)?;

    let merged = TileMerger::from_config(config).merge(&features)?;
    report.components = merged.component_count;
    report.features_written = merged.features.len();

    write_features(output, &merged.features)?;
    info!(
        "wrote {} features from {} components to {}",
        report.features_written,
        report.components,
        output.display()
    );

    if remove_inputs {
        let removed = remove_tiff_masks(input_dir)?;
        info!("removed {removed} input masks");
    }

    Ok(report)
}
