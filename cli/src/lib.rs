use clap::Args;
use footprint::PolygonizeConfig;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Morphological opening kernel size in pixels (0 or 1 disables it)
    #[arg(long)]
    pub kernel_opening: Option<u32>,
    /// Contour simplification tolerance as a fraction of the perimeter
    #[arg(long)]
    pub simplify_threshold: Option<f64>,
    /// Gap in meters bridged between features at tile edges
    #[arg(long)]
    pub distance_threshold: Option<f64>,
    /// Final simplification tolerance in degrees
    #[arg(long)]
    pub output_tolerance: Option<f64>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: PolygonizeConfig) -> PolygonizeConfig {
        if let Some(kernel_opening) = self.kernel_opening {
            config.kernel_opening = kernel_opening;
        }
        if let Some(simplify_threshold) = self.simplify_threshold {
            config.simplify_threshold = simplify_threshold;
        }
        if let Some(distance_threshold) = self.distance_threshold {
            config.distance_threshold = distance_threshold;
        }
        if let Some(output_tolerance) = self.output_tolerance {
            config.output_tolerance = output_tolerance;
        }
        config
    }
}

/// Load configuration from TOML string
pub fn config_from_toml(content: &str) -> Result<PolygonizeConfig, CliError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from JSON string
pub fn config_from_json(content: &str) -> Result<PolygonizeConfig, CliError> {
    Ok(serde_json::from_str(content)?)
}

/// Auto-detect file format and load configuration
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PolygonizeConfig, CliError> {
    let path_ref = path.as_ref();
    match path_ref.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => config_from_toml(&fs::read_to_string(path_ref)?),
        Some("json") => config_from_json(&fs::read_to_string(path_ref)?),
        _ => Err(CliError::UnsupportedFileFormat),
    }
}

/// Resolve the effective configuration: file values (or defaults), then flags
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<PolygonizeConfig, CliError> {
    let base = match path {
        Some(path) => load_config(path)?,
        None => PolygonizeConfig::default(),
    };
    Ok(overrides.apply(base))
}

/// Convert configuration to TOML string
pub fn config_to_toml(config: &PolygonizeConfig) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(config)?)
}

/// JSON schema of the configuration file, pretty-printed
pub fn config_schema_json() -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&PolygonizeConfig::schema())?)
}
