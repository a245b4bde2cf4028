use clap::{Parser, Subcommand};
use cli::{ConfigOverrides, config_schema_json, config_to_toml, resolve_config};
use color_eyre::eyre::{Result, eyre};
use footprint::{
    PolygonizeConfig, TileExtractorBuilder, TileMerger, batch, extract_directory, polygonize, read_features,
    write_features,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Building footprint polygonization from tiled segmentation masks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace every mask in a directory into raw (unmerged) features
    Extract {
        /// Directory of `<source>-<x>-<y>-<zoom>` mask tiles
        #[arg(short, long)]
        input_dir: PathBuf,
        /// GeoJSON file for the raw features
        #[arg(short, long)]
        output: PathBuf,
        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Fuse features split by tile edges
    Merge {
        /// GeoJSON file with raw features
        #[arg(short, long)]
        input: PathBuf,
        /// GeoJSON file for the merged features
        #[arg(short, long)]
        output: PathBuf,
        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Extract and merge in one run
    Polygonize {
        /// Directory of `<source>-<x>-<y>-<zoom>` mask tiles
        #[arg(short, long)]
        input_dir: PathBuf,
        /// GeoJSON file for the merged features
        #[arg(short, long)]
        output: PathBuf,
        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Delete the .tif masks after a successful run
        #[arg(long)]
        remove_inputs: bool,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Print the JSON schema of the configuration file
    Schema,
    /// Write a configuration file with default values
    InitConfig {
        /// Destination TOML file
        #[arg(short, long, default_value = "footprint.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract { input_dir, output, config, overrides } => {
            let config = load(config.as_deref(), overrides)?;
            extract(input_dir, output, &config)?;
        }
        Commands::Merge { input, output, config, overrides } => {
            let config = load(config.as_deref(), overrides)?;
            merge(input, output, &config)?;
        }
        Commands::Polygonize { input_dir, output, config, remove_inputs, overrides } => {
            let config = load(config.as_deref(), overrides)?;
            let report = polygonize(input_dir, output, &config, *remove_inputs)?;
            info!("✅ {} buildings written to {}", report.features_written, output.display());
        }
        Commands::Schema => {
            println!("{}", config_schema_json()?);
        }
        Commands::InitConfig { output } => {
            if output.exists() {
                return Err(eyre!("{} already exists", output.display()));
            }
            std::fs::write(output, config_to_toml(&PolygonizeConfig::default())?)?;
            info!("Default configuration written to {}", output.display());
        }
    }

    Ok(())
}

fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<PolygonizeConfig> {
    let config = resolve_config(path, overrides)?;
    config.validate()?;
    Ok(config)
}

fn extract(input_dir: &Path, output: &Path, config: &PolygonizeConfig) -> Result<()> {
    batch::prepare_output(output)?;
    let extractor = TileExtractorBuilder::from_config(config);
    let (features, report) = extract_directory(input_dir, &extractor)?;
    write_features(output, &features)?;
    info!(
        "✅ {} raw features from {} tiles written to {}",
        report.features_extracted,
        report.tiles_read,
        output.display()
    );
    Ok(())
}

fn merge(input: &Path, output: &Path, config: &PolygonizeConfig) -> Result<()> {
    let features = read_features(input)?;
    info!("Merging {} features from {}", features.len(), input.display());

    let merged = TileMerger::from_config(config).merge(&features)?;
    batch::prepare_output(output)?;
    write_features(output, &merged.features)?;
    info!(
        "✅ {} features from {} components written to {}",
        merged.features.len(),
        merged.component_count,
        output.display()
    );
    Ok(())
}
