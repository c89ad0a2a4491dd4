//! menu-vision command-line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use menu_vision::config::{self, AppConfig};
use menu_vision::menu::{MenuResponse, Merger};
use menu_vision::storage;
use menu_vision::vision::{
    MenuPipeline, OcrCapabilities, RecordedOcr, TextFragment, VisionConfig, VisionError,
};

/// Extract structured menu items from a menu photo
#[derive(Parser, Debug)]
#[command(name = "menu-vision")]
#[command(about = "Turns OCR output for a restaurant menu photo into structured menu items")]
struct Args {
    /// Configuration file (defaults to config.toml in the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline on an image, replaying recorded OCR output
    Extract {
        /// Menu photo
        image: PathBuf,
        /// OCR recording (JSON) for the photo
        #[arg(long)]
        ocr: PathBuf,
    },
    /// Merge a JSON list of positioned text fragments into menu items
    Merge {
        /// Fragments file: [{"bbox": {"x1", "y1", "x2", "y2"}, "text"}]
        fragments: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (config, source) = match load_config_or_default(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging.level) {
        eprintln!("Error: failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    source.log();

    match run(args.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<VisionError>() {
            Some(vision_error) if vision_error.is_client_error() => {
                error!("Rejected input image: {:#}", e);
                ExitCode::from(2)
            }
            _ => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides the configured level
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Load configuration from an explicit path, the config directory, or defaults
///
/// Logging is not installed yet, so a default config that fails to load is
/// carried in the returned [`ConfigSource`] and logged once the subscriber runs.
fn load_config_or_default(explicit: Option<&Path>) -> Result<(AppConfig, ConfigSource)> {
    if let Some(path) = explicit {
        let config = config::load_config(path)?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    Ok(match storage::default_config_path() {
        Ok(config_path) => load_default_config(config_path),
        Err(_) => (AppConfig::default(), ConfigSource::Defaults),
    })
}

/// Load the config file at the default location, falling back to defaults
fn load_default_config(config_path: PathBuf) -> (AppConfig, ConfigSource) {
    if !config_path.exists() {
        return (AppConfig::default(), ConfigSource::Defaults);
    }

    match config::load_config(&config_path) {
        Ok(config) => (config, ConfigSource::File(config_path)),
        Err(e) => (
            AppConfig::default(),
            ConfigSource::Rejected {
                path: config_path,
                error: format!("{:#}", e),
            },
        ),
    }
}

/// Where the active configuration came from
#[derive(Debug)]
enum ConfigSource {
    File(PathBuf),
    Defaults,
    /// The default config file exists but could not be loaded
    Rejected { path: PathBuf, error: String },
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Using configuration from {:?}", path),
            ConfigSource::Defaults => info!("Using default configuration"),
            ConfigSource::Rejected { path, error } => {
                warn!("Ignoring unreadable config {:?}, using defaults: {}", path, error)
            }
        }
    }
}

fn run(command: Command, config: &AppConfig) -> Result<()> {
    let response = match command {
        Command::Extract { image, ocr } => extract(&image, &ocr, config)?,
        Command::Merge { fragments } => merge(&fragments)?,
    };

    if response.is_empty() {
        warn!("No menu items extracted");
    }

    print_response(&response, config.output.pretty)
}

fn extract(image_path: &Path, ocr_path: &Path, config: &AppConfig) -> Result<MenuResponse> {
    let recording = RecordedOcr::load(ocr_path)?;
    let capabilities = OcrCapabilities::from_backend(Arc::new(recording));
    let pipeline = MenuPipeline::with_config(capabilities, VisionConfig::from(&config.vision));

    let bytes = std::fs::read(image_path)
        .with_context(|| format!("Failed to read image: {:?}", image_path))?;

    let result = pipeline.process(&bytes)?;
    info!(
        "Extracted {} menu items from {} regions ({} with text) in {} ms",
        result.items.len(),
        result.regions_detected,
        result.fragments_recognized,
        result.processing_time_ms
    );

    Ok(result.into_response())
}

fn merge(fragments_path: &Path) -> Result<MenuResponse> {
    let content = std::fs::read_to_string(fragments_path)
        .with_context(|| format!("Failed to read fragments: {:?}", fragments_path))?;
    let fragments: Vec<TextFragment> =
        serde_json::from_str(&content).context("Invalid fragments file")?;

    let usable = TextFragment::retain_usable(fragments);
    Ok(MenuResponse::new(Merger::new().merge(&usable)))
}

fn print_response(response: &MenuResponse, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    println!("{}", json);
    Ok(())
}
