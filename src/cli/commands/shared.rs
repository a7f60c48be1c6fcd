//! Shared components for CLI commands
//!
//! Logging setup, configuration lookup and progress bars used by more than
//! one command.

use crate::app::models::RawRecord;
use crate::app::services::converter::FlatConverter;
use crate::cli::args::InputArgs;
use crate::config::Config;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Set up structured logging on stderr
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("text2flat={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Pick the configuration file: the explicit one, or the default location
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let default = Config::default_path().context("Could not determine user config directory")?;
    if !default.exists() {
        anyhow::bail!(
            "No configuration given and none found at {}. Pass one with --config.",
            default.display()
        );
    }
    Ok(default)
}

/// Load the configuration, applying a delimiter override
pub fn load_configuration(input: &InputArgs) -> Result<Config> {
    let path = resolve_config_path(input.config_file.as_deref())?;
    let mut config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;

    if let Some(delimiter) = &input.delimiter {
        debug!("Delimiter overridden on the command line: {:?}", delimiter);
        config.delimiter = delimiter.clone();
    }

    info!("Using configuration {}", path.display());
    Ok(config)
}

/// Validate arguments, build the converter and read the input
///
/// The returned converter reports the delimiter actually used for the input.
pub fn prepare(input: &InputArgs) -> Result<(FlatConverter, Vec<RawRecord>)> {
    input.validate()?;
    let config = load_configuration(input)?;
    let mut converter = FlatConverter::from_config(&config).context("Invalid configuration")?;
    let records = converter
        .read(&input.input)
        .with_context(|| format!("Failed to read {}", input.input.display()))?;
    Ok((converter, records))
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
