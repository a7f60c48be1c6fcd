//! Command-line argument definitions for text2flat
//!
//! This module defines the CLI interface using the clap derive API.

use crate::constants::DEFAULT_LOG_LEVEL;
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the text2flat converter
///
/// Converts unlabeled, delimiter-separated customer data into SirsiDynix
/// Symphony flat user records.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "text2flat",
    version,
    about = "Convert unlabeled customer data into Symphony flat user records",
    long_about = "Reads customer records one per line, works out which column holds which \
                  field (names, addresses, postal codes, phone numbers, dates and more), and \
                  writes them in the flat user format loaded by Symphony's loadflatuser."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert customer data into flat user records
    Convert(ConvertArgs),
    /// Report which column holds which field, without writing records
    Detect(DetectArgs),
}

/// Input options shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct InputArgs {
    /// Customer data file, one record per line
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Customer data file, one record per line"
    )]
    pub input: PathBuf,

    /// Path to configuration file
    ///
    /// JSON configuration listing the required and optional fields, corpus
    /// files and output settings. If not specified, looks for
    /// <config dir>/text2flat/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Column delimiter, overriding the configuration
    ///
    /// Use `auto` to pick the most frequent of comma, pipe, tab and semicolon.
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "DELIM",
        help = "Column delimiter, or 'auto' to detect it"
    )]
    pub delimiter: Option<String>,
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output flat file; records go to stdout when omitted
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output flat file (default: stdout)"
    )]
    pub output: Option<PathBuf>,

    /// Refuse to write anything unless the input is well formed
    #[arg(long = "strict", help = "Fail without writing if the input is not well formed")]
    pub strict: bool,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress all output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the detect command
#[derive(Debug, Clone, Parser)]
pub struct DetectArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format for the detection report
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the detection report"
    )]
    pub output_format: OutputFormat,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// Map verbosity flags to a log level
fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => DEFAULT_LOG_LEVEL,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl InputArgs {
    /// Validate the input arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.input.is_file() {
            return Err(Error::file_not_found(self.input.display().to_string()));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if self.delimiter.as_deref() == Some("") {
            return Err(Error::configuration("Delimiter must not be empty"));
        }

        Ok(())
    }
}

impl ConvertArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars
    ///
    /// Progress is only drawn when records go to a file, so it never mixes
    /// with flat output on stdout.
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output.is_some()
    }
}

impl DetectArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}
