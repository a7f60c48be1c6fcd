//! Command implementations for the text2flat CLI
//!
//! Each command is implemented in its own module:
//! - `convert`: detection followed by flat record output
//! - `detect`: detection report only

pub mod convert;
pub mod detect;
pub mod shared;

use crate::cli::args::Commands;

/// Main command runner
pub fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Convert(convert_args) => convert::run_convert(convert_args),
        Commands::Detect(detect_args) => detect::run_detect(detect_args),
    }
}
