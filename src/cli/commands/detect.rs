//! Detect command: report column assignments without writing records

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use super::shared::{prepare, setup_logging};
use crate::app::models::RequestedField;
use crate::app::services::column_detector::{DetectionState, WellFormedness};
use crate::cli::args::{DetectArgs, OutputFormat};

/// Machine-readable detection report
#[derive(Debug, Serialize)]
struct DetectionReport<'a> {
    input: String,
    delimiter: &'a str,
    detection: &'a DetectionState,
    verdict: &'a WellFormedness,
}

/// Run the detect command
pub fn run_detect(args: DetectArgs) -> Result<()> {
    setup_logging(args.get_log_level(), false)?;

    let (converter, records) = prepare(&args.input)?;
    let detection = converter.detect(&records);
    let verdict = converter.verdict(&detection);

    match args.output_format {
        OutputFormat::Human => {
            print_human(converter.detector().requested(), &detection, &verdict);
        }
        OutputFormat::Json => {
            let report = DetectionReport {
                input: args.input.input.display().to_string(),
                delimiter: converter.delimiter(),
                detection: &detection,
                verdict: &verdict,
            };
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to encode detection report")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn print_human(requested: &[RequestedField], detection: &DetectionState, verdict: &WellFormedness) {
    println!("{}", "Column Detection".bright_green().bold());
    println!(
        "  {} records, threshold {:.1}%",
        detection.total_records.to_string().bright_white().bold(),
        verdict.threshold
    );
    println!();

    for requested_field in requested {
        let field = requested_field.field;
        let kind = if requested_field.is_required() {
            "required"
        } else {
            "optional"
        };
        match detection.column_of(field) {
            Some(column) => println!(
                "  {:<12} {:<9} column {:>2}  {:>5.1}%",
                field.as_str().bright_white(),
                kind,
                column,
                detection.detection_rate(field)
            ),
            None => println!(
                "  {:<12} {:<9} {}",
                field.as_str().bright_white(),
                kind,
                "not found".bright_red()
            ),
        }
    }

    println!();
    for deficiency in &verdict.deficiencies {
        println!("  {} {}", "!".bright_yellow().bold(), deficiency);
    }
    if verdict.is_well_formed {
        println!("{}", "Input is well formed".green().bold());
    } else {
        println!("{}", "Input is not well formed".red().bold());
    }
}
