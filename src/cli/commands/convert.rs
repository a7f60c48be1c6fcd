//! Convert command: detection followed by flat record output

use anyhow::{Context, Result};
use colored::*;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use tracing::info;

use super::shared::{create_progress_bar, prepare, setup_logging};
use crate::app::services::converter::ConversionReport;
use crate::cli::args::ConvertArgs;

/// Run the convert command
pub fn run_convert(args: ConvertArgs) -> Result<()> {
    setup_logging(args.get_log_level(), args.quiet)?;

    let (mut converter, records) = prepare(&args.input)?;
    info!("Detecting columns in {} records", records.len());

    let detection = converter.detect(&records);
    let verdict = converter.verdict(&detection);
    if args.strict && !verdict.is_well_formed {
        let reasons: Vec<String> = verdict
            .deficiencies
            .iter()
            .filter(|d| d.is_fatal())
            .map(ToString::to_string)
            .collect();
        anyhow::bail!(
            "{} is not well formed: {}",
            args.input.input.display(),
            reasons.join("; ")
        );
    }

    let report = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);

            let pb = args
                .show_progress()
                .then(|| create_progress_bar(records.len() as u64, "Writing flat records"));
            let report = converter.write_records(&records, detection, verdict, &mut out, || {
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
            })?;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            report
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            converter.write_records(&records, detection, verdict, &mut out, || {})?
        }
    };

    if !args.quiet {
        print_summary(&report, args.output.as_deref());
    }
    Ok(())
}

/// Print the end-of-run summary to stderr
fn print_summary(report: &ConversionReport, output: Option<&Path>) {
    eprintln!("\n{}", "Conversion Summary".bright_green().bold());
    eprintln!(
        "  Records written: {}",
        report.stats.records.to_string().bright_white().bold()
    );
    let errors = report.stats.errors.to_string();
    eprintln!(
        "  Field errors: {}",
        if report.stats.errors > 0 {
            errors.bright_red().bold()
        } else {
            errors.bright_white().bold()
        }
    );
    if report.skipped_records > 0 {
        eprintln!(
            "  Rows skipped: {}",
            report.skipped_records.to_string().bright_yellow().bold()
        );
    }
    eprintln!(
        "  Input: {}",
        if report.is_well_formed() {
            "well formed".green()
        } else {
            "not well formed".yellow()
        }
    );
    if let Some(path) = output {
        eprintln!("  Output: {}", path.display());
    }
    eprintln!("{}", report.stats.summary());
}
