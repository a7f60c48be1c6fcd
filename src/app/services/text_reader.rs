//! Delimited text input
//!
//! Reads customer data one record per line, splitting each line into raw
//! columns. Blank lines are skipped but still count towards line numbers so
//! diagnostics point at the right place in the source file.

use crate::app::models::RawRecord;
use crate::constants::{AUTO_DELIMITER, DELIMITER_CANDIDATES, DELIMITER_SAMPLE_LINES};
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Read every non-blank line of a file as a raw record
pub fn read_records(path: &Path, delimiter: &str) -> Result<Vec<RawRecord>> {
    read_delimited(path, delimiter).map(|(_, records)| records)
}

/// Read a file, returning the delimiter actually used with its records
///
/// A delimiter of `auto` is resolved against the file content.
pub fn read_delimited(path: &Path, delimiter: &str) -> Result<(String, Vec<RawRecord>)> {
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }

    info!("Reading customer data: {}", path.display());
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read file {}", path.display()), e))?;

    let delimiter = resolve_delimiter(&content, delimiter)?;
    let records = parse_records(&content, &delimiter);
    info!("Read {} records from {}", records.len(), path.display());
    Ok((delimiter, records))
}

/// Split text content into raw records
pub fn parse_records(content: &str, delimiter: &str) -> Vec<RawRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| RawRecord::from_line(line, delimiter, index + 1))
        .collect()
}

/// Turn a configured delimiter into the literal one to split on
pub fn resolve_delimiter(content: &str, delimiter: &str) -> Result<String> {
    if delimiter != AUTO_DELIMITER {
        return Ok(delimiter.to_string());
    }

    let sample = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(DELIMITER_SAMPLE_LINES);
    let guessed = guess_delimiter(sample).ok_or_else(|| {
        Error::configuration("Could not detect the delimiter; set it explicitly")
    })?;
    debug!("Delimiter set to {:?}", guessed);
    Ok(guessed)
}

/// Most frequent candidate delimiter across the sampled lines
///
/// Ties go to the earlier candidate in `, | tab ;` order. Returns `None`
/// when no candidate appears at all.
pub fn guess_delimiter<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = vec![0usize; DELIMITER_CANDIDATES.len()];
    for line in lines {
        for (count, candidate) in counts.iter_mut().zip(DELIMITER_CANDIDATES) {
            *count += line.matches(*candidate).count();
        }
    }

    let (best, &count) = counts
        .iter()
        .enumerate()
        .rev()
        .max_by_key(|(_, count)| **count)?;
    (count > 0).then(|| DELIMITER_CANDIDATES[best].to_string())
}
