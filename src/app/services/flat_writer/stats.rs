//! Run-wide serialization statistics

use serde::Serialize;

/// Statistics for one writer across a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteStats {
    /// Number of records serialized
    pub records: usize,
    /// Number of records serialized without any error
    pub clean_records: usize,
    /// Number of field errors across all records
    pub errors: usize,
    /// List of specific error messages for reporting
    pub error_messages: Vec<String>,
}

impl WriteStats {
    pub fn new() -> Self {
        Self {
            records: 0,
            clean_records: 0,
            errors: 0,
            error_messages: Vec::new(),
        }
    }

    /// Add an error to the statistics
    pub fn add_error(&mut self, message: String) {
        self.errors += 1;
        self.error_messages.push(message);
    }

    /// Count one finished record and how many errors it had
    pub fn record_finished(&mut self, errors: usize) {
        self.records += 1;
        if errors == 0 {
            self.clean_records += 1;
        }
    }

    /// Percentage of records written without any error
    pub fn success_rate(&self) -> f64 {
        if self.records == 0 {
            100.0
        } else {
            (self.clean_records as f64 / self.records as f64) * 100.0
        }
    }

    /// End-of-run summary line
    pub fn summary(&self) -> String {
        format!(
            "processed {} records with {} error(s)",
            self.records, self.errors
        )
    }
}

impl Default for WriteStats {
    fn default() -> Self {
        Self::new()
    }
}
