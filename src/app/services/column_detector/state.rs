//! Per-run detection state and well-formedness verdict
//!
//! A `DetectionState` belongs to exactly one run over one input. It is created
//! fresh by [`ColumnDetector::run`](super::ColumnDetector::run) and never
//! shared between files.

use crate::app::models::{Field, RequestedField};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Column assignment, histogram and counters for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionState {
    /// Most recently confirmed column for each field
    pub assignment: BTreeMap<Field, usize>,

    /// Number of records in which each field was located
    pub histogram: BTreeMap<Field, usize>,

    /// Number of records observed
    pub total_records: usize,

    /// Number of (record, required field) pairs that were not located
    pub required_misses: usize,
}

impl DetectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a field was found in a column of the current record
    pub fn record_hit(&mut self, field: Field, index: usize) {
        self.assignment.insert(field, index);
        *self.histogram.entry(field).or_insert(0) += 1;
    }

    /// Column currently assigned to a field
    pub fn column_of(&self, field: Field) -> Option<usize> {
        self.assignment.get(&field).copied()
    }

    /// Number of records in which the field was located
    pub fn hits(&self, field: Field) -> usize {
        self.histogram.get(&field).copied().unwrap_or(0)
    }

    /// Percentage of records in which the field was located
    pub fn detection_rate(&self, field: Field) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.hits(field) as f64 * 100.0) / self.total_records as f64
        }
    }

    /// Evaluate well-formedness against the requested fields
    ///
    /// Every required field must have an assigned column and a detection rate
    /// at or above `threshold`. Optional fields under the threshold are
    /// reported but do not fail the verdict.
    pub fn verdict(&self, requested: &[RequestedField], threshold: f64) -> WellFormedness {
        let mut deficiencies = Vec::new();
        let is_required = |field: Field| {
            requested
                .iter()
                .any(|r| r.field == field && r.is_required())
        };

        for field in requested.iter().filter(|r| r.is_required()).map(|r| r.field) {
            if !self.assignment.contains_key(&field) {
                deficiencies.push(Deficiency::MissingRequired { field });
            }
        }

        for &field in self.histogram.keys() {
            let percentage = self.detection_rate(field);
            if percentage < threshold {
                deficiencies.push(Deficiency::BelowThreshold {
                    field,
                    percentage,
                    required: is_required(field),
                });
            }
        }

        let is_well_formed = !deficiencies.iter().any(Deficiency::is_fatal);
        WellFormedness {
            is_well_formed,
            threshold,
            deficiencies,
        }
    }

    /// Get summary of detection statistics
    pub fn summary(&self) -> String {
        let fields: Vec<String> = self
            .assignment
            .iter()
            .map(|(field, index)| {
                format!("{}@{} ({:.1}%)", field, index, self.detection_rate(*field))
            })
            .collect();
        format!(
            "{} records, {} required misses | {}",
            self.total_records,
            self.required_misses,
            fields.join(", ")
        )
    }
}

/// One reason an input may not be well formed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Deficiency {
    /// A required field was never located
    MissingRequired { field: Field },
    /// A field was located in too few records
    BelowThreshold {
        field: Field,
        percentage: f64,
        required: bool,
    },
}

impl Deficiency {
    /// Whether this deficiency makes the input not well formed
    pub fn is_fatal(&self) -> bool {
        match self {
            Deficiency::MissingRequired { .. } => true,
            Deficiency::BelowThreshold { required, .. } => *required,
        }
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deficiency::MissingRequired { field } => {
                write!(f, "required field '{}' was not found", field)
            }
            Deficiency::BelowThreshold {
                field,
                percentage,
                required,
            } => write!(
                f,
                "{} field '{}' found in only {:.1}% of records",
                if *required { "required" } else { "optional" },
                field,
                percentage
            ),
        }
    }
}

/// Outcome of a well-formedness check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellFormedness {
    pub is_well_formed: bool,
    pub threshold: f64,
    pub deficiencies: Vec<Deficiency>,
}

impl WellFormedness {
    /// Log every deficiency to the diagnostic stream
    pub fn report(&self) {
        for deficiency in &self.deficiencies {
            warn!("{} (threshold {:.1}%)", deficiency, self.threshold);
        }
    }

    pub fn missing_required(&self) -> Vec<Field> {
        self.deficiencies
            .iter()
            .filter_map(|d| match d {
                Deficiency::MissingRequired { field } => Some(*field),
                Deficiency::BelowThreshold { .. } => None,
            })
            .collect()
    }
}
