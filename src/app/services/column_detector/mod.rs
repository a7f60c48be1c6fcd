//! Column identification for unlabeled customer rows
//!
//! Input files arrive without headers and with an unknown column order. The
//! detector runs each requested field's strategy over every row, in the
//! registry's priority order. Along the way it records the most recent column
//! confirmed for each field and how often each field was found, which together
//! decide whether the file is well formed enough to convert.
//!
//! ## Architecture
//!
//! - [`detector`] - Strategy dispatch and the per-record scan
//! - [`state`] - Per-run assignment, histogram and well-formedness verdict
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use text2flat::app::models::{Field, RawRecord, RequestedField};
//! use text2flat::app::services::column_detector::ColumnDetector;
//! use text2flat::app::services::corpus_store::CorpusStore;
//! use text2flat::app::services::date_classifier::DateClassifier;
//! use text2flat::app::services::field_registry::FieldSpecRegistry;
//!
//! # fn example() -> text2flat::Result<()> {
//! let detector = ColumnDetector::new(
//!     Arc::new(FieldSpecRegistry::standard()?),
//!     Arc::new(CorpusStore::new()),
//!     DateClassifier::new()?,
//!     &[RequestedField::required(Field::Email)],
//! )?;
//!
//! let rows = vec![RawRecord::from_line("Harold,harold@example.com", ",", 1)];
//! let state = detector.run(&rows);
//! assert_eq!(state.column_of(Field::Email), Some(1));
//! assert!(detector.is_well_formed(&state));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod detector;
pub mod state;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use detector::{ClaimPolicy, ColumnDetector};
pub use state::{Deficiency, DetectionState, WellFormedness};
