//! Test utilities for column detection
//!
//! This module provides the shared corpora, sample rows and detector builders
//! used across the detector test modules.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::app::models::{RawRecord, RequestedField};
use crate::app::services::column_detector::ColumnDetector;
use crate::app::services::corpus_store::{CorpusReference, CorpusStore};
use crate::app::services::date_classifier::DateClassifier;
use crate::app::services::field_registry::FieldSpecRegistry;


/// Sample customer row with every column shape the detector understands
pub const SAMPLE_ROW: [&str; 15] = [
    "12/31/2023",
    " EPLSTR",
    " EPL_VISITR",
    "1234-567 Ave",
    "Edmonton",
    " AB.",
    " T6G 0G4 ",
    "1999-08-22",
    " 21221012345678",
    "Bisland-Jones",
    "example@company1.com",
    "Harold",
    "Customer note",
    "(780)-555-1212",
    "X",
];

/// Reference date the sample data was written against
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// Corpora covering the free-text columns of the sample row
pub fn create_test_corpora() -> CorpusStore {
    let mut store = CorpusStore::new();
    for (name, tokens) in [
        ("branch", vec!["EPLSTR", "EPLMNA", "EPLWMC"]),
        ("profile", vec!["EPL_VISITR", "EPL_ADULT", "EPL_STAFF"]),
        ("street", vec!["Ave", "Avenue", "Street", "St", "Cres", "Road"]),
        ("city", vec!["Edmonton", "Calgary", "Leduc"]),
        ("lastName", vec!["Jones", "Smith", "Hamilton"]),
        ("firstName", vec!["Harold", "Lewis", "Ava"]),
    ] {
        store.insert(CorpusReference::from_tokens(name, tokens).unwrap());
    }
    store
}

/// Helper to build a detector over the test corpora
pub fn create_test_detector(requested: &[RequestedField]) -> ColumnDetector {
    ColumnDetector::new(
        Arc::new(FieldSpecRegistry::standard().unwrap()),
        Arc::new(create_test_corpora()),
        DateClassifier::with_today(test_today()).unwrap(),
        requested,
    )
    .unwrap()
}

/// Helper to build a raw record from string columns
pub fn row(columns: &[&str]) -> RawRecord {
    RawRecord::from_columns(columns.iter().copied())
}
