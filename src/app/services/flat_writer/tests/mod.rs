//! Unit tests for the flat_writer module


use crate::app::models::CustomerRecord;
use crate::app::services::date_classifier::DateClassifier;
use crate::app::services::flat_writer::{FlatSchema, FlatWriter};
use crate::app::services::tag_bindings::TagBindingTable;
use crate::constants::symphony::DEFAULTS;
use chrono::NaiveDate;

/// Writer with the standard bindings and defaults, dated 2024-06-15
pub fn create_test_writer() -> FlatWriter {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    FlatWriter::new(
        FlatSchema::symphony(),
        TagBindingTable::symphony_defaults(),
        DateClassifier::with_today(today).unwrap(),
    )
}

/// Writer with every built-in default removed, for exact output checks
pub fn writer_without_defaults() -> FlatWriter {
    let mut writer = create_test_writer();
    for (field, _) in DEFAULTS {
        writer.set_default(field, "").unwrap();
    }
    writer
}

/// Build a record from label/value pairs
pub fn record(pairs: &[(&str, &str)]) -> CustomerRecord {
    pairs.iter().copied().collect()
}
