//! Labelled record extraction
//!
//! Once detection has settled which column holds which field, the extractor
//! lifts those columns out of each raw row and stores them under the caller's
//! current label for the field.

use crate::app::models::{CustomerRecord, Field, RawRecord, RequestedField};
use crate::app::services::tag_bindings::TagBindingTable;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds customer records from raw rows and a column assignment
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    fields: Vec<Field>,
    labels: TagBindingTable,
}

impl RecordExtractor {
    /// Create an extractor for the requested fields, in configured order
    ///
    /// `labels` is the input binding table mapping each label to a canonical
    /// field name.
    pub fn new(requested: &[RequestedField], labels: TagBindingTable) -> Self {
        let mut fields: Vec<Field> = Vec::with_capacity(requested.len());
        for field in requested.iter().map(|r| r.field) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Self { fields, labels }
    }

    /// Label under which a field is stored
    pub fn label_of(&self, field: Field) -> &str {
        self.labels
            .label_for(field.as_str())
            .unwrap_or_else(|| field.as_str())
    }

    /// Extract one labelled record
    ///
    /// Blank values and columns the row does not have are skipped.
    pub fn extract(&self, raw: &RawRecord, assignment: &BTreeMap<Field, usize>) -> CustomerRecord {
        let mut record = CustomerRecord::new();

        for &field in &self.fields {
            let Some(&index) = assignment.get(&field) else {
                continue;
            };
            let Some(value) = raw.get(index) else {
                debug!(
                    "Line {}: column {} for '{}' is beyond the row ({} columns)",
                    raw.line_number,
                    index,
                    field,
                    raw.len()
                );
                continue;
            };

            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            record.set(self.label_of(field), normalise(field, value));
        }

        record
    }
}

/// Tidy values whose shape is known
pub fn normalise(field: Field, value: &str) -> String {
    match field {
        Field::PostalCode => normalise_postal_code(value),
        Field::Phone => normalise_phone(value),
        _ => value.to_string(),
    }
}

/// Uppercase a Canadian postal code as `A1A 1A1`
fn normalise_postal_code(value: &str) -> String {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    if compact.len() == 6 && compact.is_ascii() {
        format!("{} {}", &compact[..3], &compact[3..])
    } else {
        value.to_string()
    }
}

/// Rewrite a North-American number as `ddd-ddd-dddd`, dropping a leading 1
fn normalise_phone(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return value.to_string(),
    };
    format!("{}-{}-{}", &local[..3], &local[3..6], &local[6..])
}
