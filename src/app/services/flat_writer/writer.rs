//! Flat record serialization
//!
//! The writer owns the read-only tables for a run (output bindings, defaults,
//! merges) and the run-wide statistics. Block buckets are per call, so no
//! field from one record can leak into the next.

use std::io::Write;
use tracing::{debug, warn};

use super::merge::{MergeRule, apply_merges};
use super::schema::FlatSchema;
use super::stats::WriteStats;
use crate::app::models::CustomerRecord;
use crate::app::services::date_classifier::DateClassifier;
use crate::app::services::tag_bindings::TagBindingTable;
use crate::constants::symphony::{DEFAULT_FORM_ID, DEFAULTS, DOCUMENT_BOUNDARY, VALUE_SEPARATOR};
use crate::{Error, Result};

/// Output of serializing one record
#[derive(Debug)]
pub struct SerializedRecord {
    /// Flat text, one line per tag, newline terminated
    pub text: String,

    /// Field errors; the fields concerned were left out of `text`
    pub errors: Vec<Error>,
}

impl SerializedRecord {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writes customer records as Symphony flat user records
#[derive(Debug, Clone)]
pub struct FlatWriter {
    schema: FlatSchema,
    bindings: TagBindingTable,
    dates: DateClassifier,
    form_id: String,
    defaults: Vec<(String, String)>,
    merges: Vec<MergeRule>,
    stats: WriteStats,
}

impl FlatWriter {
    /// Create a writer with the built-in defaults and no merges
    ///
    /// `bindings` maps record labels to system fields.
    pub fn new(schema: FlatSchema, bindings: TagBindingTable, dates: DateClassifier) -> Self {
        Self {
            schema,
            bindings,
            dates,
            form_id: DEFAULT_FORM_ID.to_string(),
            defaults: DEFAULTS
                .iter()
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect(),
            merges: Vec::new(),
            stats: WriteStats::new(),
        }
    }

    /// Writer for the Symphony schema with the standard output bindings
    pub fn symphony() -> Result<Self> {
        Ok(Self::new(
            FlatSchema::symphony(),
            TagBindingTable::symphony_defaults(),
            DateClassifier::new()?,
        ))
    }

    pub fn with_form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = form_id.into();
        self
    }

    pub fn with_merges(mut self, merges: Vec<MergeRule>) -> Self {
        self.merges = merges;
        self
    }

    /// Add or replace a default value, or delete it when `value` is empty
    pub fn set_default(&mut self, system_field: &str, value: &str) -> Result<()> {
        if !self.schema.is_system_field(system_field) {
            return Err(Error::configuration(format!(
                "Default '{}' is not a Symphony system field",
                system_field
            )));
        }

        let position = self.defaults.iter().position(|(field, _)| field == system_field);
        match (position, value.is_empty()) {
            (Some(index), true) => {
                self.defaults.remove(index);
            }
            (Some(index), false) => self.defaults[index].1 = value.to_string(),
            (None, true) => {}
            (None, false) => self
                .defaults
                .push((system_field.to_string(), value.to_string())),
        }
        Ok(())
    }

    pub fn defaults(&self) -> &[(String, String)] {
        &self.defaults
    }

    pub fn merges(&self) -> &[MergeRule] {
        &self.merges
    }

    pub fn bindings(&self) -> &TagBindingTable {
        &self.bindings
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Run-wide statistics so far
    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }

    /// System field a record label is written as
    ///
    /// Labels bound in the output table win; otherwise a label that is itself
    /// a system field name resolves to itself.
    pub fn resolve<'a>(&'a self, label: &'a str) -> Option<&'a str> {
        match self.bindings.resolve(label) {
            Some(system_field) => Some(system_field),
            None if self.schema.is_system_field(label) => Some(label),
            None => None,
        }
    }

    /// System field and flat tag for a record label
    fn tag_of<'a>(&'a self, label: &'a str) -> Option<(&'a str, &'static str)> {
        let system_field = self.resolve(label)?;
        let tag = self.schema.tag_for(system_field)?;
        Some((system_field, tag))
    }

    /// Serialize one record
    ///
    /// Errors are counted against this record and the run; the fields
    /// concerned are skipped and everything else is still written.
    pub fn serialize(&mut self, record: CustomerRecord) -> SerializedRecord {
        let mut record = record;
        let mut errors = Vec::new();

        self.apply_defaults(&mut record);
        let merged = apply_merges(&self.merges, &mut record);
        if merged > 0 {
            debug!("Applied {} merge(s)", merged);
        }
        self.normalise_dates(&mut record, &mut errors);

        let mut inline = Vec::new();
        let mut blocks: Vec<(&str, Vec<String>)> = self
            .schema
            .blocks()
            .iter()
            .map(|block| (*block, Vec::new()))
            .collect();

        for (label, value) in record.iter() {
            let Some((system_field, tag)) = self.tag_of(label) else {
                errors.push(Error::unresolved_tag(label));
                continue;
            };
            let line = format!(".{}.{}{}", tag, VALUE_SEPARATOR, value);

            let bucket = self
                .schema
                .block_of(system_field)
                .and_then(|block| blocks.iter_mut().find(|(name, _)| *name == block));
            match bucket {
                Some((_, lines)) => lines.push(line),
                None => inline.push(line),
            }
        }

        let mut text = format!("{}\nFORM={}\n", DOCUMENT_BOUNDARY, self.form_id);
        for line in &inline {
            text.push_str(line);
            text.push('\n');
        }
        for (block, lines) in blocks.iter().filter(|(_, lines)| !lines.is_empty()) {
            text.push_str(&format!(".{}BEGIN.\n", block));
            for line in lines {
                text.push_str(line);
                text.push('\n');
            }
            text.push_str(&format!(".{}END.\n", block));
        }

        let record_number = self.stats.records + 1;
        for error in &errors {
            warn!("Record {}: {}", record_number, error);
            self.stats.add_error(format!("record {}: {}", record_number, error));
        }
        self.stats.record_finished(errors.len());

        SerializedRecord { text, errors }
    }

    /// Serialize one record and write it out, returning its error count
    pub fn write_record<W: Write>(&mut self, record: CustomerRecord, out: &mut W) -> Result<usize> {
        let serialized = self.serialize(record);
        out.write_all(serialized.text.as_bytes())
            .map_err(|e| Error::io("Failed to write flat record", e))?;
        Ok(serialized.error_count())
    }

    /// Fill system fields the record does not already supply
    fn apply_defaults(&self, record: &mut CustomerRecord) {
        for (system_field, value) in &self.defaults {
            let supplied = record
                .labels()
                .any(|label| self.resolve(label) == Some(system_field.as_str()));
            if !supplied {
                record.set(system_field.clone(), value.clone());
            }
        }
    }

    /// Rewrite date fields as `YYYYMMDD`, dropping any that cannot be parsed
    fn normalise_dates(&self, record: &mut CustomerRecord, errors: &mut Vec<Error>) {
        let date_labels: Vec<String> = record
            .labels()
            .filter(|label| {
                self.resolve(label)
                    .is_some_and(|field| self.schema.is_date_field(field))
            })
            .map(str::to_string)
            .collect();

        for label in date_labels {
            let Some(raw) = record.get(&label) else {
                continue;
            };
            match self.dates.parse_canonical(raw) {
                Ok(Some(date)) => record.set(label, date.to_string()),
                Ok(None) => {
                    record.remove(&label);
                }
                Err(error) => {
                    debug!("Dropping '{}': {}", label, error);
                    record.remove(&label);
                    errors.push(error);
                }
            }
        }
    }
}
