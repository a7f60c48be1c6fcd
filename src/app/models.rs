//! Data models for text2flat processing
//!
//! This module contains the core data structures shared by the column detector
//! and the flat writer: canonical fields, their detection strategies, raw input
//! rows and labelled customer records.

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Canonical Fields
// =============================================================================

/// Canonical customer fields the detector knows how to find
///
/// The canonical name is stable and independent of whatever label a caller
/// binds to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "userId")]
    UserId,
    #[serde(rename = "branch")]
    Branch,
    #[serde(rename = "profile")]
    Profile,
    #[serde(rename = "postalcode")]
    PostalCode,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "birthday")]
    Birthday,
    #[serde(rename = "expiry")]
    Expiry,
    #[serde(rename = "street")]
    Street,
    #[serde(rename = "province")]
    Province,
    #[serde(rename = "country")]
    Country,
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "city")]
    City,
    #[serde(rename = "lastName")]
    LastName,
    #[serde(rename = "firstName")]
    FirstName,
}

impl Field {
    /// All canonical fields, in scan priority order
    ///
    /// Fields with distinctive shapes come first so that by the time the
    /// free-text corpus fields are scanned most columns are already claimed.
    pub const ALL: [Field; 15] = [
        Field::UserId,
        Field::Branch,
        Field::Profile,
        Field::PostalCode,
        Field::Email,
        Field::Phone,
        Field::Birthday,
        Field::Expiry,
        Field::Street,
        Field::Province,
        Field::Country,
        Field::Gender,
        Field::City,
        Field::LastName,
        Field::FirstName,
    ];

    /// Canonical name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::UserId => "userId",
            Field::Branch => "branch",
            Field::Profile => "profile",
            Field::PostalCode => "postalcode",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Birthday => "birthday",
            Field::Expiry => "expiry",
            Field::Street => "street",
            Field::Province => "province",
            Field::Country => "country",
            Field::Gender => "gender",
            Field::City => "city",
            Field::LastName => "lastName",
            Field::FirstName => "firstName",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::configuration(format!("Unknown field name '{}'", s)))
    }
}

// =============================================================================
// Detection Strategies
// =============================================================================

/// Role a date column can play in a customer record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRole {
    /// Plausible birth date, between 2 and 100 years ago
    Birth,
    /// Privilege expiry date, strictly after tomorrow
    Expiry,
}

/// How a field's column is recognised
#[derive(Debug, Clone)]
pub enum DetectionStrategy {
    /// First column whose trimmed value matches the pattern
    Pattern(Regex),
    /// First unclaimed column sharing a token with the named corpus
    Corpus { corpus: String },
    /// First column the date classifier accepts for the role
    DateRole(DateRole),
}

impl DetectionStrategy {
    /// Short name of the strategy kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            DetectionStrategy::Pattern(_) => "pattern",
            DetectionStrategy::Corpus { .. } => "corpus",
            DetectionStrategy::DateRole(_) => "date",
        }
    }
}

/// Registered detection rule for one canonical field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field: Field,
    pub strategy: DetectionStrategy,
}

impl FieldSpec {
    pub fn new(field: Field, strategy: DetectionStrategy) -> Self {
        Self { field, strategy }
    }

    /// Whether the field is recognised through a corpus
    pub fn needs_corpus(&self) -> bool {
        matches!(self.strategy, DetectionStrategy::Corpus { .. })
    }
}

/// Whether a requested field must be found for the input to be well formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
}

/// A field requested for one run, tagged required or optional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedField {
    pub field: Field,
    pub requirement: Requirement,
}

impl RequestedField {
    pub fn required(field: Field) -> Self {
        Self {
            field,
            requirement: Requirement::Required,
        }
    }

    pub fn optional(field: Field) -> Self {
        Self {
            field,
            requirement: Requirement::Optional,
        }
    }

    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }
}

// =============================================================================
// Records
// =============================================================================

/// One input line split into raw columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the input, for diagnostics
    pub line_number: usize,

    /// Raw column values, untrimmed
    pub columns: Vec<String>,
}

impl RawRecord {
    /// Split a line on the delimiter
    pub fn from_line(line: &str, delimiter: &str, line_number: usize) -> Self {
        let columns = if delimiter.is_empty() {
            vec![line.to_string()]
        } else {
            line.split(delimiter).map(str::to_string).collect()
        };
        Self {
            line_number,
            columns,
        }
    }

    /// Build a record directly from column values
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line_number: 0,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Labelled customer data handed to the flat writer
///
/// Keys are caller-visible labels (canonical, rebound, or Symphony system
/// field names). Iteration follows insertion order, which is also the order
/// fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    fields: Vec<(String, String)>,
}

impl CustomerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing in place if the label is already present
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == label) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, label: &str) -> Option<String> {
        let position = self.fields.iter().position(|(key, _)| key == label)?;
        Some(self.fields.remove(position).1)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomerRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = CustomerRecord::new();
        for (label, value) in iter {
            record.set(label, value);
        }
        record
    }
}

impl IntoIterator for CustomerRecord {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
