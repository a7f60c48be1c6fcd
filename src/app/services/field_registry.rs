//! Canonical field detection rules and scan priority
//!
//! Values in different columns overlap: a first name can look like a street
//! token, and a phone number can look like a user ID. The registry therefore
//! fixes a scan order. Fields with unambiguous shapes are identified first,
//! which leaves fewer candidate columns for the fuzzier corpus fields.

use crate::app::models::{DateRole, DetectionStrategy, Field, FieldSpec, RequestedField};
use crate::constants::patterns;
use crate::{Error, Result};
use regex::Regex;
use tracing::debug;

/// Detection rules for every canonical field, held in scan priority order
#[derive(Debug, Clone)]
pub struct FieldSpecRegistry {
    specs: Vec<FieldSpec>,
}

impl FieldSpecRegistry {
    /// Registry with the built-in strategy for every canonical field
    pub fn standard() -> Result<Self> {
        let specs = Field::ALL
            .iter()
            .map(|&field| Ok(FieldSpec::new(field, Self::default_strategy(field)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { specs })
    }

    fn default_strategy(field: Field) -> Result<DetectionStrategy> {
        let pattern = |source: &str| {
            Regex::new(source)
                .map(DetectionStrategy::Pattern)
                .map_err(|e| Error::pattern(field.as_str(), e))
        };
        let corpus = || DetectionStrategy::Corpus {
            corpus: field.as_str().to_string(),
        };

        match field {
            Field::UserId => pattern(patterns::USER_ID),
            Field::Email => pattern(patterns::EMAIL),
            Field::PostalCode => pattern(patterns::POSTAL_CODE),
            Field::Country => pattern(patterns::COUNTRY),
            Field::Province => pattern(patterns::PROVINCE),
            Field::Phone => pattern(patterns::PHONE),
            Field::Gender => pattern(patterns::GENDER),
            Field::Birthday => Ok(DetectionStrategy::DateRole(DateRole::Birth)),
            Field::Expiry => Ok(DetectionStrategy::DateRole(DateRole::Expiry)),
            Field::Branch
            | Field::Profile
            | Field::Street
            | Field::City
            | Field::LastName
            | Field::FirstName => Ok(corpus()),
        }
    }

    /// Replace the pattern of a pattern-detected field
    ///
    /// Fields detected by corpus or date role cannot take a pattern.
    pub fn with_pattern(mut self, field: Field, source: &str) -> Result<Self> {
        let regex = Regex::new(source).map_err(|e| Error::pattern(field.as_str(), e))?;
        let spec = self
            .specs
            .iter_mut()
            .find(|spec| spec.field == field)
            .ok_or_else(|| Error::configuration(format!("Field '{}' is not registered", field)))?;

        match spec.strategy {
            DetectionStrategy::Pattern(_) => {
                debug!("Overriding pattern for '{}': {}", field, source);
                spec.strategy = DetectionStrategy::Pattern(regex);
                Ok(self)
            }
            _ => Err(Error::configuration(format!(
                "Field '{}' is detected by {} and cannot take a pattern",
                field,
                spec.strategy.kind()
            ))),
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldSpec> {
        self.specs.iter().find(|spec| spec.field == field)
    }

    /// Fields in scan priority order
    pub fn scan_order(&self) -> impl Iterator<Item = Field> + '_ {
        self.specs.iter().map(|spec| spec.field)
    }

    /// Fields that need a corpus to be detected
    pub fn corpus_fields(&self) -> Vec<Field> {
        self.specs
            .iter()
            .filter(|spec| spec.needs_corpus())
            .map(|spec| spec.field)
            .collect()
    }

    /// Order requested fields by scan priority, dropping duplicates
    ///
    /// A field requested both as required and optional is kept as required.
    pub fn prioritise(&self, requested: &[RequestedField]) -> Vec<RequestedField> {
        self.scan_order()
            .filter_map(|field| {
                let mut matches = requested.iter().filter(|r| r.field == field).peekable();
                matches.peek()?;
                if matches.any(|r| r.is_required()) {
                    Some(RequestedField::required(field))
                } else {
                    Some(RequestedField::optional(field))
                }
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
