//! Per-record column detection
//!
//! This module dispatches each requested field to its detection strategy and
//! folds the result into the run's [`DetectionState`].

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::state::{DetectionState, WellFormedness};
use crate::app::models::{
    DetectionStrategy, Field, FieldSpec, RawRecord, RequestedField,
};
use crate::app::services::corpus_store::{CorpusStore, tokenize};
use crate::app::services::date_classifier::DateClassifier;
use crate::app::services::field_registry::FieldSpecRegistry;
use crate::constants::DEFAULT_THRESHOLD;
use crate::{Error, Result};

/// Which strategies must avoid columns already claimed in the same record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimPolicy {
    /// Every strategy skips claimed columns, so no two fields share a column
    #[default]
    Exclusive,
    /// Only corpus strategies skip claimed columns; pattern and date fields
    /// may land on a column another field already holds
    CorpusOnly,
}

/// Locates requested fields in unlabeled rows
#[derive(Debug, Clone)]
pub struct ColumnDetector {
    registry: Arc<FieldSpecRegistry>,
    corpora: Arc<CorpusStore>,
    dates: DateClassifier,
    requested: Vec<RequestedField>,
    claim_policy: ClaimPolicy,
    threshold: f64,
}

impl ColumnDetector {
    /// Create a detector for the requested fields
    ///
    /// Fails if no field is required, or if a requested corpus field has no
    /// loaded corpus.
    pub fn new(
        registry: Arc<FieldSpecRegistry>,
        corpora: Arc<CorpusStore>,
        dates: DateClassifier,
        requested: &[RequestedField],
    ) -> Result<Self> {
        if !requested.iter().any(RequestedField::is_required) {
            return Err(Error::configuration("no 'required' fields were specified"));
        }

        let requested = registry.prioritise(requested);
        for field in &requested {
            let spec = registry.get(field.field).ok_or_else(|| {
                Error::configuration(format!("Field '{}' is not registered", field.field))
            })?;
            if let DetectionStrategy::Corpus { corpus } = &spec.strategy {
                if !corpora.contains(corpus) {
                    return Err(Error::corpus(
                        corpus,
                        format!("expected a lookup file for '{}'", field.field),
                    ));
                }
            }
        }

        debug!(
            "Detector scan order: {:?}",
            requested.iter().map(|r| r.field.as_str()).collect::<Vec<_>>()
        );

        Ok(Self {
            registry,
            corpora,
            dates,
            requested,
            claim_policy: ClaimPolicy::default(),
            threshold: DEFAULT_THRESHOLD,
        })
    }

    /// Set which strategies skip already claimed columns
    pub fn with_claim_policy(mut self, claim_policy: ClaimPolicy) -> Self {
        self.claim_policy = claim_policy;
        self
    }

    /// Set the well-formedness threshold, as a percentage of records
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Requested fields in scan priority order
    pub fn requested(&self) -> &[RequestedField] {
        &self.requested
    }

    pub fn claim_policy(&self) -> ClaimPolicy {
        self.claim_policy
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Run detection over a batch of records with fresh state
    pub fn run<'a, I>(&self, records: I) -> DetectionState
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let mut state = DetectionState::new();
        for record in records {
            self.observe(&mut state, record);
        }
        debug!("Detection complete: {}", state.summary());
        state
    }

    /// Scan one record, updating the assignment and histogram
    ///
    /// Returns the fields located in this record with their column index.
    pub fn observe(&self, state: &mut DetectionState, record: &RawRecord) -> Vec<(Field, usize)> {
        state.total_records += 1;

        let mut claimed = HashSet::new();
        let mut located = Vec::new();

        for requested in &self.requested {
            let Some(spec) = self.registry.get(requested.field) else {
                continue;
            };

            match self.locate(spec, record, &claimed) {
                Some(index) => {
                    trace!(
                        "Line {}: '{}' found in column {}",
                        record.line_number, requested.field, index
                    );
                    claimed.insert(index);
                    state.record_hit(requested.field, index);
                    located.push((requested.field, index));
                }
                None if requested.is_required() => {
                    state.required_misses += 1;
                    warn!(
                        "Line {}: required field '{}' not found",
                        record.line_number, requested.field
                    );
                }
                None => {
                    trace!(
                        "Line {}: optional field '{}' not found",
                        record.line_number, requested.field
                    );
                }
            }
        }

        located
    }

    /// Find the column holding a field in one record
    pub fn locate(
        &self,
        spec: &FieldSpec,
        record: &RawRecord,
        claimed: &HashSet<usize>,
    ) -> Option<usize> {
        let skip_claimed = match (&spec.strategy, self.claim_policy) {
            (DetectionStrategy::Corpus { .. }, _) => true,
            (_, ClaimPolicy::Exclusive) => true,
            (_, ClaimPolicy::CorpusOnly) => false,
        };
        let mut candidates = record
            .columns
            .iter()
            .enumerate()
            .filter(|(index, _)| !(skip_claimed && claimed.contains(index)));

        match &spec.strategy {
            DetectionStrategy::Pattern(regex) => candidates
                .find(|(_, value)| regex.is_match(value.trim()))
                .map(|(index, _)| index),
            DetectionStrategy::Corpus { corpus } => {
                let reference = self.corpora.get(corpus)?;
                candidates
                    .find(|(_, value)| {
                        let tokens = tokenize(value);
                        reference.intersects(tokens.iter().map(String::as_str))
                    })
                    .map(|(index, _)| index)
            }
            DetectionStrategy::DateRole(role) => candidates
                .find(|(_, value)| self.dates.matches_role(value, *role))
                .map(|(index, _)| index),
        }
    }

    /// Well-formedness verdict for a finished run, with each deficiency logged
    pub fn verdict(&self, state: &DetectionState) -> WellFormedness {
        let verdict = state.verdict(&self.requested, self.threshold);
        verdict.report();
        verdict
    }

    /// Whether a finished run is well formed
    pub fn is_well_formed(&self, state: &DetectionState) -> bool {
        self.verdict(state).is_well_formed
    }
}
