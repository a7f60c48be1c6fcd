//! Multi-source field merges
//!
//! A merge joins the values of several record fields into one target field,
//! for example `lastName` and `firstName` into `userName` as
//! `"Hamilton, Lewis"`.

use crate::app::models::CustomerRecord;
use serde::{Deserialize, Serialize};
use tracing::trace;

fn default_merge_delimiter() -> String {
    " ".to_string()
}

/// One configured field merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRule {
    /// Label the joined value is stored under
    pub target: String,

    /// Labels whose values are joined, in order
    pub sources: Vec<String>,

    /// Separator placed between non-empty source values
    #[serde(default = "default_merge_delimiter")]
    pub delimiter: String,

    /// Remove the source fields after merging
    #[serde(default)]
    pub purge: bool,
}

impl MergeRule {
    pub fn new<I, S>(target: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: target.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            delimiter: default_merge_delimiter(),
            purge: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_purge(mut self, purge: bool) -> Self {
        self.purge = purge;
        self
    }

    /// Apply the merge to a record
    ///
    /// Empty and absent sources are skipped. Returns false, leaving the record
    /// untouched, when no source has a value. The target is never purged even
    /// when it is also listed as a source.
    pub fn apply(&self, record: &mut CustomerRecord) -> bool {
        let values: Vec<&str> = self
            .sources
            .iter()
            .filter_map(|source| record.get(source))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect();

        if values.is_empty() {
            trace!("Merge into '{}' skipped: no source values", self.target);
            return false;
        }

        let merged = values.join(&self.delimiter);
        if self.purge {
            for source in self.sources.iter().filter(|s| **s != self.target) {
                record.remove(source);
            }
        }
        record.set(self.target.clone(), merged);
        true
    }
}

/// Apply every merge in order, returning how many produced a value
pub fn apply_merges(rules: &[MergeRule], record: &mut CustomerRecord) -> usize {
    rules.iter().filter(|rule| rule.apply(record)).count()
}
