//! Reference word-lists for recognising free-text fields
//!
//! Names, streets, towns, branches and profiles have no reliable shape, so
//! they are recognised by token membership in a corpus loaded once at start-up.
//! Corpora are immutable after loading.

use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One loaded word-list
#[derive(Debug, Clone)]
pub struct CorpusReference {
    /// Corpus name, matching the canonical field it serves
    pub name: String,

    /// File the tokens were loaded from
    pub path: PathBuf,

    tokens: HashSet<String>,
}

impl CorpusReference {
    /// Load a word-list, one token per line
    ///
    /// Lines are trimmed and lowercased; blank lines and `#` comments are
    /// skipped. The file must exist and yield at least one token.
    pub fn load(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let name = name.into();
        let path = path.as_ref();

        if !path.is_file() {
            return Err(Error::corpus(
                &name,
                format!("expected a lookup file but it doesn't exist: {}", path.display()),
            ));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::corpus(&name, format!("failed to read {}: {}", path.display(), e))
        })?;

        let tokens: HashSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();

        if tokens.is_empty() {
            return Err(Error::corpus(
                &name,
                format!("lookup file is empty: {}", path.display()),
            ));
        }

        debug!("Loaded corpus '{}' with {} tokens", name, tokens.len());
        Ok(Self {
            name,
            path: path.to_path_buf(),
            tokens,
        })
    }

    /// Build a corpus from in-memory tokens
    pub fn from_tokens<I, S>(name: impl Into<String>, tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let tokens: HashSet<String> = tokens
            .into_iter()
            .map(|token| token.as_ref().trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(Error::corpus(&name, "corpus has no tokens"));
        }

        Ok(Self {
            name,
            path: PathBuf::new(),
            tokens,
        })
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Whether any of the (already lowercased) tokens is in the corpus
    pub fn intersects<'a, I>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens.into_iter().any(|token| self.tokens.contains(token))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Split a column value into lowercase word tokens
///
/// Any character that is not alphanumeric or `_` separates tokens.
pub fn tokenize(value: &str) -> Vec<String> {
    value
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// All corpora available to a run, keyed by corpus name
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    corpora: HashMap<String, CorpusReference>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a corpus file and register it under its name
    pub fn load(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let reference = CorpusReference::load(name, path)?;
        info!(
            "Corpus '{}': {} tokens from {}",
            reference.name,
            reference.len(),
            reference.path.display()
        );
        self.insert(reference);
        Ok(())
    }

    pub fn insert(&mut self, reference: CorpusReference) {
        self.corpora.insert(reference.name.clone(), reference);
    }

    pub fn get(&self, name: &str) -> Option<&CorpusReference> {
        self.corpora.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.corpora.contains_key(name)
    }

    /// Corpus names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.corpora.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }
}
