//! Configuration management and validation.
//!
//! Provides the JSON configuration document for a conversion run: which
//! fields are requested, how labels are rebound, where the corpora live, and
//! how records are written. Objects in the document keep their order, since
//! renames are applied in sequence.

use crate::app::services::flat_writer::MergeRule;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DELIMITER, DEFAULT_THRESHOLD,
    symphony::DEFAULT_FORM_ID,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serde adapter keeping JSON objects as ordered `(key, value)` pairs
pub mod ordered_pairs {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(pairs: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (key, value) in pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object of string values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    pairs.push((key, value));
                }
                Ok(pairs)
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Labels that must be found for the input to be well formed
    pub required: Vec<String>,

    /// Labels extracted when found
    pub optional: Vec<String>,

    /// Column delimiter, or `auto` to sniff it
    pub delimiter: String,

    /// Label renames, applied in order
    #[serde(alias = "fieldNames", with = "ordered_pairs")]
    pub field_bindings: Vec<(String, String)>,

    /// Corpus file for each corpus-detected label
    #[serde(with = "ordered_pairs")]
    pub corpus: Vec<(String, String)>,

    /// Well-formedness threshold, percent of records
    pub threshold: f64,

    /// Stop every field, not just corpus fields, from reusing a claimed column
    pub exclusive_columns: bool,

    /// Regex overrides for pattern-detected labels
    #[serde(with = "ordered_pairs")]
    pub patterns: Vec<(String, String)>,

    /// Flat form identifier
    pub form_id: String,

    /// Default values by system field; an empty value removes a default
    #[serde(with = "ordered_pairs")]
    pub defaults: Vec<(String, String)>,

    /// Extra output bindings, label to system field
    #[serde(with = "ordered_pairs")]
    pub output_bindings: Vec<(String, String)>,

    /// Field merges applied before writing
    pub merge: Vec<MergeRule>,

    /// Directory relative corpus paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required: Vec::new(),
            optional: Vec::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            field_bindings: Vec::new(),
            corpus: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
            exclusive_columns: true,
            patterns: Vec::new(),
            form_id: DEFAULT_FORM_ID.to_string(),
            defaults: Vec::new(),
            output_bindings: Vec::new(),
            merge: Vec::new(),
            base_dir: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a configuration file
    ///
    /// Relative corpus paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read configuration {}", path.display()), e)
        })?;
        let mut config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::json(format!("Failed to parse configuration {}", path.display()), e)
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Check presence and range constraints
    pub fn validate(&self) -> Result<()> {
        if self.required.is_empty() {
            return Err(Error::configuration("no 'required' fields were specified"));
        }
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(Error::configuration(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        if self.delimiter.is_empty() {
            return Err(Error::configuration("delimiter must not be empty"));
        }
        if self.form_id.trim().is_empty() {
            return Err(Error::configuration("formId must not be empty"));
        }
        for rule in &self.merge {
            if rule.target.is_empty() || rule.sources.is_empty() {
                return Err(Error::configuration(format!(
                    "merge into '{}' needs a target and at least one source",
                    rule.target
                )));
            }
        }
        Ok(())
    }

    /// Configured corpus file for a label, resolved against `base_dir`
    pub fn corpus_path(&self, label: &str) -> Option<PathBuf> {
        let (_, path) = self.corpus.iter().find(|(key, _)| key == label)?;
        let path = PathBuf::from(path);
        Some(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        })
    }

    pub fn with_required<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_optional<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_field_binding(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.field_bindings.push((old.into(), new.into()));
        self
    }

    pub fn with_corpus(mut self, label: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.corpus
            .push((label.into(), path.as_ref().display().to_string()));
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_exclusive_columns(mut self, exclusive: bool) -> Self {
        self.exclusive_columns = exclusive;
        self
    }

    pub fn with_pattern(mut self, label: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.push((label.into(), pattern.into()));
        self
    }

    pub fn with_form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = form_id.into();
        self
    }

    pub fn with_default(mut self, system_field: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.push((system_field.into(), value.into()));
        self
    }

    pub fn with_output_binding(
        mut self,
        label: impl Into<String>,
        system_field: impl Into<String>,
    ) -> Self {
        self.output_bindings.push((label.into(), system_field.into()));
        self
    }

    pub fn with_merge(mut self, rule: MergeRule) -> Self {
        self.merge.push(rule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_minimal_document_uses_defaults() {
        let config = Config::from_json_str(r#"{"required": ["firstName"]}"#).unwrap();

        assert_eq!(config.required, vec!["firstName"]);
        assert!(config.optional.is_empty());
        assert_eq!(config.delimiter, ",");
        assert_eq!(config.threshold, 90.0);
        assert!(config.exclusive_columns);
        assert_eq!(config.form_id, "LDUSER");
    }

    #[test]
    fn test_objects_keep_document_order() {
        let config = Config::from_json_str(
            r#"{
                "required": ["lastName"],
                "fieldBindings": {"zeta": "z", "alpha": "a", "mid": "m"},
                "corpus": {"lastName": "last.txt", "firstName": "first.txt"}
            }"#,
        )
        .unwrap();

        let keys: Vec<&str> = config.field_bindings.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(config.corpus[1], ("firstName".to_string(), "first.txt".to_string()));
    }

    #[test]
    fn test_field_names_alias() {
        let config =
            Config::from_json_str(r#"{"required": ["x"], "fieldNames": {"firstName": "given"}}"#)
                .unwrap();
        assert_eq!(
            config.field_bindings,
            vec![("firstName".to_string(), "given".to_string())]
        );
    }

    #[test]
    fn test_full_document() {
        let config = Config::from_json_str(
            r#"{
                "required": ["firstName", "lastName"],
                "optional": ["email"],
                "delimiter": "|",
                "threshold": 75,
                "exclusiveColumns": false,
                "patterns": {"postalcode": "^\\d{5}$"},
                "formId": "LDUSER_EPL",
                "defaults": {"userProfile": "EPL_ADULT", "retrnmail": ""},
                "outputBindings": {"country": "userCategory3"},
                "merge": [
                    {"target": "userName", "sources": ["lastName", "firstName"], "delimiter": ", ", "purge": true}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.delimiter, "|");
        assert_eq!(config.threshold, 75.0);
        assert!(!config.exclusive_columns);
        assert_eq!(config.patterns[0].1, r"^\d{5}$");
        assert_eq!(config.form_id, "LDUSER_EPL");
        assert_eq!(config.defaults.len(), 2);
        assert_eq!(config.output_bindings[0].0, "country");
        assert_eq!(
            config.merge[0],
            MergeRule::new("userName", ["lastName", "firstName"])
                .with_delimiter(", ")
                .with_purge(true)
        );
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            Config::from_json_str("{}"),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Config::from_json_str(r#"{"required": ["x"], "threshold": 120}"#),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Config::from_json_str(r#"{"required": ["x"], "delimiter": ""}"#),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Config::from_json_str(r#"{"required": ["x"], "merge": [{"target": "userName", "sources": []}]}"#),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Config::from_json_str(r#"{"required": "firstName"}"#),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    fn test_load_resolves_relative_corpus_paths() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"required": ["street"], "corpus": {{"street": "street.txt", "city": "/data/city.txt"}}}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let base = file.path().parent().unwrap();

        assert_eq!(config.corpus_path("street"), Some(base.join("street.txt")));
        assert_eq!(config.corpus_path("city"), Some(PathBuf::from("/data/city.txt")));
        assert_eq!(config.corpus_path("lastName"), None);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/text2flat.json"));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_builder_round_trips_through_json() {
        let config = Config::new()
            .with_required(["firstName"])
            .with_optional(["email"])
            .with_field_binding("firstName", "given")
            .with_default("userProfile", "EPL_ADULT");

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""fieldBindings":{"firstName":"given"}"#));

        let parsed = Config::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_path_ends_with_config_file() {
        if let Some(path) = Config::default_path() {
            assert!(path.ends_with("text2flat/config.json"));
        }
    }
}
