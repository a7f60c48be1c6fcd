//! Text2Flat Library
//!
//! A Rust library for converting unlabeled, delimiter-separated customer records
//! into SirsiDynix Symphony flat user records ready for bulk loading.
//!
//! This library provides tools for:
//! - Identifying which column of an unlabeled row holds which customer field
//! - Classifying ambiguous date strings as birth or expiry dates
//! - Recognising free-text fields (names, streets, towns) from reference corpora
//! - Rebinding field labels without disturbing detection or serialization
//! - Writing flat records with defaults, field merges and bracketed blocks
//! - Reporting every detection and serialization problem without aborting a run

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod column_detector;
        pub mod converter;
        pub mod corpus_store;
        pub mod date_classifier;
        pub mod field_registry;
        pub mod flat_writer;
        pub mod record_extractor;
        pub mod tag_bindings;
        pub mod text_reader;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CustomerRecord, DateRole, DetectionStrategy, Field, FieldSpec, RawRecord};
pub use app::services::converter::FlatConverter;
pub use config::Config;

/// Result type alias for text2flat
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for configuration, detection and serialization
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document could not be decoded
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error, always raised before any record is read
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Corpus word-list missing, unreadable or empty
    #[error("Corpus error for '{name}': {message}")]
    Corpus { name: String, message: String },

    /// Detection pattern failed to compile
    #[error("Invalid pattern for field '{field}': {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Date string matched no accepted ordering or is not a calendar date
    #[error("Invalid date: '{value}'")]
    InvalidDate { value: String },

    /// Record field has no output tag in the active bindings or schema
    #[error("No output tag for field '{label}'")]
    UnresolvedTag { label: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON decoding error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a corpus error
    pub fn corpus(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corpus {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a pattern compilation error
    pub fn pattern(field: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            field: field.into(),
            source,
        }
    }

    /// Create an invalid date error
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Create an unresolved tag error
    pub fn unresolved_tag(label: impl Into<String>) -> Self {
        Self::UnresolvedTag {
            label: label.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: "Failed to decode configuration".to_string(),
            source: error,
        }
    }
}
