//! Error types for vpl-grader operations.
//!
//! Grading failures (assertions, raised errors, fixture and collection
//! failures) are data, not errors: they travel as [`crate::outcome::Outcome`]
//! and [`crate::session::CollectionFailureRecord`] values. The types here
//! cover the plumbing around the grading core:
//! - Event log loading and decoding
//! - Grader configuration files
//! - Description templates

use thiserror::Error;

/// Errors that can occur while loading a runner event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("Failed to read event log '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed event on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that can occur while loading grader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid grade scale {0}: must be a positive, finite number")]
    InvalidScale(f64),

    #[error("Conflicting grade formats: {0}")]
    ConflictingFormats(String),
}

/// Errors that can occur while expanding a description template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Parameter '{0}' not found for description template")]
    UnknownParameter(String),

    #[error("Unbalanced '{brace}' at byte {offset} in description template")]
    UnbalancedBrace { brace: char, offset: usize },
}
