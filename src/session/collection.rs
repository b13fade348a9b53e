//! Tracks tests and modules that could not even be collected.
//!
//! Collection failures never enter a family bucket and never affect the
//! grade; their presence replaces the pre-run test listing entirely.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::outcome::{classify_collection, Outcome, RaisedError};

/// Raw discovery failure, as delivered by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionFailure {
    /// Module or node that failed to load.
    #[serde(default)]
    pub node_id: String,
    /// Captured error chain, when the runner has one.
    #[serde(default)]
    pub error: Option<RaisedError>,
    /// Raw stringified failure, used when no error chain is usable.
    #[serde(default)]
    pub payload: String,
}

impl CollectionFailure {
    /// Creates a failure carrying an error chain.
    pub fn from_error(node_id: impl Into<String>, error: RaisedError) -> Self {
        Self {
            node_id: node_id.into(),
            error: Some(error),
            payload: String::new(),
        }
    }

    /// Creates a failure carrying only a raw payload.
    pub fn from_payload(node_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            error: None,
            payload: payload.into(),
        }
    }
}

/// File and line a collection failure points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Normalized collection failure, as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFailureRecord {
    pub node_id: String,
    pub location: Option<SourceLocation>,
    pub message: String,
}

impl CollectionFailureRecord {
    /// Normalizes a raw failure: the root cause location when a traceback is
    /// available, the raw payload otherwise.
    pub fn from_failure(failure: CollectionFailure) -> Self {
        if let Outcome::CollectionError { cause: Some(cause) } =
            classify_collection(failure.error.as_ref())
        {
            return Self {
                node_id: failure.node_id,
                location: Some(SourceLocation {
                    file: cause.file,
                    line: cause.line,
                }),
                message: cause.message,
            };
        }

        let message = match (failure.payload.is_empty(), &failure.error) {
            (true, Some(error)) => error.root_cause().message.clone(),
            _ => failure.payload,
        };
        Self {
            node_id: failure.node_id,
            location: None,
            message,
        }
    }

    /// Message split into report lines.
    pub fn message_lines(&self) -> std::str::Lines<'_> {
        self.message.lines()
    }
}

/// Collection failures of one grading session.
#[derive(Debug, Clone, Default)]
pub struct CollectionFailureTracker {
    records: Vec<CollectionFailureRecord>,
}

impl CollectionFailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, failure: CollectionFailure) {
        let record = CollectionFailureRecord::from_failure(failure);
        match &record.location {
            Some(location) => warn!(node_id = %record.node_id, %location, "Collection failed"),
            None => warn!(node_id = %record.node_id, "Collection failed without a location"),
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[CollectionFailureRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
