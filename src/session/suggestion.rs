//! Per-test channel through which a running test records improvement hints.
//!
//! The runner obtains a fresh [`SuggestionChannel`] from
//! [`crate::session::Session::start_test`] for every test, hands it to the
//! test body, and freezes it with [`SuggestionChannel::finish`] when the call
//! phase completes. Suggestions never change a test's outcome.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mutable hint sink owned by exactly one test execution.
#[derive(Debug)]
pub struct SuggestionChannel {
    node_id: String,
    suggestions: Vec<String>,
}

impl SuggestionChannel {
    /// Creates an empty channel for the given test node.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            suggestions: Vec::new(),
        }
    }

    /// Records `message` if `condition` holds.
    pub fn suggest(&mut self, condition: bool, message: impl Into<String>) {
        if condition {
            self.suggestions.push(message.into());
        }
    }

    /// Probes an optional dependency, returning `None` instead of failing the
    /// test when it is unavailable.
    pub fn try_import<T, E, F>(&self, name: &str, probe: F) -> Option<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        match probe() {
            Ok(module) => Some(module),
            Err(e) => {
                debug!(node_id = %self.node_id, module = name, "Optional import failed: {}", e);
                None
            }
        }
    }

    /// Test node this channel belongs to.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Suggestions recorded so far.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Freezes the channel into the suggestions attached to the outcome.
    pub fn finish(self) -> Suggestions {
        Suggestions(self.suggestions)
    }
}

/// Frozen, ordered suggestions of one test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Suggestions(Vec<String>);

impl Suggestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Suggestions {
    fn from(suggestions: Vec<String>) -> Self {
        Self(suggestions)
    }
}

impl<'a> IntoIterator for &'a Suggestions {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
