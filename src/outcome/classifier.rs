//! Converts raw per-phase results from the runner into [`Outcome`]s.
//!
//! Only the call phase decides whether a test passed. A failing setup or
//! teardown phase is classified as a fixture failure: the learner gets a
//! fixed reassurance message instead of fixture internals.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::chain::{detail_lines, Cause, ErrorKind, RaisedError};
use super::types::{Failure, FailureKind, Outcome};

/// Execution phase of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Call => write!(f, "call"),
            Phase::Teardown => write!(f, "teardown"),
        }
    }
}

/// Raw result of one phase, as delivered by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseReport {
    Passed,
    Skipped {
        #[serde(default)]
        reason: String,
    },
    Failed {
        error: RaisedError,
    },
}

impl PhaseReport {
    /// Returns true if the phase did not pass or skip.
    pub fn is_failed(&self) -> bool {
        matches!(self, PhaseReport::Failed { .. })
    }
}

/// Classifies the result of one phase.
pub fn classify(phase: Phase, report: PhaseReport) -> Outcome {
    match report {
        PhaseReport::Passed => Outcome::Passed,
        PhaseReport::Skipped { reason } => Outcome::Skipped { reason },
        PhaseReport::Failed { error } if phase != Phase::Call => Outcome::Failed(Failure {
            kind: FailureKind::Fixture,
            cause: Cause::from_error(&error),
            detail: Vec::new(),
        }),
        PhaseReport::Failed { error } => {
            let kind = match error.kind {
                ErrorKind::Assertion => FailureKind::Assertion,
                ErrorKind::Raised => FailureKind::Raised,
            };
            Outcome::Failed(Failure {
                kind,
                cause: Cause::from_error(&error),
                detail: detail_lines(&error),
            })
        }
    }
}

/// Classifies a discovery-time failure.
pub fn classify_collection(error: Option<&RaisedError>) -> Outcome {
    Outcome::CollectionError {
        cause: error.and_then(Cause::from_error),
    }
}
