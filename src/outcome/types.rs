//! Normalized outcome of one executed (or uncollectable) test.

use serde::{Deserialize, Serialize};

use super::chain::Cause;

/// Why a test ended up in the failing bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A checked condition did not hold.
    Assertion,
    /// An unexpected error propagated out of the test body.
    Raised,
    /// Setup or teardown failed; the body never meaningfully ran.
    Fixture,
}

/// A failed test, reduced to what the learner can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// Root cause location, when the runner captured a traceback.
    pub cause: Option<Cause>,
    /// Assertion and diff lines, already prefixed with `> `.
    pub detail: Vec<String>,
}

/// Classification of one test. Created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed(Failure),
    Skipped { reason: String },
    CollectionError { cause: Option<Cause> },
}

impl Outcome {
    /// Returns true if the test counts towards its family's credit.
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// Returns true if the report should show the skip notice instead of
    /// assertion details: a skipped call phase or a fixture failure.
    pub fn shows_skip_notice(&self) -> bool {
        match self {
            Outcome::Skipped { .. } => true,
            Outcome::Failed(failure) => failure.kind == FailureKind::Fixture,
            _ => false,
        }
    }

    /// Assertion and diff lines to echo for this outcome.
    pub fn detail_lines(&self) -> &[String] {
        match self {
            Outcome::Failed(failure) => &failure.detail,
            _ => &[],
        }
    }

    /// Root cause location, if any.
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Outcome::Failed(failure) => failure.cause.as_ref(),
            Outcome::CollectionError { cause } => cause.as_ref(),
            _ => None,
        }
    }
}
