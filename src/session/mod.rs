//! Grading session driven by runner events.
//!
//! A [`Session`] owns every piece of state of one grading run: family
//! weights and buckets, collection failures and fixture failures still
//! waiting for their test to finish. It is constructed fresh per run and
//! reacts to events delivered serially by the external runner:
//!
//! ```text
//! on_node_discovered* / on_collection_failed*
//!   → on_collection_finish            (pre-run report)
//!   → (start_test → on_test_completed{setup, call, teardown})*
//!   → on_session_end                  (post-run report + grade)
//! ```
//!
//! # Example
//!
//! ```
//! use vpl_grader::outcome::{Phase, PhaseReport};
//! use vpl_grader::session::{CollectedNode, GraderConfig, Session, TestIdentity};
//!
//! let mut session = Session::new(GraderConfig::default());
//! let test = TestIdentity::new("test_hello.py::test_greet", "test_greet");
//! session.on_node_discovered(CollectedNode::Test(test.clone()), Some(2));
//! let _listing = session.on_collection_finish();
//!
//! let mut channel = session.start_test(&test);
//! channel.suggest(true, "Greet by name");
//! session.on_test_completed(test, Phase::Call, PhaseReport::Passed, channel.finish());
//!
//! let report = session.on_session_end(None);
//! assert_eq!(report.last().map(String::as_str), Some("Grade :=>> 2"));
//! ```

pub mod collection;
pub mod config;
pub mod family;
pub mod identity;
pub mod suggestion;

pub use collection::{
    CollectionFailure, CollectionFailureRecord, CollectionFailureTracker, SourceLocation,
};
pub use config::GraderConfig;
pub use family::{CollectedTest, FamilyAggregator, FamilyBucket, GradedTest, DEFAULT_WEIGHT};
pub use identity::{expand_template, CollectedNode, TestIdentity};
pub use suggestion::{SuggestionChannel, Suggestions};

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::outcome::{classify, Outcome, Phase, PhaseReport};
use crate::report::ReportSynthesizer;
use crate::scoring::{compute_grade, GradeFormatter, SessionGrade};

/// Counts describing a session, logged when it ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub families: usize,
    pub tests_collected: usize,
    pub tests_passed: usize,
    pub tests_failed: usize,
    pub collection_failures: usize,
    pub interrupted: bool,
    pub grade: SessionGrade,
}

/// State of one grading run.
#[derive(Debug, Default)]
pub struct Session {
    config: GraderConfig,
    families: FamilyAggregator,
    collection: CollectionFailureTracker,
    /// Tests whose call phase has been recorded.
    called: HashSet<String>,
    /// Setup failures awaiting teardown, in arrival order.
    pending_fixture: Vec<(TestIdentity, Outcome)>,
    interrupted: bool,
}

impl Session {
    /// Creates an empty session.
    pub fn new(config: GraderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    pub fn families(&self) -> &FamilyAggregator {
        &self.families
    }

    pub fn collection_failures(&self) -> &CollectionFailureTracker {
        &self.collection
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Records a discovered node. Containers are structural only and are
    /// dropped before any weight is assigned.
    pub fn on_node_discovered(&mut self, node: CollectedNode, weight: Option<u32>) {
        match node {
            CollectedNode::Test(test) => {
                debug!(node_id = %test.node_id, family = test.family(), ?weight, "Discovered test");
                self.families.record_discovery(test, weight);
            }
            CollectedNode::Container { name } => {
                trace!(container = %name, "Skipping container node");
            }
        }
    }

    /// Records a node that could not be collected.
    pub fn on_collection_failed(&mut self, failure: CollectionFailure) {
        self.collection.record(failure);
    }

    /// Renders the pre-run report.
    pub fn on_collection_finish(&self) -> Vec<String> {
        info!(
            families = self.families.families().len(),
            tests = self.families.collected_count(),
            collection_failures = self.collection.len(),
            "Collection finished"
        );
        self.synthesizer().collection_report()
    }

    /// Opens a fresh suggestion channel for a test about to run.
    pub fn start_test(&self, test: &TestIdentity) -> SuggestionChannel {
        trace!(node_id = %test.node_id, "Starting test");
        SuggestionChannel::new(test.node_id.clone())
    }

    /// Records the result of one phase of a test.
    ///
    /// The call phase decides the outcome. A failing or skipped setup is
    /// held until teardown and only recorded if the call phase never ran.
    /// Suggestions are only kept for the call phase.
    pub fn on_test_completed(
        &mut self,
        test: TestIdentity,
        phase: Phase,
        report: PhaseReport,
        suggestions: Suggestions,
    ) {
        let outcome = classify(phase, report);

        if phase == Phase::Call {
            self.pending_fixture.retain(|(pending, _)| pending.node_id != test.node_id);
            if !self.called.insert(test.node_id.clone()) {
                warn!(node_id = %test.node_id, "Ignoring repeated call phase");
                return;
            }
            debug!(node_id = %test.node_id, passed = outcome.is_passed(), "Test completed");
            self.families.record_outcome(test, outcome, suggestions);
            return;
        }

        if !suggestions.is_empty() {
            debug!(node_id = %test.node_id, %phase, "Dropping suggestions outside the call phase");
        }

        if self.called.contains(&test.node_id) {
            if !outcome.is_passed() {
                debug!(node_id = %test.node_id, %phase, "Call outcome stands despite fixture failure");
            }
            return;
        }

        let already_pending = self
            .pending_fixture
            .iter()
            .any(|(pending, _)| pending.node_id == test.node_id);
        if !outcome.is_passed() && !already_pending {
            self.pending_fixture.push((test.clone(), outcome));
        }

        if phase == Phase::Teardown {
            self.settle_fixture(&test.node_id);
        }
    }

    /// Marks the run as interrupted. Nothing is reported; the session-end
    /// report uses whatever was recorded so far.
    pub fn on_interrupt(&mut self) {
        info!("Run interrupted; reporting partial results");
        self.interrupted = true;
    }

    /// Renders the post-run report, ending with the grade line.
    pub fn on_session_end(&mut self, formatter: Option<&dyn GradeFormatter>) -> Vec<String> {
        let pending: Vec<String> = self
            .pending_fixture
            .iter()
            .map(|(test, _)| test.node_id.clone())
            .collect();
        for node_id in pending {
            self.settle_fixture(&node_id);
        }

        let summary = self.summary();
        info!(
            earned = summary.grade.earned,
            possible = summary.grade.possible,
            passed = summary.tests_passed,
            failed = summary.tests_failed,
            interrupted = summary.interrupted,
            "Session finished"
        );
        self.summary_report(formatter)
    }

    /// Pre-run report for the current state.
    pub fn collection_report(&self) -> Vec<String> {
        self.synthesizer().collection_report()
    }

    /// Post-run report for the current state.
    pub fn summary_report(&self, formatter: Option<&dyn GradeFormatter>) -> Vec<String> {
        self.synthesizer().summary_report(formatter)
    }

    /// Grade of the recorded families.
    pub fn grade(&self) -> SessionGrade {
        compute_grade(&self.families)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            families: self.families.families().len(),
            tests_collected: self.families.collected_count(),
            tests_passed: self.families.passed_count(),
            tests_failed: self.families.failed_count(),
            collection_failures: self.collection.len(),
            interrupted: self.interrupted,
            grade: self.grade(),
        }
    }

    fn synthesizer(&self) -> ReportSynthesizer<'_> {
        ReportSynthesizer::new(&self.families, &self.collection, self.config.hide_assert)
    }

    fn settle_fixture(&mut self, node_id: &str) {
        let Some(position) = self
            .pending_fixture
            .iter()
            .position(|(pending, _)| pending.node_id == node_id)
        else {
            return;
        };
        let (test, outcome) = self.pending_fixture.remove(position);
        debug!(node_id = %test.node_id, "Recording fixture failure without call phase");
        self.called.insert(test.node_id.clone());
        self.families.record_outcome(test, outcome, Suggestions::new());
    }
}
