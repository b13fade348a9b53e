//! End-to-end tests driving a [`Session`] the way a test runner would.
//!
//! `FakeRunner` discovers tests, runs each body with a fresh suggestion
//! channel and forwards every phase result to the session.

use std::io::Write;

use vpl_grader::events::{replay, EventLog, SessionEvent};
use vpl_grader::outcome::{Phase, PhaseReport, RaisedError};
use vpl_grader::report::{WriterSink, CLOSE_MARKER, GRADE_TAG, OPEN_MARKER};
use vpl_grader::scoring::ScaledGrade;
use vpl_grader::session::{
    CollectedNode, CollectionFailure, GraderConfig, Session, SuggestionChannel, TestIdentity,
};

type Body = Box<dyn Fn(&mut SuggestionChannel) -> PhaseReport>;

struct FakeTest {
    identity: TestIdentity,
    weight: Option<u32>,
    setup: PhaseReport,
    body: Body,
}

#[derive(Default)]
struct FakeRunner {
    tests: Vec<FakeTest>,
    collection_failures: Vec<CollectionFailure>,
    config: GraderConfig,
}

impl FakeRunner {
    fn new() -> Self {
        Self::default()
    }

    fn config(mut self, config: GraderConfig) -> Self {
        self.config = config;
        self
    }

    fn test<F>(mut self, identity: TestIdentity, weight: Option<u32>, body: F) -> Self
    where
        F: Fn(&mut SuggestionChannel) -> PhaseReport + 'static,
    {
        self.tests.push(FakeTest {
            identity,
            weight,
            setup: PhaseReport::Passed,
            body: Box::new(body),
        });
        self
    }

    fn broken_setup(mut self, identity: TestIdentity, error: RaisedError) -> Self {
        self.tests.push(FakeTest {
            identity,
            weight: None,
            setup: PhaseReport::Failed { error },
            body: Box::new(|_| PhaseReport::Passed),
        });
        self
    }

    fn collection_failure(mut self, failure: CollectionFailure) -> Self {
        self.collection_failures.push(failure);
        self
    }

    /// Runs everything and returns (pre-run report, post-run report, session).
    fn run(self) -> (Vec<String>, Vec<String>, Session) {
        let mut session = Session::new(self.config);

        session.on_node_discovered(
            CollectedNode::Container {
                name: "test_module.py".to_string(),
            },
            None,
        );
        for test in &self.tests {
            session.on_node_discovered(CollectedNode::Test(test.identity.clone()), test.weight);
        }
        for failure in self.collection_failures {
            session.on_collection_failed(failure);
        }
        let listing = session.on_collection_finish();

        for test in &self.tests {
            let identity = test.identity.clone();
            session.on_test_completed(
                identity.clone(),
                Phase::Setup,
                test.setup.clone(),
                Default::default(),
            );
            if !test.setup.is_failed() {
                let mut channel = session.start_test(&identity);
                let report = (test.body)(&mut channel);
                session.on_test_completed(identity.clone(), Phase::Call, report, channel.finish());
            }
            session.on_test_completed(identity, Phase::Teardown, PhaseReport::Passed, Default::default());
        }

        let summary = session.on_session_end(None);
        (listing, summary, session)
    }
}

fn pass(_: &mut SuggestionChannel) -> PhaseReport {
    PhaseReport::Passed
}

fn assertion_failure(_: &mut SuggestionChannel) -> PhaseReport {
    PhaseReport::Failed {
        error: RaisedError::assertion("assert 3 == 4")
            .with_frame("/home/learner/tests/test_sum.py", 12)
            .with_repr_lines([
                "    def test_sum():",
                ">       assert add(1, 2) == 4",
                "E       assert 3 == 4",
            ]),
    }
}

fn sum_variant(a: i64, b: i64) -> TestIdentity {
    TestIdentity::new(format!("test_sum.py::test_sum[{}-{}]", a, b), "test_sum")
        .with_description("sums {a} and {b}")
        .with_parameter("a", a)
        .with_parameter("b", b)
}

fn grade_lines(lines: &[String]) -> Vec<&String> {
    lines.iter().filter(|l| l.starts_with(GRADE_TAG)).collect()
}

#[test]
fn test_all_passing_grade_is_sum_of_weights() {
    let (_, summary, session) = FakeRunner::new()
        .test(TestIdentity::new("t.py::test_a", "test_a"), Some(2), pass)
        .test(TestIdentity::new("t.py::test_b", "test_b"), Some(3), pass)
        .test(TestIdentity::new("t.py::test_c", "test_c"), None, pass)
        .run();

    assert_eq!(session.grade().earned, 6);
    assert_eq!(session.grade().possible, 6);
    assert!(summary.contains(&"✨ Congratulations! All tests have passed! ✨".to_string()));
    assert!(!summary.contains(&"⚠️ Failing tests ❌".to_string()));
    assert_eq!(grade_lines(&summary).len(), 1);
    assert_eq!(summary.last().map(String::as_str), Some("Grade :=>> 6"));
}

#[test]
fn test_one_failing_variant_zeroes_family() {
    let (listing, summary, session) = FakeRunner::new()
        .test(sum_variant(1, 2), Some(3), pass)
        .test(sum_variant(2, 2), Some(3), assertion_failure)
        .test(sum_variant(0, 0), Some(3), pass)
        .run();

    assert!(listing.contains(&"📝 3 test configurations worth 3 point(s)".to_string()));
    assert!(listing.contains(&"⠀⠀↪️ sums 2 and 2".to_string()));

    assert_eq!(session.grade().earned, 0);
    assert!(summary.contains(&"✅ sums 1 and 2".to_string()));
    assert!(summary.contains(&"❌ sums 2 and 2".to_string()));
    assert!(summary.contains(&"> >       assert add(1, 2) == 4".to_string()));
    assert!(summary.contains(&"> E       assert 3 == 4".to_string()));
    assert!(!summary.iter().any(|l| l.contains("def test_sum")));
    assert_eq!(summary.last().map(String::as_str), Some("Grade :=>> 0"));
}

#[test]
fn test_mixed_families_grade() {
    let (_, summary, session) = FakeRunner::new()
        .test(
            TestIdentity::new("t.py::test_a[1]", "test_a").with_parameter("n", 1),
            Some(2),
            pass,
        )
        .test(
            TestIdentity::new("t.py::test_a[2]", "test_a").with_parameter("n", 2),
            Some(2),
            pass,
        )
        .test(TestIdentity::new("t.py::test_b", "test_b"), Some(1), assertion_failure)
        .run();

    assert_eq!(session.grade().earned, 2);
    assert_eq!(session.grade().possible, 3);
    assert!(summary.contains(&"🌟 Passing tests  🎯".to_string()));
    assert!(summary.contains(
        &"💪 Keep going! 1 test(s) still need work, but you're making progress!".to_string()
    ));
    assert_eq!(summary.last().map(String::as_str), Some("Grade :=>> 2"));
}

#[test]
fn test_first_weight_wins_for_family() {
    let (listing, _, session) = FakeRunner::new()
        .test(sum_variant(1, 1), Some(2), pass)
        .test(sum_variant(2, 2), Some(5), pass)
        .run();

    assert_eq!(session.families().weight("test_sum"), Some(2));
    assert!(listing.contains(&"📝 2 test configurations worth 2 point(s)".to_string()));
    assert_eq!(session.grade().earned, 2);
}

#[test]
fn test_empty_session() {
    let (listing, summary, session) = FakeRunner::new().run();

    assert_eq!(listing.first().map(String::as_str), Some(OPEN_MARKER));
    assert_eq!(listing.last().map(String::as_str), Some(CLOSE_MARKER));
    assert_eq!(summary, vec!["Grade :=>> 0".to_string()]);
    assert_eq!(session.summary().tests_collected, 0);
}

#[test]
fn test_collection_failure_replaces_listing() {
    let error = RaisedError::raised("NameError: name 'ad' is not defined")
        .caused_by(
            RaisedError::raised("SyntaxError: invalid syntax").with_frame("/work/solution.py", 4),
        );
    let (listing, _, session) = FakeRunner::new()
        .test(TestIdentity::new("t.py::test_a", "test_a"), None, pass)
        .collection_failure(CollectionFailure::from_error("test_solution.py", error))
        .collection_failure(CollectionFailure::from_payload("test_other.py", "ImportError\nno module"))
        .run();

    assert!(listing.contains(&"⚠️ Code Compilation Issues".to_string()));
    assert!(listing.contains(&"⚠️ solution.py:4".to_string()));
    assert!(listing.contains(&"> SyntaxError: invalid syntax".to_string()));
    assert!(listing.contains(&"⚠️ Unknown error, see traceback".to_string()));
    assert!(listing.contains(&"> no module".to_string()));
    assert!(!listing.iter().any(|l| l.starts_with("📝")));
    assert_eq!(session.collection_failures().len(), 2);
    assert_eq!(session.grade().possible, 1);
}

#[test]
fn test_suggestions_keep_order_and_stay_per_test() {
    let (_, summary, _) = FakeRunner::new()
        .test(
            TestIdentity::new("t.py::test_style", "test_style").with_description("checks style"),
            None,
            |channel| {
                channel.suggest(true, "use a list comprehension");
                channel.suggest(false, "never shown");
                channel.suggest(true, "name your variables");
                PhaseReport::Passed
            },
        )
        .test(TestIdentity::new("t.py::test_plain", "test_plain"), None, assertion_failure)
        .run();

    let first = summary
        .iter()
        .position(|l| l == "⠀💡use a list comprehension")
        .expect("first suggestion");
    let second = summary
        .iter()
        .position(|l| l == "⠀💡name your variables")
        .expect("second suggestion");
    assert!(first < second);
    assert!(!summary.iter().any(|l| l.contains("never shown")));

    let plain = summary.iter().position(|l| l == "❌ test_plain").expect("failing test");
    assert!(!summary[plain + 1].starts_with("⠀💡"));
}

#[test]
fn test_broken_setup_shows_skip_notice() {
    let error = RaisedError::raised("fixture 'db' failed").with_frame("conftest.py", 3);
    let (_, summary, session) = FakeRunner::new()
        .test(TestIdentity::new("t.py::test_ok", "test_ok"), Some(1), pass)
        .broken_setup(TestIdentity::new("t.py::test_db", "test_db"), error)
        .run();

    assert!(summary.contains(&"❌ test_db".to_string()));
    assert!(summary.contains(&"💡 Oops! Test skipping isn't part of the journey! ".to_string()));
    assert!(!summary.iter().any(|l| l.contains("fixture 'db' failed")));
    assert_eq!(session.grade().earned, 1);
    assert_eq!(session.grade().possible, 2);
}

#[test]
fn test_hide_assert_suppresses_details() {
    let (_, summary, _) = FakeRunner::new()
        .config(GraderConfig::new().with_hide_assert(true))
        .test(TestIdentity::new("t.py::test_sum", "test_sum"), None, assertion_failure)
        .run();

    assert!(summary.contains(&"❌ test_sum".to_string()));
    assert!(!summary.iter().any(|l| l.starts_with("> ")));
}

#[test]
fn test_reports_are_idempotent() {
    let (_, summary, session) = FakeRunner::new()
        .test(sum_variant(1, 2), Some(2), pass)
        .test(TestIdentity::new("t.py::test_b", "test_b"), None, assertion_failure)
        .run();

    assert_eq!(session.summary_report(None), summary);
    assert_eq!(session.summary_report(None), session.summary_report(None));
    assert_eq!(session.collection_report(), session.collection_report());
}

#[test]
fn test_scaled_grade_line() {
    let (_, _, session) = FakeRunner::new()
        .test(TestIdentity::new("t.py::test_a", "test_a"), Some(1), pass)
        .test(TestIdentity::new("t.py::test_b", "test_b"), Some(3), assertion_failure)
        .run();

    let report = session.summary_report(Some(&ScaledGrade::new(10.0)));
    assert_eq!(report.last().map(String::as_str), Some("Grade :=>> 2.50"));
}

#[test]
fn test_replay_event_log_file() {
    let test = TestIdentity::new("t.py::test_a", "test_a").with_description("adds numbers");
    let events = EventLog {
        events: vec![
            SessionEvent::Discovered {
                node: CollectedNode::Test(test.clone()),
                weight: Some(4),
            },
            SessionEvent::CollectionFinished,
            SessionEvent::Completed {
                test,
                phase: Phase::Call,
                report: PhaseReport::Passed,
                suggestions: vec!["try sum()".to_string()],
            },
            SessionEvent::SessionFinished,
        ],
    };

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(events.to_json_lines().expect("serializable").as_bytes())
        .expect("write log");

    let log = EventLog::from_path(file.path()).expect("valid log");
    let mut session = Session::new(GraderConfig::default());
    let mut sink = WriterSink::new(Vec::new());
    let grade = replay(&mut session, log, &mut sink, None).expect("in-memory sink");
    let output = String::from_utf8(sink.into_inner().expect("flush")).expect("utf-8 report");

    assert_eq!(grade.earned, 4);
    assert!(output.contains("📝 adds numbers worth 4 point(s)\n"));
    assert!(output.contains("⠀💡try sum()\n"));
    assert!(output.ends_with("Grade :=>> 4\n"));
}
