//! Renders the learner-facing report as a sequence of text lines.
//!
//! Every structured block is wrapped in [`OPEN_MARKER`] / [`CLOSE_MARKER`]
//! lines so an outer grading harness can slice it out of free text. The
//! post-run report always ends with exactly one [`GRADE_TAG`] line.
//!
//! Rendering only reads the session state: rendering the same state twice
//! yields identical lines.

use crate::scoring::{compute_grade, render_grade, GradeFormatter};
use crate::session::{CollectionFailureTracker, FamilyAggregator, GradedTest};

/// Opens a structured block.
pub const OPEN_MARKER: &str = "<|--";
/// Closes a structured block.
pub const CLOSE_MARKER: &str = "--|>";
/// Prefix of the machine-readable grade line.
pub const GRADE_TAG: &str = "Grade :=>>";

const SUGGESTION_PREFIX: &str = "⠀💡";
const VARIANT_PREFIX: &str = "⠀⠀↪️ ";

/// Builds report lines from a session's recorded state.
pub struct ReportSynthesizer<'a> {
    families: &'a FamilyAggregator,
    collection: &'a CollectionFailureTracker,
    hide_assert: bool,
}

impl<'a> ReportSynthesizer<'a> {
    pub fn new(
        families: &'a FamilyAggregator,
        collection: &'a CollectionFailureTracker,
        hide_assert: bool,
    ) -> Self {
        Self {
            families,
            collection,
            hide_assert,
        }
    }

    /// Report emitted once discovery is over, before any test runs.
    ///
    /// Collection failures replace the test listing entirely.
    pub fn collection_report(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.collection.is_empty() {
            self.push_test_listing(&mut lines);
        } else {
            self.push_collection_failures(&mut lines);
        }
        lines
    }

    /// Report emitted once every test has completed (or the run stopped).
    pub fn summary_report(&self, formatter: Option<&dyn GradeFormatter>) -> Vec<String> {
        let mut lines = Vec::new();

        if self.families.passed_count() > 0 {
            self.push_passing_block(&mut lines);
        }
        if self.families.failed_count() > 0 {
            self.push_failing_block(&mut lines);
        }

        let grade = compute_grade(self.families);
        lines.push(format!("{} {}", GRADE_TAG, render_grade(&grade, formatter)));
        lines
    }

    fn push_collection_failures(&self, lines: &mut Vec<String>) {
        lines.push(String::new());
        lines.push(OPEN_MARKER.to_string());
        lines.push("⚠️ Code Compilation Issues".to_string());
        lines.push(
            "💡 Almost there! Let's fix these compilation errors and get your code running:"
                .to_string(),
        );
        lines.push(String::new());

        for record in self.collection.records() {
            match &record.location {
                Some(location) => lines.push(format!("⚠️ {}", location)),
                None => lines.push("⚠️ Unknown error, see traceback".to_string()),
            }
            lines.extend(record.message_lines().map(|line| format!("> {}", line)));
        }

        lines.push(String::new());
        lines.push(CLOSE_MARKER.to_string());
    }

    fn push_test_listing(&self, lines: &mut Vec<String>) {
        lines.push(OPEN_MARKER.to_string());
        lines.push("🎯 Let's check your solution! Here are the tests we'll run: ✨".to_string());
        lines.push(String::new());

        for bucket in self.families.families() {
            match bucket.collected.as_slice() {
                [] => {}
                [single] => lines.push(format!(
                    "📝 {} worth {} point(s)",
                    single.description, bucket.weight
                )),
                variants => {
                    lines.push(format!(
                        "📝 {} test configurations worth {} point(s)",
                        variants.len(),
                        bucket.weight
                    ));
                    for variant in variants {
                        lines.push(format!("{}{}", VARIANT_PREFIX, variant.description));
                    }
                }
            }
        }

        lines.push(String::new());
        lines.push(CLOSE_MARKER.to_string());
    }

    fn push_passing_block(&self, lines: &mut Vec<String>) {
        lines.push(String::new());
        lines.push(OPEN_MARKER.to_string());

        if self.families.all_passed() {
            lines.push("✨ Congratulations! All tests have passed! ✨".to_string());
            lines.push(
                "🎉 Excellent work! You've successfully completed all the requirements!"
                    .to_string(),
            );
            if self.families.passed().any(|p| !p.suggestions.is_empty()) {
                lines.push(String::new());
                lines.push(
                    "Please take a look at these suggestions to improve your solution".to_string(),
                );
                for passed in self.families.passed().filter(|p| !p.suggestions.is_empty()) {
                    lines.push(format!("✅ {}", passed.description));
                    push_suggestions(lines, passed);
                }
            }
        } else {
            lines.push("🌟 Passing tests  🎯".to_string());
            lines.push(
                "These tests passed successfully! 💪 Keep going - you're making great progress 🚀"
                    .to_string(),
            );
            lines.push(String::new());
            for passed in self.families.passed() {
                lines.push(format!("✅ {}", passed.description));
                push_suggestions(lines, passed);
            }
        }

        lines.push(String::new());
        lines.push(CLOSE_MARKER.to_string());
    }

    fn push_failing_block(&self, lines: &mut Vec<String>) {
        lines.push(String::new());
        lines.push(OPEN_MARKER.to_string());
        lines.push("⚠️ Failing tests ❌".to_string());
        lines.push(format!(
            "💪 Keep going! {} test(s) still need work, but you're making progress!",
            self.families.failing_family_count()
        ));
        lines.push("💡 Check the details below for hints to improve your solution.".to_string());
        lines.push(String::new());

        for failed in self.families.failed() {
            lines.push(format!("❌ {}", failed.description));
            push_suggestions(lines, failed);

            if failed.outcome.shows_skip_notice() {
                lines.push("💡 Oops! Test skipping isn't part of the journey! ".to_string());
                lines.push("Let's tackle each test together - you've got this! 💪".to_string());
            } else if !self.hide_assert {
                lines.extend(failed.outcome.detail_lines().iter().cloned());
            }
            lines.push(String::new());
        }

        lines.push(CLOSE_MARKER.to_string());
    }
}

fn push_suggestions(lines: &mut Vec<String>, graded: &GradedTest) {
    for suggestion in &graded.suggestions {
        lines.push(format!("{}{}", SUGGESTION_PREFIX, suggestion));
    }
}
