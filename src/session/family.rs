//! Groups tests into families and buckets their outcomes.
//!
//! A family is every parameterized variant of one declared test. It carries
//! a single weight, registered by the first discovery of the family, and is
//! graded as a whole. Outcomes for families that were never discovered are
//! still reported but carry no weight.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::identity::TestIdentity;
use super::suggestion::Suggestions;
use crate::outcome::Outcome;

/// Weight of a family whose tests declare none.
pub const DEFAULT_WEIGHT: u32 = 1;

/// A discovered variant, as listed in the pre-run report.
#[derive(Debug, Clone, Serialize)]
pub struct CollectedTest {
    pub test: TestIdentity,
    pub description: String,
}

/// A completed variant with its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct GradedTest {
    pub test: TestIdentity,
    pub description: String,
    pub outcome: Outcome,
    pub suggestions: Suggestions,
}

/// Everything recorded for one family.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyBucket {
    pub family: String,
    /// Weight declared at discovery; 0 while the family is unlisted.
    pub weight: u32,
    /// True once any variant of the family was discovered.
    pub listed: bool,
    pub collected: Vec<CollectedTest>,
    pub passed: Vec<GradedTest>,
    pub failed: Vec<GradedTest>,
}

impl FamilyBucket {
    fn unlisted(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            weight: 0,
            listed: false,
            collected: Vec::new(),
            passed: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Returns true if any variant failed, which zeroes the family's credit.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Returns true if every discovered variant has a passing entry.
    fn every_collected_passed(&self) -> bool {
        self.collected.iter().all(|collected| {
            self.passed
                .iter()
                .any(|passed| passed.test.node_id == collected.test.node_id)
        })
    }
}

/// Family registry of one grading session, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FamilyAggregator {
    families: Vec<FamilyBucket>,
    index: HashMap<String, usize>,
}

impl FamilyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a discovered test and, on first sight of its family, the
    /// family's weight.
    pub fn record_discovery(&mut self, test: TestIdentity, weight: Option<u32>) {
        let weight = weight.unwrap_or(DEFAULT_WEIGHT);
        let bucket = self.bucket_mut(test.family());
        if !bucket.listed {
            bucket.listed = true;
            bucket.weight = weight;
        } else if bucket.weight != weight {
            debug!(
                family = %bucket.family,
                stored = bucket.weight,
                declared = weight,
                "Family weight already registered; keeping the first"
            );
        }
        let description = test.resolve_description();
        bucket.collected.push(CollectedTest { test, description });
    }

    /// Buckets the final outcome of a completed test.
    pub fn record_outcome(&mut self, test: TestIdentity, outcome: Outcome, suggestions: Suggestions) {
        if !self.index.contains_key(test.family()) {
            warn!(
                family = test.family(),
                node_id = %test.node_id,
                "Outcome for undiscovered family; reporting it without weight"
            );
        }
        let bucket = self.bucket_mut(test.family());
        let description = test.resolve_description();
        let entry = GradedTest {
            test,
            description,
            outcome,
            suggestions,
        };
        if entry.outcome.is_passed() {
            bucket.passed.push(entry);
        } else {
            bucket.failed.push(entry);
        }
    }

    fn bucket_mut(&mut self, family: &str) -> &mut FamilyBucket {
        let position = match self.index.get(family) {
            Some(&position) => position,
            None => {
                self.families.push(FamilyBucket::unlisted(family));
                let position = self.families.len() - 1;
                self.index.insert(family.to_string(), position);
                position
            }
        };
        &mut self.families[position]
    }

    /// All families in first-seen order.
    pub fn families(&self) -> &[FamilyBucket] {
        &self.families
    }

    pub fn family(&self, family: &str) -> Option<&FamilyBucket> {
        self.index.get(family).map(|&position| &self.families[position])
    }

    pub fn weight(&self, family: &str) -> Option<u32> {
        self.family(family).map(|bucket| bucket.weight)
    }

    /// Passed tests, family by family.
    pub fn passed(&self) -> impl Iterator<Item = &GradedTest> {
        self.families.iter().flat_map(|bucket| bucket.passed.iter())
    }

    /// Failed tests, family by family.
    pub fn failed(&self) -> impl Iterator<Item = &GradedTest> {
        self.families.iter().flat_map(|bucket| bucket.failed.iter())
    }

    pub fn collected_count(&self) -> usize {
        self.families.iter().map(|bucket| bucket.collected.len()).sum()
    }

    pub fn passed_count(&self) -> usize {
        self.families.iter().map(|bucket| bucket.passed.len()).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.families.iter().map(|bucket| bucket.failed.len()).sum()
    }

    /// Number of families with at least one failing variant.
    pub fn failing_family_count(&self) -> usize {
        self.families.iter().filter(|bucket| bucket.has_failures()).count()
    }

    /// Returns true if nothing failed and every discovered test has a
    /// passing entry of its own.
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
            && self
                .families
                .iter()
                .all(FamilyBucket::every_collected_passed)
    }
}
