// Grade calculation for a grading session
// Reduces family pass/fail state to a single all-or-nothing-per-family grade

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::FamilyAggregator;

/// Grade of a session before any formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionGrade {
    /// Sum of the weights of families without failures.
    pub earned: u64,
    /// Sum of all family weights.
    pub possible: u64,
}

impl SessionGrade {
    /// Fraction of the possible points earned (0.0 when nothing is possible).
    pub fn ratio(&self) -> f64 {
        if self.possible == 0 {
            0.0
        } else {
            self.earned as f64 / self.possible as f64
        }
    }
}

impl fmt::Display for SessionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.earned)
    }
}

/// Computes the grade of the recorded families.
///
/// Every discovered family is first credited in full; each family with at
/// least one failing variant then loses its whole weight. There is no partial
/// credit per variant, and families that were never discovered carry none.
///
/// Weights are summed as `u64`, so any number of `u32` weights fits.
pub fn compute_grade(families: &FamilyAggregator) -> SessionGrade {
    let listed = || families.families().iter().filter(|bucket| bucket.listed);
    let possible: u64 = listed().map(|bucket| u64::from(bucket.weight)).sum();
    let lost: u64 = listed()
        .filter(|bucket| bucket.has_failures())
        .map(|bucket| u64::from(bucket.weight))
        .sum();
    SessionGrade {
        earned: possible - lost,
        possible,
    }
}
