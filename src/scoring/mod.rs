// Score calculation
// Provides the all-or-nothing family grade and optional grade formatters

pub mod formatter;
pub mod grade;

pub use formatter::{render_grade, GradeFormatter, PercentageGrade, ScaledGrade};
pub use grade::{compute_grade, SessionGrade};
