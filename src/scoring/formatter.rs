//! Optional transforms applied to the grade before it is surfaced.

use super::grade::SessionGrade;

/// Turns a session grade into the value printed after `Grade :=>>`.
pub trait GradeFormatter {
    fn format(&self, grade: &SessionGrade) -> String;
}

impl<F> GradeFormatter for F
where
    F: Fn(&SessionGrade) -> String,
{
    fn format(&self, grade: &SessionGrade) -> String {
        self(grade)
    }
}

/// Rescales the earned points onto `0..=max`, with two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledGrade {
    pub max: f64,
}

impl ScaledGrade {
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl GradeFormatter for ScaledGrade {
    fn format(&self, grade: &SessionGrade) -> String {
        format!("{:.2}", grade.ratio() * self.max)
    }
}

/// Earned points as a rounded percentage of the possible points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PercentageGrade;

impl GradeFormatter for PercentageGrade {
    fn format(&self, grade: &SessionGrade) -> String {
        format!("{}", (grade.ratio() * 100.0).round() as u32)
    }
}

/// Renders the grade, through the formatter when one is configured.
pub fn render_grade(grade: &SessionGrade, formatter: Option<&dyn GradeFormatter>) -> String {
    match formatter {
        Some(formatter) => formatter.format(grade),
        None => grade.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_formatter() {
        let grade = SessionGrade { earned: 7, possible: 9 };
        assert_eq!(render_grade(&grade, None), "7");
    }

    #[test]
    fn test_closure_formatter() {
        let grade = SessionGrade { earned: 3, possible: 4 };
        let formatter = |g: &SessionGrade| format!("{}/{}", g.earned, g.possible);
        assert_eq!(render_grade(&grade, Some(&formatter)), "3/4");
    }

    #[test]
    fn test_scaled_grade() {
        let grade = SessionGrade { earned: 3, possible: 4 };
        assert_eq!(ScaledGrade::new(10.0).format(&grade), "7.50");
        let empty = SessionGrade::default();
        assert_eq!(ScaledGrade::new(10.0).format(&empty), "0.00");
    }

    #[test]
    fn test_percentage_grade() {
        let grade = SessionGrade { earned: 2, possible: 3 };
        assert_eq!(PercentageGrade.format(&grade), "67");
    }
}
