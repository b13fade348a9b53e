//! Configuration passed in by the host of a grading session.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scoring::{GradeFormatter, PercentageGrade, ScaledGrade};

/// Configuration for rendering and grading a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    /// Suppress assertion and diff lines for failing tests.
    pub hide_assert: bool,
    /// Rescale the grade onto `0..=grade_scale`.
    pub grade_scale: Option<f64>,
    /// Report the grade as a percentage of the possible points.
    pub percentage: bool,
}

impl GraderConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parses and validates a YAML configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets whether assertion details are hidden.
    pub fn with_hide_assert(mut self, hide_assert: bool) -> Self {
        self.hide_assert = hide_assert;
        self
    }

    /// Sets the grade scale.
    pub fn with_grade_scale(mut self, max: f64) -> Self {
        self.grade_scale = Some(max);
        self
    }

    /// Enables percentage grades.
    pub fn with_percentage(mut self, percentage: bool) -> Self {
        self.percentage = percentage;
        self
    }

    /// Checks that the grade settings are usable together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.grade_scale {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::InvalidScale(max));
            }
            if self.percentage {
                return Err(ConfigError::ConflictingFormats(
                    "grade_scale and percentage are mutually exclusive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The grade formatter selected by this configuration, if any.
    pub fn grade_formatter(&self) -> Result<Option<Box<dyn GradeFormatter>>, ConfigError> {
        self.validate()?;
        if let Some(max) = self.grade_scale {
            return Ok(Some(Box::new(ScaledGrade::new(max))));
        }
        if self.percentage {
            return Ok(Some(Box::new(PercentageGrade)));
        }
        Ok(None)
    }
}
