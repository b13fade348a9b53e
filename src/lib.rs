//! vpl-grader: grading-report engine for learner test runs.
//!
//! This library reacts to test discovery and execution events from an
//! external runner, groups results into test families, computes an
//! all-or-nothing-per-family grade, and renders marker-delimited feedback
//! ending in a machine-readable `Grade :=>>` line.

// Core modules
pub mod cli;
pub mod error;
pub mod events;
pub mod outcome;
pub mod report;
pub mod scoring;
pub mod session;

// Re-export commonly used types
pub use error::{ConfigError, EventLogError, TemplateError};
pub use session::{GraderConfig, Session};
