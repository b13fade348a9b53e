//! Command-line interface for vpl-grader.
//!
//! Provides commands for replaying runner event logs into reports and
//! validating grader configuration.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
