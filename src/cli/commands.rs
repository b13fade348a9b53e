//! CLI command definitions for vpl-grader.
//!
//! The grader does not run tests itself: `report` replays the event log a
//! runner recorded and prints the learner report to stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::events::{replay, EventLog};
use crate::report::WriterSink;
use crate::session::{GraderConfig, Session};

/// Default log level; anything noisier would interleave with the report.
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Grading-report engine for learner test runs.
#[derive(Parser)]
#[command(name = "vpl-grader")]
#[command(about = "Turn recorded test events into a graded feedback report")]
#[command(version)]
#[command(
    long_about = "vpl-grader groups test results into families, grades each family all-or-nothing, and prints marker-delimited feedback ending in a `Grade :=>>` line.\n\nExample usage:\n  vpl-grader report --events run.jsonl --scale 10"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Replay a runner event log and print the feedback report.
    Report(ReportArgs),

    /// Validate a grader configuration file and print it as JSON.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

/// Arguments for `vpl-grader report`.
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// JSON-lines event log written by the test runner.
    #[arg(short, long, env = "VPL_GRADER_EVENTS")]
    pub events: PathBuf,

    /// YAML configuration file; flags below override its values.
    #[arg(short, long, env = "VPL_GRADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hide assertion and diff details of failing tests.
    #[arg(long)]
    pub hide_assert: bool,

    /// Rescale the grade onto 0..=SCALE.
    #[arg(long, conflicts_with = "percentage")]
    pub scale: Option<f64>,

    /// Print the grade as a percentage of the possible points.
    #[arg(long)]
    pub percentage: bool,
}

/// Arguments for `vpl-grader check-config`.
#[derive(Parser, Debug)]
pub struct CheckConfigArgs {
    /// YAML configuration file to validate.
    pub path: PathBuf,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Report(args) => run_report_command(args),
        Commands::CheckConfig(args) => run_check_config_command(args),
    }
}

/// Merges the optional config file with command-line overrides.
fn resolve_config(args: &ReportArgs) -> anyhow::Result<GraderConfig> {
    let mut config = match &args.config {
        Some(path) => GraderConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GraderConfig::default(),
    };

    if args.hide_assert {
        config.hide_assert = true;
    }
    if let Some(scale) = args.scale {
        config.grade_scale = Some(scale);
        config.percentage = false;
    }
    if args.percentage {
        config.grade_scale = None;
        config.percentage = true;
    }
    config.validate()?;
    Ok(config)
}

fn run_report_command(args: ReportArgs) -> anyhow::Result<()> {
    write_report(&args, io::stdout().lock()).map(drop)
}

/// Replays the event log named by `args` into `writer` and hands the
/// flushed writer back.
fn write_report<W: Write>(args: &ReportArgs, writer: W) -> anyhow::Result<W> {
    let config = resolve_config(args)?;
    let formatter = config.grade_formatter()?;
    let log = load_events(&args.events)?;

    info!(
        "Replaying {} events from {}",
        log.events.len(),
        args.events.display()
    );

    let mut session = Session::new(config);
    let mut sink = WriterSink::new(writer);
    let grade = replay(&mut session, log, &mut sink, formatter.as_deref())
        .context("Failed to write report")?;
    let writer = sink.into_inner().context("Failed to flush report")?;

    info!(earned = grade.earned, possible = grade.possible, "Report written");
    Ok(writer)
}

fn load_events(path: &Path) -> anyhow::Result<EventLog> {
    EventLog::from_path(path).with_context(|| format!("Failed to load events {}", path.display()))
}

fn run_check_config_command(args: CheckConfigArgs) -> anyhow::Result<()> {
    let config = GraderConfig::from_yaml_file(&args.path)
        .with_context(|| format!("Invalid config {}", args.path.display()))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
