//! CLI argument parsing for stepwatch

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable ranked table (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "stepwatch")]
#[command(version)]
#[command(about = "Time pipeline steps and print the slowest ones", long_about = None)]
pub struct Cli {
    /// Event input: `<seconds> <step name>` per line, or a host log with --live (default: stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Number of steps to list (overrides STEPWATCH_TOP_N, default: 33)
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Disable profiling (same as setting STEPWATCH_DISABLE)
    #[arg(long = "disable")]
    pub disable: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Read a live host log and time steps as their banner lines arrive
    #[arg(short = 'l', long = "live")]
    pub live: bool,

    /// Regex announcing a step in live mode; the step name is the `name` group or group 1
    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "REGEX",
        default_value = crate::events::DEFAULT_STEP_PATTERN
    )]
    pub pattern: String,

    /// Echo every host log line to stdout in live mode
    #[arg(long = "passthrough", requires = "live")]
    pub passthrough: bool,

    /// Run start time in seconds for replay (default: first event's timestamp)
    #[arg(long = "start", value_name = "SECS", conflicts_with = "live")]
    pub start: Option<f64>,

    /// Fail on malformed replay lines instead of skipping them
    #[arg(long = "strict", conflicts_with = "live")]
    pub strict: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
