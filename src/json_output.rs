//! JSON output format for run summaries
//!
//! `--format json` implementation

use crate::accumulator::RunSummary;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// A single ranked step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonStep {
    /// 1-based rank, slowest first
    pub rank: usize,
    /// Step name as reported by the host
    pub name: String,
    /// Completed executions of this step
    pub occurrences: u64,
    /// Total time across all occurrences (seconds)
    pub total_secs: f64,
}

/// Complete summary document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Format version for consumers
    pub version: String,
    /// Ranked steps (top-N only)
    pub steps: Vec<JsonStep>,
    /// Distinct step names recorded
    pub total_steps: usize,
    /// Sum of all step times (seconds)
    pub total_secs: f64,
    /// Time before the first step (seconds)
    pub startup_secs: f64,
    /// Completion timestamp (RFC 3339)
    pub finished_at: String,
}

impl From<&RunSummary> for JsonSummary {
    fn from(summary: &RunSummary) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            steps: summary
                .steps
                .iter()
                .map(|step| JsonStep {
                    rank: step.rank,
                    name: step.name.clone(),
                    occurrences: step.record.occurrences,
                    total_secs: step.record.total_time.as_secs_f64(),
                })
                .collect(),
            total_steps: summary.total_steps,
            total_secs: summary.total_time.as_secs_f64(),
            startup_secs: summary.startup_time.as_secs_f64(),
            finished_at: summary.finished_at.to_rfc3339(),
        }
    }
}

impl JsonSummary {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write the JSON summary to `writer`, newline-terminated
pub fn write_json<W: Write>(writer: &mut W, summary: &RunSummary) -> io::Result<()> {
    let json = JsonSummary::from(summary).to_json()?;
    writeln!(writer, "{json}")?;
    writer.flush()
}
