//! Plain-text summary rendering
//!
//! Layout of each ranked row:
//!
//! ```text
//! install packages (3x) ------------------------------------------------- 12.40s
//! ```
//!
//! The label is left-aligned and padded with `-` to 70 columns, the time is
//! right-aligned and padded with `-` to 9 columns.

use crate::accumulator::{RankedStep, RunSummary};
use std::io::{self, Write};
use std::time::Duration;

/// Width of the label column, including the trailing space
pub const LABEL_WIDTH: usize = 70;

/// Minimum width of the time column
pub const TIME_WIDTH: usize = 9;

const STARTUP_LABEL: &str = "Startup time";

/// Format a label/time pair as one table row
pub fn format_row(label: &str, time: Duration) -> String {
    let label: String = label.chars().take(LABEL_WIDTH - 1).collect();
    let label = format!("{label} ");
    let time = format!(" {:.2}s", time.as_secs_f64());
    format!("{label:-<LABEL_WIDTH$}{time:->TIME_WIDTH$}")
}

/// Row label for a step: the name, with the occurrence count when repeated
pub fn step_label(step: &RankedStep) -> String {
    if step.record.occurrences > 1 {
        format!("{} ({}x)", step.name, step.record.occurrences)
    } else {
        step.name.clone()
    }
}

/// Format a duration as `H:MM:SS`, truncating fractional seconds
///
/// Spans of a day or more get a `N day, ` / `N days, ` prefix.
///
/// # Example
/// ```
/// use stepwatch::report::format_elapsed;
/// use std::time::Duration;
///
/// assert_eq!(format_elapsed(Duration::from_secs(3725)), "1:02:05");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

/// Render the full text summary
pub fn render_text(summary: &RunSummary) -> String {
    let mut out = String::new();

    for step in &summary.steps {
        out.push_str(&format_row(&step_label(step), step.record.total_time));
        out.push('\n');
    }
    out.push_str(&format_row(STARTUP_LABEL, summary.startup_time));
    out.push('\n');

    out.push_str(&format!(
        "\nRun finished: {}, {} total steps.  {} elapsed. \n\n",
        summary.finished_at.format("%a %b %e %H:%M:%S %Y"),
        summary.total_steps,
        format_elapsed(summary.total_time)
    ));
    out
}

/// Write the text summary to `writer`
pub fn write_text<W: Write>(writer: &mut W, summary: &RunSummary) -> io::Result<()> {
    writer.write_all(render_text(summary).as_bytes())?;
    writer.flush()
}
