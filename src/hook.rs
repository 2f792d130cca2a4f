//! Host-facing callback hook
//!
//! A host orchestrator calls [`PipelineHook::on_step_start`] when a step
//! begins and [`PipelineHook::on_run_complete`] once at the end of the run.
//! [`ProfileHook`] times the steps and writes the ranked summary.

use crate::accumulator::{RunSummary, StepTimingAccumulator};
use crate::cli::OutputFormat;
use crate::clock::Clock;
use crate::config::ProfileConfig;
use crate::{json_output, report};
use std::io::Write;

/// Final statistics handed over by the host at the end of a run
///
/// Timing never depends on these; they are logged for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Step-start events delivered by the host
    pub events: u64,
    /// Input lines the host could not turn into events
    pub malformed: u64,
}

/// The two notifications a host delivers to a plugin
pub trait PipelineHook {
    /// A step named `name` is starting
    fn on_step_start(&mut self, name: &str, is_conditional: bool);

    /// The run is over
    fn on_run_complete(&mut self, stats: &RunStats);
}

/// Step profiler plugged into a host
///
/// Owns the accumulator for one run and the writer that receives the summary.
#[derive(Debug)]
pub struct ProfileHook<C: Clock, W: Write> {
    accumulator: StepTimingAccumulator<C>,
    format: OutputFormat,
    writer: W,
    summary: Option<RunSummary>,
}

impl<C: Clock, W: Write> ProfileHook<C, W> {
    pub fn new(clock: C, config: &ProfileConfig, writer: W) -> Self {
        Self {
            accumulator: StepTimingAccumulator::new(clock, config),
            format: config.format,
            writer,
            summary: None,
        }
    }

    pub fn accumulator(&self) -> &StepTimingAccumulator<C> {
        &self.accumulator
    }

    /// Summary produced by the last completed run, if any
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Give back the output writer
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn emit(&mut self, summary: &RunSummary) {
        let result = match self.format {
            OutputFormat::Text => report::write_text(&mut self.writer, summary),
            OutputFormat::Json => json_output::write_json(&mut self.writer, summary),
        };
        // The host's run must not fail because the report could not be written
        if let Err(e) = result {
            tracing::warn!("Failed to write step timing summary: {}", e);
        }
    }
}

impl<C: Clock, W: Write> PipelineHook for ProfileHook<C, W> {
    fn on_step_start(&mut self, name: &str, is_conditional: bool) {
        if is_conditional {
            tracing::trace!("conditional step {:?}", name);
        }
        self.accumulator.on_step_start(name);
    }

    fn on_run_complete(&mut self, stats: &RunStats) {
        tracing::debug!(
            "host reported {} events, {} malformed",
            stats.events,
            stats.malformed
        );

        if let Some(summary) = self.accumulator.on_run_complete() {
            self.emit(&summary);
            self.summary = Some(summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::io;
    use std::time::Duration;

    fn run(hook: &mut impl PipelineHook, clock: &ManualClock) {
        hook.on_step_start("gather facts", false);
        clock.advance(Duration::from_secs(1));
        hook.on_step_start("install", false);
        clock.advance(Duration::from_secs(3));
        hook.on_step_start("restart", true);
        clock.advance(Duration::from_millis(500));
        hook.on_run_complete(&RunStats::default());
    }

    #[test]
    fn test_text_summary_written_on_complete() {
        let clock = ManualClock::new();
        let mut hook = ProfileHook::new(&clock, &ProfileConfig::default(), Vec::new());
        run(&mut hook, &clock);

        let text = String::from_utf8(hook.into_writer()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("install "));
        assert!(lines[0].ends_with(" 3.00s"));
        assert!(lines[1].starts_with("gather facts "));
        assert!(lines[2].starts_with("restart "));
        assert!(text.contains("3 total steps."));
    }

    #[test]
    fn test_nothing_written_before_complete() {
        let clock = ManualClock::new();
        let mut hook = ProfileHook::new(&clock, &ProfileConfig::default(), Vec::new());
        hook.on_step_start("one", false);
        clock.advance(Duration::from_secs(1));
        hook.on_step_start("two", false);

        assert!(hook.summary().is_none());
        assert!(hook.into_writer().is_empty());
    }

    #[test]
    fn test_json_format() {
        let clock = ManualClock::new();
        let config = ProfileConfig::default().with_format(OutputFormat::Json);
        let mut hook = ProfileHook::new(&clock, &config, Vec::new());
        run(&mut hook, &clock);

        let value: serde_json::Value = serde_json::from_slice(&hook.into_writer()).unwrap();
        assert_eq!(value["steps"][0]["name"], "install");
        assert_eq!(value["total_steps"], 3);
    }

    #[test]
    fn test_disabled_hook_writes_nothing() {
        let clock = ManualClock::new();
        let config = ProfileConfig::default().with_disabled(true);
        let mut hook = ProfileHook::new(&clock, &config, Vec::new());
        run(&mut hook, &clock);

        assert!(hook.summary().is_none());
        assert_eq!(hook.accumulator().records().count(), 0);
        assert!(hook.into_writer().is_empty());
    }

    #[test]
    fn test_summary_kept_after_complete() {
        let clock = ManualClock::new();
        let config = ProfileConfig::default().with_top_n(1);
        let mut hook = ProfileHook::new(&clock, &config, Vec::new());
        run(&mut hook, &clock);

        let summary = hook.summary().unwrap();
        assert_eq!(summary.steps.len(), 1);
        assert_eq!(summary.steps[0].name, "install");
        assert_eq!(summary.total_steps, 3);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_does_not_panic() {
        let clock = ManualClock::new();
        let mut hook = ProfileHook::new(&clock, &ProfileConfig::default(), FailingWriter);
        run(&mut hook, &clock);

        // Summary still available even though it could not be printed
        assert!(hook.summary().is_some());
    }
}
