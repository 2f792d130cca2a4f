//! Per-step wall-clock accumulation
//!
//! A step's duration is only known when the *next* step starts, so every
//! start-of-step notification closes the previous step. Time before the first
//! step is kept apart as startup time, and the final step is closed by
//! [`StepTimingAccumulator::on_run_complete`].
//!
//! Step names are not unique: every occurrence of a name, contiguous or not,
//! is merged into a single [`StepRecord`].

use crate::clock::Clock;
use crate::config::ProfileConfig;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::time::Duration;

/// Aggregated timing for one step name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepRecord {
    /// Number of completed executions of this step
    pub occurrences: u64,
    /// Wall-clock time across all occurrences
    pub total_time: Duration,
}

/// One row of the ranked summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedStep {
    /// 1-based position after sorting
    pub rank: usize,
    pub name: String,
    pub record: StepRecord,
}

/// Ranked result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Top-N steps, slowest first
    pub steps: Vec<RankedStep>,
    /// Distinct step names recorded (before truncation)
    pub total_steps: usize,
    /// Sum of all recorded step times (before truncation)
    pub total_time: Duration,
    /// Time elapsed before the first step started
    pub startup_time: Duration,
    /// Local wall-clock time at completion
    pub finished_at: DateTime<Local>,
}

/// Accumulates step durations for a single run
///
/// # Example
/// ```
/// use stepwatch::accumulator::StepTimingAccumulator;
/// use stepwatch::clock::ManualClock;
/// use stepwatch::config::ProfileConfig;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut acc = StepTimingAccumulator::new(&clock, &ProfileConfig::default());
///
/// acc.on_step_start("fetch");
/// clock.advance(Duration::from_secs(3));
/// acc.on_step_start("build");
/// clock.advance(Duration::from_secs(1));
///
/// let summary = acc.on_run_complete().unwrap();
/// assert_eq!(summary.steps[0].name, "fetch");
/// assert_eq!(summary.steps[1].name, "build");
/// ```
#[derive(Debug)]
pub struct StepTimingAccumulator<C: Clock> {
    clock: C,
    enabled: bool,
    top_n: usize,
    /// Records in first-seen order; ties in the ranking keep this order
    records: Vec<(String, StepRecord)>,
    index: HashMap<String, usize>,
    previous_step: Option<String>,
    previous_start: Duration,
    startup_time: Duration,
    created_at: Duration,
}

impl<C: Clock> StepTimingAccumulator<C> {
    /// Create an accumulator; the run starts now
    pub fn new(clock: C, config: &ProfileConfig) -> Self {
        let created_at = clock.now();
        Self {
            clock,
            enabled: !config.disabled,
            top_n: config.top_n,
            records: Vec::new(),
            index: HashMap::new(),
            previous_step: None,
            previous_start: created_at,
            startup_time: Duration::ZERO,
            created_at,
        }
    }

    /// Record the start of step `name`, closing the previous step
    pub fn on_step_start(&mut self, name: &str) {
        if !self.enabled {
            return;
        }
        self.transition(Some(name.to_string()));
    }

    /// Close the last step and rank all steps by total time
    ///
    /// Returns `None` when profiling is disabled.
    pub fn on_run_complete(&mut self) -> Option<RunSummary> {
        if !self.enabled {
            return None;
        }

        // The final step has no successor; restart it to flush its duration
        let last = self.previous_step.clone();
        self.transition(last);

        let summary = RunSummary {
            steps: self.ranked(self.top_n),
            total_steps: self.records.len(),
            total_time: self.total_step_time(),
            startup_time: self.startup_time,
            finished_at: Local::now(),
        };

        tracing::debug!(
            "run complete: {} steps, {:.3}s recorded, {:.3}s startup",
            summary.total_steps,
            summary.total_time.as_secs_f64(),
            summary.startup_time.as_secs_f64()
        );
        Some(summary)
    }

    fn transition(&mut self, next: Option<String>) {
        let now = self.clock.now();
        let delta = now.saturating_sub(self.previous_start);

        match self.previous_step.take() {
            None => {
                self.startup_time += delta;
                tracing::debug!("startup took {:.3}s", self.startup_time.as_secs_f64());
            }
            Some(previous) => {
                tracing::debug!("step {:?} took {:.3}s", previous, delta.as_secs_f64());
                let i = match self.index.get(&previous) {
                    Some(&i) => i,
                    None => {
                        let i = self.records.len();
                        self.index.insert(previous.clone(), i);
                        self.records.push((previous, StepRecord::default()));
                        i
                    }
                };
                let record = &mut self.records[i].1;
                record.occurrences += 1;
                record.total_time += delta;
            }
        }

        self.previous_step = next;
        self.previous_start = now;
    }

    /// Steps sorted by total time (descending), at most `limit` of them
    ///
    /// Does not flush the step in progress.
    pub fn ranked(&self, limit: usize) -> Vec<RankedStep> {
        let mut sorted: Vec<_> = self.records.iter().collect();
        // Stable: equal times keep first-seen order
        sorted.sort_by(|a, b| b.1.total_time.cmp(&a.1.total_time));

        sorted
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (name, record))| RankedStep {
                rank: i + 1,
                name: name.clone(),
                record: *record,
            })
            .collect()
    }

    /// Look up the record for a step name
    pub fn record(&self, name: &str) -> Option<&StepRecord> {
        self.index.get(name).map(|&i| &self.records[i].1)
    }

    /// All completed records in first-seen order
    pub fn records(&self) -> impl Iterator<Item = (&str, &StepRecord)> {
        self.records.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn startup_time(&self) -> Duration {
        self.startup_time
    }

    /// Name of the step currently in progress
    pub fn previous_step(&self) -> Option<&str> {
        self.previous_step.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sum of all recorded step times
    pub fn total_step_time(&self) -> Duration {
        self.records.iter().map(|(_, r)| r.total_time).sum()
    }

    /// Span from creation to the most recent notification
    pub fn recorded_span(&self) -> Duration {
        self.previous_start.saturating_sub(self.created_at)
    }
}
