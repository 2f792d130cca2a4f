//! Step events read from a recorded log or a live host log
//!
//! Replay lines look like:
//!
//! ```text
//! # seconds  step name
//! 0.000      Gathering Facts
//! 2.417      install packages
//! 9.003      restart service
//! 12.250
//! ```
//!
//! The timestamp may be an offset or an absolute epoch value; only the
//! differences matter. A bare timestamp ends the run, giving the last step
//! its duration. Live mode instead matches each host log line against a
//! regex and times the step when the line arrives.

use crate::clock::ManualClock;
use crate::config::ConfigError;
use crate::hook::{PipelineHook, RunStats};
use anyhow::{Context, Result};
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use thiserror::Error;

/// Default live pattern: `TASK [name] ****`
pub const DEFAULT_STEP_PATTERN: &str = r"^TASK \[(?P<name>.+?)\]";

/// Malformed replay input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("line {line}: missing timestamp")]
    MissingTimestamp { line: usize },

    #[error("line {line}: invalid timestamp {value:?}")]
    InvalidTimestamp { line: usize, value: String },

    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },
}

/// One parsed replay line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Step `name` starts at `at`
    StepStart { at: Duration, name: String },
    /// A bare timestamp: the run ended at `at`
    RunEnd { at: Duration },
}

impl Event {
    pub fn at(&self) -> Duration {
        match self {
            Event::StepStart { at, .. } | Event::RunEnd { at } => *at,
        }
    }
}

/// Read the next line into `buf`, dropping its `\n` or `\r\n` ending
///
/// Returns `false` at end of input.
fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}

fn parse_timestamp(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Parse one replay line
///
/// Returns `Ok(None)` for blank lines and `#` comments. A line holding only a
/// timestamp marks the end of the run. `line` is the 1-based line number used
/// in errors.
///
/// # Example
/// ```
/// use stepwatch::events::{parse_event_line, Event};
/// use std::time::Duration;
///
/// let event = parse_event_line("1.5 deploy app", 1).unwrap();
/// assert_eq!(
///     event,
///     Some(Event::StepStart {
///         at: Duration::from_millis(1500),
///         name: "deploy app".to_string(),
///     })
/// );
/// ```
pub fn parse_event_line(text: &str, line: usize) -> Result<Option<Event>, EventError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let (raw_time, name) = match text.split_once(char::is_whitespace) {
        Some((time, name)) => (time, Some(name.trim())),
        None => (text, None),
    };

    let at = match (parse_timestamp(raw_time), name) {
        (Some(at), _) => at,
        (None, None) => return Err(EventError::MissingTimestamp { line }),
        (None, Some(_)) => {
            return Err(EventError::InvalidTimestamp {
                line,
                value: raw_time.to_string(),
            })
        }
    };

    Ok(Some(match name {
        Some(name) => Event::StepStart {
            at,
            name: name.to_string(),
        },
        None => Event::RunEnd { at },
    }))
}

/// Regex that extracts step names from host log lines
#[derive(Debug, Clone)]
pub struct StepPattern {
    regex: Regex,
}

impl StepPattern {
    /// Compile a pattern; it must have a `name` group or at least one group
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(ConfigError::MissingCapture {
                pattern: pattern.to_string(),
            });
        }
        Ok(Self { regex })
    }

    /// Step name in `line`, if the line announces a step
    pub fn step_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = self.regex.captures(line)?;
        let name = caps.name("name").or_else(|| caps.get(1))?.as_str().trim();
        (!name.is_empty()).then_some(name)
    }
}

impl Default for StepPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_STEP_PATTERN).expect("default step pattern is valid"),
        }
    }
}

/// Replay behaviour
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Run start; the first event's timestamp when absent
    pub start: Option<Duration>,
    /// Abort on the first malformed line instead of skipping it
    pub strict: bool,
}

/// Feed recorded events to `hook`, advancing `clock` to each timestamp
///
/// `clock` must be the clock the hook's accumulator was built with, still at
/// zero. Ends with [`PipelineHook::on_run_complete`] at the first run-end
/// marker, or once input is exhausted.
pub fn replay<R, H>(
    mut reader: R,
    clock: &ManualClock,
    hook: &mut H,
    options: ReplayOptions,
) -> Result<RunStats>
where
    R: BufRead,
    H: PipelineHook,
{
    let mut stats = RunStats::default();
    let mut origin = options.start;
    let mut buf = Vec::new();
    let mut i = 0;

    while next_line(&mut reader, &mut buf).context("Failed to read event input")? {
        i += 1;
        let parsed = match std::str::from_utf8(&buf) {
            Ok(text) => parse_event_line(text, i),
            Err(_) => Err(EventError::InvalidUtf8 { line: i }),
        };
        let event = match parsed {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) if options.strict => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Skipping malformed event: {}", e);
                stats.malformed += 1;
                continue;
            }
        };

        let at = event.at();
        let run_start = *origin.get_or_insert(at);
        let offset = match at.checked_sub(run_start) {
            Some(offset) => offset,
            None => {
                tracing::warn!("line {}: event before the run start; clamped", i);
                Duration::ZERO
            }
        };
        if !clock.set(offset) {
            tracing::warn!("line {}: timestamp goes backwards; clamped", i);
        }

        match event {
            Event::StepStart { name, .. } => {
                hook.on_step_start(&name, false);
                stats.events += 1;
            }
            Event::RunEnd { .. } => {
                tracing::debug!("run end marker on line {}", i);
                break;
            }
        }
    }

    hook.on_run_complete(&stats);
    Ok(stats)
}

/// Feed steps announced in a live host log to `hook`
///
/// Steps are timed by the hook's own clock when their line is read. With
/// `passthrough`, every input line is copied to it unchanged.
pub fn follow<R, H>(
    mut reader: R,
    pattern: &StepPattern,
    hook: &mut H,
    mut passthrough: Option<&mut dyn Write>,
) -> Result<RunStats>
where
    R: BufRead,
    H: PipelineHook,
{
    let mut stats = RunStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .context("Failed to read host log")?;
        if read == 0 {
            break;
        }
        // Echo the host's bytes as-is, whatever their encoding
        if let Some(out) = passthrough.as_deref_mut() {
            out.write_all(&buf).context("Failed to echo host log")?;
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);
        if let Some(name) = pattern.step_name(line) {
            hook.on_step_start(name, false);
            stats.events += 1;
        }
    }

    hook.on_run_complete(&stats);
    Ok(stats)
}
