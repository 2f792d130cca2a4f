//! Integration tests for step timing through the public hook API
//!
//! Drives `ProfileHook` the way a host orchestrator would and checks the
//! recorded durations and the rendered summary.

use std::thread;
use std::time::Duration;
use stepwatch::accumulator::StepTimingAccumulator;
use stepwatch::clock::{ManualClock, SystemClock};
use stepwatch::config::ProfileConfig;
use stepwatch::hook::{PipelineHook, ProfileHook, RunStats};

#[test]
fn test_ranked_scenario_through_hook() {
    // B runs 2s, C runs 1s; the span before B is startup
    let clock = ManualClock::new();
    let mut hook = ProfileHook::new(&clock, &ProfileConfig::default(), Vec::new());

    clock.advance(Duration::from_secs(1));
    hook.on_step_start("B", false);
    clock.advance(Duration::from_secs(2));
    hook.on_step_start("C", false);
    clock.advance(Duration::from_secs(1));
    hook.on_run_complete(&RunStats::default());

    let summary = hook.summary().unwrap();
    assert_eq!(summary.steps.len(), 2);
    assert_eq!(summary.steps[0].name, "B");
    assert_eq!(summary.steps[0].record.total_time, Duration::from_secs(2));
    assert_eq!(summary.steps[1].name, "C");
    assert_eq!(summary.steps[1].record.total_time, Duration::from_secs(1));
    assert_eq!(summary.startup_time, Duration::from_secs(1));

    let text = String::from_utf8(hook.into_writer()).unwrap();
    let b = text.find("B ---").unwrap();
    let c = text.find("C ---").unwrap();
    assert!(b < c, "B should be listed before C:\n{}", text);
    assert!(text.contains("2 total steps.  0:00:03 elapsed."));
}

#[test]
fn test_repeated_steps_reported_with_count() {
    let clock = ManualClock::new();
    let mut hook = ProfileHook::new(&clock, &ProfileConfig::default(), Vec::new());

    for _ in 0..3 {
        hook.on_step_start("poll status", true);
        clock.advance(Duration::from_millis(400));
    }
    hook.on_run_complete(&RunStats::default());

    let text = String::from_utf8(hook.into_writer()).unwrap();
    assert!(
        text.starts_with("poll status (3x) ---"),
        "unexpected output:\n{}",
        text
    );
    assert!(text.lines().next().unwrap().ends_with(" 1.20s"));
}

#[test]
fn test_system_clock_span_invariant() {
    let config = ProfileConfig::default();
    let mut acc = StepTimingAccumulator::new(SystemClock::new(), &config);

    thread::sleep(Duration::from_millis(5));
    acc.on_step_start("first");
    thread::sleep(Duration::from_millis(10));
    acc.on_step_start("second");
    thread::sleep(Duration::from_millis(5));
    let summary = acc.on_run_complete().unwrap();

    assert_eq!(summary.total_time + summary.startup_time, acc.recorded_span());
    assert!(summary.startup_time >= Duration::from_millis(5));
    assert!(acc.record("first").unwrap().total_time >= Duration::from_millis(10));
    assert!(acc.recorded_span() >= Duration::from_millis(20));
}

#[test]
fn test_top_n_limits_rows_not_totals() {
    let clock = ManualClock::new();
    let config = ProfileConfig::default().with_top_n(3);
    let mut hook = ProfileHook::new(&clock, &config, Vec::new());

    for i in 1..=10u64 {
        hook.on_step_start(&format!("step {i}"), false);
        clock.advance(Duration::from_secs(i));
    }
    hook.on_run_complete(&RunStats::default());

    let text = String::from_utf8(hook.into_writer()).unwrap();
    let rows = text.lines().filter(|l| l.starts_with("step ")).count();
    assert_eq!(rows, 3);
    assert!(text.starts_with("step 10 "));
    assert!(text.contains("10 total steps.  0:00:55 elapsed."));
}

#[test]
fn test_disabled_hook_is_silent() {
    let clock = ManualClock::new();
    let config = ProfileConfig::default().with_disabled(true);
    let mut hook = ProfileHook::new(&clock, &config, Vec::new());

    hook.on_step_start("A", false);
    clock.advance(Duration::from_secs(1));
    hook.on_run_complete(&RunStats::default());

    assert!(hook.summary().is_none());
    assert!(hook.into_writer().is_empty());
}
