//! stepwatch - step timing hook for pipeline orchestrators
//!
//! A host calls the hook when each step starts and once when the run ends.
//! The hook attributes wall-clock time to steps, merges repeated step names,
//! and prints the slowest steps as a ranked table.

pub mod accumulator;
pub mod cli;
pub mod clock;
pub mod config;
pub mod events;
pub mod hook;
pub mod json_output;
pub mod report;
